//! 章节去重合并
//!
//! 窗口重叠会让同一个标题被检测两次。这里只去掉 `(char_start, level, title)`
//! 完全相同的重复项，起点相同但层级不同的章节保持独立。

use std::collections::HashSet;

use crate::models::RawSection;

/// 按 `(char_start, level)` 排序并去重
pub fn reconcile(mut sections: Vec<RawSection>) -> Vec<RawSection> {
    sections.sort_by_key(|s| (s.char_start, s.level));

    let mut seen = HashSet::new();
    sections.retain(|s| seen.insert((s.char_start, s.level, s.title.clone())));
    sections
}
