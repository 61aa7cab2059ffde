//! 章节正文提取
//!
//! 章节 i 的正文一直延伸到章节 i+1 的起点；只有最后一个章节使用 LLM 给出的
//! `char_end`。这样可以消除不同窗口各自检测带来的范围分歧。

use crate::models::{NodeCandidate, RawSection, SourceText};

/// 为每个章节切出正文（去掉首尾空白）
pub fn materialize(source: &SourceText, sections: &[RawSection]) -> Vec<NodeCandidate> {
    let doc_len = source.len_chars();

    sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let start = section.char_start.min(doc_len);
            let end = match sections.get(i + 1) {
                Some(next) => next.char_start,
                None => section.char_end,
            }
            .clamp(start, doc_len);

            NodeCandidate {
                title: section.title.clone(),
                level: section.level,
                char_start: start,
                char_end: end,
                text: source.slice(start, end).trim().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, start: usize, end: usize) -> RawSection {
        RawSection {
            title: title.to_string(),
            level: 1,
            char_start: start,
            char_end: end,
            chunk_idx: 0,
        }
    }

    #[test]
    fn test_section_runs_until_next_start() {
        let source = SourceText::new("Intro text here.\n\nBody starts here.\n");
        // LLM 给出的第一个 char_end 偏短，会被下一个章节的起点覆盖
        let nodes = materialize(&source, &[section("Intro", 0, 5), section("Body", 18, 36)]);
        assert_eq!(nodes[0].char_end, 18);
        assert_eq!(nodes[0].text, "Intro text here.");
        assert_eq!(nodes[1].char_start, 18);
        assert_eq!(nodes[1].char_end, 36);
        assert_eq!(nodes[1].text, "Body starts here.");
    }

    #[test]
    fn test_last_section_uses_own_end() {
        let source = SourceText::new("0123456789");
        let nodes = materialize(&source, &[section("only", 2, 6)]);
        assert_eq!(nodes[0].text, "2345");
    }

    #[test]
    fn test_end_clamped_to_document() {
        let source = SourceText::new("short");
        let nodes = materialize(&source, &[section("x", 0, 999)]);
        assert_eq!(nodes[0].char_end, 5);
        assert_eq!(nodes[0].text, "short");
    }

    #[test]
    fn test_shared_start_gives_empty_parent_text() {
        let source = SourceText::new("Chapter body");
        let nodes = materialize(&source, &[section("Part", 0, 12), section("Chapter", 0, 12)]);
        assert_eq!(nodes[0].text, "");
        assert_eq!(nodes[1].text, "Chapter body");
    }
}
