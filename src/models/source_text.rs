//! 只读文档缓冲区
//!
//! 所有偏移量都按字符（Unicode scalar）计算，与 LLM 看到的文本和输出 JSON 中的
//! `char_start` / `char_end` 保持一致。内部维护一张字符到字节的边界表，
//! 使切片为 O(1)。

/// 只读文档文本
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    /// `boundaries[i]` 是第 i 个字符的字节偏移，末尾额外存放 `text.len()`
    boundaries: Vec<usize>,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 字符数
    pub fn len_chars(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// 按字符偏移切片，越界部分会被截断
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let len = self.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }
}

/// 统计字符数
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
