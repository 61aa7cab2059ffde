//! Token 计数能力
//!
//! 计数器本身被视为外部协作者（纯函数，无副作用）。按 token 预算切分文本时
//! 只依赖 `count`，在字符域上二分查找边界，因此任何计数器实现都能复用。

use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

use crate::error::{AppResult, ConfigError};
use crate::models::SourceText;

/// Token 计数器
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// 基于 tiktoken 的计数器
pub struct TiktokenCounter {
    bpe: CoreBPE,
    model: String,
}

impl TiktokenCounter {
    /// 按模型名选择编码；未知模型回退到 o200k_base
    pub fn for_model(model: &str) -> AppResult<Self> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(e) => {
                warn!("模型 {} 没有对应的分词器 ({}), 使用 o200k_base", model, e);
                tiktoken_rs::o200k_base().map_err(|e| ConfigError::TokenizerUnavailable {
                    model: model.to_string(),
                    reason: e.to_string(),
                })?
            }
        };
        Ok(Self {
            bpe,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// 按 token 预算切出的子块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenChunk {
    pub text: String,
    /// 子块在原文中的字符偏移
    pub char_offset: usize,
}

/// 把文本切成不超过 `max_tokens` 的子块，相邻子块重叠约 `overlap_tokens` 个 token
///
/// 实际重叠不超过 `max_tokens / 2`，保证每个子块都向前推进。
/// 文本本身不超过预算时原样返回一个子块。
pub fn split_by_tokens(
    counter: &dyn TokenCounter,
    text: &str,
    max_tokens: usize,
    overlap_tokens: usize,
) -> Vec<TokenChunk> {
    if max_tokens == 0 || counter.count(text) <= max_tokens {
        return vec![TokenChunk {
            text: text.to_string(),
            char_offset: 0,
        }];
    }

    let source = SourceText::new(text);
    let len = source.len_chars();
    let overlap = overlap_tokens.min(max_tokens / 2);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = last_true(start, len, |end| {
            counter.count(source.slice(start, end)) <= max_tokens
        })
        .max(start + 1);

        chunks.push(TokenChunk {
            text: source.slice(start, end).to_string(),
            char_offset: start,
        });

        if end >= len {
            break;
        }

        let next = if overlap == 0 {
            end
        } else {
            // [next, end) 至少包含 overlap 个 token 的最靠后起点
            last_true(start, end, |s| counter.count(source.slice(s, end)) >= overlap)
        };
        start = next.clamp(start + 1, end);
    }

    debug!(
        "文本按 {} token 切分为 {} 个子块 (重叠 {} token)",
        max_tokens,
        chunks.len(),
        overlap
    );
    chunks
}

/// 截断文本，使其不超过 `max_tokens`
pub fn truncate_to_tokens<'a>(counter: &dyn TokenCounter, text: &'a str, max_tokens: usize) -> &'a str {
    if counter.count(text) <= max_tokens {
        return text;
    }
    let source = SourceText::new(text);
    let end = last_true(0, source.len_chars(), |end| {
        counter.count(source.slice(0, end)) <= max_tokens
    });
    let byte_end = source.slice(0, end).len();
    &text[..byte_end]
}

/// 在 `[lo, hi]` 上寻找最后一个满足 `pred` 的位置（`pred` 单调：先真后假）
fn last_true(mut lo: usize, mut hi: usize, pred: impl Fn(usize) -> bool) -> usize {
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if pred(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TokenCounter;

    /// 测试用计数器：按空白分词
    pub struct WhitespaceCounter;

    impl TokenCounter for WhitespaceCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    pub fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{words, WhitespaceCounter};
    use super::*;

    #[test]
    fn test_small_text_is_single_chunk() {
        let chunks = split_by_tokens(&WhitespaceCounter, "a b c", 10, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].char_offset, 0);
        assert_eq!(chunks[0].text, "a b c");
    }

    #[test]
    fn test_chunks_respect_budget_and_overlap() {
        let text = words(100);
        let source = SourceText::new(text.as_str());
        let chunks = split_by_tokens(&WhitespaceCounter, &text, 30, 500);

        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].char_offset, 0);
        for chunk in &chunks {
            assert!(WhitespaceCounter.count(&chunk.text) <= 30);
            let end = chunk.char_offset + chunk.text.chars().count();
            assert_eq!(chunk.text, source.slice(chunk.char_offset, end));
        }
        for pair in chunks.windows(2) {
            let prev_end = pair[0].char_offset + pair[0].text.chars().count();
            assert!(pair[1].char_offset > pair[0].char_offset);
            assert!(pair[1].char_offset < prev_end, "相邻子块应当重叠");
        }
        let last = chunks.last().unwrap();
        assert_eq!(last.char_offset + last.text.chars().count(), source.len_chars());
    }

    #[test]
    fn test_zero_overlap_chunks_are_adjacent() {
        let text = words(50);
        let chunks = split_by_tokens(&WhitespaceCounter, &text, 20, 0);
        for pair in chunks.windows(2) {
            let prev_end = pair[0].char_offset + pair[0].text.chars().count();
            assert_eq!(pair[1].char_offset, prev_end);
        }
    }

    #[test]
    fn test_truncate_to_tokens() {
        let text = words(10);
        let truncated = truncate_to_tokens(&WhitespaceCounter, &text, 3);
        assert_eq!(WhitespaceCounter.count(truncated), 3);
        assert!(truncated.starts_with("w0 w1 w2"));
        assert_eq!(truncate_to_tokens(&WhitespaceCounter, "a b", 5), "a b");
    }

    #[test]
    fn test_tiktoken_counter() {
        let counter = TiktokenCounter::for_model("gpt-4o").unwrap();
        assert!(counter.count("hello world") >= 2);
    }

    #[test]
    fn test_unknown_model_falls_back_to_o200k() {
        let text = "第一章 引言。The quick brown fox jumps over the lazy dog.";
        let fallback = TiktokenCounter::for_model("some-unknown-model").unwrap();
        let o200k = tiktoken_rs::o200k_base().unwrap();

        assert_eq!(fallback.model(), "some-unknown-model");
        assert_eq!(fallback.count(text), o200k.encode_with_special_tokens(text).len());
    }
}
