//! 文本窗口切分
//!
//! 把长文本切成相互重叠的窗口，窗口结尾尽量对齐到句子结束处。

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppResult, ConfigError};
use crate::models::source_text::{char_len, SourceText};
use crate::models::Window;

/// 在窗口末尾多少个字符内寻找句子边界
const BOUNDARY_SEARCH_CHARS: usize = 200;

fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"))
}

/// 窗口切分器
///
/// 构造时校验 `overlap < window_size`，保证切分一定能结束
#[derive(Debug, Clone, Copy)]
pub struct Windower {
    window_size: usize,
    overlap: usize,
}

impl Windower {
    pub fn new(window_size: usize, overlap: usize) -> AppResult<Self> {
        if window_size == 0 || overlap >= window_size {
            return Err(ConfigError::InvalidWindow {
                window_size,
                overlap,
            }
            .into());
        }
        Ok(Self {
            window_size,
            overlap,
        })
    }

    /// 切分文本
    ///
    /// - 文本不超过 `window_size` 时返回覆盖全文的单个窗口
    /// - 否则每个窗口结尾在最后 200 个字符内寻找最后一个 `[.!?]\s+`，找到则截到匹配之后
    /// - 找不到句子边界时直接在上限处截断
    /// - 下一个窗口从 `end - overlap` 开始
    pub fn split(&self, source: &SourceText) -> Vec<Window> {
        let len = source.len_chars();
        if len <= self.window_size {
            return vec![Window {
                text: source.as_str().to_string(),
                start: 0,
                end: len,
            }];
        }

        let mut windows = Vec::with_capacity(len / (self.window_size - self.overlap) + 1);
        let mut start = 0;

        loop {
            let cap = (start + self.window_size).min(len);
            let mut end = cap;

            if cap < len {
                // 对齐后的窗口必须仍然让下一个 start 前进
                if let Some(snapped) = self.snap_to_sentence(source, start, cap) {
                    if snapped > start + self.overlap {
                        end = snapped;
                    }
                }
            }

            windows.push(Window {
                text: source.slice(start, end).to_string(),
                start,
                end,
            });

            if end >= len {
                break;
            }
            start = end - self.overlap;
        }

        windows
    }

    /// 返回 `[start, end)` 末尾区域中最后一个句子边界之后的位置
    fn snap_to_sentence(&self, source: &SourceText, start: usize, end: usize) -> Option<usize> {
        let search_start = end.saturating_sub(BOUNDARY_SEARCH_CHARS).max(start);
        let region = source.slice(search_start, end);
        let last = sentence_end().find_iter(region).last()?;
        Some(search_start + char_len(&region[..last.end()]))
    }
}
