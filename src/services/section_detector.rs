//! 章节检测适配层
//!
//! 把窗口（超出输入预算时再切成子块）交给 LLM 识别章节，解析返回的 JSON，
//! 并把子块内的局部偏移换算成全文偏移。
//!
//! - LLM 返回无法解析或不是数组：该子块视为没有章节（只记 warn，不中断）
//! - 全部子块都没有章节：合成一个覆盖全文的一级章节
//! - LLM 调用本身失败（重试后）：向上返回错误

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::source_text::char_len;
use crate::models::{RawSection, SourceText, Window};
use crate::services::oracle::ChatCompletion;
use crate::services::token_counter::{split_by_tokens, TokenChunk, TokenCounter};

/// 子块之间的 token 重叠
pub const SUBCHUNK_OVERLAP_TOKENS: usize = 500;

/// 没有检测到任何章节时合成章节的标题
pub const FALLBACK_TITLE: &str = "Document Content";

/// 章节检测器
pub struct SectionDetector<'a> {
    oracle: &'a dyn ChatCompletion,
    counter: &'a dyn TokenCounter,
}

impl<'a> SectionDetector<'a> {
    pub fn new(oracle: &'a dyn ChatCompletion, counter: &'a dyn TokenCounter) -> Self {
        Self { oracle, counter }
    }

    /// 检测一段文本中的章节，偏移相对于 `text`
    ///
    /// 非空输入永远不会返回空列表
    pub async fn detect(
        &self,
        text: &str,
        max_input_tokens: Option<usize>,
    ) -> AppResult<Vec<RawSection>> {
        let (sections, _) = self.detect_chunks(text, max_input_tokens, 0).await?;
        if sections.is_empty() {
            return Ok(vec![fallback_section(char_len(text))]);
        }
        Ok(sections)
    }

    /// 逐个窗口检测，返回全文偏移的章节
    ///
    /// 兜底章节针对整篇文档只合成一次，所以没有结构的多窗口文档也只得到一个章节
    pub async fn detect_windows(
        &self,
        source: &SourceText,
        windows: &[Window],
        max_input_tokens: Option<usize>,
    ) -> AppResult<Vec<RawSection>> {
        let mut all_sections = Vec::new();
        let mut next_chunk_idx = 0;

        for (i, window) in windows.iter().enumerate() {
            debug!(
                "检测窗口 {}/{}: [{}, {})",
                i + 1,
                windows.len(),
                window.start,
                window.end
            );
            let (sections, chunk_idx) = self
                .detect_chunks(&window.text, max_input_tokens, next_chunk_idx)
                .await?;
            next_chunk_idx = chunk_idx;

            all_sections.extend(sections.into_iter().map(|mut s| {
                s.char_start += window.start;
                s.char_end += window.start;
                s
            }));
        }

        if all_sections.is_empty() {
            warn!("⚠️ 没有检测到任何章节，使用整篇文档作为单个章节");
            return Ok(vec![fallback_section(source.len_chars())]);
        }

        info!("✓ 共检测到 {} 个章节（去重前）", all_sections.len());
        Ok(all_sections)
    }

    /// 按 token 预算切分后逐个子块调用 LLM
    ///
    /// 返回 (章节列表, 下一个可用的 chunk_idx)。每个子块的偏移取自切分结果中
    /// 已知的 `char_offset`，不依赖前面子块的检测结果。
    async fn detect_chunks(
        &self,
        text: &str,
        max_input_tokens: Option<usize>,
        first_chunk_idx: usize,
    ) -> AppResult<(Vec<RawSection>, usize)> {
        let chunks = match max_input_tokens {
            Some(limit) => split_by_tokens(self.counter, text, limit, SUBCHUNK_OVERLAP_TOKENS),
            None => vec![TokenChunk {
                text: text.to_string(),
                char_offset: 0,
            }],
        };
        if chunks.len() > 1 {
            info!(
                "📦 文本超出 {} token，切分为 {} 个子块",
                max_input_tokens.unwrap_or_default(),
                chunks.len()
            );
        }

        let mut sections = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_idx = first_chunk_idx + i;
            let reply = self
                .oracle
                .complete(&build_detection_prompt(&chunk.text))
                .await?;

            let detected = parse_sections(&reply);
            debug!("子块 {} 检测到 {} 个章节", chunk_idx, detected.len());

            let chunk_len = char_len(&chunk.text);
            sections.extend(
                detected
                    .into_iter()
                    .map(|d| d.localize(chunk_len, chunk.char_offset, chunk_idx)),
            );
        }

        Ok((sections, first_chunk_idx + chunks.len()))
    }
}

fn fallback_section(len: usize) -> RawSection {
    RawSection {
        title: FALLBACK_TITLE.to_string(),
        level: 1,
        char_start: 0,
        char_end: len,
        chunk_idx: 0,
    }
}

/// LLM 返回的单个章节（子块内偏移，尚未校正）
#[derive(Debug, Clone, PartialEq)]
struct DetectedSection {
    title: String,
    level: u32,
    char_start: i64,
    char_end: i64,
}

impl DetectedSection {
    /// 缺少数值型 `char_start` / `char_end` 的条目直接丢弃
    fn from_value(value: &JsonValue, ordinal: usize) -> Option<Self> {
        let obj = value.as_object()?;
        let char_start = as_integer(obj.get("char_start")?)?;
        let char_end = as_integer(obj.get("char_end")?)?;
        let title = obj
            .get("title")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Section {}", ordinal));
        let level = obj
            .get("level")
            .and_then(as_integer)
            .unwrap_or(1)
            .clamp(1, i64::from(u32::MAX)) as u32;

        Some(Self {
            title,
            level,
            char_start,
            char_end,
        })
    }

    /// 夹紧到子块范围内，再加上子块偏移
    fn localize(self, chunk_len: usize, chunk_offset: usize, chunk_idx: usize) -> RawSection {
        let bound = chunk_len as i64;
        let start = self.char_start.clamp(0, bound) as usize;
        let end = (self.char_end.clamp(0, bound) as usize).max(start);
        RawSection {
            title: self.title,
            level: self.level,
            char_start: start + chunk_offset,
            char_end: end + chunk_offset,
            chunk_idx,
        }
    }
}

fn as_integer(value: &JsonValue) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// 解析 LLM 回复；失败时返回空列表
fn parse_sections(reply: &str) -> Vec<DetectedSection> {
    let Some(value) = extract_json(reply) else {
        warn!("无法解析 LLM 返回的章节 JSON，视为无章节");
        return Vec::new();
    };
    let JsonValue::Array(items) = value else {
        warn!("LLM 返回的章节不是数组，视为无章节");
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| DetectedSection::from_value(item, i + 1))
        .collect()
}

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("code fence pattern is valid")
    })
}

/// 从回复中提取 JSON：先去掉 ``` 代码块包裹，再退而截取第一个 `[` 到最后一个 `]`
fn extract_json(reply: &str) -> Option<JsonValue> {
    let body = code_fence()
        .captures(reply)
        .and_then(|c| c.get(1))
        .map_or(reply.trim(), |m| m.as_str());

    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }

    let start = body.find('[')?;
    let end = body.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

/// 章节检测提示词
pub fn build_detection_prompt(chunk: &str) -> String {
    format!(
        r#"You are an expert document analyzer. Your task is to identify semantic sections (headings and subheadings) in the following unstructured text.

Analyze the text and identify natural section boundaries, titles, and their hierarchical levels (1 for main sections, 2 for subsections, 3 for sub-subsections, etc.).

Look for:
- Topic changes or transitions
- Natural paragraph groupings
- Semantic breaks in content
- Logical organization of ideas

Text to analyze:
{}

Return a JSON array of sections with the following structure:
[
  {{
    "title": "Section Title",
    "level": 1,
    "char_start": 0,
    "char_end": 500
  }},
  ...
]

Important:
- char_start and char_end should be the character positions within THIS chunk
- Assign appropriate hierarchical levels based on content importance and structure
- Create descriptive titles that summarize each section's content
- Ensure sections don't overlap
- Include at least one section, even if the text appears uniform

Directly return ONLY the JSON array, no other text."#,
        chunk
    )
}
