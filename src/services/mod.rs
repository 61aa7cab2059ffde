//! 业务能力层：与外部模型打交道的部分
//!
//! - `oracle` - LLM 能力的 trait 抽象（便于测试替换）
//! - `llm_service` - 基于 OpenAI 兼容接口的实现
//! - `token_counter` - token 计数与按 token 切分
//! - `section_detector` - 章节检测适配层

pub mod llm_service;
pub mod oracle;
pub mod section_detector;
pub mod token_counter;

pub use llm_service::LlmService;
pub use oracle::{ChatCompletion, DescriptionGenerator, NodeSummarizer};
pub use section_detector::SectionDetector;
pub use token_counter::{TiktokenCounter, TokenCounter};
