//! 外部语义能力（LLM）的抽象接口
//!
//! 核心流程只通过这些 trait 访问 LLM，生产环境由 `LlmService` 实现，
//! 测试中使用脚本化的假实现。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{ReducedNode, TreeNode};

/// 通用对话补全：输入提示词，返回文本
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// 节点摘要生成
#[async_trait]
pub trait NodeSummarizer: Send + Sync {
    /// `max_input_tokens` 限制送给 LLM 的正文长度
    async fn summarize_node(
        &self,
        node: &TreeNode,
        max_input_tokens: Option<usize>,
    ) -> AppResult<String>;
}

/// 文档描述生成
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe(&self, structure: &[ReducedNode]) -> AppResult<String>;
}
