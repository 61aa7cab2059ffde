//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务
//!
//! ## 传输层准入控制
//! 摘要阶段会一次性发出所有请求，这里用 `Semaphore` 限制同时在途的请求数，
//! 并对每次调用做重试。

use std::sync::Arc;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{ReducedNode, TreeNode};
use crate::services::oracle::{ChatCompletion, DescriptionGenerator, NodeSummarizer};
use crate::services::token_counter::{truncate_to_tokens, TokenCounter};

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API
/// - 章节检测、节点摘要、文档描述三种能力的具体实现
/// - 不关心文档结构和流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_retries: usize,
    permits: Semaphore,
    counter: Arc<dyn TokenCounter>,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config, counter: Arc<dyn TokenCounter>) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_retries: config.max_retries.max(1),
            permits: Semaphore::new(config.max_concurrent_requests.max(1)),
            counter,
        }
    }

    /// 单次 LLM 调用（不重试）
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let model = self.model_name.as_str();
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::llm_api_failed(model, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::llm_api_failed(model, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| AppError::llm_api_failed(model, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 带准入控制和重试的调用
    async fn send_with_retry(&self, prompt: &str) -> AppResult<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            match self.send_to_llm(prompt, None).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!(
                        "LLM 调用失败 (尝试 {}/{}): {}，1 秒后重试...",
                        attempt, self.max_retries, e
                    );
                    last_error = e.to_string();
                    if attempt < self.max_retries {
                        sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            model: self.model_name.clone(),
            attempts: self.max_retries,
            last_error,
        }
        .into())
    }
}

#[async_trait]
impl ChatCompletion for LlmService {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.send_with_retry(prompt).await
    }
}

#[async_trait]
impl NodeSummarizer for LlmService {
    async fn summarize_node(
        &self,
        node: &TreeNode,
        max_input_tokens: Option<usize>,
    ) -> AppResult<String> {
        let text = match max_input_tokens {
            Some(limit) => truncate_to_tokens(self.counter.as_ref(), &node.text, limit),
            None => node.text.as_str(),
        };
        debug!("生成节点摘要: [{}] {}", node.node_id, node.title);
        self.send_with_retry(&build_summary_prompt(text)).await
    }
}

#[async_trait]
impl DescriptionGenerator for LlmService {
    async fn describe(&self, structure: &[ReducedNode]) -> AppResult<String> {
        let prompt = build_description_prompt(structure)?;
        self.send_with_retry(&prompt).await
    }
}

/// 节点摘要提示词
pub fn build_summary_prompt(text: &str) -> String {
    format!(
        "You are given a part of a document, your task is to generate a description of the \
partial document about what are main points covered in the partial document.

Partial Document Text: {}

Directly return the description, do not include any other text.",
        text
    )
}

/// 文档描述提示词
pub fn build_description_prompt(structure: &[ReducedNode]) -> AppResult<String> {
    let structure_json = serde_json::to_string_pretty(structure)?;
    Ok(format!(
        "You are an expert in generating descriptions for a document.
You are given a structure of a document. Your task is to generate a one-sentence description \
for the document, which makes it easy to distinguish the document from other documents.

Document Structure: {}

Directly return the description, do not include any other text.",
        structure_json
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token_counter::test_support::WhitespaceCounter;

    #[test]
    fn test_summary_prompt_embeds_text() {
        let prompt = build_summary_prompt("季度营收增长了 12%。");
        assert!(prompt.contains("Partial Document Text: 季度营收增长了 12%。"));
        assert!(prompt.ends_with("do not include any other text."));
    }

    #[test]
    fn test_description_prompt_embeds_structure() {
        let structure = vec![ReducedNode {
            title: "Overview".to_string(),
            node_id: Some("0000".to_string()),
            summary: Some("High level summary".to_string()),
            prefix_summary: None,
            nodes: Vec::new(),
        }];
        let prompt = build_description_prompt(&structure).unwrap();
        assert!(prompt.contains("\"title\": \"Overview\""));
        assert!(prompt.contains("\"node_id\": \"0000\""));
    }

    /// 需要真实的 API 配置：LLM_API_KEY / LLM_API_BASE_URL / LLM_MODEL_NAME
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::load(None).unwrap();
        let service = LlmService::new(&config, Arc::new(WhitespaceCounter));

        let response = service
            .send_to_llm("Reply with the single word: pong", Some("You are terse."))
            .await
            .expect("LLM 调用失败");
        assert!(!response.is_empty());
    }
}
