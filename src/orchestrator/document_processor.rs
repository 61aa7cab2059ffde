//! 单文档处理器 - 编排层
//!
//! ## 职责
//!
//! 把一份 .txt 文档变成目录树：
//!
//! 1. **加载校验**：文件必须存在且为 .txt
//! 2. **窗口切分**：按字符数切成带重叠的窗口
//! 3. **章节检测**：逐窗口交给 LLM，得到全文偏移的章节
//! 4. **合并建树**：去重、提取正文、按层级建树并分配节点 ID
//! 5. **摘要与描述**：按需生成节点摘要和文档描述

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{doc_name, load_text_document, DocumentResult};
use crate::orchestrator::summary_orchestrator::generate_summaries;
use crate::processing::{
    build_tree, materialize, reconcile, reduce_for_description, PresentOptions, Windower,
};
use crate::services::{
    ChatCompletion, DescriptionGenerator, NodeSummarizer, SectionDetector, TokenCounter,
};

/// 单文档处理选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub window_size: usize,
    pub overlap: usize,
    pub max_input_tokens: Option<usize>,
    pub summary_token_threshold: usize,
    pub if_add_node_id: bool,
    pub if_add_node_summary: bool,
    /// 只在同时开启摘要时生效
    pub if_add_doc_description: bool,
    pub if_add_node_text: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ProcessOptions {
    fn from(config: &Config) -> Self {
        Self {
            window_size: config.window_size,
            overlap: config.overlap,
            max_input_tokens: config.max_input_tokens,
            summary_token_threshold: config.summary_token_threshold,
            if_add_node_id: config.if_add_node_id,
            if_add_node_summary: config.if_add_node_summary,
            if_add_doc_description: config.if_add_doc_description,
            if_add_node_text: config.if_add_node_text,
        }
    }
}

impl ProcessOptions {
    /// 输出时使用的字段开关
    pub fn present_options(&self) -> PresentOptions {
        PresentOptions {
            include_node_id: self.if_add_node_id,
            include_text: self.if_add_node_text,
            include_summaries: self.if_add_node_summary,
        }
    }
}

/// 处理流程依赖的外部能力
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub chat: &'a dyn ChatCompletion,
    pub summarizer: &'a dyn NodeSummarizer,
    pub describer: &'a dyn DescriptionGenerator,
    pub counter: &'a dyn TokenCounter,
}

/// 把 .txt 文档处理成目录树
///
/// # 参数
/// - `path`: 文档路径
/// - `options`: 处理选项
/// - `deps`: LLM 与 token 计数能力
///
/// # 返回
/// 文档名、可选的文档描述以及目录树
pub async fn txt_to_tree(
    path: &Path,
    options: &ProcessOptions,
    deps: Collaborators<'_>,
) -> AppResult<DocumentResult> {
    let windower = Windower::new(options.window_size, options.overlap)?;
    let source = load_text_document(path).await?;
    let doc_name = doc_name(path);

    info!("📄 处理文档: {} ({} 字符)", doc_name, source.len_chars());

    // ========== 切分与检测 ==========
    let windows = windower.split(&source);
    info!(
        "🪟 切分为 {} 个窗口 (window_size={}, overlap={})",
        windows.len(),
        options.window_size,
        options.overlap
    );

    let detector = SectionDetector::new(deps.chat, deps.counter);
    let raw_sections = detector
        .detect_windows(&source, &windows, options.max_input_tokens)
        .await?;

    // ========== 合并建树 ==========
    let sections = reconcile(raw_sections);
    info!("✓ 去重后剩余 {} 个章节", sections.len());

    let candidates = materialize(&source, &sections);
    let mut structure = build_tree(candidates);
    info!("🌳 目录树构建完成: {} 个顶层节点", structure.len());

    // ========== 摘要与描述 ==========
    let mut doc_description = None;
    if options.if_add_node_summary {
        generate_summaries(
            &mut structure,
            options.summary_token_threshold,
            options.max_input_tokens,
            deps.counter,
            deps.summarizer,
        )
        .await?;

        if options.if_add_doc_description {
            let reduced = reduce_for_description(&structure, options.if_add_node_id);
            let description = deps.describer.describe(&reduced).await?;
            info!("✓ 文档描述生成完成");
            doc_description = Some(description);
        }
    }

    Ok(DocumentResult {
        doc_name,
        doc_description,
        structure,
    })
}
