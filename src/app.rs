//! 应用入口 - 持有配置和 LLM 服务，负责单次运行的生命周期
//!
//! 1. **初始化**：校验配置、加载分词器、创建 LLM 服务
//! 2. **处理**：委托 `txt_to_tree` 生成目录树
//! 3. **输出**：打印目录、写出 JSON、输出统计

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::models::tree::flatten;
use crate::models::DocumentResult;
use crate::orchestrator::{txt_to_tree, Collaborators, ProcessOptions};
use crate::processing::{render_toc, DocumentView, PresentOptions};
use crate::services::{LlmService, TiktokenCounter};
use crate::utils::logging::{log_startup, log_toc, print_final_stats};
use crate::utils::truncate_text;

/// 应用主结构
pub struct App {
    config: Config,
    llm: LlmService,
    counter: Arc<TiktokenCounter>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(&config);

        let counter = Arc::new(
            TiktokenCounter::for_model(&config.llm_model_name).context("初始化分词器失败")?,
        );
        info!("🔤 分词器: {}", counter.model());
        let llm = LlmService::new(&config, counter.clone());

        Ok(Self {
            config,
            llm,
            counter,
        })
    }

    /// 处理一个 .txt 文件，返回输出 JSON 的路径
    pub async fn run(&self, txt_path: &Path) -> Result<PathBuf> {
        let started = Instant::now();
        let options = ProcessOptions::from(&self.config);
        let deps = Collaborators {
            chat: &self.llm,
            summarizer: &self.llm,
            describer: &self.llm,
            counter: self.counter.as_ref(),
        };

        let result = txt_to_tree(txt_path, &options, deps)
            .await
            .with_context(|| format!("处理文档失败: {}", txt_path.display()))?;

        log_toc(&render_toc(&result.structure));
        if let Some(description) = &result.doc_description {
            info!("📝 文档描述: {}", truncate_text(description, 200));
        }

        let output_path = self
            .write_result(&result, options.present_options())
            .await?;

        print_final_stats(
            &result.doc_name,
            flatten(&result.structure).len(),
            &output_path,
            started.elapsed(),
        );
        Ok(output_path)
    }

    /// 写出 `<output_dir>/<doc_name>_structure.json`
    async fn write_result(&self, result: &DocumentResult, present: PresentOptions) -> Result<PathBuf> {
        let dir = Path::new(&self.config.output_dir);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;

        let path = dir.join(format!("{}_structure.json", result.doc_name));
        let json = DocumentView::new(result, present).to_json_pretty()?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        info!("💾 结果已保存至: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TreeNode;

    #[tokio::test]
    async fn test_write_result_persists_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("results");
        let config = Config {
            output_dir: output_dir.display().to_string(),
            ..Default::default()
        };
        let app = App::initialize(config).unwrap();
        let result = DocumentResult {
            doc_name: "报告".to_string(),
            doc_description: None,
            structure: vec![TreeNode {
                title: "第一章".to_string(),
                node_id: "0000".to_string(),
                level: 1,
                text: "正文".to_string(),
                char_start: 0,
                char_end: 2,
                nodes: Vec::new(),
                summary: None,
                prefix_summary: None,
            }],
        };

        let path = app
            .write_result(&result, PresentOptions::default())
            .await
            .unwrap();

        assert_eq!(path, output_dir.join("报告_structure.json"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"报告\""));
        assert!(content.contains("\"第一章\""));
        assert!(content.contains("\n  \"doc_name\""));
    }
}
