//! 命令行参数
//!
//! 命令行参数优先级最高，覆盖 TOML 与环境变量中的同名配置

use std::path::PathBuf;

use clap::Parser;

use crate::config::{parse_yes_no, Config};

#[derive(Debug, Parser)]
#[command(name = "pageindex-txt")]
#[command(about = "Build a hierarchical table of contents for a plain-text document", long_about = None)]
pub struct Cli {
    /// Path to the .txt document
    #[arg(value_name = "TXT_PATH")]
    pub txt_path: PathBuf,

    /// Optional TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Model used for section detection and summaries
    #[arg(long)]
    pub model: Option<String>,

    /// Window size in characters
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Overlap between windows in characters
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Token budget for a single request (0 disables sub-chunking)
    #[arg(long)]
    pub max_input_tokens: Option<usize>,

    /// Nodes with fewer tokens than this use their text as the summary
    #[arg(long)]
    pub summary_token_threshold: Option<usize>,

    #[arg(long, value_name = "yes|no", value_parser = parse_yes_no)]
    pub if_add_node_id: Option<bool>,

    #[arg(long, value_name = "yes|no", value_parser = parse_yes_no)]
    pub if_add_node_summary: Option<bool>,

    #[arg(long, value_name = "yes|no", value_parser = parse_yes_no)]
    pub if_add_doc_description: Option<bool>,

    #[arg(long, value_name = "yes|no", value_parser = parse_yes_no)]
    pub if_add_node_text: Option<bool>,

    /// Directory for the generated JSON
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,
}

impl Cli {
    /// 把命令行中出现的参数覆盖到配置上
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(v) = &self.model {
            config.llm_model_name = v.clone();
        }
        if let Some(v) = self.window_size {
            config.window_size = v;
        }
        if let Some(v) = self.overlap {
            config.overlap = v;
        }
        if let Some(v) = self.max_input_tokens {
            config.max_input_tokens = (v > 0).then_some(v);
        }
        if let Some(v) = self.summary_token_threshold {
            config.summary_token_threshold = v;
        }
        if let Some(v) = self.if_add_node_id {
            config.if_add_node_id = v;
        }
        if let Some(v) = self.if_add_node_summary {
            config.if_add_node_summary = v;
        }
        if let Some(v) = self.if_add_doc_description {
            config.if_add_doc_description = v;
        }
        if let Some(v) = self.if_add_node_text {
            config.if_add_node_text = v;
        }
        if let Some(v) = &self.output_dir {
            config.output_dir = v.clone();
        }
    }
}
