//! 程序配置
//!
//! 配置按以下顺序叠加，后者覆盖前者：
//! 1. `Config::default()` 内置默认值
//! 2. 可选的 TOML 配置文件（所有字段都可省略）
//! 3. 环境变量
//! 4. 命令行参数（见 `cli` 模块）

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次 LLM 调用的最大重试次数
    pub max_retries: usize,
    /// 同时在途的 LLM 请求上限（传输层准入控制）
    pub max_concurrent_requests: usize,
    // --- 文本切分配置 ---
    /// 窗口大小（字符数）
    pub window_size: usize,
    /// 相邻窗口重叠（字符数），必须小于 window_size
    pub overlap: usize,
    /// 单次 LLM 请求的最大输入 token 数，None 表示不做子切分
    pub max_input_tokens: Option<usize>,
    // --- 输出配置 ---
    pub summary_token_threshold: usize,
    pub if_add_node_id: bool,
    pub if_add_node_summary: bool,
    pub if_add_doc_description: bool,
    pub if_add_node_text: bool,
    /// 结果输出目录
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-2024-11-20".to_string(),
            max_retries: 10,
            max_concurrent_requests: 16,
            window_size: 5000,
            overlap: 500,
            max_input_tokens: Some(25000),
            summary_token_threshold: 200,
            if_add_node_id: true,
            if_add_node_summary: true,
            if_add_doc_description: false,
            if_add_node_text: false,
            output_dir: "./results".to_string(),
        }
    }
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    model: Option<String>,
    max_retries: Option<usize>,
    max_concurrent_requests: Option<usize>,
    window_size: Option<usize>,
    overlap: Option<usize>,
    max_input_tokens: Option<usize>,
    summary_token_threshold: Option<usize>,
    if_add_node_id: Option<bool>,
    if_add_node_summary: Option<bool>,
    if_add_doc_description: Option<bool>,
    if_add_node_text: Option<bool>,
    output_dir: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(FileError::NotFound { path: display }.into());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(&display, e))?;
        Self::parse_toml(&content, display)
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Self::parse_toml(content, String::new())
    }

    fn parse_toml(content: &str, path: String) -> AppResult<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|source| FileError::TomlParseFailed { path, source })?;

        let mut config = Self::default();
        if let Some(v) = file.llm_api_key {
            config.llm_api_key = v;
        }
        if let Some(v) = file.llm_api_base_url {
            config.llm_api_base_url = v;
        }
        if let Some(v) = file.model {
            config.llm_model_name = v;
        }
        if let Some(v) = file.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = file.max_concurrent_requests {
            config.max_concurrent_requests = v;
        }
        if let Some(v) = file.window_size {
            config.window_size = v;
        }
        if let Some(v) = file.overlap {
            config.overlap = v;
        }
        if let Some(v) = file.max_input_tokens {
            // 0 表示关闭子切分
            config.max_input_tokens = (v > 0).then_some(v);
        }
        if let Some(v) = file.summary_token_threshold {
            config.summary_token_threshold = v;
        }
        if let Some(v) = file.if_add_node_id {
            config.if_add_node_id = v;
        }
        if let Some(v) = file.if_add_node_summary {
            config.if_add_node_summary = v;
        }
        if let Some(v) = file.if_add_doc_description {
            config.if_add_doc_description = v;
        }
        if let Some(v) = file.if_add_node_text {
            config.if_add_node_text = v;
        }
        if let Some(v) = file.output_dir {
            config.output_dir = v;
        }
        Ok(config)
    }

    /// 用环境变量覆盖当前配置
    pub fn apply_env(&mut self) -> AppResult<()> {
        // CHATGPT_API_KEY 兼容旧的 .env 配置
        if let Ok(v) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("CHATGPT_API_KEY")) {
            self.llm_api_key = v;
        }
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = env_parse("LLM_MAX_RETRIES", "usize")? {
            self.max_retries = v;
        }
        if let Some(v) = env_parse("LLM_MAX_CONCURRENT_REQUESTS", "usize")? {
            self.max_concurrent_requests = v;
        }
        if let Some(v) = env_parse("PAGEINDEX_WINDOW_SIZE", "usize")? {
            self.window_size = v;
        }
        if let Some(v) = env_parse("PAGEINDEX_OVERLAP", "usize")? {
            self.overlap = v;
        }
        if let Some(v) = env_parse::<usize>("PAGEINDEX_MAX_INPUT_TOKENS", "usize")? {
            self.max_input_tokens = (v > 0).then_some(v);
        }
        if let Some(v) = env_parse("PAGEINDEX_SUMMARY_TOKEN_THRESHOLD", "usize")? {
            self.summary_token_threshold = v;
        }
        if let Ok(v) = std::env::var("PAGEINDEX_OUTPUT_DIR") {
            self.output_dir = v;
        }
        Ok(())
    }

    /// 校验配置的前置条件
    pub fn validate(&self) -> AppResult<()> {
        if self.window_size == 0 || self.overlap >= self.window_size {
            return Err(ConfigError::InvalidWindow {
                window_size: self.window_size,
                overlap: self.overlap,
            }
            .into());
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_concurrent_requests".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// 读取并解析环境变量，不存在时返回 None，解析失败时报错
fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    let Ok(value) = std::env::var(var_name) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }
        .into()),
    }
}

/// 解析 yes/no 开关
pub fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(format!("期望 yes 或 no，实际为 '{}'", other)),
    }
}
