//! # PageIndex Txt
//!
//! 借助 LLM 为纯文本文档生成层级目录树
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - 源文本、章节、目录树以及 .txt 加载
//!
//! ### ② 纯处理（Processing）
//! - `processing/` - 窗口切分、章节去重、正文提取、建树、输出视图
//! - 不访问任何外部服务，全部可以离线测试
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - LLM 能力抽象与实现、token 计数、章节检测
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/document_processor` - 单文档处理流程 `txt_to_tree`
//! - `orchestrator/summary_orchestrator` - 节点摘要并发生成
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod processing;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{DocumentResult, TreeNode};
pub use orchestrator::{txt_to_tree, Collaborators, ProcessOptions};
