//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把纯处理步骤（`processing`）和外部能力（`services`）串成完整流程。
//!
//! ## 模块划分
//!
//! ### `document_processor` - 单文档处理器
//! - 加载校验 .txt 文件
//! - 窗口切分、章节检测、去重、建树
//! - 按选项生成摘要和文档描述
//!
//! ### `summary_orchestrator` - 摘要编排
//! - 短节点直接使用原文
//! - 其余节点并发调用 LLM，全部成功才写回
//!
//! ## 层次关系
//!
//! ```text
//! app::App (配置、输出文件、统计)
//!     ↓
//! document_processor::txt_to_tree (处理单个文档)
//!     ↓
//! summary_orchestrator / services::SectionDetector
//!     ↓
//! services (能力层：LLM / token 计数)
//! ```

pub mod document_processor;
pub mod summary_orchestrator;

pub use document_processor::{txt_to_tree, Collaborators, ProcessOptions};
pub use summary_orchestrator::generate_summaries;
