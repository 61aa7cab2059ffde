//! 核心处理模块（纯函数，不访问外部服务）
//!
//! 窗口切分 → 去重合并 → 正文提取 → 建树 → 标注

pub mod annotator;
pub mod materializer;
pub mod reconciler;
pub mod tree_builder;
pub mod windower;

pub use annotator::{
    reduce_for_description, render_toc, DocumentView, NodeIdAllocator, NodeView, PresentOptions,
};
pub use materializer::materialize;
pub use reconciler::reconcile;
pub use tree_builder::build_tree;
pub use windower::Windower;
