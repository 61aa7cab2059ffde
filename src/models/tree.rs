//! 目录树结构

use serde::Serialize;

/// 目录树节点
///
/// 每个节点只归属于父节点的 `nodes`，整棵树归属于 `DocumentResult`。
/// `level` 只在建树时使用，不参与输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub title: String,
    pub node_id: String,
    pub level: u32,
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
    pub nodes: Vec<TreeNode>,
    /// 叶子节点的摘要
    pub summary: Option<String>,
    /// 非叶子节点在进入子节点之前那部分内容的摘要
    pub prefix_summary: Option<String>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 先序遍历整棵树
pub fn flatten(structure: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = structure.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.nodes.iter().rev());
    }
    out
}

/// 先序遍历并对每个节点执行 `f`（可变）
pub fn for_each_mut(structure: &mut [TreeNode], f: &mut impl FnMut(&mut TreeNode)) {
    for node in structure.iter_mut() {
        f(node);
        for_each_mut(&mut node.nodes, f);
    }
}

/// 文档处理结果
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub doc_name: String,
    pub doc_description: Option<String>,
    pub structure: Vec<TreeNode>,
}

/// 用于生成文档描述的精简节点：只保留标题、ID 和摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReducedNode {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<ReducedNode>,
}
