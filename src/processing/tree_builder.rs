//! 扁平章节列表 → 嵌套目录树
//!
//! 经典的层级栈算法：栈里是当前打开的祖先链，层级数字越小越靠外。
//! 遇到层级不大于栈顶的章节时先关闭栈顶，被关闭的节点挂到新的栈顶（或根列表）下。
//!
//! 不校验层级是否合理：层级跳跃（1 → 4）会直接成为子节点，层级倒挂（3 之后的 1）
//! 会关闭前面的节点。结果严格按照这条规则生成。

use crate::models::{NodeCandidate, TreeNode};
use crate::processing::annotator::NodeIdAllocator;

/// 建树，单次遍历，线性时间
///
/// 节点 ID 按文档顺序（即先序）依次分配，之后不再重新编号
pub fn build_tree(candidates: Vec<NodeCandidate>) -> Vec<TreeNode> {
    let mut ids = NodeIdAllocator::default();
    let mut roots = Vec::new();
    // 打开的祖先链，节点自身携带层级
    let mut stack: Vec<TreeNode> = Vec::new();

    for candidate in candidates {
        let node = TreeNode {
            title: candidate.title,
            node_id: ids.next_id(),
            level: candidate.level,
            text: candidate.text,
            char_start: candidate.char_start,
            char_end: candidate.char_end,
            nodes: Vec::new(),
            summary: None,
            prefix_summary: None,
        };

        while stack.last().is_some_and(|top| top.level >= node.level) {
            close_top(&mut stack, &mut roots);
        }
        stack.push(node);
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

/// 弹出栈顶并挂到新的栈顶下；栈空则成为根节点
fn close_top(stack: &mut Vec<TreeNode>, roots: &mut Vec<TreeNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.nodes.push(node),
            None => roots.push(node),
        }
    }
}
