//! 节点标注与输出形态
//!
//! 内存中的 `TreeNode` 形状固定；输出哪些字段由 `PresentOptions` 在序列化时决定，
//! 不修改树本身。字段顺序固定为：
//! `title, node_id, summary, prefix_summary, text, char_start, char_end, nodes`

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::AppResult;
use crate::models::{DocumentResult, ReducedNode, TreeNode};

/// 节点 ID 分配器：`"0000"`, `"0001"`, ...
#[derive(Debug, Default)]
pub struct NodeIdAllocator {
    next: usize,
}

impl NodeIdAllocator {
    pub fn next_id(&mut self) -> String {
        let id = format!("{:04}", self.next);
        self.next += 1;
        id
    }
}

/// 输出选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentOptions {
    pub include_node_id: bool,
    pub include_text: bool,
    /// 请求了摘要时，`summary` 和 `prefix_summary` 两个键都会输出（未填充的为 null）
    pub include_summaries: bool,
}

impl Default for PresentOptions {
    fn default() -> Self {
        Self {
            include_node_id: true,
            include_text: false,
            include_summaries: false,
        }
    }
}

/// 单个节点的序列化视图
pub struct NodeView<'a> {
    node: &'a TreeNode,
    options: PresentOptions,
}

impl<'a> NodeView<'a> {
    pub fn new(node: &'a TreeNode, options: PresentOptions) -> Self {
        Self { node, options }
    }
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.node;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("title", &node.title)?;
        if self.options.include_node_id {
            map.serialize_entry("node_id", &node.node_id)?;
        }
        if self.options.include_summaries {
            map.serialize_entry("summary", &node.summary)?;
            map.serialize_entry("prefix_summary", &node.prefix_summary)?;
        }
        if self.options.include_text {
            map.serialize_entry("text", &node.text)?;
        }
        map.serialize_entry("char_start", &node.char_start)?;
        map.serialize_entry("char_end", &node.char_end)?;
        // 叶子节点不输出空的 nodes
        if !node.nodes.is_empty() {
            map.serialize_entry("nodes", &NodesView::new(&node.nodes, self.options))?;
        }
        map.end()
    }
}

/// 节点列表的序列化视图
pub struct NodesView<'a> {
    nodes: &'a [TreeNode],
    options: PresentOptions,
}

impl<'a> NodesView<'a> {
    pub fn new(nodes: &'a [TreeNode], options: PresentOptions) -> Self {
        Self { nodes, options }
    }
}

impl Serialize for NodesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.nodes.iter().map(|n| NodeView::new(n, self.options)))
    }
}

/// 文档结果的序列化视图
pub struct DocumentView<'a> {
    result: &'a DocumentResult,
    options: PresentOptions,
}

impl<'a> DocumentView<'a> {
    pub fn new(result: &'a DocumentResult, options: PresentOptions) -> Self {
        Self { result, options }
    }

    /// 2 空格缩进的 JSON，非 ASCII 字符原样输出
    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for DocumentView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("doc_name", &self.result.doc_name)?;
        if let Some(description) = &self.result.doc_description {
            map.serialize_entry("doc_description", description)?;
        }
        map.serialize_entry(
            "structure",
            &NodesView::new(&self.result.structure, self.options),
        )?;
        map.end()
    }
}

/// 生成文档描述用的精简树：去掉正文和偏移，只保留标题、ID、摘要
pub fn reduce_for_description(nodes: &[TreeNode], include_node_id: bool) -> Vec<ReducedNode> {
    nodes
        .iter()
        .map(|node| ReducedNode {
            title: node.title.clone(),
            node_id: include_node_id.then(|| node.node_id.clone()),
            summary: node.summary.clone(),
            prefix_summary: node.prefix_summary.clone(),
            nodes: reduce_for_description(&node.nodes, include_node_id),
        })
        .collect()
}

/// 渲染目录：每层缩进两个空格
pub fn render_toc(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    write_toc(nodes, 0, &mut out);
    out
}

fn write_toc(nodes: &[TreeNode], depth: usize, out: &mut String) {
    for node in nodes {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.title);
        out.push('\n');
        write_toc(&node.nodes, depth + 1, out);
    }
}
