//! 节点摘要编排
//!
//! 先序展开整棵树，短文本直接用原文作摘要，其余节点并发调用 LLM，
//! 全部成功后再按同样的先序写回。任一节点失败，整个阶段失败。

use futures::future::try_join_all;
use tracing::info;

use crate::error::AppResult;
use crate::models::tree::{flatten, for_each_mut};
use crate::models::TreeNode;
use crate::services::{NodeSummarizer, TokenCounter};

/// 为树中每个节点生成摘要
///
/// 叶子节点写入 `summary`，非叶子节点写入 `prefix_summary`；节点 ID 与树结构不变。
pub async fn generate_summaries<S>(
    structure: &mut [TreeNode],
    threshold: usize,
    max_input_tokens: Option<usize>,
    counter: &dyn TokenCounter,
    summarizer: &S,
) -> AppResult<()>
where
    S: NodeSummarizer + ?Sized,
{
    let summaries = {
        let nodes = flatten(structure);
        let is_short: Vec<bool> = nodes
            .iter()
            .map(|n| counter.count(&n.text) < threshold)
            .collect();
        info!(
            "📝 生成节点摘要: 共 {} 个节点，其中 {} 个直接使用原文",
            nodes.len(),
            is_short.iter().filter(|&&short| short).count()
        );

        let tasks = nodes.iter().zip(&is_short).map(|(node, &short)| async move {
            if short {
                Ok(node.text.clone())
            } else {
                summarizer.summarize_node(node, max_input_tokens).await
            }
        });
        try_join_all(tasks).await?
    };

    let mut summaries = summaries.into_iter();
    for_each_mut(structure, &mut |node| {
        let Some(summary) = summaries.next() else {
            return;
        };
        if node.is_leaf() {
            node.summary = Some(summary);
        } else {
            node.prefix_summary = Some(summary);
        }
    });

    info!("✓ 节点摘要生成完成");
    Ok(())
}
