use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use pageindex_txt::config::Config;
use pageindex_txt::models::{ReducedNode, TreeNode};
use pageindex_txt::processing::DocumentView;
use pageindex_txt::services::{
    ChatCompletion, DescriptionGenerator, LlmService, NodeSummarizer, TiktokenCounter,
    TokenCounter,
};
use pageindex_txt::utils::logging;
use pageindex_txt::{txt_to_tree, AppResult, Collaborators, ProcessOptions};
use serde_json::Value;

/// 以空白分词计数
struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// 依次返回预设回复
struct ScriptedChat {
    replies: Mutex<Vec<String>>,
}

impl ScriptedChat {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
        }
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, _prompt: &str) -> AppResult<String> {
        Ok(self.replies.lock().unwrap().pop().unwrap_or_else(|| "[]".to_string()))
    }
}

struct TitleSummarizer;

#[async_trait]
impl NodeSummarizer for TitleSummarizer {
    async fn summarize_node(&self, node: &TreeNode, _max: Option<usize>) -> AppResult<String> {
        Ok(format!("Summary of {}", node.title))
    }
}

#[async_trait]
impl DescriptionGenerator for TitleSummarizer {
    async fn describe(&self, structure: &[ReducedNode]) -> AppResult<String> {
        Ok(format!("A document about {}", structure[0].title))
    }
}

fn write_txt(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("report")
        .suffix(".txt")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_end_to_end_json_shape() {
    let body = format!(
        "Introduction\n{}\nMethods\n{}\nResults\n{}",
        "intro words ".repeat(30),
        "method words ".repeat(30),
        "result words ".repeat(30)
    );
    let intro_end = body.find("Methods").unwrap();
    let methods_end = body.find("Results").unwrap();
    let reply = format!(
        r#"[{{"title": "Introduction", "level": 1, "char_start": 0, "char_end": {}}},
            {{"title": "Methods", "level": 2, "char_start": {}, "char_end": {}}},
            {{"title": "Results", "level": 2, "char_start": {}, "char_end": {}}}]"#,
        intro_end,
        intro_end,
        methods_end,
        methods_end,
        body.len()
    );
    let file = write_txt(&body);
    let chat = ScriptedChat::new(&[&reply]);
    let deps = Collaborators {
        chat: &chat,
        summarizer: &TitleSummarizer,
        describer: &TitleSummarizer,
        counter: &WordCounter,
    };
    let options = ProcessOptions {
        window_size: 5000,
        overlap: 500,
        max_input_tokens: None,
        summary_token_threshold: 40,
        if_add_node_id: true,
        if_add_node_summary: true,
        if_add_doc_description: true,
        if_add_node_text: false,
    };

    let result = txt_to_tree(file.path(), &options, deps).await.unwrap();
    let json = DocumentView::new(&result, options.present_options())
        .to_json_pretty()
        .unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert!(value["doc_name"].as_str().unwrap().starts_with("report"));
    assert_eq!(value["doc_description"], "A document about Introduction");

    let root = &value["structure"][0];
    assert_eq!(root["title"], "Introduction");
    assert_eq!(root["node_id"], "0000");
    assert_eq!(root["prefix_summary"], "Summary of Introduction");
    assert!(root["summary"].is_null());
    assert!(root.get("text").is_none());

    let children = root["nodes"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["node_id"], "0001");
    assert_eq!(children[1]["node_id"], "0002");
    assert!(children[1].get("nodes").is_none());
    assert_eq!(children[1]["summary"], "Summary of Results");

    let keys: Vec<&str> = root.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys[0], "title");
}

#[tokio::test]
async fn test_flat_document_spanning_windows() {
    let body = "no headings anywhere ".repeat(400);
    let file = write_txt(&body);
    let chat = ScriptedChat::new(&["not json at all"]);
    let deps = Collaborators {
        chat: &chat,
        summarizer: &TitleSummarizer,
        describer: &TitleSummarizer,
        counter: &WordCounter,
    };
    let options = ProcessOptions {
        window_size: 2000,
        overlap: 200,
        max_input_tokens: None,
        if_add_node_summary: false,
        ..Default::default()
    };

    let result = txt_to_tree(file.path(), &options, deps).await.unwrap();

    assert_eq!(result.structure.len(), 1);
    let node = &result.structure[0];
    assert_eq!(node.title, "Document Content");
    assert_eq!(node.node_id, "0000");
    assert_eq!((node.char_start, node.char_end), (0, body.chars().count()));
    assert!(node.nodes.is_empty());
}

#[tokio::test]
async fn test_non_txt_input_is_rejected() {
    let file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    let chat = ScriptedChat::new(&[]);
    let deps = Collaborators {
        chat: &chat,
        summarizer: &TitleSummarizer,
        describer: &TitleSummarizer,
        counter: &WordCounter,
    };

    let result = txt_to_tree(file.path(), &ProcessOptions::default(), deps).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore] // 需要真实的 LLM 服务：cargo test -- --ignored
async fn test_live_document() {
    logging::init();

    let config = Config::load(None).expect("加载配置失败");
    let counter = std::sync::Arc::new(
        TiktokenCounter::for_model(&config.llm_model_name).expect("加载分词器失败"),
    );
    let llm = LlmService::new(&config, counter.clone());
    let file = write_txt(
        "Chapter 1. The Beginning\nIt was a quiet morning in the valley.\n\n\
         Chapter 2. The Journey\nThey set out before dawn and walked for days.",
    );
    let deps = Collaborators {
        chat: &llm,
        summarizer: &llm,
        describer: &llm,
        counter: counter.as_ref(),
    };

    let result = txt_to_tree(file.path(), &ProcessOptions::from(&config), deps)
        .await
        .expect("处理文档失败");
    assert!(!result.structure.is_empty());
}
