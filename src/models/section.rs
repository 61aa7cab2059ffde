//! 窗口与章节数据结构

/// 文本窗口
///
/// `start` / `end` 为全文中的字符偏移，区间左闭右开
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// LLM 识别出的章节
///
/// 刚从 LLM 解析出来时偏移量是相对于子块的，经过平移后是全文偏移。
/// 平移完成后保证 `char_start <= char_end <= 文档字符数`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub title: String,
    /// 层级，1 为最外层
    pub level: u32,
    pub char_start: usize,
    pub char_end: usize,
    /// 产生该章节的 LLM 调用序号（跨窗口、子块递增）
    pub chunk_idx: usize,
}

/// 已确定正文范围的章节，等待建树
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCandidate {
    pub title: String,
    pub level: u32,
    pub char_start: usize,
    pub char_end: usize,
    pub text: String,
}
