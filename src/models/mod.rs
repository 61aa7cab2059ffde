pub mod loaders;
pub mod section;
pub mod source_text;
pub mod tree;

pub use loaders::{doc_name, load_text_document, validate_text_path};
pub use section::{NodeCandidate, RawSection, Window};
pub use source_text::SourceText;
pub use tree::{DocumentResult, ReducedNode, TreeNode};
