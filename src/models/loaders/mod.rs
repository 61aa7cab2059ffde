pub mod text_loader;

pub use text_loader::{doc_name, load_text_document, validate_text_path};
