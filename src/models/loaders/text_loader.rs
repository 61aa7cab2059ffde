use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::source_text::SourceText;

/// 校验输入文件：必须存在且扩展名为 .txt
///
/// 在任何处理开始之前调用，失败即终止
pub fn validate_text_path(path: &Path) -> AppResult<()> {
    let display = path.display().to_string();
    let is_txt = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return Err(FileError::InvalidExtension {
            path: display,
            expected: "txt".to_string(),
        }
        .into());
    }
    if !path.is_file() {
        return Err(FileError::NotFound { path: display }.into());
    }
    Ok(())
}

/// 从 .txt 文件加载文档
pub async fn load_text_document(path: &Path) -> AppResult<SourceText> {
    validate_text_path(path)?;
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    tracing::debug!(
        "已加载 {}: {} 字符",
        path.display(),
        content.chars().count()
    );
    Ok(SourceText::new(content))
}

/// 文档名：去掉目录和扩展名的文件名
pub fn doc_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rejects_wrong_extension() {
        let err = validate_text_path(Path::new("notes.md")).unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_file() {
        let err = validate_text_path(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_load_text_document() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "标题\n正文内容。").unwrap();

        let source = load_text_document(file.path()).await.unwrap();
        assert_eq!(source.len_chars(), 8);
        assert_eq!(source.slice(0, 2), "标题");
    }

    #[test]
    fn test_doc_name_strips_extension() {
        assert_eq!(doc_name(Path::new("/tmp/annual_report.txt")), "annual_report");
    }
}
