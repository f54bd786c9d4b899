//! Export - 小说导出管线
//!
//! 三种产物共享同一套命名与转换工具:
//! - epub: EPUB 2.0 (mimetype + OPF/NCX + 章节 XHTML)
//! - markdown: Markdown 章节打包 zip
//! - text: 纯文本章节打包 zip

mod epub;
mod filename;
mod html;
mod markdown;
mod text;

use thiserror::Error;

pub use epub::build_epub;
pub use filename::sanitize_filename;
pub use html::{html_to_markdown, html_to_plain_text};
pub use markdown::build_markdown_zip;
pub use text::build_text_zip;

/// 空作者时的占位
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 没有章节的小说不可导出
    #[error("novel has no chapters to export")]
    NoChapters,

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 导出产物类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Epub,
    MarkdownZip,
    TextZip,
}

impl ExportKind {
    /// 下载对话的建议文件名
    pub fn suggested_file_name(&self, title: &str) -> String {
        let base = sanitize_filename(title);
        match self {
            ExportKind::Epub => format!("{}.epub", base),
            ExportKind::MarkdownZip => format!("{}.zip", base),
            ExportKind::TextZip => format!("{}_txt.zip", base),
        }
    }
}

/// 导出署名: 小说作者优先, 其次全局默认作者, 都空时用占位
pub(crate) fn export_author(novel_author: &str, default_author: &str) -> String {
    if !novel_author.trim().is_empty() {
        novel_author.to_string()
    } else if !default_author.trim().is_empty() {
        default_author.to_string()
    } else {
        UNKNOWN_AUTHOR.to_string()
    }
}

/// 章节文件主干名: `{order:02}_{清洗后标题}`
pub(crate) fn chapter_file_stem(order: u32, title: &str) -> String {
    format!("{:02}_{}", order, sanitize_filename(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_file_names() {
        assert_eq!(ExportKind::Epub.suggested_file_name("My Book"), "My_Book.epub");
        assert_eq!(ExportKind::MarkdownZip.suggested_file_name("My Book"), "My_Book.zip");
        assert_eq!(ExportKind::TextZip.suggested_file_name("My Book"), "My_Book_txt.zip");
    }

    #[test]
    fn test_export_author_fallbacks() {
        assert_eq!(export_author("Ann", "Default"), "Ann");
        assert_eq!(export_author("  ", "Default"), "Default");
        assert_eq!(export_author("", ""), UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_chapter_file_stem_padding() {
        assert_eq!(chapter_file_stem(3, "The End?"), "03_The_End");
        assert_eq!(chapter_file_stem(12, "Later"), "12_Later");
    }
}
