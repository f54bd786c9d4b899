//! Infrastructure Layer - 基础设施层
//!
//! - persistence: 存储端口实现 (sled / 内存)
//! - export: EPUB 与打包导出

pub mod export;
pub mod persistence;

pub use export::{
    build_epub, build_markdown_zip, build_text_zip, html_to_markdown, html_to_plain_text,
    sanitize_filename, ExportError, ExportKind,
};
pub use persistence::{MemoryBlobStore, SledBlobStore, SledStoreConfig};
