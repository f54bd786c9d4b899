//! Markdown 打包导出

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::html::html_to_markdown;
use super::{chapter_file_stem, export_author, ExportError};
use crate::domain::novel::Novel;

/// 生成 Markdown 章节的 zip 字节流
///
/// 包含一个 `novel_metadata.md` 与每章一个 `{序号}_{标题}.md`
pub fn build_markdown_zip(novel: &Novel, default_author: &str) -> Result<Vec<u8>, ExportError> {
    if novel.chapters().is_empty() {
        return Err(ExportError::NoChapters);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.start_file("novel_metadata.md", options)?;
    writer.write_all(metadata_markdown(novel, default_author).as_bytes())?;

    for chapter in novel.chapters() {
        let name = format!("{}.md", chapter_file_stem(chapter.order(), chapter.title()));
        writer.start_file(name, options)?;
        writer.write_all(html_to_markdown(chapter.content_html()).as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

fn metadata_markdown(novel: &Novel, default_author: &str) -> String {
    format!(
        "# {title}\n\
         **Author:** {author}\n\
         **Language:** {language}\n\
         **Created:** {created}\n\
         **Last Updated:** {updated}\n\
         **Total Chapters:** {count}\n\
         ---",
        title = novel.title(),
        author = export_author(novel.author(), default_author),
        language = novel.language(),
        created = novel.created_at().format("%Y-%m-%d"),
        updated = novel.updated_at().format("%Y-%m-%d"),
        count = novel.chapter_count(),
    )
}
