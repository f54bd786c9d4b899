//! 纯文本打包导出

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::html::html_to_plain_text;
use super::{chapter_file_stem, export_author, ExportError};
use crate::domain::novel::Novel;

/// 生成纯文本章节的 zip 字节流
pub fn build_text_zip(novel: &Novel, default_author: &str) -> Result<Vec<u8>, ExportError> {
    if novel.chapters().is_empty() {
        return Err(ExportError::NoChapters);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.start_file("novel_metadata.txt", options)?;
    writer.write_all(metadata_text(novel, default_author).as_bytes())?;

    for chapter in novel.chapters() {
        let name = format!("{}.txt", chapter_file_stem(chapter.order(), chapter.title()));
        writer.start_file(name, options)?;
        writer.write_all(html_to_plain_text(chapter.content_html()).as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

fn metadata_text(novel: &Novel, default_author: &str) -> String {
    format!(
        "Title: {title}\nAuthor: {author}\nLanguage: {language}\nCreated: {created}\nLast Updated: {updated}\nTotal Chapters: {count}\n---\n",
        title = novel.title(),
        author = export_author(novel.author(), default_author),
        language = novel.language(),
        created = novel.created_at().format("%Y-%m-%d"),
        updated = novel.updated_at().format("%Y-%m-%d"),
        count = novel.chapter_count(),
    )
}
