//! EPUB 2.0 导出

use std::io::{Cursor, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{export_author, sanitize_filename, ExportError};
use crate::domain::novel::{Chapter, Novel};

const PUBLISHER: &str = "Vellum";

/// 解码后的封面
struct CoverMeta {
    filename: String,
    mime_type: &'static str,
    data: Vec<u8>,
}

/// 生成 EPUB 2.0 字节流
///
/// mimetype 条目必须是压缩格式为 Stored 的首个条目, 否则阅读器拒收。
/// SVG 与无法解码的封面直接跳过, 不让封面问题毁掉整本导出。
pub fn build_epub(novel: &Novel, default_author: &str) -> Result<Vec<u8>, ExportError> {
    if novel.chapters().is_empty() {
        return Err(ExportError::NoChapters);
    }

    let title = novel.title();
    let author = export_author(novel.author(), default_author);
    // 多语言标签只取第一个
    let language = novel
        .language()
        .split(',')
        .next()
        .unwrap_or("en-US")
        .trim()
        .to_string();

    let cover = novel.cover_data_url().and_then(decode_cover);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default();

    writer.start_file("mimetype", stored)?;
    writer.write_all(b"application/epub+zip")?;

    writer.start_file("META-INF/container.xml", deflated)?;
    writer.write_all(container_xml().as_bytes())?;

    writer.start_file("OEBPS/css/style.css", deflated)?;
    writer.write_all(style_css().as_bytes())?;

    if let Some(cover) = &cover {
        writer.start_file(format!("OEBPS/images/{}", cover.filename), deflated)?;
        writer.write_all(&cover.data)?;
        writer.start_file("OEBPS/cover.xhtml", deflated)?;
        writer.write_all(cover_xhtml(&cover.filename, &language).as_bytes())?;
    }

    for chapter in novel.chapters() {
        writer.start_file(format!("OEBPS/{}", chapter_file_name(chapter)), deflated)?;
        writer.write_all(chapter_xhtml(chapter, &language).as_bytes())?;
    }

    writer.start_file("OEBPS/content.opf", deflated)?;
    writer.write_all(content_opf(novel, title, &author, &language, cover.as_ref()).as_bytes())?;

    writer.start_file("OEBPS/toc.ncx", deflated)?;
    writer.write_all(toc_ncx(novel, title).as_bytes())?;

    Ok(writer.finish()?.into_inner())
}

fn decode_cover(data_url: &str) -> Option<CoverMeta> {
    if data_url.starts_with("data:image/svg+xml") {
        warn!("SVG cover skipped, not reliably supported in EPUB 2");
        return None;
    }
    let (mime_type, extension, rest) = if let Some(rest) = data_url.strip_prefix("data:image/png;base64,") {
        ("image/png", "png", rest)
    } else if let Some(rest) = data_url.strip_prefix("data:image/jpeg;base64,") {
        ("image/jpeg", "jpg", rest)
    } else if let Some(rest) = data_url.strip_prefix("data:image/gif;base64,") {
        ("image/gif", "gif", rest)
    } else {
        warn!("cover image type not recognized, exporting without cover");
        return None;
    };
    match BASE64.decode(rest) {
        Ok(data) => Some(CoverMeta {
            filename: format!("cover.{}", extension),
            mime_type,
            data,
        }),
        Err(err) => {
            warn!(error = %err, "cover base64 undecodable, exporting without cover");
            None
        }
    }
}

fn chapter_file_name(chapter: &Chapter) -> String {
    format!(
        "{}.xhtml",
        sanitize_filename(&format!("chapter-{}_{}", chapter.order(), chapter.title()))
    )
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn container_xml() -> &'static str {
    r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#
}

fn style_css() -> &'static str {
    r#"body { font-family: sans-serif; margin: 5%; line-height: 1.5; }
h1, h2, h3, h4, h5, h6 { margin-top: 1.5em; margin-bottom: 0.5em; line-height: 1.2; text-align:left; }
p { margin-top: 0.5em; margin-bottom: 0.5em; text-align:justify; }
img { max-width: 100%; height: auto; display:block; margin: 1em auto; }
div.cover-image-container { width: 100%; height: 100vh; display: flex; align-items: center; justify-content: center; margin:0; padding:0; }
div.cover-image-container img { max-width: 100%; max-height: 100vh; object-fit: contain; }
"#
}

fn cover_xhtml(cover_filename: &str, language: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
  <title>Cover</title>
  <link rel="stylesheet" type="text/css" href="css/style.css"/>
</head>
<body>
  <div class="cover-image-container">
    <img src="images/{file}" alt="Cover Image"/>
  </div>
</body>
</html>"#,
        lang = xml_escape(language),
        file = cover_filename,
    )
}

fn chapter_xhtml(chapter: &Chapter, language: &str) -> String {
    let title = xml_escape(chapter.title());
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="css/style.css"/>
</head>
<body>
  <h2>{title}</h2>
  {content}
</body>
</html>"#,
        lang = xml_escape(language),
        title = title,
        content = chapter.content_html(),
    )
}

fn content_opf(
    novel: &Novel,
    title: &str,
    author: &str,
    language: &str,
    cover: Option<&CoverMeta>,
) -> String {
    let manifest_items: Vec<String> = novel
        .chapters()
        .iter()
        .map(|ch| {
            format!(
                r#"<item id="chapter-{}" href="{}" media-type="application/xhtml+xml"/>"#,
                ch.id(),
                chapter_file_name(ch)
            )
        })
        .collect();
    let spine_items: Vec<String> = novel
        .chapters()
        .iter()
        .map(|ch| format!(r#"<itemref idref="chapter-{}"/>"#, ch.id()))
        .collect();

    let (cover_image_item, cover_page_item, cover_meta, cover_spine, cover_guide) = match cover {
        Some(meta) => (
            format!(
                r#"<item id="cover-image" href="images/{}" media-type="{}"/>"#,
                meta.filename, meta.mime_type
            ),
            r#"<item id="cover-page" href="cover.xhtml" media-type="application/xhtml+xml"/>"#
                .to_string(),
            r#"<meta name="cover" content="cover-image"/>"#.to_string(),
            r#"<itemref idref="cover-page" linear="yes"/>"#.to_string(),
            r#"<guide><reference type="cover" title="Cover" href="cover.xhtml"/></guide>"#
                .to_string(),
        ),
        None => Default::default(),
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="bookid" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:identifier id="bookid">urn:uuid:{id}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:creator opf:role="aut">{author}</dc:creator>
    <dc:language>{language}</dc:language>
    <dc:publisher>{publisher}</dc:publisher>
    <dc:date>{date}</dc:date>
    {cover_meta}
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="css" href="css/style.css" media-type="text/css"/>
    {cover_image_item}
    {cover_page_item}
    {manifest}
  </manifest>
  <spine toc="ncx">
    {cover_spine}
    {spine}
  </spine>
  {cover_guide}
</package>"#,
        id = novel.id(),
        title = xml_escape(title),
        author = xml_escape(author),
        language = xml_escape(language),
        publisher = PUBLISHER,
        date = novel.updated_at().format("%Y-%m-%d"),
        cover_meta = cover_meta,
        cover_image_item = cover_image_item,
        cover_page_item = cover_page_item,
        manifest = manifest_items.join("\n    "),
        cover_spine = cover_spine,
        spine = spine_items.join("\n    "),
        cover_guide = cover_guide,
    )
}

fn toc_ncx(novel: &Novel, title: &str) -> String {
    let nav_points: Vec<String> = novel
        .chapters()
        .iter()
        .map(|ch| {
            format!(
                r#"
    <navPoint id="navpoint-{order}" playOrder="{order}">
      <navLabel><text>{title}</text></navLabel>
      <content src="{file}"/>
    </navPoint>"#,
                order = ch.order(),
                title = xml_escape(ch.title()),
                file = chapter_file_name(ch),
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:uuid:{id}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>{nav}
  </navMap>
</ncx>"#,
        id = novel.id(),
        title = xml_escape(title),
        nav = nav_points.join(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn sample_novel() -> Novel {
        let mut novel = Novel::new("Fish & Chips", "Ann");
        let id = novel.add_chapter("Opening");
        novel
            .set_chapter_content(id, "<p>It was a dark night.</p>")
            .unwrap();
        novel.add_chapter("");
        novel
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_empty_novel_is_rejected() {
        let novel = Novel::new("Empty", "");
        assert!(matches!(
            build_epub(&novel, ""),
            Err(ExportError::NoChapters)
        ));
    }

    #[test]
    fn test_mimetype_is_first_and_stored() {
        let bytes = build_epub(&sample_novel(), "").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);
        assert_eq!(
            read_entry(&mut archive, "mimetype"),
            "application/epub+zip"
        );
    }

    #[test]
    fn test_opf_metadata_is_escaped() {
        let bytes = build_epub(&sample_novel(), "").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let opf = read_entry(&mut archive, "OEBPS/content.opf");
        assert!(opf.contains("<dc:title>Fish &amp; Chips</dc:title>"));
        assert!(opf.contains("<dc:creator opf:role=\"aut\">Ann</dc:creator>"));
        assert!(opf.contains("<dc:language>en-US</dc:language>"));
    }

    #[test]
    fn test_chapters_appear_in_spine_order() {
        let bytes = build_epub(&sample_novel(), "").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let opf = read_entry(&mut archive, "OEBPS/content.opf");
        let ncx = read_entry(&mut archive, "OEBPS/toc.ncx");

        assert_eq!(opf.matches("<itemref idref=\"chapter-").count(), 2);
        assert!(ncx.contains("playOrder=\"1\""));
        assert!(ncx.contains("playOrder=\"2\""));
        // 无标题章节回落到默认章节名
        assert!(ncx.contains("Chapter 2"));
    }

    #[test]
    fn test_png_cover_is_embedded() {
        let mut novel = sample_novel();
        novel.set_cover_data_url(Some(format!(
            "data:image/png;base64,{}",
            BASE64.encode([0x89u8, 0x50, 0x4e, 0x47])
        )));

        let bytes = build_epub(&novel, "").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("OEBPS/images/cover.png").is_ok());
        assert!(archive.by_name("OEBPS/cover.xhtml").is_ok());
        let opf = read_entry(&mut archive, "OEBPS/content.opf");
        assert!(opf.contains("<meta name=\"cover\" content=\"cover-image\"/>"));
    }

    #[test]
    fn test_svg_cover_is_skipped() {
        let mut novel = sample_novel();
        novel.set_cover_data_url(Some("data:image/svg+xml;base64,PHN2Zy8+".to_string()));

        let bytes = build_epub(&novel, "").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("OEBPS/cover.xhtml").is_err());
    }

    #[test]
    fn test_default_author_fallback() {
        let mut novel = Novel::new("Draft", "");
        novel.add_chapter("Ch1");
        let bytes = build_epub(&novel, "House Default").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let opf = read_entry(&mut archive, "OEBPS/content.opf");
        assert!(opf.contains("House Default"));
    }
}
