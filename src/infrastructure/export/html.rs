//! 章节 HTML 的纯文本与 Markdown 转换
//!
//! 编辑器产出的 HTML 子集很小 (段落/标题/列表/引用/行内格式),
//! 这里用一个轻量解析器覆盖它, 不追求完整的 HTML5 解析。

/// 解析后的节点
#[derive(Debug)]
enum Node {
    Element {
        name: String,
        href: Option<String>,
        children: Vec<Node>,
    },
    Text(String),
}

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "div", "li", "blockquote", "pre", "ul", "ol",
];

/// 内容模型里不闭合的空标签
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// HTML 转纯文本
///
/// 块级元素结束处补换行, `<hr>` 变成 `---` 分隔行,
/// 三个以上连续空行折叠为一个空行
pub fn html_to_plain_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let nodes = parse(html);
    let mut out = String::new();
    for node in &nodes {
        plain_text_node(node, &mut out);
    }
    collapse_blank_lines(&out).trim().to_string()
}

/// HTML 转 Markdown (atx 标题, 围栏代码块)
pub fn html_to_markdown(html: &str) -> String {
    let nodes = parse(html);
    let blocks = render_blocks(&nodes, 0);
    blocks.join("\n\n").trim().to_string()
}

// ---------------------------------------------------------------------------
// 解析
// ---------------------------------------------------------------------------

fn parse(html: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    // (元素名, href, 子节点) 的打开栈
    let mut stack: Vec<(String, Option<String>, Vec<Node>)> = Vec::new();
    let mut rest = html;

    fn push(stack: &mut Vec<(String, Option<String>, Vec<Node>)>, root: &mut Vec<Node>, node: Node) {
        match stack.last_mut() {
            Some((_, _, children)) => children.push(node),
            None => root.push(node),
        }
    }

    while !rest.is_empty() {
        if let Some(lt) = rest.find('<') {
            if lt > 0 {
                let text = decode_entities(&rest[..lt]);
                if !text.is_empty() {
                    push(&mut stack, &mut root, Node::Text(text));
                }
            }
            rest = &rest[lt..];

            if let Some(comment) = rest.strip_prefix("<!--") {
                rest = match comment.find("-->") {
                    Some(end) => &comment[end + 3..],
                    None => "",
                };
                continue;
            }

            let Some(gt) = rest.find('>') else {
                // 悬空的 '<' 当作普通文本
                push(&mut stack, &mut root, Node::Text(decode_entities(rest)));
                break;
            };
            let tag_body = &rest[1..gt];
            rest = &rest[gt + 1..];

            if let Some(name) = tag_body.strip_prefix('/') {
                let name = name.trim().to_ascii_lowercase();
                // 关闭到匹配层, 中间未闭合的标签一并收起
                while let Some((open_name, href, children)) = stack.pop() {
                    let node = Node::Element {
                        name: open_name.clone(),
                        href,
                        children,
                    };
                    push(&mut stack, &mut root, node);
                    if open_name == name {
                        break;
                    }
                }
                continue;
            }

            let tag_body = tag_body.trim_end_matches('/').trim();
            let (name, attrs) = match tag_body.split_once(char::is_whitespace) {
                Some((n, a)) => (n, a),
                None => (tag_body, ""),
            };
            let name = name.to_ascii_lowercase();
            if name.is_empty() || name.starts_with('!') {
                continue;
            }

            if VOID_TAGS.contains(&name.as_str()) {
                push(
                    &mut stack,
                    &mut root,
                    Node::Element {
                        name,
                        href: None,
                        children: Vec::new(),
                    },
                );
            } else {
                let href = if name == "a" { extract_href(attrs) } else { None };
                stack.push((name, href, Vec::new()));
            }
        } else {
            let text = decode_entities(rest);
            if !text.is_empty() {
                push(&mut stack, &mut root, Node::Text(text));
            }
            break;
        }
    }

    // 未闭合的残留标签
    while let Some((name, href, children)) = stack.pop() {
        let node = Node::Element {
            name,
            href,
            children,
        };
        push(&mut stack, &mut root, node);
    }
    root
}

fn extract_href(attrs: &str) -> Option<String> {
    let idx = attrs.find("href")?;
    let rest = attrs[idx + 4..].trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    if quote == '"' || quote == '\'' {
        let inner = &rest[1..];
        let end = inner.find(quote)?;
        Some(inner[..end].to_string())
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        // 分号必须离 '&' 足够近才视为实体; 按字节下标过滤, 不能切片
        // (固定偏移可能落在多字节字符中间)
        let Some(semi) = rest.find(';').filter(|i| *i < 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix('#')
                .and_then(|num| {
                    if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        num.parse().ok()
                    }
                })
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// 纯文本
// ---------------------------------------------------------------------------

fn plain_text_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element { name, children, .. } => match name.as_str() {
            "br" => out.push('\n'),
            "hr" => out.push_str("\n---\n"),
            _ => {
                for child in children {
                    plain_text_node(child, out);
                }
                if BLOCK_TAGS.contains(&name.as_str()) {
                    out.push('\n');
                }
            }
        },
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && (c == '\n' || chars.peek().map_or(false, |n| *n == '\n')) {
            let mut run = String::from(c);
            let mut newlines = if c == '\n' { 1 } else { 0 };
            while let Some(&n) = chars.peek() {
                if n.is_whitespace() {
                    if n == '\n' {
                        newlines += 1;
                    }
                    run.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            if newlines >= 3 {
                out.push_str("\n\n");
            } else {
                out.push_str(&run);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn render_blocks(nodes: &[Node], list_depth: usize) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inline_run = String::new();

    for node in nodes {
        match node {
            Node::Element { name, children, .. } if is_markdown_block(name) => {
                flush_inline(&mut inline_run, &mut blocks);
                match name.as_str() {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let level = name[1..].parse::<usize>().unwrap_or(1);
                        let text = render_inline_children(children);
                        blocks.push(format!("{} {}", "#".repeat(level), text.trim()));
                    }
                    "p" | "div" => {
                        let text = render_inline_children(children);
                        if !text.trim().is_empty() {
                            blocks.push(text.trim().to_string());
                        }
                    }
                    "blockquote" => {
                        let inner = render_blocks(children, list_depth).join("\n\n");
                        let quoted: Vec<String> = inner
                            .lines()
                            .map(|line| {
                                if line.is_empty() {
                                    ">".to_string()
                                } else {
                                    format!("> {}", line)
                                }
                            })
                            .collect();
                        blocks.push(quoted.join("\n"));
                    }
                    "ul" | "ol" => {
                        blocks.push(render_list(name == "ol", children, list_depth));
                    }
                    "pre" => {
                        let mut code = String::new();
                        for child in children {
                            plain_text_node(child, &mut code);
                        }
                        blocks.push(format!("```\n{}\n```", code.trim_end()));
                    }
                    "hr" => blocks.push("---".to_string()),
                    _ => {}
                }
            }
            other => inline_run.push_str(&render_inline(other)),
        }
    }
    flush_inline(&mut inline_run, &mut blocks);
    blocks
}

fn flush_inline(run: &mut String, blocks: &mut Vec<String>) {
    let trimmed = run.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
    run.clear();
}

fn is_markdown_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "ul" | "ol" | "pre"
            | "hr"
    )
}

fn render_list(ordered: bool, items: &[Node], depth: usize) -> String {
    let indent = "    ".repeat(depth);
    let mut lines = Vec::new();
    let mut index = 0u32;
    for item in items {
        let Node::Element { name, children, .. } = item else {
            continue;
        };
        if name != "li" {
            continue;
        }
        index += 1;
        let marker = if ordered {
            format!("{}. ", index)
        } else {
            "- ".to_string()
        };

        let mut inline = String::new();
        let mut nested = Vec::new();
        for child in children {
            match child {
                Node::Element {
                    name: child_name,
                    children: child_children,
                    ..
                } if child_name == "ul" || child_name == "ol" => {
                    nested.push(render_list(child_name == "ol", child_children, depth + 1));
                }
                other => inline.push_str(&render_inline(other)),
            }
        }
        lines.push(format!("{}{}{}", indent, marker, inline.trim()));
        lines.extend(nested);
    }
    lines.join("\n")
}

fn render_inline_children(children: &[Node]) -> String {
    children.iter().map(render_inline).collect()
}

fn render_inline(node: &Node) -> String {
    match node {
        Node::Text(text) => text.clone(),
        Node::Element {
            name,
            href,
            children,
        } => {
            let inner = render_inline_children(children);
            match name.as_str() {
                "strong" | "b" => format!("**{}**", inner),
                "em" | "i" => format!("*{}*", inner),
                "del" | "s" | "strike" => format!("~~{}~~", inner),
                "code" => format!("`{}`", inner),
                "a" => match href {
                    Some(url) => format!("[{}]({})", inner, url),
                    None => inner,
                },
                "br" => "\n".to_string(),
                // 行内位置出现的块标签按纯内容处理
                _ => inner,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_paragraphs() {
        let text = html_to_plain_text("<p>First.</p><p>Second.</p>");
        assert_eq!(text, "First.\nSecond.");
    }

    #[test]
    fn test_plain_text_br_and_hr() {
        let text = html_to_plain_text("<p>a<br>b</p><hr><p>c</p>");
        assert_eq!(text, "a\nb\n\n---\nc");
    }

    #[test]
    fn test_plain_text_entities() {
        let text = html_to_plain_text("<p>Fish &amp; Chips &lt;3 &#233;</p>");
        assert_eq!(text, "Fish & Chips <3 \u{e9}");
    }

    #[test]
    fn test_plain_text_collapses_blank_runs() {
        let text = html_to_plain_text("<div><p>a</p></div>\n\n\n<p>b</p>");
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_bare_ampersand_before_multibyte_char() {
        // '&' 后九个 ASCII 字节紧跟多字节字符, 不构成实体, 原样保留
        let text = html_to_plain_text("<p>&abcdefgh\u{e9}x</p>");
        assert_eq!(text, "&abcdefgh\u{e9}x");

        let md = html_to_markdown("<p>AT&T caf\u{e9} &amp; bar</p>");
        assert_eq!(md, "AT&T caf\u{e9} & bar");
    }

    #[test]
    fn test_plain_text_empty() {
        assert_eq!(html_to_plain_text(""), "");
    }

    #[test]
    fn test_markdown_headings_and_paragraphs() {
        let md = html_to_markdown("<h1>Title</h1><p>Body text.</p><h3>Sub</h3>");
        assert_eq!(md, "# Title\n\nBody text.\n\n### Sub");
    }

    #[test]
    fn test_markdown_inline_formatting() {
        let md = html_to_markdown("<p><strong>bold</strong> and <em>italic</em> and <s>gone</s></p>");
        assert_eq!(md, "**bold** and *italic* and ~~gone~~");
    }

    #[test]
    fn test_markdown_links() {
        let md = html_to_markdown(r#"<p>see <a href="https://example.com">here</a></p>"#);
        assert_eq!(md, "see [here](https://example.com)");
    }

    #[test]
    fn test_markdown_lists() {
        let md = html_to_markdown("<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol>");
        assert_eq!(md, "- one\n- two\n\n1. first");
    }

    #[test]
    fn test_markdown_nested_list() {
        let md = html_to_markdown("<ul><li>outer<ul><li>inner</li></ul></li></ul>");
        assert_eq!(md, "- outer\n    - inner");
    }

    #[test]
    fn test_markdown_blockquote() {
        let md = html_to_markdown("<blockquote><p>quoted line</p></blockquote>");
        assert_eq!(md, "> quoted line");
    }

    #[test]
    fn test_markdown_fenced_code() {
        let md = html_to_markdown("<pre>let x = 1;</pre>");
        assert_eq!(md, "```\nlet x = 1;\n```");
    }

    #[test]
    fn test_unclosed_tags_do_not_panic() {
        let md = html_to_markdown("<p><strong>bold");
        assert_eq!(md, "**bold**");
    }
}
