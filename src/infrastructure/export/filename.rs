//! 导出文件名清洗

/// 文件名最大长度
const MAX_LEN: usize = 100;

/// 清洗任意标题为安全文件名
///
/// 只保留字母数字下划线与 `.`/`-`/空白, 空白折叠为单个下划线,
/// 连续下划线合并, 超长截断, 全空回落到 "untitled"
pub fn sanitize_filename(input: &str) -> String {
    let filtered: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '.' || *c == '-' || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(filtered.len());
    let mut last_was_underscore = false;
    for c in filtered.trim().chars() {
        let mapped = if c.is_whitespace() { '_' } else { c };
        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(mapped);
    }

    let truncated: String = out.chars().take(MAX_LEN).collect();
    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated
    }
}
