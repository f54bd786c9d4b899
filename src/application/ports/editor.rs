//! Content Source Port - 出站端口
//!
//! 编辑器内容的抽象来源, 自动保存时从这里拉取当前 HTML

/// 编辑中内容的来源
pub trait ContentSourcePort: Send + Sync {
    /// 当前编辑内容的 HTML 快照
    fn content(&self) -> String;

    /// 释放底层编辑器资源, 重复调用是无害的
    fn dispose(&self) {}
}
