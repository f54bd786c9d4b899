//! Confirmation Port - 出站端口
//!
//! 破坏性操作前的用户确认, 由外层界面实现

/// 确认对话端口
pub trait ConfirmationPort: Send + Sync {
    /// 返回 true 表示用户同意继续
    fn confirm(&self, title: &str, message: &str) -> bool;
}
