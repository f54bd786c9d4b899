//! Blob Store Port - 出站端口
//!
//! 定义键值文本存取的抽象接口
//! 具体实现在 infrastructure 层（如 sled）

use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Stored value is not valid UTF-8: {0}")]
    Utf8(String),
}

/// 键值文本存储端口
///
/// 语义对齐同步持久化: `put` 返回时数据已落盘,
/// `get` 对不存在的键返回 `Ok(None)` 而不是错误
pub trait BlobStorePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
