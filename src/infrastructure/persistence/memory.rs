//! In-Memory Blob Store - 测试用内存实现
//!
//! 支持注入写失败与统计写次数, 用于验证保存路径的错误处理

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{BlobStorePort, StoreError};

#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    write_count: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让后续 put 全部失败 (模拟磁盘故障/配额耗尽)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 成功写入的累计次数
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

impl BlobStorePort for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated write failure".into()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = MemoryBlobStore::new();
        assert!(store.get("absent").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get() {
        let store = MemoryBlobStore::new();
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_injected_failure() {
        let store = MemoryBlobStore::new();
        store.set_fail_writes(true);
        assert!(store.put("k", "v").is_err());
        assert_eq!(store.write_count(), 0);
    }
}
