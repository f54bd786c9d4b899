//! Persistence - 存储端口的具体实现
//!
//! - sled: 生产用嵌入式数据库
//! - memory: 测试用内存实现

mod memory;
pub mod sled;

pub use memory::MemoryBlobStore;
pub use sled::{SledBlobStore, SledStoreConfig};
