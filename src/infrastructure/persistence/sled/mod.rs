//! Sled 持久化适配器

mod blob_store;

pub use blob_store::{SledBlobStore, SledStoreConfig};
