//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod blob_store;
mod dialog;
mod editor;

pub use blob_store::{BlobStorePort, StoreError};
pub use dialog::ConfirmationPort;
pub use editor::ContentSourcePort;
