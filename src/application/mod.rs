//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（BlobStore、ContentSource、Confirmation）
//! - store: 文档库服务（加载、持久化、全部结构变更）
//! - autosave: 编辑去抖与脏状态机
//! - selection: 当前小说/章节与位置编解码
//! - settings: 全局设置读写
//! - error: 应用层错误定义

pub mod autosave;
pub mod error;
pub mod ports;
pub mod selection;
pub mod settings;
pub mod store;

// Re-exports
pub use autosave::{AutosaveController, SaveState, DEFAULT_DEBOUNCE_MS};
pub use error::ApplicationError;
pub use ports::{BlobStorePort, ConfirmationPort, ContentSourcePort, StoreError};
pub use selection::{Location, SelectionState};
pub use settings::{SettingsService, SETTINGS_KEY};
pub use store::{DocumentStore, LoadOutcome, NovelMetadata, NOVELS_KEY};
