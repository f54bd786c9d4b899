//! Domain Layer - 领域层
//!
//! 包含:
//! - Novel Context: 小说与章节管理
//! - 全局应用设置

pub mod novel;

mod settings;

pub use settings::{AppSettings, Theme, EDITOR_SCALE_MAX, EDITOR_SCALE_MIN};
