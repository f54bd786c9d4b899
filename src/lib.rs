//! Vellum - 本地小说写作库
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说与章节聚合、密集排序不变量、宽松归一化
//! - Settings: 全局应用设置
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BlobStore, ContentSource, Confirmation）
//! - Store: 文档库服务（加载、持久化、结构变更、备份恢复）
//! - Autosave: 编辑去抖与脏状态机
//! - Selection: 当前小说/章节与位置编解码
//!
//! 基础设施层 (infrastructure/):
//! - Persistence: Sled + 内存存储
//! - Export: EPUB 2.0 / Markdown zip / 纯文本 zip

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
