//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 小说聚合管理
//! - 章节实体与密集排序不变量
//! - 原始记录的宽松归一化

mod aggregate;
mod entities;
mod errors;
mod raw;
mod value_objects;

pub use aggregate::{Novel, DEFAULT_LANGUAGE, UNTITLED_NOVEL};
pub use entities::{Chapter, DEFAULT_CHAPTER_CONTENT, UNTITLED_CHAPTER};
pub use errors::NovelError;
pub use raw::{RawChapter, RawNovel};
pub use value_objects::{ChapterId, NovelId};
