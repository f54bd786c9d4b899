//! Novel Context - Domain Errors

use thiserror::Error;

use super::ChapterId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NovelError {
    #[error("Chapter not found: {0}")]
    ChapterNotFound(ChapterId),
}
