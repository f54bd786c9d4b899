//! Novel Context - Entities

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ChapterId;

/// 新章节的默认富文本内容
pub const DEFAULT_CHAPTER_CONTENT: &str = "<p></p>";

/// 已存在章节空标题的占位
pub const UNTITLED_CHAPTER: &str = "Untitled Chapter";

/// 章节实体
///
/// 不变量:
/// - `order` 在所属小说内唯一, 且恒为密集的 1..N 序列
/// - `id` 创建后不可变
/// - `updated_at` 在标题或正文变化时前移, 重排序号不前移
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    id: ChapterId,
    title: String,
    /// 展示/导出顺序, 1 起始
    order: u32,
    /// 富文本正文 (标记字符串)
    #[serde(rename = "contentHTML")]
    content_html: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl Chapter {
    /// 创建新章节, 空标题回落到占位标题
    pub fn new(title: impl Into<String>, order: u32) -> Self {
        let now = Utc::now();
        Self {
            id: ChapterId::new(),
            title: default_chapter_title(title.into(), order),
            order,
            content_html: DEFAULT_CHAPTER_CONTENT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 由归一化流程重建章节 (加载/导入路径)
    pub(crate) fn restore(
        id: ChapterId,
        title: String,
        order: u32,
        content_html: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            order,
            content_html,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ChapterId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 重命名章节, 空标题回落到 "Untitled Chapter"
    ///
    /// "Chapter {n}" 占位只在创建时使用, 重命名后序号可能已变
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            UNTITLED_CHAPTER.to_string()
        } else {
            trimmed.to_string()
        };
        self.updated_at = Utc::now();
    }

    /// 写入正文并前移 `updated_at`
    pub fn set_content_html(&mut self, html: impl Into<String>) {
        self.content_html = html.into();
        self.updated_at = Utc::now();
    }

    /// 仅重排序号, 不触碰时间戳
    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// 空标题回落为 "Chapter {n}" 占位
fn default_chapter_title(title: String, order: u32) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        format!("Chapter {}", order)
    } else {
        trimmed.to_string()
    }
}
