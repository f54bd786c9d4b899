//! Novel Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entities::{DEFAULT_CHAPTER_CONTENT, UNTITLED_CHAPTER};
use super::{Chapter, ChapterId, NovelError, NovelId, RawChapter, RawNovel};

/// 缺省语言标签
pub const DEFAULT_LANGUAGE: &str = "en-US";
/// 空标题占位
pub const UNTITLED_NOVEL: &str = "Untitled Novel";

/// Novel 聚合根
///
/// 不变量:
/// - 章节只属于一个 Novel, 不存在跨 Novel 引用
/// - `chapters` 恒按 `order` 升序存放, 且 order 集合恰为 {1..N}
/// - 任何对 Novel 或其章节的变更都会前移 `updated_at` (通过 `touch`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Novel {
    id: NovelId,
    title: String,
    author: String,
    language: String,
    #[serde(rename = "coverDataURL")]
    cover_data_url: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
    chapters: Vec<Chapter>,
}

impl Novel {
    /// 创建新小说, 空标题回落到占位标题
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NovelId::new(),
            title: default_novel_title(title.into()),
            author: author.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            cover_data_url: None,
            created_at: now,
            updated_at: now,
            chapters: Vec::new(),
        }
    }

    /// 从原始记录归一化重建
    ///
    /// 补齐缺失的 id/标题/时间戳/语言, 章节按原 order 稳定排序后
    /// 重编为密集的 1..N。该变换幂等: 对已归一化的数据再跑一遍是恒等。
    pub fn from_raw(raw: RawNovel) -> Self {
        let created_at = parse_timestamp(raw.created_at.as_deref()).unwrap_or(DateTime::UNIX_EPOCH);
        let updated_at = parse_timestamp(raw.updated_at.as_deref())
            .or_else(|| parse_timestamp(raw.created_at.as_deref()))
            .unwrap_or(DateTime::UNIX_EPOCH);

        let mut chapters: Vec<(f64, Chapter)> = raw
            .chapters
            .unwrap_or_default()
            .into_iter()
            .map(|ch| (ch.order.unwrap_or(f64::MAX), chapter_from_raw(ch)))
            .collect();
        // 稳定排序: 缺失 order 的章节保持原相对位置排在末尾
        chapters.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        let mut chapters: Vec<Chapter> = chapters.into_iter().map(|(_, ch)| ch).collect();
        for (index, chapter) in chapters.iter_mut().enumerate() {
            chapter.set_order(index as u32 + 1);
        }

        Self {
            id: parse_id(raw.id.as_deref()),
            title: default_novel_title(raw.title.unwrap_or_default()),
            author: raw.author.unwrap_or_default(),
            language: match raw.language {
                Some(lang) if !lang.trim().is_empty() => lang,
                _ => DEFAULT_LANGUAGE.to_string(),
            },
            cover_data_url: raw.cover_data_url,
            created_at,
            updated_at,
            chapters,
        }
    }

    // Getters
    pub fn id(&self) -> NovelId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn cover_data_url(&self) -> Option<&str> {
        self.cover_data_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 章节切片, 恒按 `order` 升序
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|ch| ch.id() == id)
    }

    /// order 最小的章节 (进入小说时的默认选中项)
    pub fn first_chapter(&self) -> Option<&Chapter> {
        self.chapters.first()
    }

    /// 前移 `updated_at`, 任何对本聚合的变更之后都要调用
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = default_novel_title(title.into());
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        let language = language.into();
        self.language = if language.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            language
        };
    }

    pub fn set_cover_data_url(&mut self, cover: Option<String>) {
        self.cover_data_url = cover;
    }

    /// 追加新章节, 永远排在末尾 (order = count + 1)
    pub fn add_chapter(&mut self, title: impl Into<String>) -> ChapterId {
        let order = self.chapters.len() as u32 + 1;
        let chapter = Chapter::new(title, order);
        let id = chapter.id();
        self.chapters.push(chapter);
        id
    }

    /// 删除章节并重编剩余序号
    pub fn remove_chapter(&mut self, id: ChapterId) -> Result<(), NovelError> {
        let index = self.position(id)?;
        self.chapters.remove(index);
        self.assign_orders();
        Ok(())
    }

    pub fn rename_chapter(
        &mut self,
        id: ChapterId,
        title: impl Into<String>,
    ) -> Result<(), NovelError> {
        let index = self.position(id)?;
        self.chapters[index].set_title(title);
        Ok(())
    }

    pub fn set_chapter_content(
        &mut self,
        id: ChapterId,
        html: impl Into<String>,
    ) -> Result<(), NovelError> {
        let index = self.position(id)?;
        self.chapters[index].set_content_html(html);
        Ok(())
    }

    /// 与上一个相邻章节交换位置, 首章不动
    pub fn move_chapter_up(&mut self, id: ChapterId) -> Result<bool, NovelError> {
        let index = self.position(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.chapters.swap(index - 1, index);
        self.assign_orders();
        Ok(true)
    }

    /// 与下一个相邻章节交换位置, 末章不动
    pub fn move_chapter_down(&mut self, id: ChapterId) -> Result<bool, NovelError> {
        let index = self.position(id)?;
        if index + 1 >= self.chapters.len() {
            return Ok(false);
        }
        self.chapters.swap(index, index + 1);
        self.assign_orders();
        Ok(true)
    }

    /// 拖拽重排: 从旧位置摘出, 插入目标位置, 再整体重编
    pub fn reorder_chapter(&mut self, id: ChapterId, new_index: usize) -> Result<(), NovelError> {
        let index = self.position(id)?;
        let chapter = self.chapters.remove(index);
        let new_index = new_index.min(self.chapters.len());
        self.chapters.insert(new_index, chapter);
        self.assign_orders();
        Ok(())
    }

    /// 按当前 order 排序后重编为 1..N, 任何结构变化之后的收尾步骤
    pub fn renumber(&mut self) {
        self.chapters.sort_by_key(|ch| ch.order());
        self.assign_orders();
    }

    fn assign_orders(&mut self) {
        for (index, chapter) in self.chapters.iter_mut().enumerate() {
            chapter.set_order(index as u32 + 1);
        }
    }

    fn position(&self, id: ChapterId) -> Result<usize, NovelError> {
        self.chapters
            .iter()
            .position(|ch| ch.id() == id)
            .ok_or(NovelError::ChapterNotFound(id))
    }
}

fn default_novel_title(title: String) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_NOVEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_id(raw: Option<&str>) -> NovelId {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn chapter_from_raw(raw: RawChapter) -> Chapter {
    let created_at = parse_timestamp(raw.created_at.as_deref()).unwrap_or(DateTime::UNIX_EPOCH);
    let updated_at = parse_timestamp(raw.updated_at.as_deref())
        .or_else(|| parse_timestamp(raw.created_at.as_deref()))
        .unwrap_or(DateTime::UNIX_EPOCH);
    let title = match raw.title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => UNTITLED_CHAPTER.to_string(),
    };
    Chapter::restore(
        raw.id
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        title,
        raw.order.unwrap_or(0.0).max(0.0) as u32,
        raw.content_html
            .unwrap_or_else(|| DEFAULT_CHAPTER_CONTENT.to_string()),
        created_at,
        updated_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_values(novel: &Novel) -> Vec<u32> {
        novel.chapters().iter().map(|ch| ch.order()).collect()
    }

    #[test]
    fn test_novel_creation() {
        let novel = Novel::new("Draft", "Ann");
        assert_eq!(novel.title(), "Draft");
        assert_eq!(novel.author(), "Ann");
        assert_eq!(novel.language(), DEFAULT_LANGUAGE);
        assert!(novel.chapters().is_empty());
    }

    #[test]
    fn test_empty_title_falls_back() {
        let novel = Novel::new("   ", "");
        assert_eq!(novel.title(), UNTITLED_NOVEL);
    }

    #[test]
    fn test_new_chapter_appends_last() {
        let mut novel = Novel::new("Draft", "");
        novel.add_chapter("Ch1");
        let id = novel.add_chapter("Ch2");
        assert_eq!(order_values(&novel), vec![1, 2]);
        assert_eq!(novel.chapter(id).map(|ch| ch.order()), Some(2));
    }

    #[test]
    fn test_delete_renumbers_dense() {
        let mut novel = Novel::new("Draft", "");
        novel.add_chapter("Ch1");
        let mid = novel.add_chapter("Ch2");
        novel.add_chapter("Ch3");

        novel.remove_chapter(mid).unwrap();
        assert_eq!(order_values(&novel), vec![1, 2]);
        assert_eq!(novel.chapters()[0].title(), "Ch1");
        assert_eq!(novel.chapters()[1].title(), "Ch3");
    }

    #[test]
    fn test_move_up_at_boundary_is_noop() {
        let mut novel = Novel::new("Draft", "");
        let first = novel.add_chapter("Ch1");
        novel.add_chapter("Ch2");

        assert!(!novel.move_chapter_up(first).unwrap());
        assert_eq!(order_values(&novel), vec![1, 2]);
        assert_eq!(novel.chapters()[0].id(), first);
    }

    #[test]
    fn test_move_down_swaps_neighbors() {
        let mut novel = Novel::new("Draft", "");
        let first = novel.add_chapter("Ch1");
        let second = novel.add_chapter("Ch2");

        assert!(novel.move_chapter_down(first).unwrap());
        assert_eq!(novel.chapters()[0].id(), second);
        assert_eq!(novel.chapters()[1].id(), first);
        assert_eq!(order_values(&novel), vec![1, 2]);
    }

    #[test]
    fn test_reorder_chapter_splices() {
        let mut novel = Novel::new("Draft", "");
        let a = novel.add_chapter("A");
        novel.add_chapter("B");
        let c = novel.add_chapter("C");

        novel.reorder_chapter(c, 0).unwrap();
        assert_eq!(novel.chapters()[0].id(), c);
        assert_eq!(novel.chapters()[2].id(), a);
        assert_eq!(order_values(&novel), vec![1, 2, 3]);
    }

    #[test]
    fn test_order_invariant_after_mixed_operations() {
        let mut novel = Novel::new("Draft", "");
        let ids: Vec<_> = (0..5).map(|i| novel.add_chapter(format!("Ch{}", i))).collect();

        novel.move_chapter_down(ids[0]).unwrap();
        novel.remove_chapter(ids[2]).unwrap();
        novel.reorder_chapter(ids[4], 0).unwrap();
        novel.move_chapter_up(ids[1]).unwrap();

        let mut orders = order_values(&novel);
        orders.sort_unstable();
        assert_eq!(orders, (1..=novel.chapter_count() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_from_raw_fills_defaults() {
        let raw: RawNovel = serde_json::from_str(r#"{"chapters":[{"order":7},{"order":2}]}"#).unwrap();
        let novel = Novel::from_raw(raw);

        assert_eq!(novel.title(), UNTITLED_NOVEL);
        assert_eq!(novel.language(), DEFAULT_LANGUAGE);
        assert_eq!(novel.created_at(), DateTime::UNIX_EPOCH);
        // 原 order 7/2 按大小排序后重编为 1..2
        assert_eq!(order_values(&novel), vec![1, 2]);
        assert_eq!(novel.chapters()[0].content_html(), DEFAULT_CHAPTER_CONTENT);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw: RawNovel = serde_json::from_str(
            r#"{"title":"  Draft ","chapters":[{"title":"B"},{"title":"A","order":1}]}"#,
        )
        .unwrap();
        let once = Novel::from_raw(raw);

        let json = serde_json::to_string(&once).unwrap();
        let twice = Novel::from_raw(serde_json::from_str(&json).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serialized_shape_uses_wire_field_names() {
        let mut novel = Novel::new("Draft", "Ann");
        novel.add_chapter("Ch1");
        let value: serde_json::Value = serde_json::to_value(&novel).unwrap();

        assert!(value.get("createdAt").is_some());
        assert!(value.get("coverDataURL").is_some());
        assert!(value["chapters"][0].get("contentHTML").is_some());
    }
}
