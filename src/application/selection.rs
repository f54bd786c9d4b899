//! Selection - 当前打开的小说与章节
//!
//! 选中状态独立于文档库, 结构变更后通过 `reconcile` 兜底修正。
//! 位置可编解码为查询串, 用于会话恢复与深链接。

use crate::application::error::ApplicationError;
use crate::application::store::DocumentStore;
use crate::domain::novel::{ChapterId, NovelId};

/// 可序列化的位置, 查询串形如 `novelId=..&chapterId=..`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub novel_id: Option<NovelId>,
    pub chapter_id: Option<ChapterId>,
}

impl Location {
    /// 编码为查询串; 没有小说时章节也一并丢弃
    pub fn to_query(&self) -> String {
        match (self.novel_id, self.chapter_id) {
            (Some(novel), Some(chapter)) => format!("novelId={}&chapterId={}", novel, chapter),
            (Some(novel), None) => format!("novelId={}", novel),
            _ => String::new(),
        }
    }

    /// 宽松解析: 无法识别的键和非法 id 直接忽略
    pub fn parse(query: &str) -> Self {
        let mut location = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "novelId" => location.novel_id = value.parse().ok(),
                "chapterId" => location.chapter_id = value.parse().ok(),
                _ => {}
            }
        }
        if location.novel_id.is_none() {
            location.chapter_id = None;
        }
        location
    }
}

/// 当前选中状态
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionState {
    novel_id: Option<NovelId>,
    chapter_id: Option<ChapterId>,
}

impl SelectionState {
    pub fn novel_id(&self) -> Option<NovelId> {
        self.novel_id
    }

    pub fn chapter_id(&self) -> Option<ChapterId> {
        self.chapter_id
    }

    /// 打开小说并选中章节
    ///
    /// 优先用 `preferred` (深链接携带的章节), 不在该小说里则
    /// 回落到首章; 空小说选中 None。返回最终选中的章节。
    pub fn open_novel(
        &mut self,
        store: &DocumentStore,
        novel_id: NovelId,
        preferred: Option<ChapterId>,
    ) -> Result<Option<ChapterId>, ApplicationError> {
        let novel = store
            .novel(novel_id)
            .ok_or_else(|| ApplicationError::not_found("Novel", *novel_id.as_uuid()))?;

        let chapter_id = preferred
            .filter(|id| novel.chapter(*id).is_some())
            .or_else(|| novel.first_chapter().map(|ch| ch.id()));

        self.novel_id = Some(novel_id);
        self.chapter_id = chapter_id;
        Ok(chapter_id)
    }

    /// 切换到当前小说内的另一个章节
    pub fn select_chapter(
        &mut self,
        store: &DocumentStore,
        chapter_id: ChapterId,
    ) -> Result<(), ApplicationError> {
        let novel_id = self
            .novel_id
            .ok_or_else(|| ApplicationError::validation("no novel is open"))?;
        if store.chapter(novel_id, chapter_id).is_none() {
            return Err(ApplicationError::not_found("Chapter", *chapter_id.as_uuid()));
        }
        self.chapter_id = Some(chapter_id);
        Ok(())
    }

    /// 返回书库视图
    pub fn clear(&mut self) {
        self.novel_id = None;
        self.chapter_id = None;
    }

    /// 结构变更后的兜底: 小说没了就整体清空, 只有章节没了就回落首章
    pub fn reconcile(&mut self, store: &DocumentStore) {
        let Some(novel_id) = self.novel_id else {
            self.chapter_id = None;
            return;
        };
        let Some(novel) = store.novel(novel_id) else {
            self.clear();
            return;
        };
        let still_present = self
            .chapter_id
            .map(|id| novel.chapter(id).is_some())
            .unwrap_or(false);
        if !still_present {
            self.chapter_id = novel.first_chapter().map(|ch| ch.id());
        }
    }

    pub fn location(&self) -> Location {
        Location {
            novel_id: self.novel_id,
            chapter_id: self.chapter_id,
        }
    }

    /// 从位置恢复选中状态, 指向已不存在数据的部分静默丢弃
    pub fn restore(store: &DocumentStore, location: &Location) -> Self {
        let mut state = Self::default();
        if let Some(novel_id) = location.novel_id {
            if state.open_novel(store, novel_id, location.chapter_id).is_err() {
                state.clear();
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::MemoryBlobStore;
    use std::sync::Arc;

    fn store_with_novel() -> (DocumentStore, NovelId, ChapterId, ChapterId) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let (mut store, _) = DocumentStore::open(blobs).unwrap();
        let novel_id = store.create_novel("Draft", "").unwrap();
        let first = store.add_chapter(novel_id, Some("Ch1")).unwrap();
        let second = store.add_chapter(novel_id, Some("Ch2")).unwrap();
        (store, novel_id, first, second)
    }

    #[test]
    fn test_open_defaults_to_first_chapter() {
        let (store, novel_id, first, _) = store_with_novel();
        let mut selection = SelectionState::default();
        let selected = selection.open_novel(&store, novel_id, None).unwrap();
        assert_eq!(selected, Some(first));
    }

    #[test]
    fn test_open_honors_preferred_chapter() {
        let (store, novel_id, _, second) = store_with_novel();
        let mut selection = SelectionState::default();
        let selected = selection.open_novel(&store, novel_id, Some(second)).unwrap();
        assert_eq!(selected, Some(second));
    }

    #[test]
    fn test_foreign_preferred_chapter_falls_back() {
        let (store, novel_id, first, _) = store_with_novel();
        let mut selection = SelectionState::default();
        let selected = selection
            .open_novel(&store, novel_id, Some(ChapterId::new()))
            .unwrap();
        assert_eq!(selected, Some(first));
    }

    #[test]
    fn test_reconcile_after_chapter_deleted() {
        let (mut store, novel_id, first, second) = store_with_novel();
        let mut selection = SelectionState::default();
        selection.open_novel(&store, novel_id, Some(second)).unwrap();

        store.delete_chapter(novel_id, second).unwrap();
        selection.reconcile(&store);
        assert_eq!(selection.chapter_id(), Some(first));
    }

    #[test]
    fn test_reconcile_after_novel_deleted() {
        let (mut store, novel_id, _, _) = store_with_novel();
        let mut selection = SelectionState::default();
        selection.open_novel(&store, novel_id, None).unwrap();

        store.delete_novel(novel_id).unwrap();
        selection.reconcile(&store);
        assert_eq!(selection.novel_id(), None);
        assert_eq!(selection.chapter_id(), None);
    }

    #[test]
    fn test_location_round_trip() {
        let (store, novel_id, _, second) = store_with_novel();
        let mut selection = SelectionState::default();
        selection.open_novel(&store, novel_id, Some(second)).unwrap();

        let query = selection.location().to_query();
        let restored = SelectionState::restore(&store, &Location::parse(&query));
        assert_eq!(restored.novel_id(), Some(novel_id));
        assert_eq!(restored.chapter_id(), Some(second));
    }

    #[test]
    fn test_chapter_without_novel_is_dropped() {
        let location = Location::parse("chapterId=0b7e5e8e-7f3a-4e1f-9e8d-6b1a2c3d4e5f");
        assert_eq!(location.novel_id, None);
        assert_eq!(location.chapter_id, None);
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let location = Location::parse("?novelId=not-a-uuid&foo&bar=1");
        assert_eq!(location, Location::default());
        assert_eq!(location.to_query(), "");
    }

    #[test]
    fn test_restore_with_stale_novel_clears() {
        let (store, _, _, _) = store_with_novel();
        let stale = Location {
            novel_id: Some(NovelId::new()),
            chapter_id: None,
        };
        let restored = SelectionState::restore(&store, &stale);
        assert_eq!(restored.novel_id(), None);
    }
}
