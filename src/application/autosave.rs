//! Autosave - 编辑自动保存
//!
//! 编辑事件把控制器置为脏并重置去抖截止时刻, 到点后从内容源
//! 拉取当前 HTML 写回文档库。时间由调用方注入, 便于无定时器测试。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::application::error::ApplicationError;
use crate::application::ports::{ConfirmationPort, ContentSourcePort};
use crate::application::store::DocumentStore;
use crate::domain::novel::{ChapterId, NovelId};

/// 缺省去抖间隔, 毫秒
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// 保存状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// 无未保存修改
    Clean,
    /// 有修改等待落盘
    Dirty,
    /// 正在写入
    Saving,
}

/// 单个章节的自动保存控制器
pub struct AutosaveController {
    content: Arc<dyn ContentSourcePort>,
    novel_id: NovelId,
    chapter_id: ChapterId,
    debounce: Duration,
    state: SaveState,
    deadline: Option<Instant>,
    last_saved_at: Option<Instant>,
}

impl AutosaveController {
    pub fn new(
        content: Arc<dyn ContentSourcePort>,
        novel_id: NovelId,
        chapter_id: ChapterId,
        debounce: Duration,
    ) -> Self {
        Self {
            content,
            novel_id,
            chapter_id,
            debounce,
            state: SaveState::Clean,
            deadline: None,
            last_saved_at: None,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// 最近一次成功落盘的时刻, 供 "Last saved" 状态条展示
    pub fn last_saved_at(&self) -> Option<Instant> {
        self.last_saved_at
    }

    pub fn is_dirty(&self) -> bool {
        self.state != SaveState::Clean
    }

    /// 记录一次编辑: 置脏并把截止时刻推后一个去抖间隔
    ///
    /// 连续编辑只会导致最后一条截止时刻生效, 中间的全部被合并
    pub fn note_edit(&mut self, now: Instant) {
        self.state = SaveState::Dirty;
        self.deadline = Some(now + self.debounce);
    }

    /// 轮询: 截止时刻已到且仍脏时执行保存, 返回是否写入了
    pub fn poll(&mut self, now: Instant, store: &mut DocumentStore) -> Result<bool, ApplicationError> {
        match self.deadline {
            Some(deadline) if now >= deadline && self.state == SaveState::Dirty => {
                self.flush(store)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// 立即保存未落盘的修改, 不等截止时刻 (离开编辑器时调用)
    pub fn flush_now(&mut self, store: &mut DocumentStore) -> Result<bool, ApplicationError> {
        if self.state == SaveState::Dirty {
            self.flush(store)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 破坏性跳转前的确认: 干净时直接放行, 脏时询问用户;
    /// 用户同意后丢弃未保存修改
    pub fn confirm_discard(&mut self, dialog: &dyn ConfirmationPort) -> bool {
        if !self.is_dirty() {
            return true;
        }
        let confirmed = dialog.confirm(
            "Unsaved Changes",
            "You have unsaved changes. Are you sure you want to leave without saving?",
        );
        if confirmed {
            self.state = SaveState::Clean;
            self.deadline = None;
        }
        confirmed
    }

    /// 结束编辑会话: 先保住未落盘的修改, 再释放编辑器资源
    ///
    /// 保存失败也会继续释放资源, 错误原样返回
    pub fn dispose(&mut self, store: &mut DocumentStore) -> Result<(), ApplicationError> {
        let result = self.flush_now(store).map(|_| ());
        self.content.dispose();
        self.state = SaveState::Clean;
        self.deadline = None;
        result
    }

    fn flush(&mut self, store: &mut DocumentStore) -> Result<(), ApplicationError> {
        self.state = SaveState::Saving;
        let html = self.content.content();
        match store.set_chapter_content(self.novel_id, self.chapter_id, &html) {
            Ok(()) => {
                debug!(chapter_id = %self.chapter_id, "chapter autosaved");
                self.state = SaveState::Clean;
                self.deadline = None;
                self.last_saved_at = Some(Instant::now());
                Ok(())
            }
            Err(err) => {
                // 失败时保持脏, 下一次轮询或手动保存会重试
                warn!(chapter_id = %self.chapter_id, error = %err, "autosave failed");
                self.state = SaveState::Dirty;
                Err(err)
            }
        }
    }
}
