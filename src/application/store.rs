//! Document Store - 文档库应用服务
//!
//! 持有全部小说的内存副本, 每次变更后整体写回存储端口。
//! 读取是宽松的 (损坏数据尽量恢复), 备份恢复是严格的 (整体通过或整体拒绝)。

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::error::ApplicationError;
use crate::application::ports::BlobStorePort;
use crate::domain::novel::{Chapter, ChapterId, Novel, NovelId, RawNovel, UNTITLED_NOVEL};

/// 小说列表在存储里的键
pub const NOVELS_KEY: &str = "novels";

/// 打开文档库时的加载结果
#[derive(Debug)]
pub enum LoadOutcome {
    /// 正常读出的小说数量
    Loaded { count: usize },
    /// 键不存在, 首次启动
    Empty,
    /// 数据整体损坏, 以空库继续
    Recovered { error: String },
}

/// 元数据更新请求, 与编辑弹窗的字段一一对应
#[derive(Debug, Clone)]
pub struct NovelMetadata {
    pub title: String,
    pub author: String,
    pub language: String,
    pub cover_data_url: Option<String>,
}

/// 文档库
pub struct DocumentStore {
    blobs: Arc<dyn BlobStorePort>,
    novels: Vec<Novel>,
}

impl DocumentStore {
    /// 打开文档库并宽松加载既有数据
    ///
    /// 单条小说损坏时逐条归一化修复; 整个列表无法解析时
    /// 以空库继续并在返回值里携带原始错误, 绝不 panic。
    pub fn open(blobs: Arc<dyn BlobStorePort>) -> Result<(Self, LoadOutcome), ApplicationError> {
        let raw = blobs.get(NOVELS_KEY)?;
        let (novels, outcome) = match raw {
            None => (Vec::new(), LoadOutcome::Empty),
            Some(text) => match serde_json::from_str::<Vec<RawNovel>>(&text) {
                Ok(raws) => {
                    let novels: Vec<Novel> = raws.into_iter().map(Novel::from_raw).collect();
                    let outcome = LoadOutcome::Loaded {
                        count: novels.len(),
                    };
                    (novels, outcome)
                }
                Err(err) => {
                    warn!(error = %err, "stored novel list unreadable, starting empty");
                    (
                        Vec::new(),
                        LoadOutcome::Recovered {
                            error: err.to_string(),
                        },
                    )
                }
            },
        };
        Ok((Self { blobs, novels }, outcome))
    }

    /// 将当前内存状态整体写回
    ///
    /// 写入失败时内存状态保留, 调用方可稍后重试
    pub fn save(&self) -> Result<(), ApplicationError> {
        let json = serde_json::to_string(&self.novels)?;
        self.blobs.put(NOVELS_KEY, &json)?;
        Ok(())
    }

    /// 全量导出为带缩进的 JSON, 用作备份文件内容
    pub fn backup_json(&self) -> Result<String, ApplicationError> {
        Ok(serde_json::to_string_pretty(&self.novels)?)
    }

    /// 严格校验后整体替换文档库
    ///
    /// 任何一条记录缺少必需字段都拒绝导入, 内存与存储均不变
    pub fn replace_all(&mut self, json: &str) -> Result<usize, ApplicationError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| ApplicationError::validation(format!("invalid backup JSON: {}", err)))?;
        validate_backup(&value)?;

        let raws: Vec<RawNovel> = serde_json::from_value(value)?;
        self.novels = raws.into_iter().map(Novel::from_raw).collect();
        self.save()?;
        info!(count = self.novels.len(), "novel library restored from backup");
        Ok(self.novels.len())
    }

    pub fn novels(&self) -> &[Novel] {
        &self.novels
    }

    pub fn novel(&self, id: NovelId) -> Option<&Novel> {
        self.novels.iter().find(|n| n.id() == id)
    }

    pub fn chapter(&self, novel_id: NovelId, chapter_id: ChapterId) -> Option<&Chapter> {
        self.novel(novel_id).and_then(|n| n.chapter(chapter_id))
    }

    /// 按最近更新时间倒序的小说引用, 用于书库列表
    pub fn novels_by_recency(&self) -> Vec<&Novel> {
        let mut list: Vec<&Novel> = self.novels.iter().collect();
        list.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        list
    }

    pub fn create_novel(
        &mut self,
        title: &str,
        author: &str,
    ) -> Result<NovelId, ApplicationError> {
        let novel = Novel::new(title, author);
        let id = novel.id();
        info!(novel_id = %id, title = novel.title(), "novel created");
        self.novels.push(novel);
        self.save()?;
        Ok(id)
    }

    pub fn delete_novel(&mut self, id: NovelId) -> Result<(), ApplicationError> {
        let index = self
            .novels
            .iter()
            .position(|n| n.id() == id)
            .ok_or_else(|| ApplicationError::not_found("Novel", *id.as_uuid()))?;
        let removed = self.novels.remove(index);
        info!(novel_id = %id, title = removed.title(), "novel deleted");
        self.save()
    }

    pub fn rename_novel(&mut self, id: NovelId, title: &str) -> Result<(), ApplicationError> {
        let novel = self.novel_mut(id)?;
        novel.set_title(title);
        novel.touch();
        self.save()
    }

    /// 应用元数据编辑, 返回是否有实际变化; 无变化时不落盘也不前移时间戳
    pub fn update_novel_metadata(
        &mut self,
        id: NovelId,
        metadata: NovelMetadata,
    ) -> Result<bool, ApplicationError> {
        let novel = self.novel_mut(id)?;
        let mut changed = false;

        // 空标题与占位标题视为同一取值
        let new_title = match metadata.title.trim() {
            "" => UNTITLED_NOVEL,
            t => t,
        };
        if novel.title() != new_title {
            novel.set_title(new_title);
            changed = true;
        }
        if novel.author() != metadata.author {
            novel.set_author(metadata.author);
            changed = true;
        }
        if novel.language() != metadata.language {
            novel.set_language(metadata.language);
            changed = true;
        }
        if novel.cover_data_url() != metadata.cover_data_url.as_deref() {
            novel.set_cover_data_url(metadata.cover_data_url);
            changed = true;
        }

        if changed {
            novel.touch();
            self.save()?;
        }
        Ok(changed)
    }

    /// 记录一次访问, 把小说顶到最近列表首位
    pub fn touch_novel(&mut self, id: NovelId) -> Result<(), ApplicationError> {
        self.novel_mut(id)?.touch();
        self.save()
    }

    /// 追加章节, 空标题回落到 "Chapter {序号}"
    pub fn add_chapter(
        &mut self,
        novel_id: NovelId,
        title: Option<&str>,
    ) -> Result<ChapterId, ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        let chapter_id = novel.add_chapter(title.unwrap_or_default());
        novel.touch();
        info!(novel_id = %novel_id, chapter_id = %chapter_id, "chapter added");
        self.save()?;
        Ok(chapter_id)
    }

    pub fn delete_chapter(
        &mut self,
        novel_id: NovelId,
        chapter_id: ChapterId,
    ) -> Result<(), ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        novel.remove_chapter(chapter_id)?;
        novel.touch();
        info!(novel_id = %novel_id, chapter_id = %chapter_id, "chapter deleted");
        self.save()
    }

    pub fn rename_chapter(
        &mut self,
        novel_id: NovelId,
        chapter_id: ChapterId,
        title: &str,
    ) -> Result<(), ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        novel.rename_chapter(chapter_id, title)?;
        novel.touch();
        self.save()
    }

    pub fn set_chapter_content(
        &mut self,
        novel_id: NovelId,
        chapter_id: ChapterId,
        html: &str,
    ) -> Result<(), ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        novel.set_chapter_content(chapter_id, html)?;
        novel.touch();
        self.save()
    }

    /// 返回是否发生了移动; 已在首位时不落盘
    pub fn move_chapter_up(
        &mut self,
        novel_id: NovelId,
        chapter_id: ChapterId,
    ) -> Result<bool, ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        if novel.move_chapter_up(chapter_id)? {
            novel.touch();
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 返回是否发生了移动; 已在末位时不落盘
    pub fn move_chapter_down(
        &mut self,
        novel_id: NovelId,
        chapter_id: ChapterId,
    ) -> Result<bool, ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        if novel.move_chapter_down(chapter_id)? {
            novel.touch();
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 拖拽到任意目标位置
    pub fn reorder_chapter(
        &mut self,
        novel_id: NovelId,
        chapter_id: ChapterId,
        new_index: usize,
    ) -> Result<(), ApplicationError> {
        let novel = self.novel_mut(novel_id)?;
        novel.reorder_chapter(chapter_id, new_index)?;
        novel.touch();
        self.save()
    }

    fn novel_mut(&mut self, id: NovelId) -> Result<&mut Novel, ApplicationError> {
        self.novels
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or_else(|| ApplicationError::not_found("Novel", *id.as_uuid()))
    }
}

/// 备份文件的结构校验, 对齐恢复流程的最低要求
fn validate_backup(value: &serde_json::Value) -> Result<(), ApplicationError> {
    let novels = value
        .as_array()
        .ok_or_else(|| ApplicationError::validation("backup must be a JSON array"))?;

    for (n_idx, novel) in novels.iter().enumerate() {
        let obj = novel
            .as_object()
            .ok_or_else(|| ApplicationError::validation(format!("novel {} is not an object", n_idx)))?;
        if !obj.get("id").map(is_nonempty_string).unwrap_or(false) {
            return Err(ApplicationError::validation(format!(
                "novel {} is missing an id",
                n_idx
            )));
        }
        if !obj.get("title").map(|t| t.is_string()).unwrap_or(false) {
            return Err(ApplicationError::validation(format!(
                "novel {} is missing a string title",
                n_idx
            )));
        }
        let chapters = obj
            .get("chapters")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                ApplicationError::validation(format!("novel {} has no chapter array", n_idx))
            })?;
        for (c_idx, chapter) in chapters.iter().enumerate() {
            let ch = chapter.as_object().ok_or_else(|| {
                ApplicationError::validation(format!(
                    "novel {} chapter {} is not an object",
                    n_idx, c_idx
                ))
            })?;
            if !ch.get("id").map(is_nonempty_string).unwrap_or(false) {
                return Err(ApplicationError::validation(format!(
                    "novel {} chapter {} is missing an id",
                    n_idx, c_idx
                )));
            }
            for field in ["title", "contentHTML"] {
                if !ch.get(field).map(|v| v.is_string()).unwrap_or(false) {
                    return Err(ApplicationError::validation(format!(
                        "novel {} chapter {} is missing string {}",
                        n_idx, c_idx, field
                    )));
                }
            }
            if !ch.get("order").map(|v| v.is_number()).unwrap_or(false) {
                return Err(ApplicationError::validation(format!(
                    "novel {} chapter {} is missing a numeric order",
                    n_idx, c_idx
                )));
            }
        }
    }
    Ok(())
}

fn is_nonempty_string(value: &serde_json::Value) -> bool {
    value.as_str().map(|s| !s.is_empty()).unwrap_or(false)
}
