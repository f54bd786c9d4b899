//! Novel Context - 宽容解析用的原始记录
//!
//! 持久化 blob 与备份文件都以外部 JSON 形态存在, 任何字段都可能缺失。
//! 原始记录把所有字段设为可选, 归一化 (`Novel::from_raw`) 负责补齐默认值。

use serde::Deserialize;

/// 原始小说记录
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNovel {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "coverDataURL")]
    pub cover_data_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
    pub chapters: Option<Vec<RawChapter>>,
}

/// 原始章节记录
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawChapter {
    pub id: Option<String>,
    pub title: Option<String>,
    /// 排序键, 归一化后被密集的 1..N 覆盖
    pub order: Option<f64>,
    #[serde(rename = "contentHTML")]
    pub content_html: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}
