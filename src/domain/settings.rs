//! 应用设置 - 跨小说的全局偏好

use serde::{Deserialize, Deserializer, Serialize};

/// 编辑器缩放下限
pub const EDITOR_SCALE_MIN: f64 = 0.75;
/// 编辑器缩放上限
pub const EDITOR_SCALE_MAX: f64 = 2.0;

/// 界面主题, 未知取值一律回落到深色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// 全局设置
///
/// 任何字段缺失或损坏都回落到缺省值, 读取永不失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 新建小说的默认作者名
    #[serde(rename = "defaultAuthor")]
    pub default_author: String,
    /// 桌面端进入小说时是否自动展开章节抽屉
    #[serde(rename = "autoOpenDrawerDesktop")]
    pub auto_open_drawer_desktop: bool,
    #[serde(deserialize_with = "lenient_theme")]
    pub theme: Theme,
    /// 编辑器缩放倍率, 读取时钳到 [0.75, 2.0]
    #[serde(rename = "editorScale")]
    pub editor_scale: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_author: String::new(),
            auto_open_drawer_desktop: true,
            theme: Theme::Dark,
            editor_scale: 1.0,
        }
    }
}

impl AppSettings {
    /// 钳制越界值, 非有限的缩放倍率回落到 1.0
    pub fn normalized(mut self) -> Self {
        if !self.editor_scale.is_finite() {
            self.editor_scale = 1.0;
        }
        self.editor_scale = self.editor_scale.clamp(EDITOR_SCALE_MIN, EDITOR_SCALE_MAX);
        self
    }
}

fn lenient_theme<'de, D>(deserializer: D) -> Result<Theme, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value.as_str() {
        Some("light") => Theme::Light,
        _ => Theme::Dark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_author, "");
        assert!(settings.auto_open_drawer_desktop);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.editor_scale, 1.0);
    }

    #[test]
    fn test_unknown_theme_coerces_to_dark() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"theme":"sepia","editorScale":1.5}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.editor_scale, 1.5);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_editor_scale_clamped() {
        let low = AppSettings {
            editor_scale: 0.1,
            ..Default::default()
        }
        .normalized();
        assert_eq!(low.editor_scale, EDITOR_SCALE_MIN);

        let high = AppSettings {
            editor_scale: 9.0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(high.editor_scale, EDITOR_SCALE_MAX);

        let nan = AppSettings {
            editor_scale: f64::NAN,
            ..Default::default()
        }
        .normalized();
        assert_eq!(nan.editor_scale, 1.0);
    }
}
