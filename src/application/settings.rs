//! Settings Service - 全局设置的读写
//!
//! 与小说列表共用一个存储端口, 读取永不失败:
//! 损坏或缺失时返回缺省设置

use std::sync::Arc;

use tracing::warn;

use crate::application::error::ApplicationError;
use crate::application::ports::BlobStorePort;
use crate::domain::AppSettings;

/// 设置在存储里的键
pub const SETTINGS_KEY: &str = "settings";

pub struct SettingsService {
    blobs: Arc<dyn BlobStorePort>,
}

impl SettingsService {
    pub fn new(blobs: Arc<dyn BlobStorePort>) -> Self {
        Self { blobs }
    }

    /// 读取设置, 任何解析问题都回落到缺省值
    pub fn load(&self) -> AppSettings {
        match self.blobs.get(SETTINGS_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<AppSettings>(&text) {
                Ok(settings) => settings.normalized(),
                Err(err) => {
                    warn!(error = %err, "stored settings unreadable, using defaults");
                    AppSettings::default()
                }
            },
            Ok(None) => AppSettings::default(),
            Err(err) => {
                warn!(error = %err, "settings read failed, using defaults");
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<(), ApplicationError> {
        let json = serde_json::to_string(settings)?;
        self.blobs.put(SETTINGS_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Theme;
    use crate::infrastructure::persistence::MemoryBlobStore;

    #[test]
    fn test_missing_settings_default() {
        let service = SettingsService::new(Arc::new(MemoryBlobStore::new()));
        assert_eq!(service.load(), AppSettings::default());
    }

    #[test]
    fn test_round_trip() {
        let service = SettingsService::new(Arc::new(MemoryBlobStore::new()));
        let settings = AppSettings {
            default_author: "Ann".into(),
            auto_open_drawer_desktop: false,
            theme: Theme::Light,
            editor_scale: 1.25,
        };
        service.save(&settings).unwrap();
        assert_eq!(service.load(), settings);
    }

    #[test]
    fn test_corrupt_settings_default() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put(SETTINGS_KEY, "not json").unwrap();
        let service = SettingsService::new(blobs);
        assert_eq!(service.load(), AppSettings::default());
    }

    #[test]
    fn test_out_of_range_scale_clamped_on_load() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put(SETTINGS_KEY, r#"{"editorScale":5.0}"#).unwrap();
        let service = SettingsService::new(blobs);
        assert_eq!(service.load().editor_scale, 2.0);
    }
}
