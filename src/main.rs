//! Vellum - 本地小说写作库
//!
//! 启动流程: 加载配置 -> 初始化日志 -> 打开存储 -> 加载文档库

use std::sync::Arc;

use vellum::application::{DocumentStore, LoadOutcome, SettingsService};
use vellum::config::{load_config, print_config};
use vellum::infrastructure::persistence::sled::{SledBlobStore, SledStoreConfig};

fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},vellum={}", config.log.level, config.log.level);
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter))
    };
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
    }

    tracing::info!("Vellum - 本地小说写作库");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.storage.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 打开存储
    let store_config = SledStoreConfig {
        db_path: config.storage.db_path.clone(),
    };
    let blobs = Arc::new(
        SledBlobStore::new(&store_config)
            .map_err(|e| anyhow::anyhow!("Failed to open storage: {}", e))?,
    );

    // 读取全局设置
    let settings = SettingsService::new(blobs.clone()).load();
    tracing::info!(theme = ?settings.theme, "settings loaded");

    // 加载文档库
    let (store, outcome) = DocumentStore::open(blobs)?;
    match outcome {
        LoadOutcome::Loaded { count } => tracing::info!(count, "novel library loaded"),
        LoadOutcome::Empty => tracing::info!("novel library is empty"),
        LoadOutcome::Recovered { error } => {
            tracing::warn!(error = %error, "novel library was unreadable, starting empty")
        }
    }

    for novel in store.novels_by_recency() {
        tracing::info!(
            novel_id = %novel.id(),
            title = novel.title(),
            chapters = novel.chapter_count(),
            updated_at = %novel.updated_at(),
            "novel"
        );
    }

    Ok(())
}
