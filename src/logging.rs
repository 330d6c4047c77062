// src/logging.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ConfigError;

/// ログレベルを上書きする環境変数 (例: `FLAT_ROUTES_LOG=flat_routes=debug`)
pub const LOG_ENV_VAR: &str = "FLAT_ROUTES_LOG";

/// ログ出力の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error, off
    pub level: String,
    /// 色付き出力
    pub color: bool,
    /// モジュール単位のログレベル
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

/// フィルタを組み立てる
///
/// 優先順位: 環境変数 `FLAT_ROUTES_LOG` → 設定ファイル → 既定値
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| ConfigError::Logging(format!("invalid log level {:?}: {}", config.level, e)))?;
    for (module, level) in &config.modules {
        let directive = format!("{}={}", module, level)
            .parse()
            .map_err(|e| {
                ConfigError::Logging(format!("invalid log directive {}={}: {}", module, level, e))
            })?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// ログシステムを初期化する
///
/// 標準出力はマニフェスト JSON 専用なので、ログは標準エラーに書き出す。
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_env_filter(config)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(config.color)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| ConfigError::Logging(format!("failed to install log subscriber: {}", e)))
}
