// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// ルートマニフェスト構築中に発生する致命的なエラー
///
/// どれも入力データ由来の決定的なエラーなので、リトライはせずビルド全体を中断する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// セグメントに予約文字 (`*`, `:`, `/`) が含まれている
    #[error(
        "route segment \"{segment}\" for \"{route_id}\" cannot contain \"{character}\"; \
         use a `$` prefix for params and `$` alone for splats"
    )]
    SegmentSyntax {
        route_id: String,
        segment: String,
        character: char,
    },

    /// 同じ URL パス (と index 属性) を 2 つのルートが定義している
    #[error("path {path:?} defined by route {route_id:?} conflicts with route {existing_id:?}")]
    RouteConflict {
        path: String,
        route_id: String,
        existing_id: String,
    },

    /// index ルートが子ルートを持っている
    #[error("child routes are not allowed in index routes; remove the child routes of {route_id:?}")]
    InvalidIndexChild { route_id: String },
}

/// 設定ファイルの読み込み・検証エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid ignore pattern {pattern:?}: {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid route module extension {0:?}")]
    Extension(String),

    #[error("{0}")]
    Logging(String),
}

/// ディレクトリ走査からマニフェスト出力までの一連の処理で発生するエラー
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("routes directory {0:?} does not exist")]
    MissingRoutesDir(PathBuf),

    #[error("failed to walk routes directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to resolve path {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Route(#[from] RouteError),
}
