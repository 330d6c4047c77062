// src/config.rs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::LoggingConfig;

/// ルートモジュールとして認識する既定の拡張子
pub const DEFAULT_ROUTE_MODULE_EXTENSIONS: [&str; 6] = [".tsx", ".ts", ".jsx", ".js", ".md", ".mdx"];

/// ルートマニフェスト構築の設定
///
/// TOML ファイルから読み込み、CLI 引数で上書きする。未指定の項目は既定値になる。
///
/// ```toml
/// app_dir = "app"
/// routes_dir = "routes"
/// root_prefix = "routes"
/// ignored_route_files = ["**/.*", "**/*.css"]
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatRoutesConfig {
    /// アプリケーションのルートディレクトリ
    pub app_dir: PathBuf,
    /// `app_dir` からの相対で表したルートディレクトリ
    pub routes_dir: PathBuf,
    /// マニフェストのルート ID / ファイルパスに付けるプレフィックス
    pub root_prefix: String,
    /// ルートモジュールとして認識する拡張子 (先頭の `.` を含む)
    pub extensions: Vec<String>,
    /// ルートディレクトリからの相対パスに対して評価する除外 glob
    pub ignored_route_files: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for FlatRoutesConfig {
    fn default() -> Self {
        FlatRoutesConfig {
            app_dir: PathBuf::from("app"),
            routes_dir: PathBuf::from("routes"),
            root_prefix: "routes".to_string(),
            extensions: DEFAULT_ROUTE_MODULE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            ignored_route_files: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FlatRoutesConfig {
    /// TOML 設定ファイルを読み込む
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&src).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 走査対象となるルートディレクトリ (`app_dir/routes_dir`)
    pub fn routes_root(&self) -> PathBuf {
        self.app_dir.join(&self.routes_dir)
    }
}

/// ファイルがルートモジュールかどうかを判定する
///
/// - フラットなファイル (ディレクトリ区切りを含まない) は拡張子だけで判定
/// - ネストしたファイルは `+/name`, `/index`, `/route`, `/_layout` のいずれかが
///   拡張子の直前に来ている場合のみルートモジュールとみなす
/// - 除外 glob にマッチしたファイルは常に対象外
#[derive(Debug, Clone)]
pub struct RouteModuleMatcher {
    extensions: Vec<String>,
    nested_route: Regex,
    ignored: Vec<glob::Pattern>,
}

impl RouteModuleMatcher {
    pub fn new(config: &FlatRoutesConfig) -> Result<Self, ConfigError> {
        let mut bare_exts = Vec::with_capacity(config.extensions.len());
        for ext in &config.extensions {
            let bare = ext
                .strip_prefix('.')
                .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
                .ok_or_else(|| ConfigError::Extension(ext.clone()))?;
            bare_exts.push(regex::escape(bare));
        }

        // 拡張子が空の場合は何にもマッチしない正規表現にする
        let ext_alternation = if bare_exts.is_empty() {
            "[^\\s\\S]".to_string()
        } else {
            bare_exts.join("|")
        };
        let nested_route = Regex::new(&format!(
            r"(?:\+/[^/]+|/index|/route|/_[^/]+)\.(?:{ext_alternation})$"
        ))
        .map_err(|_| ConfigError::Extension(config.extensions.join(",")))?;

        let ignored = config
            .ignored_route_files
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ConfigError::IgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteModuleMatcher {
            extensions: config.extensions.clone(),
            nested_route,
            ignored,
        })
    }

    /// 除外 glob のいずれかにマッチするか
    pub fn is_ignored(&self, file: &str) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.ignored
            .iter()
            .any(|pattern| pattern.matches_with(file, options))
    }

    /// ルートディレクトリ相対のファイルパスがルートモジュールかどうか
    pub fn is_route_module(&self, file: &str) -> bool {
        let file = file.replace('\\', "/");
        if self.is_ignored(&file) {
            return false;
        }

        let has_route_ext = Path::new(&file)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known[1..] == *ext));
        if !has_route_ext {
            return false;
        }

        // フラットなファイルは拡張子だけで判定
        if !file.contains('/') {
            return true;
        }
        self.nested_route.is_match(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> RouteModuleMatcher {
        RouteModuleMatcher::new(&FlatRoutesConfig::default()).unwrap()
    }

    #[test]
    fn flat_files_need_only_an_extension() {
        let m = matcher();
        assert!(m.is_route_module("users.$id.tsx"));
        assert!(m.is_route_module("about.mdx"));
        assert!(!m.is_route_module("styles.css"));
        assert!(!m.is_route_module("README"));
    }

    #[test]
    fn nested_files_need_a_structural_marker() {
        let m = matcher();
        assert!(m.is_route_module("users/route.tsx"));
        assert!(m.is_route_module("users/index.tsx"));
        assert!(m.is_route_module("users/_layout.tsx"));
        assert!(m.is_route_module("users+/$id.tsx"));
        assert!(m.is_route_module("users\\route.tsx"));
        assert!(!m.is_route_module("users/helpers.ts"));
        assert!(!m.is_route_module("users/route.css"));
    }

    #[test]
    fn ignored_patterns_win_over_extensions() {
        let config = FlatRoutesConfig {
            ignored_route_files: vec!["**/.*".to_string(), "**/*.test.tsx".to_string()],
            ..FlatRoutesConfig::default()
        };
        let m = RouteModuleMatcher::new(&config).unwrap();
        assert!(!m.is_route_module(".eslintrc.js"));
        assert!(!m.is_route_module("users.test.tsx"));
        assert!(!m.is_route_module("users+/profile.test.tsx"));
        assert!(m.is_route_module("users.tsx"));
    }

    #[test]
    fn rejects_malformed_extensions() {
        let config = FlatRoutesConfig {
            extensions: vec!["tsx".to_string()],
            ..FlatRoutesConfig::default()
        };
        assert!(matches!(
            RouteModuleMatcher::new(&config),
            Err(ConfigError::Extension(ext)) if ext == "tsx"
        ));
    }

    #[test]
    fn rejects_malformed_ignore_patterns() {
        let config = FlatRoutesConfig {
            ignored_route_files: vec!["[".to_string()],
            ..FlatRoutesConfig::default()
        };
        assert!(matches!(
            RouteModuleMatcher::new(&config),
            Err(ConfigError::IgnorePattern { .. })
        ));
    }

    #[test]
    fn parses_partial_toml() {
        let config: FlatRoutesConfig = toml::from_str(
            r#"
            app_dir = "web/app"
            ignored_route_files = ["**/*.css"]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.app_dir, PathBuf::from("web/app"));
        assert_eq!(config.root_prefix, "routes");
        assert_eq!(config.extensions.len(), 6);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.routes_root(), PathBuf::from("web/app/routes"));
    }
}
