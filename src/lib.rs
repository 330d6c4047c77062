// src/lib.rs

//! フラットファイル規約のルート探索とルートマニフェストの構築
//!
//! ルートディレクトリ内のファイル名からルートツリーを組み立てる。
//!
//! ```text
//! routes/
//! ├── _index.tsx          → "/" (index)
//! ├── users.tsx           → "/users"
//! ├── users.$id.tsx       →   ":id"
//! ├── _auth.tsx           → (パスなしレイアウト)
//! └── _auth.login.tsx     →   "login"
//! ```
//!
//! ```
//! use flat_routes::{FlatRoutesConfig, flat_routes};
//!
//! let manifest = flat_routes(["users.tsx", "users.$id.tsx"], &FlatRoutesConfig::default()).unwrap();
//! let child = manifest.get("routes/users.$id").unwrap();
//! assert_eq!(child.path.as_deref(), Some(":id"));
//! ```

use std::path::Path;
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod scan;
pub mod tree;

pub use config::{FlatRoutesConfig, RouteModuleMatcher};
pub use error::{ConfigError, DiscoveryError, RouteError};
pub use model::{RouteDefinition, RouteInfo, RouteManifest};
pub use parser::{create_route_id, create_route_path, get_route_info, get_route_segments, is_index_route};
pub use resolver::{NameAncestors, RouteMap, build_route_map, find_parent_route_id};
pub use tree::define_nested_routes;

/// ルートディレクトリ相対のファイル一覧からマニフェストを構築する
///
/// 入出力を伴わない純粋な処理で、エラー時は部分的なマニフェストを返さない。
pub fn build_manifest<I, S>(
    files: I,
    matcher: &RouteModuleMatcher,
    prefix: &str,
) -> Result<RouteManifest, RouteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let map = build_route_map(files, matcher)?;
    let manifest = define_nested_routes(&map, prefix)?;
    info!(routes = map.len(), "built route manifest");
    Ok(manifest)
}

/// ファイルパスの一覧からマニフェストを構築する
///
/// パスはルートディレクトリ相対、または `config.routes_root()` 配下の絶対パス。
/// ルートディレクトリ外の絶対パスは読み飛ばす。
pub fn flat_routes<I, P>(files: I, config: &FlatRoutesConfig) -> Result<RouteManifest, DiscoveryError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let matcher = RouteModuleMatcher::new(config)?;
    let root = scan::absolute_routes_root(&config.routes_root())?;

    let mut relative = Vec::new();
    for file in files {
        let file = file.as_ref();
        match scan::relative_route_file(file, &root) {
            Some(rel) => relative.push(rel),
            None => warn!(path = ?file, "skipping file outside the routes directory"),
        }
    }

    Ok(build_manifest(relative, &matcher, &config.root_prefix)?)
}

/// `config.routes_root()` を走査してマニフェストを構築する
pub fn flat_routes_in_dir(config: &FlatRoutesConfig) -> Result<RouteManifest, DiscoveryError> {
    let files = scan::discover_route_files(&config.routes_root())?;
    let matcher = RouteModuleMatcher::new(config)?;
    Ok(build_manifest(files, &matcher, &config.root_prefix)?)
}
