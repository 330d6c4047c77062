// src/tree.rs
use std::collections::HashMap;
use tracing::debug;

use crate::error::RouteError;
use crate::model::{RouteDefinition, RouteInfo, RouteManifest};
use crate::resolver::RouteMap;

const INDEX_KEY_SUFFIX: &str = "?index";

/// 1 回のツリー構築で共有する状態
struct TreeBuilder<'a> {
    map: &'a RouteMap,
    prefix: &'a str,
    /// 一意キー (パス + index マーカー) → 最初に登録したルートの ID
    unique_routes: HashMap<String, String>,
}

impl<'a> TreeBuilder<'a> {
    fn qualify(&self, value: &str) -> String {
        if self.prefix.is_empty() {
            value.to_string()
        } else {
            format!("{}/{}", self.prefix, value)
        }
    }

    /// 同じ URL を 2 つのルートが定義していないか確認し、一意キーを登録する
    fn register_unique(&mut self, route: &RouteInfo) -> Result<(), RouteError> {
        let Some(key) = unique_route_key(route) else {
            return Ok(());
        };
        match self.unique_routes.get(&key) {
            Some(existing) => Err(RouteError::RouteConflict {
                path: route.path.clone().unwrap_or_default(),
                route_id: self.qualify(&route.id),
                existing_id: existing.clone(),
            }),
            None => {
                let id = self.qualify(&route.id);
                self.unique_routes.insert(key, id);
                Ok(())
            }
        }
    }

    /// `parent_id` の子ルートを再帰的に定義する (None はツリーのルート直下)
    fn define_children(&mut self, parent_id: Option<&str>) -> Result<Vec<RouteDefinition>, RouteError> {
        let map = self.map;
        let parent_path = parent_id
            .and_then(|id| map.get(id))
            .and_then(|parent| parent.path.as_deref())
            .unwrap_or("/");

        let mut definitions = Vec::new();
        for route in map.children_of(parent_id) {
            self.register_unique(route)?;

            // 1) index ルートは葉でなければならない
            let children = if route.index {
                if map.children_of(Some(&route.id)).next().is_some() {
                    return Err(RouteError::InvalidIndexChild {
                        route_id: self.qualify(&route.id),
                    });
                }
                Vec::new()
            } else {
                // 2) それ以外は自分の ID を親として子を再帰的に定義
                self.define_children(Some(&route.id))?
            };

            let definition = RouteDefinition {
                id: self.qualify(&route.id),
                path: relative_path(route.path.as_deref(), parent_path),
                file: self.qualify(&route.file),
                index: route.index,
                children,
            };
            debug!(id = %definition.id, path = ?definition.path, index = definition.index, "defined route");
            definitions.push(definition);
        }
        Ok(definitions)
    }
}

/// 一意性チェック用のキー。index ルートはパスに `?index` を付けて区別する
///
/// パスも index 属性も持たないルート (ルート直下のレイアウト) はキーを持たない。
fn unique_route_key(route: &RouteInfo) -> Option<String> {
    let mut key = route.path.clone().unwrap_or_default();
    if route.index {
        key.push_str(INDEX_KEY_SUFFIX);
    }
    if key.is_empty() { None } else { Some(key) }
}

/// 親のパスからの相対パス。先頭の `/` は取り除き、空なら None
fn relative_path(path: Option<&str>, parent_path: &str) -> Option<String> {
    let path = path?;
    let relative = path.strip_prefix(parent_path).unwrap_or(path);
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    if relative.is_empty() {
        None
    } else {
        Some(relative.to_string())
    }
}

/// 親 ID が解決済みのルートマップからルートツリーを構築する
///
/// 親 → 子の順に深さ優先で定義し、途中でエラーが起きた場合はマニフェストを返さない。
/// `prefix` はマニフェスト上のルート ID とファイルパスの先頭に付く (例: "routes")。
pub fn define_nested_routes(map: &RouteMap, prefix: &str) -> Result<RouteManifest, RouteError> {
    let mut builder = TreeBuilder {
        map,
        prefix: prefix.trim_end_matches('/'),
        unique_routes: HashMap::new(),
    };
    let routes = builder.define_children(None)?;
    Ok(RouteManifest { routes })
}
