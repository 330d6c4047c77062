// src/resolver.rs
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::config::RouteModuleMatcher;
use crate::error::RouteError;
use crate::model::RouteInfo;
use crate::parser::get_route_info;

/// 1 回のビルドの間だけ使うルートの索引
///
/// - `routes`: ルート ID → RouteInfo
/// - `names`: 名前 → ルート ID (祖先の検索用)
///
/// どちらも順序付きマップなので、同じ入力からは常に同じ順序で走査できる。
#[derive(Debug, Clone, Default)]
pub struct RouteMap {
    routes: BTreeMap<String, RouteInfo>,
    names: BTreeMap<String, String>,
}

impl RouteMap {
    pub fn get(&self, id: &str) -> Option<&RouteInfo> {
        self.routes.get(id)
    }

    /// 名前から登録済みのルートを引く
    pub fn get_by_name(&self, name: &str) -> Option<&RouteInfo> {
        self.names.get(name).and_then(|id| self.routes.get(id))
    }

    /// `parent_id` が `parent` と一致するルートを ID 順に返す (None はツリーのルート直下)
    pub fn children_of<'a>(&'a self, parent: Option<&'a str>) -> impl Iterator<Item = &'a RouteInfo> {
        self.routes
            .values()
            .filter(move |route| route.parent_id.as_deref() == parent)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// ルートを登録する。同じ ID・名前は後勝ち
    fn insert(&mut self, route: RouteInfo) {
        self.names.insert(route.name.clone(), route.id.clone());
        self.routes.insert(route.id.clone(), route);
    }
}

/// 名前の祖先候補を長い順に返すイテレータ
///
/// `a/b/c/d` に対して `a/b/c` → `a/b` → `a` を返す (自分自身は含まない)。
#[derive(Debug, Clone)]
pub struct NameAncestors<'a> {
    current: &'a str,
}

impl<'a> NameAncestors<'a> {
    pub fn new(name: &'a str) -> Self {
        NameAncestors { current: name }
    }
}

impl<'a> Iterator for NameAncestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, _) = self.current.rsplit_once('/')?;
        self.current = parent;
        if parent.is_empty() { None } else { Some(parent) }
    }
}

/// 名前の最も長い登録済みの祖先を探し、その ID を返す
///
/// どの祖先も登録されていなければ None (ツリーのルート直下に付く)。
pub fn find_parent_route_id(name: &str, names: &BTreeMap<String, String>) -> Option<String> {
    NameAncestors::new(name).find_map(|candidate| names.get(candidate).cloned())
}

/// ファイル一覧からルートマップを構築し、全ルートの親を解決する
///
/// `files` はルートディレクトリ相対のパス。ルートモジュールでないファイルは黙って読み飛ばす。
pub fn build_route_map<I, S>(files: I, matcher: &RouteModuleMatcher) -> Result<RouteMap, RouteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // 1) ルートモジュールだけを RouteInfo に変換して登録
    let mut map = RouteMap::default();
    for file in files {
        let file = file.as_ref();
        if !matcher.is_route_module(file) {
            debug!(file, "skipping non-route file");
            continue;
        }
        let route = get_route_info(file)?;
        trace!(id = %route.id, path = ?route.path, index = route.index, "found route module");
        map.insert(route);
    }

    // 2) 全ルートが揃ってから親 ID を一度だけ設定する
    let parents: Vec<(String, Option<String>)> = map
        .routes
        .values()
        .map(|route| (route.id.clone(), find_parent_route_id(&route.name, &map.names)))
        .collect();
    for (id, parent_id) in parents {
        if let Some(route) = map.routes.get_mut(&id) {
            route.parent_id = parent_id;
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlatRoutesConfig;

    fn matcher() -> RouteModuleMatcher {
        RouteModuleMatcher::new(&FlatRoutesConfig::default()).unwrap()
    }

    #[test]
    fn ancestors_are_yielded_longest_first() {
        let ancestors: Vec<&str> = NameAncestors::new("a/b/c/d").collect();
        assert_eq!(ancestors, vec!["a/b/c", "a/b", "a"]);
        assert_eq!(NameAncestors::new("a").next(), None);
        assert_eq!(NameAncestors::new("").next(), None);
    }

    #[test]
    fn picks_the_longest_registered_prefix() {
        let names: BTreeMap<String, String> = [("a", "A"), ("a/b", "AB"), ("a/b/c", "ABC")]
            .into_iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect();
        assert_eq!(find_parent_route_id("a/b/c/d", &names).as_deref(), Some("ABC"));
        assert_eq!(find_parent_route_id("a/x/y", &names).as_deref(), Some("A"));
        assert_eq!(find_parent_route_id("z/y", &names), None);
        // 自分自身は親にならない
        assert_eq!(find_parent_route_id("a", &names), None);
    }

    #[test]
    fn resolves_parents_for_every_route() {
        let map = build_route_map(
            [
                "root.tsx",
                "users.tsx",
                "users._index.tsx",
                "users.$id.tsx",
                "users.$id.edit.tsx",
                "_auth.tsx",
                "_auth.login.tsx",
                "styles.css",
                "users/helpers.ts",
            ],
            &matcher(),
        )
        .unwrap();

        assert_eq!(map.len(), 7);
        let parent = |id: &str| map.get(id).unwrap().parent_id.clone();
        assert_eq!(parent("users"), None);
        assert_eq!(parent("users._index").as_deref(), Some("users"));
        assert_eq!(parent("users.$id").as_deref(), Some("users"));
        assert_eq!(parent("users.$id.edit").as_deref(), Some("users.$id"));
        assert_eq!(parent("_auth.login").as_deref(), Some("_auth"));
        assert!(map.get("styles").is_none());

        let top: Vec<&str> = map.children_of(None).map(|r| r.id.as_str()).collect();
        assert_eq!(top, vec!["_auth", "root", "users"]);
        assert_eq!(map.get_by_name("users/:id").map(|r| r.id.as_str()), Some("users.$id"));
    }

    #[test]
    fn skips_missing_intermediate_routes() {
        let map = build_route_map(["a.tsx", "a.b.c.d.tsx"], &matcher()).unwrap();
        assert_eq!(map.get("a.b.c.d").unwrap().parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn folder_routes_share_names_with_flat_files() {
        let map = build_route_map(["users/route.tsx", "users+/$id.tsx"], &matcher()).unwrap();
        assert_eq!(map.get("users+/$id").unwrap().parent_id.as_deref(), Some("users/route"));
    }

    #[test]
    fn propagates_segment_errors() {
        let err = build_route_map(["users.[*].tsx"], &matcher()).unwrap_err();
        assert!(matches!(err, RouteError::SegmentSyntax { character: '*', .. }));
    }
}
