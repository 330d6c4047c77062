// src/model.rs
use serde::Serialize;

/// ルートディレクトリ内の 1 ファイルから導出したルート情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// ルートディレクトリ相対の ID (例: "users.$id", "admin/route")
    pub id: String,

    /// URL パステンプレート (例: "/users/:id")
    /// パスを持たないレイアウトルートでは None
    pub path: Option<String>,

    /// ルートディレクトリ相対のファイルパス (区切り文字は `/`)
    pub file: String,

    /// 祖先ルートの検索にだけ使う名前 (セグメントを `/` で連結したもの)
    pub name: String,

    /// 正規化済みのセグメント列 (例: ["users", ":id"])
    pub segments: Vec<String>,

    /// 親のパスにそのまま描画される index ルートかどうか
    pub index: bool,

    /// 親ルートの ID。ルートマップ構築後に一度だけ設定される
    pub parent_id: Option<String>,
}

/// マニフェストに出力する 1 ルート分の定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    /// プレフィックス付きのルート ID (例: "routes/users.$id")
    pub id: String,

    /// 親ルートのパスからの相対パス (例: ":id")。空なら None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// アプリケーションルートからの相対ファイルパス (例: "routes/users.$id.tsx")
    pub file: String,

    pub index: bool,

    /// 子ルート (index ルートは常に空)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteDefinition>,
}

/// 最終的なルートツリー
///
/// 親子関係はネストで表現され、親 ID のフィールドは持たない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteManifest {
    pub routes: Vec<RouteDefinition>,
}

impl RouteManifest {
    /// 親 → 子の順 (深さ優先) で全ルートを辿る
    pub fn iter(&self) -> ManifestIter<'_> {
        ManifestIter {
            stack: self.routes.iter().rev().collect(),
        }
    }

    /// プレフィックス付き ID でルートを探す
    pub fn get(&self, id: &str) -> Option<&RouteDefinition> {
        self.iter().find(|route| route.id == id)
    }

    /// 全ルート数 (ネストした子を含む)
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteManifest {
    type Item = &'a RouteDefinition;
    type IntoIter = ManifestIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// [`RouteManifest::iter`] の戻り値
pub struct ManifestIter<'a> {
    stack: Vec<&'a RouteDefinition>,
}

impl<'a> Iterator for ManifestIter<'a> {
    type Item = &'a RouteDefinition;

    fn next(&mut self) -> Option<Self::Item> {
        let route = self.stack.pop()?;
        self.stack.extend(route.children.iter().rev());
        Some(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, path: Option<&str>, index: bool) -> RouteDefinition {
        RouteDefinition {
            id: id.to_string(),
            path: path.map(str::to_string),
            file: format!("{id}.tsx"),
            index,
            children: Vec::new(),
        }
    }

    #[test]
    fn iterates_parents_before_children() {
        let mut users = leaf("routes/users", Some("users"), false);
        users.children.push(leaf("routes/users._index", None, true));
        users.children.push(leaf("routes/users.$id", Some(":id"), false));
        let manifest = RouteManifest {
            routes: vec![users, leaf("routes/about", Some("about"), false)],
        };

        let ids: Vec<&str> = manifest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "routes/users",
                "routes/users._index",
                "routes/users.$id",
                "routes/about"
            ]
        );
        assert_eq!(manifest.len(), 4);
        assert_eq!(
            manifest.get("routes/users.$id").and_then(|r| r.path.as_deref()),
            Some(":id")
        );
        assert!(manifest.get("routes/missing").is_none());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let manifest = RouteManifest {
            routes: vec![leaf("routes/_index", None, true)],
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "id": "routes/_index", "file": "routes/_index.tsx", "index": true }
            ])
        );
    }
}
