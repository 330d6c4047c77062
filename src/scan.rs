// src/scan.rs
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::DiscoveryError;

/// ルートディレクトリを絶対パス化する
pub fn absolute_routes_root(routes_root: &Path) -> Result<PathBuf, DiscoveryError> {
    routes_root
        .absolutize()
        .map(|abs| abs.to_path_buf())
        .map_err(|source| DiscoveryError::Io {
            path: routes_root.to_path_buf(),
            source,
        })
}

/// ファイルパスをルートディレクトリ相対の `/` 区切り文字列にする
///
/// - 絶対パスはルートディレクトリ配下であればその相対部分、配下でなければ None
/// - 相対パスは既にルートディレクトリ相対とみなす
/// - UTF-8 でないパスは None
pub fn relative_route_file(path: &Path, routes_root: &Path) -> Option<String> {
    let relative = if path.is_absolute() {
        path.strip_prefix(routes_root).ok()?
    } else {
        path
    };
    let relative = relative.to_str()?.replace('\\', "/");
    if relative.is_empty() { None } else { Some(relative) }
}

/// ルートディレクトリ配下の全ファイルを列挙する
///
/// 戻り値はルートディレクトリ相対のパスで、名前順に並ぶ。
/// ルートモジュールかどうかの判定はここでは行わない。
pub fn discover_route_files(routes_root: &Path) -> Result<Vec<String>, DiscoveryError> {
    // 1) ルートディレクトリを絶対化して存在を確認
    let root = absolute_routes_root(routes_root)?;
    if !root.is_dir() {
        return Err(DiscoveryError::MissingRoutesDir(root));
    }

    // 2) WalkDir で全ファイルを再帰的に探索
    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        match relative_route_file(entry.path(), &root) {
            Some(file) => files.push(file),
            None => warn!(path = ?entry.path(), "skipping file with a non UTF-8 path"),
        }
    }

    // 3) 走査順に依存しないよう並べ替える
    files.sort();
    debug!(count = files.len(), root = ?root, "discovered files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn relativizes_absolute_paths() {
        let root = absolute_routes_root(Path::new("app/routes")).unwrap();
        assert_eq!(
            relative_route_file(&root.join("users").join("route.tsx"), &root).as_deref(),
            Some("users/route.tsx")
        );
        assert_eq!(
            relative_route_file(Path::new("users.$id.tsx"), &root).as_deref(),
            Some("users.$id.tsx")
        );
        let outside = absolute_routes_root(Path::new("elsewhere/file.tsx")).unwrap();
        assert_eq!(relative_route_file(&outside, &root), None);
    }

    #[test]
    fn lists_files_relative_to_the_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("users+")).unwrap();
        fs::write(dir.path().join("_index.tsx"), "").unwrap();
        fs::write(dir.path().join("users+").join("$id.tsx"), "").unwrap();
        fs::write(dir.path().join("styles.css"), "").unwrap();

        let files = discover_route_files(dir.path()).unwrap();
        assert_eq!(files, vec!["_index.tsx", "styles.css", "users+/$id.tsx"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_route_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingRoutesDir(_)));
    }
}
