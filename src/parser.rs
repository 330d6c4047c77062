// src/parser.rs
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::error::RouteError;
use crate::model::RouteInfo;

const ESCAPE_START: char = '[';
const ESCAPE_END: char = ']';
const OPTIONAL_START: char = '(';
const OPTIONAL_END: char = ')';
const PARAM_PREFIX: char = '$';

/// フォルダでフラットファイルをまとめるためのマーカー (`users+/$id.tsx` ≡ `users.$id.tsx`)
const FOLDER_GROUP_MARKER: &str = "+/";

/// 生のセグメントに含まれてはいけない文字
const RESERVED_CHARS: [char; 3] = ['*', ':', '/'];

/// ネストした ID で、区切り文字の直後に `index` / `_index` が来るものを index ルートとして判定する
static INDEX_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\.|/|\+/)_?index(?:/route)?$").expect("index route pattern is valid")
});

/// セグメント分割ステートマシンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// 通常。区切り文字でセグメントを確定する
    Normal,
    /// `[` ... `]` の中。文字をそのまま取り込む
    Escape,
    /// `(` ... `)` の中。閉じると末尾に `?` が付く
    Optional,
    /// オプショナル内の `[` ... `]`
    OptionalEscape,
}

fn is_segment_separator(c: char) -> bool {
    c == '/' || c == '.' || c == std::path::MAIN_SEPARATOR
}

/// 処理中のセグメント (正規化後と生の両方) と確定済みのセグメント列
struct SegmentBuffer<'a> {
    route_id: &'a str,
    segments: Vec<String>,
    segment: String,
    raw: String,
}

impl<'a> SegmentBuffer<'a> {
    fn new(route_id: &'a str) -> Self {
        SegmentBuffer {
            route_id,
            segments: Vec::new(),
            segment: String::new(),
            raw: String::new(),
        }
    }

    fn push(&mut self, c: char) {
        self.segment.push(c);
        self.raw.push(c);
    }

    /// 正規化後のセグメントには現れない記号 (`[`, `(` など)
    fn push_raw(&mut self, c: char) {
        self.raw.push(c);
    }

    /// セグメント先頭の `$` を `:` (パラメータ) か `*` (キャッチオール) に書き換える
    fn push_param_prefix(&mut self, is_last_char: bool) {
        self.segment.push(if is_last_char { '*' } else { ':' });
        self.raw.push(PARAM_PREFIX);
    }

    fn at_segment_start(&self) -> bool {
        self.segment.is_empty()
    }

    /// 現在のセグメントを確定させる。空のセグメントは捨てる
    fn flush(&mut self) -> Result<(), RouteError> {
        let segment = std::mem::take(&mut self.segment);
        let raw = std::mem::take(&mut self.raw);
        if segment.is_empty() {
            return Ok(());
        }
        if let Some(character) = RESERVED_CHARS.into_iter().find(|c| raw.contains(*c)) {
            return Err(RouteError::SegmentSyntax {
                route_id: self.route_id.to_string(),
                segment: raw,
                character,
            });
        }
        self.segments.push(segment);
        Ok(())
    }
}

impl State {
    /// 1 文字分の遷移。次の状態を返す
    fn step(
        self,
        c: char,
        is_last_char: bool,
        buf: &mut SegmentBuffer<'_>,
    ) -> Result<State, RouteError> {
        let next = match self {
            State::Normal => {
                if is_segment_separator(c) {
                    buf.flush()?;
                    State::Normal
                } else if c == ESCAPE_START {
                    buf.push_raw(c);
                    State::Escape
                } else if c == OPTIONAL_START {
                    buf.push_raw(c);
                    State::Optional
                } else if c == PARAM_PREFIX && buf.at_segment_start() {
                    buf.push_param_prefix(is_last_char);
                    State::Normal
                } else {
                    buf.push(c);
                    State::Normal
                }
            }
            State::Escape => {
                if c == ESCAPE_END {
                    buf.push_raw(c);
                    State::Normal
                } else {
                    buf.push(c);
                    State::Escape
                }
            }
            State::Optional => {
                if c == OPTIONAL_END {
                    buf.segment.push('?');
                    buf.push_raw(c);
                    State::Normal
                } else if c == ESCAPE_START {
                    buf.push_raw(c);
                    State::OptionalEscape
                } else if c == PARAM_PREFIX && buf.at_segment_start() {
                    buf.push_param_prefix(is_last_char);
                    State::Optional
                } else {
                    buf.push(c);
                    State::Optional
                }
            }
            State::OptionalEscape => {
                if c == ESCAPE_END {
                    buf.push_raw(c);
                    State::Optional
                } else {
                    buf.push(c);
                    State::OptionalEscape
                }
            }
        };
        Ok(next)
    }
}

/// フォルダ規約を平坦化する
///
/// - `+/` は `.` と同じ扱い
/// - ネストしたフォルダ末尾の `/route`, `/index` はセグメントに含めない
fn flatten_folder_conventions(route_id: &str) -> Cow<'_, str> {
    let mut id = if route_id.contains(FOLDER_GROUP_MARKER) {
        Cow::Owned(route_id.replace(FOLDER_GROUP_MARKER, "."))
    } else {
        Cow::Borrowed(route_id)
    };
    if id.contains('/') {
        for marker in ["/route", "/index"] {
            if let Some(stripped) = id.strip_suffix(marker) {
                id = Cow::Owned(stripped.to_string());
                break;
            }
        }
    }
    id
}

/// ルート ID をセグメント列に分割する
///
/// 例:
/// - `users.$id` → `["users", ":id"]`
/// - `files.$` → `["files", "*"]`
/// - `($lang).about` → `[":lang?", "about"]`
/// - `sitemap[.]xml` → `["sitemap.xml"]`
pub fn get_route_segments(route_id: &str) -> Result<Vec<String>, RouteError> {
    let flattened = flatten_folder_conventions(route_id);

    let mut buf = SegmentBuffer::new(route_id);
    let mut state = State::Normal;
    let mut chars = flattened.chars().peekable();
    while let Some(c) = chars.next() {
        let is_last_char = chars.peek().is_none();
        state = state.step(c, is_last_char, &mut buf)?;
    }
    // 閉じられていない `[` や `(` は許容し、残りをそのまま確定する
    buf.flush()?;

    Ok(buf.segments)
}

/// セグメント列から URL パステンプレートを作る
///
/// - index ルートなら最後のセグメント (index マーカー) を捨てる
/// - `_` で始まるセグメント (パスを持たないレイアウト) はスキップ
/// - `_` で終わるセグメントは末尾の `_` を取り除く
///
/// 何も残らなければ None (ルート直下)
pub fn create_route_path<S: AsRef<str>>(segments: &[S], index: bool) -> Option<String> {
    let segments = match (index, segments.split_last()) {
        (true, Some((_, rest))) => rest,
        _ => segments,
    };

    let mut result = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.starts_with('_') {
            continue;
        }
        let segment = segment.strip_suffix('_').unwrap_or(segment);
        result.push('/');
        result.push_str(segment);
    }

    if result.is_empty() { None } else { Some(result) }
}

/// index ルートかどうか
///
/// `_index` で終わる ID は index ルート。フォルダを含む ID に限り、`index` / `_index` が
/// 区切り文字 (`.`, `/`, `+/`) の直後に来るものも index ルートとみなす。
/// フラットな `about.index` は通常のセグメント `index` を持つルートになる。
pub fn is_index_route(route_id: &str) -> bool {
    route_id.ends_with("_index") || (route_id.contains('/') && INDEX_ROUTE.is_match(route_id))
}

/// 拡張子 (`.tsx` など) を取り除く
fn strip_file_extension(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => file,
    }
}

/// ルートディレクトリ相対のファイルパスからルート ID を作る
///
/// 区切り文字を `/` に揃え、拡張子を取り除く。フォルダ内の `index` ファイルは
/// フォルダ自身のルートとして扱うため `/index` を畳み込む (`users/index.tsx` → `users`)。
pub fn create_route_id(file: &str) -> String {
    let normalized = file.replace('\\', "/");
    let id = strip_file_extension(&normalized);
    match id.strip_suffix("/index") {
        Some(folder) if !folder.is_empty() && !folder.ends_with('+') => folder.to_string(),
        _ => id.to_string(),
    }
}

/// ルートディレクトリ相対のファイルパスから [`RouteInfo`] を導出する
///
/// `parent_id` はまだ決まらないので None のまま返す。
pub fn get_route_info(file: &str) -> Result<RouteInfo, RouteError> {
    let file = file.replace('\\', "/");
    let id = create_route_id(&file);
    let index = is_index_route(&id);
    let segments = get_route_segments(&id)?;
    let path = create_route_path(&segments, index);

    Ok(RouteInfo {
        name: segments.join("/"),
        id,
        path,
        file,
        segments,
        index,
        parent_id: None,
    })
}
