// src/main.rs

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use flat_routes::logging::init_logging;
use flat_routes::{FlatRoutesConfig, flat_routes_in_dir};

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "flat-routes",
    version = "0.1.0",
    about = "フラットファイル規約のルートディレクトリを解析し、ルートマニフェストを JSON 出力する CLI ツール"
)]
struct Cli {
    /// アプリケーションのルートディレクトリ
    /// 例: `--app-dir ./app`
    #[arg(short = 'a', long = "app-dir", value_name = "DIR")]
    app_dir: Option<PathBuf>,

    /// TOML 設定ファイル
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// `app-dir` からの相対で表したルートディレクトリ (既定: routes)
    #[arg(long = "routes-dir", value_name = "DIR")]
    routes_dir: Option<PathBuf>,

    /// マニフェストのルート ID に付けるプレフィックス (既定: routes)
    #[arg(long = "prefix", value_name = "PREFIX")]
    prefix: Option<String>,

    /// 除外する glob パターン (複数指定可)
    #[arg(short = 'i', long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// 整形せずに 1 行で出力する
    #[arg(long)]
    compact: bool,
}

impl Cli {
    /// 設定ファイルを読み込み、CLI 引数で上書きする
    fn into_config(self) -> anyhow::Result<(FlatRoutesConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => FlatRoutesConfig::load(path)?,
            None => FlatRoutesConfig::default(),
        };
        if let Some(app_dir) = self.app_dir {
            config.app_dir = app_dir;
        }
        if let Some(routes_dir) = self.routes_dir {
            config.routes_dir = routes_dir;
        }
        if let Some(prefix) = self.prefix {
            config.root_prefix = prefix;
        }
        config.ignored_route_files.extend(self.ignore);
        Ok((config, self.compact))
    }
}

fn main() -> anyhow::Result<()> {
    // 1) CLI 引数をパースし、設定を組み立てる
    let (config, compact) = Cli::parse().into_config()?;
    init_logging(&config.logging)?;

    // 2) ルートディレクトリを走査してマニフェストを構築
    let manifest = flat_routes_in_dir(&config).with_context(|| {
        format!(
            "failed to build route manifest from {:?}",
            config.routes_root()
        )
    })?;

    // 3) 最終的なルートツリーを JSON 化して標準出力
    let json = if compact {
        serde_json::to_string(&manifest)?
    } else {
        serde_json::to_string_pretty(&manifest)?
    };
    println!("{}", json);

    Ok(())
}
