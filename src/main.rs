//! # Expo 品牌资源生成器：命令行入口
//!
//! 本文件仅负责参数解析、日志初始化与文件读写。
//! 业务逻辑全部经由命令层进入 `asset_generator`，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use expo_branding::asset_generator::{
    ARCHIVE_FILE_NAME, AssetConfigOverrides, AssetForm, AssetService, UploadedFile,
    generate_assets,
};
use expo_branding::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "expo-branding", version, about = "Generate Expo branding assets from a square PNG logo")]
struct Cli {
    /// Square PNG logo, at least 1024x1024.
    #[arg(long)]
    logo: PathBuf,

    /// Background color as #RRGGBB.
    #[arg(long)]
    background_color: String,

    /// Also generate splash.png.
    #[arg(long, default_value_t = false)]
    splash: bool,

    /// App name written to app.json.snippet.
    #[arg(long)]
    app_name: Option<String>,

    /// Output ZIP path.
    #[arg(long, default_value = ARCHIVE_FILE_NAME)]
    output: PathBuf,

    /// Performance profile: quality, balanced or speed.
    #[arg(long)]
    profile: Option<String>,

    /// JSON file with configuration overrides.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(path) => {
            log::info!("📦 已写入 {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<PathBuf, AppError> {
    let service = AssetService::new();

    if let Some(path) = cli.config.as_deref() {
        let overrides = AssetConfigOverrides::load_from_path(path)?;
        service.apply_overrides(&overrides)?;
    }
    if let Some(profile) = cli.profile.as_deref() {
        service.set_performance_profile(profile)?;
    }

    let logo = std::fs::read(&cli.logo)?;
    let form = AssetForm {
        file: Some(UploadedFile::sniff(logo)),
        background_color: Some(cli.background_color),
        include_splash: cli.splash.then(|| "true".to_string()),
        app_name: cli.app_name,
    };

    let response = generate_assets(&service, form).await?;
    std::fs::write(&cli.output, &response.body)?;

    Ok(cli.output)
}
