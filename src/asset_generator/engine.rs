//! # 变换引擎
//!
//! ## 设计思路
//!
//! `AssetEngine` 只负责“源图 → 六个 PNG”的编排，不关心上传、校验与打包。
//! 每个输出由 `render_asset` 独立生成，输入只读共享，因此顺序执行与并发执行结果一致。
//!
//! ## 实现思路
//!
//! - `generate`：从原始字节解码后顺序生成（最简单、最易测试的路径）。
//! - `generate_from_source`：复用校验阶段已解码的源图，避免二次解码。
//! - `generate_concurrently`：每个输出一个 `spawn_blocking` 任务，源图以 `Arc` 共享。
//! - 任一输出失败即整体失败，不返回残缺结果。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use image::{DynamicImage, RgbaImage};
use tokio::task::JoinHandle;

use super::bundle::{AssetKind, OutputBundle};
use super::source::SourceImage;
use super::transform::{
    centered_composite, encode_png, monochrome_alpha, pad_and_center, resize_contain, solid_fill,
};
use super::validator::decode_source;
use super::{AssetConfig, AssetError, Color};

/// 自适应图标前景四周留白比例（百分比）。
pub const ADAPTIVE_ICON_PADDING_PERCENT: u32 = 20;
/// 启动屏 logo 框占画布宽高的比例。
pub const SPLASH_LOGO_RATIO: f64 = 0.4;

/// 资源变换引擎。
#[derive(Debug, Clone, Default)]
pub struct AssetEngine {
    config: AssetConfig,
}

/// 取消标志：析构时置位，尚未完成的变换在下一个阶段检查点退出。
///
/// 请求失败、超时（外层 future 被丢弃）时都会触发。
#[derive(Debug, Default)]
pub(crate) struct CancelOnDrop {
    flag: Arc<AtomicBool>,
}

impl CancelOnDrop {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl AssetEngine {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    /// 从原始字节生成全部资源。
    ///
    /// 调用前应已通过 `validate_upload`；此处的解码失败按内部错误处理，
    /// 超出解码上限仍按资源限制返回。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use expo_branding::asset_generator::{AssetEngine, Color};
    ///
    /// let logo = std::fs::read("logo.png").expect("logo");
    /// let bundle = AssetEngine::default().generate(&logo, Color::parse_hex("#FF3B30")?, true)?;
    /// assert!(!bundle.splash.is_empty());
    /// # Ok::<(), expo_branding::asset_generator::AssetError>(())
    /// ```
    pub fn generate(
        &self,
        source: &[u8],
        background: Color,
        include_splash: bool,
    ) -> Result<OutputBundle, AssetError> {
        let source = decode_source(source, &self.config).map_err(|e| match e {
            AssetError::ResourceLimit(_) => e,
            other => AssetError::Processing(format!("源图解码失败：{}", other)),
        })?;
        self.generate_from_source(&source, background, include_splash)
    }

    /// 使用已解码源图顺序生成全部资源。
    pub fn generate_from_source(
        &self,
        source: &SourceImage,
        background: Color,
        include_splash: bool,
    ) -> Result<OutputBundle, AssetError> {
        self.generate_sequential(source, background, include_splash, &AtomicBool::new(false))
    }

    /// 顺序生成，每个输出开始前与编码前检查取消标志。
    pub(crate) fn generate_sequential(
        &self,
        source: &SourceImage,
        background: Color,
        include_splash: bool,
        cancelled: &AtomicBool,
    ) -> Result<OutputBundle, AssetError> {
        let mut bundle = OutputBundle::default();

        for kind in planned_assets(include_splash) {
            let bytes = render_checked(kind, source.pixels(), background, &self.config, cancelled)?;
            bundle.set(kind, bytes);
        }

        Ok(bundle)
    }

    /// 在 tokio 阻塞线程池上并发生成全部资源。
    ///
    /// 任一输出失败或本 future 被丢弃时，其余任务在下一个检查点退出。
    pub async fn generate_concurrently(
        &self,
        source: Arc<SourceImage>,
        background: Color,
        include_splash: bool,
    ) -> Result<OutputBundle, AssetError> {
        let cancel = CancelOnDrop::new();

        let handles: Vec<(AssetKind, JoinHandle<Result<Vec<u8>, AssetError>>)> =
            planned_assets(include_splash)
                .map(|kind| {
                    let source = Arc::clone(&source);
                    let config = self.config.clone();
                    let cancelled = cancel.token();
                    let handle = tokio::task::spawn_blocking(move || {
                        render_checked(kind, source.pixels(), background, &config, &cancelled)
                    });
                    (kind, handle)
                })
                .collect();

        let mut bundle = OutputBundle::default();
        for (kind, handle) in handles {
            let bytes = handle
                .await
                .map_err(|e| AssetError::Internal(format!("{} 变换任务异常：{}", kind, e)))??;
            bundle.set(kind, bytes);
        }

        Ok(bundle)
    }
}

/// 本次需要生成的输出；未请求启动屏时跳过 `Splash`，对应字段保持为空。
fn planned_assets(include_splash: bool) -> impl Iterator<Item = AssetKind> {
    AssetKind::ALL
        .into_iter()
        .filter(move |kind| include_splash || *kind != AssetKind::Splash)
}

fn ensure_active(kind: AssetKind, cancelled: &AtomicBool) -> Result<(), AssetError> {
    if cancelled.load(Ordering::SeqCst) {
        return Err(AssetError::Cancelled(format!("{} 生成已取消", kind)));
    }
    Ok(())
}

fn render_checked(
    kind: AssetKind,
    source: &RgbaImage,
    background: Color,
    config: &AssetConfig,
    cancelled: &AtomicBool,
) -> Result<Vec<u8>, AssetError> {
    ensure_active(kind, cancelled)?;
    let start = Instant::now();
    let image = render_image(kind, source, background, config)?;

    ensure_active(kind, cancelled)?;
    let bytes = encode_png(&image, config.png_compression)?;
    log_rendered(kind, bytes.len(), start);

    Ok(bytes)
}

/// 生成单个输出并编码为 PNG。
pub fn render_asset(
    kind: AssetKind,
    source: &RgbaImage,
    background: Color,
    config: &AssetConfig,
) -> Result<Vec<u8>, AssetError> {
    let start = Instant::now();
    let image = render_image(kind, source, background, config)?;
    let bytes = encode_png(&image, config.png_compression)?;
    log_rendered(kind, bytes.len(), start);

    Ok(bytes)
}

fn render_image(
    kind: AssetKind,
    source: &RgbaImage,
    background: Color,
    config: &AssetConfig,
) -> Result<DynamicImage, AssetError> {
    let (width, height) = kind.dimensions();
    let filter = config.resize_filter;

    let image = match kind {
        AssetKind::Icon | AssetKind::Favicon => {
            DynamicImage::ImageRgba8(resize_contain(source, width, height, filter)?)
        }
        AssetKind::AdaptiveIconForeground => DynamicImage::ImageRgba8(pad_and_center(
            source,
            width,
            ADAPTIVE_ICON_PADDING_PERCENT,
            filter,
        )?),
        AssetKind::AdaptiveIconBackground => {
            DynamicImage::ImageRgb8(solid_fill(width, height, background))
        }
        AssetKind::AndroidIconMonochrome => {
            DynamicImage::ImageRgba8(monochrome_alpha(source, width, filter)?)
        }
        AssetKind::Splash => DynamicImage::ImageRgb8(centered_composite(
            source,
            width,
            height,
            background,
            SPLASH_LOGO_RATIO,
            filter,
        )?),
    };

    Ok(image)
}

fn log_rendered(kind: AssetKind, len: usize, start: Instant) {
    let (width, height) = kind.dimensions();
    log::debug!(
        "🖼️ 已生成 {} - {}x{} {}KB {}ms",
        kind,
        width,
        height,
        len / 1024,
        start.elapsed().as_millis()
    );
}
