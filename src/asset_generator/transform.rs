//! # 图像变换模块
//!
//! ## 设计思路
//!
//! 所有输出都由少量纯函数组合而成，输入只读、输出独占，彼此之间没有共享可变状态，
//! 因此可以任意顺序或并发执行。
//!
//! ## 实现思路
//!
//! - `resize_contain`：等比缩放到目标框内，剩余区域透明填充，不裁剪、不拉伸。
//!   其他所有变换都复用它。
//! - `pad_and_center`：按百分比留白后居中放置（自适应图标前景）。
//! - `solid_fill`：纯色无 alpha 画布（自适应图标背景）。
//! - `monochrome_alpha`：灰度 → 对比度拉伸 → 与白色层做 screen 混合，alpha 保留自缩放结果。
//!   白色层下 RGB 恒为 255，形状只由 alpha 表达。
//! - `centered_composite`：纯色画布中央按 source-over 叠加 logo（启动屏）。
//! - `encode_png`：统一 PNG 编码出口。
//!
//! 源图在解码时已统一为 RGBA8，各变换只借用，不再复制整幅源图。
//! 缩放优先走 `fast_image_resize`（借用源缓冲），失败时回退 `image::imageops::resize`。

use fast_image_resize as fr;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel, Rgba, RgbImage, RgbaImage};

use super::{AssetError, Color};

/// 单色图中与灰度做 screen 混合的图层亮度。
pub const MONOCHROME_SCREEN_LAYER: u8 = 255;
/// 单色图对比度拉伸的低位百分位。
pub const NORMALIZE_LOWER_PERCENTILE: u8 = 1;
/// 单色图对比度拉伸的高位百分位。
pub const NORMALIZE_UPPER_PERCENTILE: u8 = 99;

/// 计算等比缩放进目标框后的尺寸。
///
/// 缩放比例取宽、高两个方向的较小值，结果四舍五入并限制在 `1..=目标边长` 内。
pub fn contain_dimensions(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    let scale = (target_width as f64 / width as f64).min(target_height as f64 / height as f64);

    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, target_width);
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, target_height);

    (fitted_width, fitted_height)
}

/// 等比缩放到 `target_width x target_height` 内并居中，空白处为全透明像素。
pub fn resize_contain(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, AssetError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || target_width == 0 || target_height == 0 {
        return Err(AssetError::Processing(format!(
            "无效缩放尺寸：{}x{} -> {}x{}",
            width, height, target_width, target_height
        )));
    }

    let (fitted_width, fitted_height) =
        contain_dimensions(width, height, target_width, target_height);

    let fitted = if (fitted_width, fitted_height) == (width, height) {
        image.clone()
    } else {
        resize_rgba(image, fitted_width, fitted_height, filter)?
    };

    if (fitted_width, fitted_height) == (target_width, target_height) {
        return Ok(fitted);
    }

    let mut canvas = RgbaImage::new(target_width, target_height);
    let left = (target_width - fitted_width) / 2;
    let top = (target_height - fitted_height) / 2;
    imageops::replace(&mut canvas, &fitted, left as i64, top as i64);

    Ok(canvas)
}

/// 四周按 `padding_percent` 留白，内容区等比缩放后放到全透明画布上。
pub fn pad_and_center(
    image: &RgbaImage,
    size: u32,
    padding_percent: u32,
    filter: FilterType,
) -> Result<RgbaImage, AssetError> {
    let padding = padding_pixels(size, padding_percent);
    let content = size.saturating_sub(padding * 2);
    if content == 0 {
        return Err(AssetError::Processing(format!(
            "留白过大：size={} padding={}",
            size, padding
        )));
    }

    let resized = resize_contain(image, content, content, filter)?;

    let mut canvas = RgbaImage::new(size, size);
    imageops::replace(&mut canvas, &resized, padding as i64, padding as i64);

    Ok(canvas)
}

/// 单边留白像素数：`round(size * percent / 100)`。
pub fn padding_pixels(size: u32, padding_percent: u32) -> u32 {
    (size as f64 * padding_percent as f64 / 100.0).round() as u32
}

/// 纯色不透明画布。
pub fn solid_fill(width: u32, height: u32, color: Color) -> RgbImage {
    ImageBuffer::from_pixel(width, height, color.to_rgb())
}

/// 生成单色图：灰度化、按百分位拉伸对比度，再与白色层做 screen 混合。
///
/// 与 255 做 screen 混合时结果恒为 255，因此输出 RGB 全白，拉伸结果不影响像素；
/// 形状完全由缩放后的 alpha 表达。
pub fn monochrome_alpha(
    image: &RgbaImage,
    size: u32,
    filter: FilterType,
) -> Result<RgbaImage, AssetError> {
    let mut icon = resize_contain(image, size, size, filter)?;

    let (low, high) =
        luminance_bounds(&icon, NORMALIZE_LOWER_PERCENTILE, NORMALIZE_UPPER_PERCENTILE);

    for pixel in icon.pixels_mut() {
        let alpha = pixel[3];
        let luma = pixel.to_luma()[0];
        let stretched = stretch(luma, low, high);
        let value = screen(stretched, MONOCHROME_SCREEN_LAYER);
        *pixel = Rgba([value, value, value, alpha]);
    }

    Ok(icon)
}

/// 可见像素（alpha > 0）亮度直方图的百分位上下界。
///
/// 没有可见像素或分布退化时返回 `(0, 255)`，即不拉伸。
fn luminance_bounds(image: &RgbaImage, lower_percentile: u8, upper_percentile: u8) -> (u8, u8) {
    let mut histogram = [0u64; 256];
    let mut visible = 0u64;

    for pixel in image.pixels().filter(|p| p[3] > 0) {
        histogram[pixel.to_luma()[0] as usize] += 1;
        visible += 1;
    }

    if visible == 0 {
        return (0, 255);
    }

    let percentile_value = |percentile: u8| -> u8 {
        let threshold = (visible * percentile.min(100) as u64).div_ceil(100).max(1);
        let mut cumulative = 0u64;
        for (value, count) in histogram.iter().enumerate() {
            cumulative += count;
            if cumulative >= threshold {
                return value as u8;
            }
        }
        255
    };

    let low = percentile_value(lower_percentile);
    let high = percentile_value(upper_percentile);

    if high <= low { (0, 255) } else { (low, high) }
}

/// 将 `[low, high]` 线性拉伸到 `[0, 255]`，区间外截断。
fn stretch(value: u8, low: u8, high: u8) -> u8 {
    if high <= low {
        return value;
    }
    let clamped = value.clamp(low, high) as u32 - low as u32;
    ((clamped * 255 + (high - low) as u32 / 2) / (high - low) as u32) as u8
}

/// screen 混合：`1 - (1 - base) * (1 - layer)`，在 `[0, 255]` 整数域计算。
pub fn screen(base: u8, layer: u8) -> u8 {
    let inverse = (255 - base as u32) * (255 - layer as u32);
    (255 - (inverse + 127) / 255) as u8
}

/// 纯色画布中央叠加 logo。
///
/// logo 框为画布宽高各乘 `logo_ratio` 后取整，框内等比缩放；偏移量四舍五入。
pub fn centered_composite(
    image: &RgbaImage,
    canvas_width: u32,
    canvas_height: u32,
    background: Color,
    logo_ratio: f64,
    filter: FilterType,
) -> Result<RgbImage, AssetError> {
    let (logo_width, logo_height) = logo_box(canvas_width, canvas_height, logo_ratio);
    let logo = resize_contain(image, logo_width, logo_height, filter)?;

    let left = ((canvas_width - logo_width) as f64 / 2.0).round() as i64;
    let top = ((canvas_height - logo_height) as f64 / 2.0).round() as i64;

    let mut canvas = solid_fill(canvas_width, canvas_height, background);
    composite_over_opaque(&mut canvas, &logo, left, top);

    Ok(canvas)
}

/// source-over 合成到不透明画布上，超出画布的部分丢弃。
///
/// 整数运算，alpha 为 0 / 255 时结果分别精确等于背景 / 前景。
fn composite_over_opaque(canvas: &mut RgbImage, layer: &RgbaImage, left: i64, top: i64) {
    let (canvas_width, canvas_height) = canvas.dimensions();

    for (x, y, pixel) in layer.enumerate_pixels() {
        let cx = left + x as i64;
        let cy = top + y as i64;
        if cx < 0 || cy < 0 || cx >= canvas_width as i64 || cy >= canvas_height as i64 {
            continue;
        }

        let alpha = pixel[3] as u32;
        if alpha == 0 {
            continue;
        }

        let target = canvas.get_pixel_mut(cx as u32, cy as u32);
        for channel in 0..3 {
            let fg = pixel[channel] as u32;
            let bg = target[channel] as u32;
            target[channel] = ((fg * alpha + bg * (255 - alpha) + 127) / 255) as u8;
        }
    }
}

/// 启动屏 logo 框尺寸。
pub fn logo_box(canvas_width: u32, canvas_height: u32, logo_ratio: f64) -> (u32, u32) {
    let width = ((canvas_width as f64 * logo_ratio).round() as u32).clamp(1, canvas_width);
    let height = ((canvas_height as f64 * logo_ratio).round() as u32).clamp(1, canvas_height);
    (width, height)
}

/// PNG 编码。
pub fn encode_png(image: &DynamicImage, compression: CompressionType) -> Result<Vec<u8>, AssetError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buffer, compression, PngFilterType::Adaptive);

    image
        .write_with_encoder(encoder)
        .map_err(|e| AssetError::Processing(format!("PNG 编码失败：{}", e)))?;

    Ok(buffer)
}

fn resize_rgba(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, AssetError> {
    match resize_with_fast_image_resize(source, target_width, target_height, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!(
                "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                err
            );
            Ok(imageops::resize(source, target_width, target_height, filter))
        }
    }
}

fn resize_with_fast_image_resize(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, AssetError> {
    let (src_width, src_height) = source.dimensions();

    let src_image =
        fr::images::ImageRef::new(src_width, src_height, source.as_raw(), fr::PixelType::U8x4)
            .map_err(|e| AssetError::Processing(format!("构建源图像视图失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    // 全不透明时跳过 alpha 预乘，避免额外的整幅临时缓冲
    let has_transparency = source.pixels().any(|p| p[3] < u8::MAX);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)))
        .use_alpha(has_transparency);

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| AssetError::Processing(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| AssetError::Processing("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
