//! # 输入校验模块
//!
//! ## 设计思路
//!
//! 在进入生成流水线之前，按固定顺序对上传文件与背景色做“尽早失败”的校验，
//! 保证变换引擎只会收到尺寸足够、方形、可解码的 PNG。
//!
//! ## 实现思路
//!
//! 1. 文件是否存在
//! 2. 背景色格式（`#RRGGBB`）
//! 3. 声明类型必须为 `image/png`
//! 4. 体积非空且不超过上限（超限单独归类为 413）
//! 5. 先读 header 尺寸，按像素数与解码内存上限快速拒绝（413）
//! 6. 带 `image::Limits` 完整解码；超出分配上限归为资源限制，其余失败视为文件损坏
//! 7. 方形校验、最小边长校验
//!
//! 通过校验后直接返回解码结果，供引擎复用，避免二次解码。

use std::io::Cursor;

use image::{ImageError, ImageFormat, ImageReader, Limits};

use super::color::is_hex_color;
use super::source::{SourceImage, UploadedFile};
use super::{AssetConfig, AssetError};

/// 唯一接受的声明类型。
pub const PNG_MIME_TYPE: &str = "image/png";

/// 按固定顺序校验上传内容，成功时返回已解码的源图。
pub fn validate_upload(
    file: Option<&UploadedFile>,
    background_color: Option<&str>,
    config: &AssetConfig,
) -> Result<SourceImage, AssetError> {
    let file = file.ok_or(AssetError::MissingFile)?;

    match background_color {
        Some(color) if is_hex_color(color) => {}
        other => {
            return Err(AssetError::InvalidColor(other.unwrap_or_default().to_string()));
        }
    }

    if file.content_type != PNG_MIME_TYPE {
        return Err(AssetError::UnsupportedType(file.content_type.clone()));
    }

    check_file_size(file.size, config)?;

    let source = decode_source(&file.bytes, config)?;
    check_dimensions(source.width(), source.height(), config)?;

    log::debug!(
        "🔍 上传校验通过 - {}x{} alpha={} size={}B",
        source.width(),
        source.height(),
        source.has_alpha(),
        file.size
    );

    Ok(source)
}

/// 校验声明体积：不能为空，不能超过上限。
pub fn check_file_size(size: u64, config: &AssetConfig) -> Result<(), AssetError> {
    if size == 0 {
        return Err(AssetError::EmptyFile);
    }

    if size > config.max_file_size {
        return Err(AssetError::FileTooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    Ok(())
}

/// 校验方形与最小边长。
pub fn check_dimensions(width: u32, height: u32, config: &AssetConfig) -> Result<(), AssetError> {
    if width != height {
        return Err(AssetError::NotSquare { width, height });
    }

    if width < config.min_dimension || height < config.min_dimension {
        return Err(AssetError::TooSmall {
            width,
            height,
            min: config.min_dimension,
        });
    }

    Ok(())
}

/// 以 PNG 解码源图。
///
/// 先通过 header 读取尺寸，header 都读不出来的文件直接判为损坏；
/// 尺寸超出解码上限时不做完整解码。
pub(crate) fn decode_source(bytes: &[u8], config: &AssetConfig) -> Result<SourceImage, AssetError> {
    let (header_width, header_height) = inspect_dimensions_from_memory(bytes)?;
    if header_width == 0 || header_height == 0 {
        return Err(AssetError::UnknownDimensions);
    }

    validate_pixel_limits(header_width, header_height, config)?;
    validate_decoded_memory_limits(header_width, header_height, config)?;

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(ImageFormat::Png);
    let mut limits = Limits::default();
    limits.max_alloc = Some(config.max_decoded_bytes);
    reader.limits(limits);

    let decoded = reader.decode().map_err(|e| match e {
        ImageError::Limits(limit) => AssetError::ResourceLimit(format!(
            "{}x{}px exceeds the decoder allocation limit ({})",
            header_width, header_height, limit
        )),
        other => AssetError::CorruptedImage(format!("PNG 解码失败：{}", other)),
    })?;

    Ok(SourceImage::new(decoded))
}

/// 校验像素数量是否超过配置上限。
fn validate_pixel_limits(width: u32, height: u32, config: &AssetConfig) -> Result<(), AssetError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| AssetError::ResourceLimit(format!("{}x{}px pixel count overflows", width, height)))?;

    if pixels > config.max_decoded_pixels {
        return Err(AssetError::ResourceLimit(format!(
            "{}x{}px has {} pixels (limit: {} pixels)",
            width, height, pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

/// 按 RGBA8 估算解码内存并与上限比较。
fn validate_decoded_memory_limits(
    width: u32,
    height: u32,
    config: &AssetConfig,
) -> Result<(), AssetError> {
    let estimated = (width as u64)
        .checked_mul(height as u64)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| AssetError::ResourceLimit(format!("{}x{}px memory estimate overflows", width, height)))?;

    if estimated > config.max_decoded_bytes {
        return Err(AssetError::ResourceLimit(format!(
            "{}x{}px needs {:.2}MB when decoded (limit: {:.2}MB)",
            width,
            height,
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

/// 仅通过内存中的图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), AssetError> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(ImageFormat::Png);

    reader
        .into_dimensions()
        .map_err(|e| AssetError::CorruptedImage(format!("无法读取图片尺寸：{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
    use image::{DynamicImage, ExtendedColorType, GrayImage, ImageBuffer, ImageEncoder, Luma, Rgba};
    use proptest::prelude::*;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn grey_png_bytes(side: u32) -> Vec<u8> {
        let img = GrayImage::from_pixel(side, side, Luma([128]));

        let mut buffer = Vec::new();
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Fast, PngFilterType::NoFilter)
            .write_image(img.as_raw(), side, side, ExtendedColorType::L8)
            .expect("failed to encode grey image");
        buffer
    }

    fn png_file(width: u32, height: u32) -> UploadedFile {
        UploadedFile::new(PNG_MIME_TYPE, create_png_bytes(width, height))
    }

    #[test]
    fn missing_file_is_checked_first() {
        let result = validate_upload(None, None, &AssetConfig::default());

        assert!(matches!(result, Err(AssetError::MissingFile)));
    }

    #[test]
    fn color_is_checked_before_file_contents() {
        let file = UploadedFile::new("image/jpeg", Vec::new());
        let config = AssetConfig::default();

        assert!(matches!(
            validate_upload(Some(&file), Some("#12345"), &config),
            Err(AssetError::InvalidColor(_))
        ));
        assert!(matches!(
            validate_upload(Some(&file), None, &config),
            Err(AssetError::InvalidColor(_))
        ));
    }

    #[test]
    fn rejects_non_png_declared_type() {
        let mut file = png_file(8, 8);
        file.content_type = "image/jpeg".to_string();

        let result = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default());

        assert!(matches!(result, Err(AssetError::UnsupportedType(t)) if t == "image/jpeg"));
    }

    #[test]
    fn rejects_empty_file() {
        let file = UploadedFile::new(PNG_MIME_TYPE, Vec::new());

        let result = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default());

        assert!(matches!(result, Err(AssetError::EmptyFile)));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let config = AssetConfig::default();

        assert!(check_file_size(5 * 1024 * 1024, &config).is_ok());

        let err = check_file_size(5 * 1024 * 1024 + 1, &config).expect_err("one byte over");
        assert_eq!(err.status(), 413);
    }

    #[test]
    fn oversized_declared_size_short_circuits_before_decode() {
        let file = UploadedFile {
            content_type: PNG_MIME_TYPE.to_string(),
            size: 6 * 1024 * 1024,
            bytes: bytes::Bytes::from_static(b"not even a png"),
        };

        let result = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default());

        assert!(matches!(result, Err(AssetError::FileTooLarge { size, .. }) if size == 6 * 1024 * 1024));
    }

    #[test]
    fn rejects_corrupted_png() {
        let mut bytes = create_png_bytes(64, 64);
        let len = bytes.len();
        bytes.truncate(len / 2);
        let file = UploadedFile::new(PNG_MIME_TYPE, bytes);

        let result = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default());

        assert!(matches!(result, Err(AssetError::CorruptedImage(_))));
    }

    #[test]
    fn rejects_garbage_bytes_as_corrupted() {
        let file = UploadedFile::new(PNG_MIME_TYPE, b"hello world".to_vec());

        let result = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default());

        assert!(matches!(result, Err(AssetError::CorruptedImage(_))));
    }

    #[test]
    fn rejects_non_square_with_actual_dimensions() {
        let file = png_file(1023, 1024);

        let err = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default())
            .expect_err("non-square input must be rejected");

        assert!(matches!(err, AssetError::NotSquare { width: 1023, height: 1024 }));
        assert!(err.to_string().contains("1023x1024"));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn rejects_too_small_square() {
        let file = png_file(512, 512);

        let err = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default())
            .expect_err("small input must be rejected");

        assert!(err.to_string().contains("512x512"));
    }

    #[test]
    fn accepts_large_square_png() {
        let file = png_file(1025, 1025);

        let source = validate_upload(Some(&file), Some("#ff3b30"), &AssetConfig::default())
            .expect("1025x1025 should be accepted");

        assert_eq!(source.dimensions(), (1025, 1025));
        assert!(source.has_alpha());
    }

    #[test]
    fn min_dimension_follows_config() {
        let mut config = AssetConfig::default();
        config.min_dimension = 16;

        assert!(validate_upload(Some(&png_file(16, 16)), Some("#000000"), &config).is_ok());
    }

    #[test]
    fn huge_compressed_png_is_rejected_as_resource_limit() {
        let bytes = grey_png_bytes(12_000);
        assert!(bytes.len() as u64 <= 5 * 1024 * 1024, "fixture is {} bytes", bytes.len());
        let file = UploadedFile::new(PNG_MIME_TYPE, bytes);

        let err = validate_upload(Some(&file), Some("#FFFFFF"), &AssetConfig::default())
            .expect_err("144M pixels must not be decoded");

        assert!(matches!(err, AssetError::ResourceLimit(_)), "{err:?}");
        assert_eq!(err.code(), "resource_limit");
        assert_eq!(err.status(), 413);
        assert!(err.to_string().contains("12000x12000px"), "{err}");
    }

    #[test]
    fn pixel_limit_follows_config() {
        let mut config = AssetConfig::default();
        config.min_dimension = 16;
        config.max_decoded_pixels = 1_000;

        let err = validate_upload(Some(&png_file(64, 64)), Some("#000000"), &config)
            .expect_err("4096 pixels exceed the limit");

        assert!(matches!(err, AssetError::ResourceLimit(ref msg) if msg.contains("4096 pixels")), "{err:?}");
    }

    #[test]
    fn memory_estimate_follows_config() {
        let mut config = AssetConfig::default();
        config.min_dimension = 16;
        config.max_decoded_bytes = 64 * 64 * 4 - 1;

        let err = validate_upload(Some(&png_file(64, 64)), Some("#000000"), &config)
            .expect_err("RGBA8 estimate exceeds the limit");

        assert_eq!(err.status(), 413);
    }

    #[test]
    fn decoder_allocation_limit_is_resource_limit_not_corruption() {
        // 16 位 RGBA 需要 64*64*8 字节，header 估算按 RGBA8 只有一半
        let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(64, 64, Rgba([1000, 2000, 3000, u16::MAX]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba16(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode 16-bit image");
        let file = UploadedFile::new(PNG_MIME_TYPE, cursor.into_inner());

        let mut config = AssetConfig::default();
        config.min_dimension = 16;
        config.max_decoded_bytes = 20_000;

        let err = validate_upload(Some(&file), Some("#000000"), &config)
            .expect_err("decoder must refuse the allocation");

        assert!(matches!(err, AssetError::ResourceLimit(_)), "{err:?}");
        assert_eq!(err.status(), 413);
    }

    proptest! {
        #[test]
        fn dimension_check_accepts_only_large_squares(width in 0u32..4096, height in 0u32..4096) {
            let config = AssetConfig::default();
            let accepted = check_dimensions(width, height, &config).is_ok();
            prop_assert_eq!(accepted, width == height && width >= 1024);
        }

        #[test]
        fn size_check_matches_limit(size in 0u64..(8 * 1024 * 1024)) {
            let config = AssetConfig::default();
            let result = check_file_size(size, &config);
            prop_assert_eq!(result.is_ok(), size > 0 && size <= config.max_file_size);
        }
    }
}
