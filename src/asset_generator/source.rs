//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `UploadedFile` 表示调用方提交的文件描述（声明类型、声明体积、原始字节）
//! - `SourceImage` 表示通过校验、已解码的源图句柄
//! - `GenerateRequest` 表示一次完整生成请求的全部参数

use bytes::Bytes;
use image::{DynamicImage, RgbaImage};

/// 上传文件描述。
///
/// `size` 为调用方声明的体积，校验按声明值执行；`bytes` 使用 `Bytes` 以便跨任务零拷贝共享。
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 声明的 MIME 类型，例如 `image/png`。
    pub content_type: String,
    /// 声明的字节数。
    pub size: u64,
    /// 原始字节。
    pub bytes: Bytes,
}

impl UploadedFile {
    /// 以实际字节长度作为声明体积构造文件描述。
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// 通过文件签名（magic bytes）推断 MIME 类型，无法识别时返回 `application/octet-stream`。
    pub fn sniff(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");
        Self::new(content_type, bytes)
    }
}

/// 已解码的源图。
///
/// 解码后立即统一为 RGBA8（已是 RGBA8 时不复制），之后只读共享给所有变换，
/// 生命周期不超过单次请求。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
    has_alpha: bool,
}

impl SourceImage {
    pub(crate) fn new(image: DynamicImage) -> Self {
        let has_alpha = image.color().has_alpha();
        Self {
            pixels: image.into_rgba8(),
            has_alpha,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// 原始编码是否带 alpha 通道。
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub(crate) fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// 一次生成请求。
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub file: Option<UploadedFile>,
    /// 背景色原始字符串（`#RRGGBB`），原样写入 manifest。
    pub background_color: Option<String>,
    pub include_splash: bool,
    pub app_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_recognizes_png_signature() {
        let png_signature = vec![137_u8, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82];
        let file = UploadedFile::sniff(png_signature);

        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.size, 16);
    }

    #[test]
    fn sniff_falls_back_to_octet_stream() {
        let file = UploadedFile::sniff(b"<html><body>not an image</body></html>".to_vec());

        assert_eq!(file.content_type, "application/octet-stream");
    }

    #[test]
    fn source_image_reports_alpha_channel() {
        let rgb = SourceImage::new(DynamicImage::new_rgb8(4, 4));
        let rgba = SourceImage::new(DynamicImage::new_rgba8(4, 2));

        assert!(!rgb.has_alpha());
        assert!(rgba.has_alpha());
        assert_eq!(rgba.dimensions(), (4, 2));
    }

    #[test]
    fn source_image_is_normalized_to_rgba8_once() {
        let rgb = SourceImage::new(DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            3,
            3,
            image::Rgb([10, 20, 30]),
        )));

        assert_eq!(rgb.pixels().dimensions(), (3, 3));
        assert!(rgb.pixels().pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }
}
