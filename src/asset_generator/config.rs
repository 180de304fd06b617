//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `AssetConfig`，保证运行时行为可观测、可调整、可测试。
//! 输出尺寸、文件名等属于产物契约，不在此处开放；这里只放限额、超时与画质相关参数。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置（5MB 上限、1024 最小边长、60 秒请求预算）。
//! - 解码上限（像素数、解码内存）在完整解码前按 header 尺寸校验，防止高压缩率的巨幅 PNG 耗尽内存。
//! - `AssetPerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为滤镜与 PNG 压缩级别。
//! - `AssetConfigOverrides` 支持从 JSON 文件局部覆盖配置，缺省字段保持原值。

use std::fs;
use std::path::Path;
use std::time::Duration;

use image::codecs::png::CompressionType;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::AssetError;

/// 上传文件体积上限：5MB。
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// 源图最小边长。
pub const DEFAULT_MIN_DIMENSION: u32 = 1024;
/// 单次请求的总耗时预算（秒）。
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// 源图解码后允许的最大像素数。
pub const DEFAULT_MAX_DECODED_PIXELS: u64 = 40_000_000;
/// 源图解码允许占用的最大内存（字节）。
pub const DEFAULT_MAX_DECODED_BYTES: u64 = 160 * 1024 * 1024;

/// 资源生成配置。
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// 上传文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 源图宽高的最小值（像素）。
    pub min_dimension: u32,
    /// 源图解码后允许的最大像素数。
    pub max_decoded_pixels: u64,
    /// 源图解码允许占用的最大内存（字节），同时作为解码器的分配上限。
    pub max_decoded_bytes: u64,
    /// 整个请求（校验 + 生成 + 打包）的耗时预算。
    pub request_timeout: Duration,
    /// 是否并发执行各个变换。
    pub parallel: bool,
    /// 缩放滤镜策略。
    pub resize_filter: FilterType,
    /// PNG 编码压缩级别。
    pub png_compression: CompressionType,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_dimension: DEFAULT_MIN_DIMENSION,
            max_decoded_pixels: DEFAULT_MAX_DECODED_PIXELS,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            parallel: true,
            resize_filter: FilterType::Lanczos3,
            png_compression: CompressionType::Default,
        }
    }
}

/// 性能档位（面向产品/用户语义）。
///
/// - `Quality`：尽量保真，压缩率最高
/// - `Balanced`：质量与速度平衡
/// - `Speed`：优先出包速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl AssetPerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use expo_branding::asset_generator::AssetPerformanceProfile;
    ///
    /// let p = AssetPerformanceProfile::parse("Balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), expo_branding::asset_generator::AssetError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, AssetError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(AssetError::InvalidConfig(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl AssetConfig {
    /// 基于当前参数反推性能档位。
    pub fn infer_performance_profile(&self) -> AssetPerformanceProfile {
        match (self.resize_filter, self.png_compression) {
            (FilterType::Lanczos3, CompressionType::Best) => AssetPerformanceProfile::Quality,
            (FilterType::Nearest | FilterType::Triangle, CompressionType::Fast) => {
                AssetPerformanceProfile::Speed
            }
            _ => AssetPerformanceProfile::Balanced,
        }
    }

    /// 应用指定性能档位到实际参数。
    pub fn apply_performance_profile(&mut self, profile: AssetPerformanceProfile) {
        match profile {
            AssetPerformanceProfile::Quality => {
                self.resize_filter = FilterType::Lanczos3;
                self.png_compression = CompressionType::Best;
            }
            AssetPerformanceProfile::Balanced => {
                self.resize_filter = FilterType::Lanczos3;
                self.png_compression = CompressionType::Default;
            }
            AssetPerformanceProfile::Speed => {
                self.resize_filter = FilterType::Triangle;
                self.png_compression = CompressionType::Fast;
            }
        }
    }

    /// 合并 JSON 覆盖项，并校验取值范围。
    ///
    /// 校验失败时配置保持不变。
    pub fn apply_overrides(&mut self, overrides: &AssetConfigOverrides) -> Result<(), AssetError> {
        let mut next = self.clone();

        if let Some(profile) = overrides.profile.as_deref() {
            next.apply_performance_profile(AssetPerformanceProfile::parse(profile)?);
        }
        if let Some(max_file_size) = overrides.max_file_size {
            if max_file_size == 0 {
                return Err(AssetError::InvalidConfig("max_file_size 必须大于 0".to_string()));
            }
            next.max_file_size = max_file_size;
        }
        if let Some(min_dimension) = overrides.min_dimension {
            if min_dimension == 0 {
                return Err(AssetError::InvalidConfig("min_dimension 必须大于 0".to_string()));
            }
            next.min_dimension = min_dimension;
        }
        if let Some(max_decoded_pixels) = overrides.max_decoded_pixels {
            if max_decoded_pixels == 0 {
                return Err(AssetError::InvalidConfig("max_decoded_pixels 必须大于 0".to_string()));
            }
            next.max_decoded_pixels = max_decoded_pixels;
        }
        if let Some(max_decoded_bytes) = overrides.max_decoded_bytes {
            if max_decoded_bytes == 0 {
                return Err(AssetError::InvalidConfig("max_decoded_bytes 必须大于 0".to_string()));
            }
            next.max_decoded_bytes = max_decoded_bytes;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            if !(1..=600).contains(&secs) {
                return Err(AssetError::InvalidConfig(
                    "request_timeout_secs 必须在 1~600 秒之间".to_string(),
                ));
            }
            next.request_timeout = Duration::from_secs(secs);
        }
        if let Some(parallel) = overrides.parallel {
            next.parallel = parallel;
        }

        *self = next;
        Ok(())
    }
}

/// 配置文件中的可选覆盖项。
///
/// 所有字段均可缺省，缺省即沿用当前配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfigOverrides {
    pub profile: Option<String>,
    pub max_file_size: Option<u64>,
    pub min_dimension: Option<u32>,
    pub max_decoded_pixels: Option<u64>,
    pub max_decoded_bytes: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub parallel: Option<bool>,
}

impl AssetConfigOverrides {
    /// 从 JSON 文件读取覆盖项。
    pub fn load_from_path(path: &Path) -> Result<Self, AssetError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AssetError::InvalidConfig(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| AssetError::InvalidConfig(format!("解析配置文件失败 {}: {}", path.display(), e)))
    }
}
