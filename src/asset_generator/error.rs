//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载“校验 → 生成 → 打包”链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! ## 实现思路
//!
//! - 客户端输入类错误（400 / 413）的 `Display` 即对外文案，可直接返回给调用方。
//! - 服务端内部错误（500）的 `Display` 携带诊断细节，仅用于日志；
//!   对外统一使用 `client_message()`，避免泄露内部信息。

/// 资源生成统一错误类型。
///
/// 该类型会在命令层被转换为 `GenerateCommandError`，或在二进制入口被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("No file provided")]
    MissingFile,

    #[error("Invalid background color format")]
    InvalidColor(String),

    #[error("File must be a PNG image")]
    UnsupportedType(String),

    #[error("File is empty")]
    EmptyFile,

    #[error("File size exceeds {}MB limit ({:.2}MB)", format_limit_mib(.limit), as_mib(.size))]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Image is too large to process: {0}")]
    ResourceLimit(String),

    #[error("Invalid or corrupted PNG file")]
    CorruptedImage(String),

    #[error("Unable to read image dimensions")]
    UnknownDimensions,

    #[error("Image must be square. Current: {width}x{height}px. Please provide a square image.")]
    NotSquare { width: u32, height: u32 },

    #[error(
        "Image must be at least {min}x{min}px. Current: {width}x{height}px. Please upload a larger image."
    )]
    TooSmall { width: u32, height: u32, min: u32 },

    #[error("资源生成失败：{0}")]
    Processing(String),

    #[error("压缩包生成失败：{0}")]
    Archive(String),

    #[error("处理超时：{0}")]
    Timeout(String),

    #[error("配置无效：{0}")]
    InvalidConfig(String),

    #[error("已取消：{0}")]
    Cancelled(String),

    #[error("内部错误：{0}")]
    Internal(String),
}

fn as_mib(bytes: &u64) -> f64 {
    *bytes as f64 / 1024.0 / 1024.0
}

/// 整 MiB 的上限按整数输出，否则保留两位小数。
fn format_limit_mib(bytes: &u64) -> String {
    if bytes % (1024 * 1024) == 0 {
        format!("{}", bytes / (1024 * 1024))
    } else {
        format!("{:.2}", as_mib(bytes))
    }
}

impl AssetError {
    /// 稳定的机器可读错误码，供调用方分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::InvalidColor(_) => "invalid_color",
            Self::UnsupportedType(_) => "unsupported_type",
            Self::EmptyFile => "empty_file",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::ResourceLimit(_) => "resource_limit",
            Self::CorruptedImage(_) => "corrupted_image",
            Self::UnknownDimensions => "unknown_dimensions",
            Self::NotSquare { .. } => "not_square",
            Self::TooSmall { .. } => "too_small",
            Self::Processing(_) => "processing_failed",
            Self::Archive(_) => "archive_failed",
            Self::Timeout(_) => "timeout",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Cancelled(_) => "cancelled",
            Self::Internal(_) => "internal",
        }
    }

    /// 出错阶段（日志与诊断使用）。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Processing(_) => "generate",
            Self::Archive(_) => "archive",
            Self::InvalidConfig(_) => "config",
            Self::Timeout(_) | Self::Cancelled(_) | Self::Internal(_) => "request",
            _ => "validate",
        }
    }

    /// HTTP 语义下的状态码分类。
    pub fn status(&self) -> u16 {
        match self {
            Self::FileTooLarge { .. } | Self::ResourceLimit(_) => 413,
            Self::Processing(_)
            | Self::Archive(_)
            | Self::Timeout(_)
            | Self::InvalidConfig(_)
            | Self::Cancelled(_)
            | Self::Internal(_) => 500,
            _ => 400,
        }
    }

    /// 是否属于调用方输入导致的错误。
    pub fn is_client_error(&self) -> bool {
        self.status() < 500
    }

    /// 对外展示的错误文案。
    ///
    /// 内部错误不透出诊断细节，只提示调用方重试。
    pub fn client_message(&self) -> String {
        match self {
            Self::Processing(_) => "Failed to process image assets".to_string(),
            Self::Archive(_) => "Failed to generate ZIP file".to_string(),
            Self::Timeout(_) => "Asset generation timed out. Please try again.".to_string(),
            Self::InvalidConfig(_) | Self::Cancelled(_) | Self::Internal(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<AssetError> for String {
    fn from(error: AssetError) -> Self {
        error.to_string()
    }
}
