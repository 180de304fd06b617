//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError`，统一二进制入口中的资源生成错误、命令层错误与文件读写错误，
//! 替代分散的 `.map_err(|e| e.to_string())`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `AssetError` / `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于以 JSON 输出给调用方。

use serde::Serialize;

use crate::asset_generator::{AssetError, GenerateCommandError};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 资源生成流水线错误（校验 / 生成 / 打包）
    #[error("{0}")]
    Asset(#[from] AssetError),

    /// 命令层返回的对外错误
    #[error("{}", describe_command_error(.0))]
    Command(GenerateCommandError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_command_error(error: &GenerateCommandError) -> String {
    format!("{} ({})", error.message, error.code)
}

impl From<GenerateCommandError> for AppError {
    fn from(error: GenerateCommandError) -> Self {
        Self::Command(error)
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_errors_keep_their_message() {
        let err = AppError::from(AssetError::EmptyFile);

        assert_eq!(err.to_string(), "File is empty");
        assert_eq!(serde_json::to_string(&err).expect("serialize"), "\"File is empty\"");
    }

    #[test]
    fn command_errors_include_code() {
        let err = AppError::from(GenerateCommandError::from(AssetError::MissingFile));

        assert_eq!(err.to_string(), "No file provided (missing_file)");
    }
}
