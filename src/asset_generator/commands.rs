//! # 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做表单参数适配与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `AssetService`，保持命令函数薄、稳定、易测试。
//! 与传输方式无关：HTTP 路由、CLI 或 IPC 都可以直接调用。

use serde::Serialize;

use super::archive::content_disposition;
use super::manifest::DEFAULT_APP_NAME;
use super::{AssetError, AssetService, GenerateRequest, UploadedFile};

/// 表单字段，均为调用方提交的原始值。
#[derive(Debug, Clone, Default)]
pub struct AssetForm {
    pub file: Option<UploadedFile>,
    pub background_color: Option<String>,
    /// 仅当值为字面量 `"true"` 时生成启动屏。
    pub include_splash: Option<String>,
    /// 缺省或空白时使用 `My App`。
    pub app_name: Option<String>,
}

impl AssetForm {
    fn into_request(self) -> GenerateRequest {
        let include_splash = self.include_splash.as_deref() == Some("true");
        let app_name = self
            .app_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        GenerateRequest {
            file: self.file,
            background_color: self.background_color,
            include_splash,
            app_name,
        }
    }
}

/// 成功响应：压缩包字节与响应头取值。
#[derive(Debug, Clone)]
pub struct ArchiveResponse {
    pub content_type: &'static str,
    pub content_disposition: String,
    pub body: Vec<u8>,
}

/// 失败响应载荷。
#[derive(Debug, Clone, Serialize)]
pub struct GenerateCommandError {
    pub code: &'static str,
    pub status: u16,
    pub message: String,
}

impl From<AssetError> for GenerateCommandError {
    fn from(error: AssetError) -> Self {
        Self {
            code: error.code(),
            status: error.status(),
            message: error.client_message(),
        }
    }
}

/// 校验表单、生成资源并返回压缩包。
///
/// 处理任务在独立 tokio 任务中运行，任务 panic 统一转换为通用内部错误。
pub async fn generate_assets(
    service: &AssetService,
    form: AssetForm,
) -> Result<ArchiveResponse, GenerateCommandError> {
    let request = form.into_request();
    let service = service.clone();

    let result = tokio::spawn(async move { service.generate_archive(request).await })
        .await
        .unwrap_or_else(|e| Err(AssetError::Internal(format!("生成任务异常：{}", e))));

    match result {
        Ok(archive) => Ok(ArchiveResponse {
            content_type: archive.content_type,
            content_disposition: content_disposition(),
            body: archive.bytes,
        }),
        Err(error) => {
            if error.is_client_error() {
                log::info!("🚫 请求被拒绝 [{}] {}", error.code(), error);
            } else {
                log::error!("❌ 资源生成失败 [{}/{}] {}", error.stage(), error.code(), error);
            }
            Err(GenerateCommandError::from(error))
        }
    }
}
