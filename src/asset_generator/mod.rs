//! # 品牌资源生成模块（asset_generator）
//!
//! ## 设计思路
//!
//! 该模块将“上传校验 → 图像变换 → manifest 生成 → ZIP 打包 → 命令暴露”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `commands`：仅做表单入参/出参适配（薄封装）
//! - `service`：承载可注入状态（`AssetService`）与请求编排
//! - `validator`：上传文件与背景色校验
//! - `engine`：编排六个输出的生成（顺序或并发）
//! - `transform`：缩放、留白、单色、合成、PNG 编码等纯函数
//! - `manifest` / `archive`：`app.json` 片段、README 与 ZIP
//! - `config/error/source/color/bundle`：配置、错误、数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 调用方（HTTP / CLI）
//!    ↓
//! commands.rs（表单适配 + 错误载荷）
//!    ↓
//! service.rs（配置快照 + 超时 + 阶段耗时日志）
//!    ├─ validator.rs（文件/颜色/类型/体积/尺寸校验）
//!    ├─ engine.rs → transform.rs（六个输出）
//!    └─ manifest.rs + archive.rs（片段 + README + ZIP）
//!    ↓
//! 返回 ArchiveResponse 或 GenerateCommandError
//! ```
//!
//! ## 分层职责建议
//!
//! - 表单字段变更优先改 `commands.rs`
//! - 限额与画质策略变更优先改 `config.rs`
//! - 输出尺寸与文件名变更优先改 `bundle.rs`
//! - 单个输出的像素算法优先改 `transform.rs`

mod archive;
mod bundle;
mod color;
pub mod commands;
mod config;
mod engine;
mod error;
mod manifest;
mod service;
mod source;
mod transform;
mod validator;

pub use archive::{ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME, build_archive, content_disposition};
pub use bundle::{AssetKind, BRANDING_DIR, OutputBundle};
pub use color::{Color, is_hex_color};
pub use commands::{ArchiveResponse, AssetForm, GenerateCommandError, generate_assets};
pub use config::{AssetConfig, AssetConfigOverrides, AssetPerformanceProfile};
pub use engine::{AssetEngine, render_asset};
pub use error::AssetError;
pub use manifest::{DEFAULT_APP_NAME, app_json_snippet, readme_content};
pub use service::{AssetService, GeneratedArchive};
pub use source::{GenerateRequest, SourceImage, UploadedFile};
pub use validator::{PNG_MIME_TYPE, check_dimensions, check_file_size, validate_upload};
