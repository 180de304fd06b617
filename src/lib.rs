//! # Expo 品牌资源生成器：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        调用方（CLI main.rs / 任意 HTTP 路由）              │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ AssetForm → Result<ArchiveResponse, GenerateCommandError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            asset_generator                       │
//! │                                                          │
//! │  commands ── service ── validator                        │
//! │                  │                                       │
//! │                  ├── engine ── transform (6 个 PNG)      │
//! │                  └── manifest + archive (ZIP)            │
//! │                                                          │
//! │  error ────── AppError (二进制入口统一错误类型)            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，二进制入口的返回类型 |
//! | [`asset_generator`] | 将一张方形 PNG logo 生成为 Expo 所需的全部品牌资源并打包 |

pub mod asset_generator;
pub mod error;
