//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! `AssetService` 持有运行时配置，是命令层与二进制入口共用的唯一服务入口。
//! 克隆成本低（内部为 `Arc`），可在任务间传递。
//!
//! ## 实现思路
//!
//! 单次请求链路固定为：
//! 1. 读取配置快照（请求中途切档不影响本次结果）
//! 2. 校验上传内容（阻塞线程池）
//! 3. 生成六个资源（按配置并发或顺序）
//! 4. 生成 manifest / README 并打包 ZIP（阻塞线程池）
//!
//! 整条链路包在 `tokio::time::timeout` 中，并记录 `validate/generate/archive/total` 阶段耗时。
//! 超时或失败后，仍在阻塞线程池上的变换任务通过取消标志尽快退出。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::archive::{ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME, build_archive};
use super::engine::CancelOnDrop;
use super::manifest::{app_json_snippet, readme_content};
use super::validator::validate_upload;
use super::{
    AssetConfig, AssetConfigOverrides, AssetEngine, AssetError, AssetPerformanceProfile, Color,
    GenerateRequest, OutputBundle,
};

/// 一次生成的最终产物。
#[derive(Debug, Clone)]
pub struct GeneratedArchive {
    /// ZIP 字节。
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub content_type: &'static str,
    /// 写入压缩包的 manifest 文本。
    pub manifest: String,
    /// 写入压缩包前的各资源字节。
    pub bundle: OutputBundle,
}

/// 资源生成服务状态。
#[derive(Debug, Clone)]
pub struct AssetService {
    config: Arc<RwLock<AssetConfig>>,
}

impl AssetService {
    /// 使用默认配置创建服务。
    ///
    /// # 示例
    /// ```rust
    /// use expo_branding::asset_generator::AssetService;
    ///
    /// let service = AssetService::new();
    /// assert_eq!(service.get_performance_profile()?, "balanced");
    /// # Ok::<(), expo_branding::asset_generator::AssetError>(())
    /// ```
    pub fn new() -> Self {
        Self::with_config(AssetConfig::default())
    }

    pub fn with_config(config: AssetConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<AssetConfig, AssetError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| AssetError::Internal("配置读取锁已中毒".to_string()))
    }

    /// 按字符串设置性能档位。
    pub fn set_performance_profile(&self, profile: &str) -> Result<(), AssetError> {
        let profile = AssetPerformanceProfile::parse(profile)?;
        let mut config = self
            .config
            .write()
            .map_err(|_| AssetError::Internal("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换资源生成性能档位：{:?}（filter={:?}, compression={:?}）",
            profile,
            config.resize_filter,
            config.png_compression
        );

        Ok(())
    }

    /// 获取当前生效性能档位（字符串）。
    pub fn get_performance_profile(&self) -> Result<String, AssetError> {
        let config = self
            .config
            .read()
            .map_err(|_| AssetError::Internal("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile().as_str().to_string())
    }

    /// 合并配置覆盖项；校验失败时配置保持不变。
    pub fn apply_overrides(&self, overrides: &AssetConfigOverrides) -> Result<(), AssetError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| AssetError::Internal("配置写入锁已中毒".to_string()))?;
        config.apply_overrides(overrides)?;

        log::info!(
            "⚙️ 已应用配置覆盖：max_file_size={} min_dimension={} max_pixels={} max_decoded_bytes={} timeout={}s parallel={}",
            config.max_file_size,
            config.min_dimension,
            config.max_decoded_pixels,
            config.max_decoded_bytes,
            config.request_timeout.as_secs(),
            config.parallel
        );

        Ok(())
    }

    /// 执行完整生成流程：校验 → 生成 → 打包。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use expo_branding::asset_generator::{AssetService, GenerateRequest, UploadedFile};
    ///
    /// # async fn demo() -> Result<(), expo_branding::asset_generator::AssetError> {
    /// let logo = std::fs::read("logo.png").expect("logo");
    /// let archive = AssetService::new()
    ///     .generate_archive(GenerateRequest {
    ///         file: Some(UploadedFile::new("image/png", logo)),
    ///         background_color: Some("#FF3B30".into()),
    ///         include_splash: true,
    ///         app_name: "Demo".into(),
    ///     })
    ///     .await?;
    /// std::fs::write(archive.file_name, &archive.bytes).expect("write");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn generate_archive(
        &self,
        request: GenerateRequest,
    ) -> Result<GeneratedArchive, AssetError> {
        let config = self.config_snapshot()?;
        let budget = config.request_timeout;

        match tokio::time::timeout(budget, run_request(request, config)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("⏱️ 资源生成超时（预算 {}s）", budget.as_secs());
                Err(AssetError::Timeout(format!(
                    "超过 {} 秒未完成",
                    budget.as_secs()
                )))
            }
        }
    }
}

impl Default for AssetService {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_request(
    request: GenerateRequest,
    config: AssetConfig,
) -> Result<GeneratedArchive, AssetError> {
    let total_start = Instant::now();
    let GenerateRequest {
        file,
        background_color,
        include_splash,
        app_name,
    } = request;

    let validate_start = Instant::now();
    let validate_config = config.clone();
    let color_input = background_color.clone();
    let source = tokio::task::spawn_blocking(move || {
        validate_upload(file.as_ref(), color_input.as_deref(), &validate_config)
    })
    .await
    .map_err(|e| AssetError::Internal(format!("校验任务异常：{}", e)))?
    .inspect_err(|e| log::info!("🚫 上传被拒绝 - code={} {}", e.code(), e))?;
    let validate_elapsed = validate_start.elapsed();

    // 校验已保证格式合法，manifest 沿用调用方原始写法
    let background_hex = background_color.unwrap_or_default();
    let background = Color::parse_hex(&background_hex)?;

    let generate_start = Instant::now();
    let parallel = config.parallel;
    let engine = AssetEngine::new(config);
    let bundle = if parallel {
        engine
            .generate_concurrently(Arc::new(source), background, include_splash)
            .await?
    } else {
        // 超时丢弃本 future 时 guard 随之析构，阻塞任务在下一个检查点退出
        let cancel = CancelOnDrop::new();
        let cancelled = cancel.token();
        tokio::task::spawn_blocking(move || {
            engine.generate_sequential(&source, background, include_splash, &cancelled)
        })
        .await
        .map_err(|e| AssetError::Internal(format!("生成任务异常：{}", e)))??
    };
    let generate_elapsed = generate_start.elapsed();

    let archive_start = Instant::now();
    let manifest = app_json_snippet(&background_hex, &app_name)?;
    let readme = readme_content(&app_name);
    let (bytes, manifest, bundle) = tokio::task::spawn_blocking(move || {
        build_archive(&bundle, &manifest, &readme).map(|bytes| (bytes, manifest, bundle))
    })
    .await
    .map_err(|e| AssetError::Internal(format!("打包任务异常：{}", e)))??;
    let archive_elapsed = archive_start.elapsed();

    log::info!(
        "✅ 资源生成完成 - assets={}KB zip={}KB splash={} validate={}ms generate={}ms archive={}ms total={}ms",
        bundle.total_bytes() / 1024,
        bytes.len() / 1024,
        include_splash,
        validate_elapsed.as_millis(),
        generate_elapsed.as_millis(),
        archive_elapsed.as_millis(),
        total_start.elapsed().as_millis()
    );

    Ok(GeneratedArchive {
        bytes,
        file_name: ARCHIVE_FILE_NAME,
        content_type: ARCHIVE_CONTENT_TYPE,
        manifest,
        bundle,
    })
}
