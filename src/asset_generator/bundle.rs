//! # 产物清单
//!
//! `AssetKind` 描述固定的六种输出（文件名、尺寸），`OutputBundle` 是一次生成的定长结果。
//! 文件名大小写敏感，manifest 与压缩包都以这里为准。

use std::fmt;

/// 压缩包内资源目录。
pub const BRANDING_DIR: &str = "assets/branding";

/// 固定输出种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Icon,
    AdaptiveIconForeground,
    AdaptiveIconBackground,
    AndroidIconMonochrome,
    Splash,
    Favicon,
}

impl AssetKind {
    /// 按压缩包写入顺序排列的全部种类。
    pub const ALL: [AssetKind; 6] = [
        AssetKind::Icon,
        AssetKind::AdaptiveIconForeground,
        AssetKind::AdaptiveIconBackground,
        AssetKind::AndroidIconMonochrome,
        AssetKind::Splash,
        AssetKind::Favicon,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Icon => "icon.png",
            Self::AdaptiveIconForeground => "adaptive-icon-foreground.png",
            Self::AdaptiveIconBackground => "adaptive-icon-background.png",
            Self::AndroidIconMonochrome => "android-icon-monochrome.png",
            Self::Splash => "splash.png",
            Self::Favicon => "favicon.png",
        }
    }

    /// 输出像素尺寸（宽, 高）。
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Splash => (1242, 2436),
            Self::Favicon => (48, 48),
            _ => (1024, 1024),
        }
    }

    /// 压缩包内的相对路径，例如 `assets/branding/icon.png`。
    pub fn archive_path(self) -> String {
        format!("{}/{}", BRANDING_DIR, self.file_name())
    }

    /// manifest 中引用的相对路径，例如 `./assets/branding/icon.png`。
    pub fn manifest_path(self) -> String {
        format!("./{}", self.archive_path())
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// 一次生成的全部 PNG 字节。
///
/// 未请求启动屏时 `splash` 为空，其余字段生成成功时必然非空。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    pub icon: Vec<u8>,
    pub adaptive_icon_foreground: Vec<u8>,
    pub adaptive_icon_background: Vec<u8>,
    pub android_icon_monochrome: Vec<u8>,
    pub splash: Vec<u8>,
    pub favicon: Vec<u8>,
}

impl OutputBundle {
    pub fn get(&self, kind: AssetKind) -> &[u8] {
        match kind {
            AssetKind::Icon => &self.icon,
            AssetKind::AdaptiveIconForeground => &self.adaptive_icon_foreground,
            AssetKind::AdaptiveIconBackground => &self.adaptive_icon_background,
            AssetKind::AndroidIconMonochrome => &self.android_icon_monochrome,
            AssetKind::Splash => &self.splash,
            AssetKind::Favicon => &self.favicon,
        }
    }

    pub(crate) fn set(&mut self, kind: AssetKind, bytes: Vec<u8>) {
        match kind {
            AssetKind::Icon => self.icon = bytes,
            AssetKind::AdaptiveIconForeground => self.adaptive_icon_foreground = bytes,
            AssetKind::AdaptiveIconBackground => self.adaptive_icon_background = bytes,
            AssetKind::AndroidIconMonochrome => self.android_icon_monochrome = bytes,
            AssetKind::Splash => self.splash = bytes,
            AssetKind::Favicon => self.favicon = bytes,
        }
    }

    pub fn has_splash(&self) -> bool {
        !self.splash.is_empty()
    }

    /// 需要写入压缩包的条目；空的启动屏会被跳过。
    pub fn entries(&self) -> impl Iterator<Item = (AssetKind, &[u8])> + '_ {
        AssetKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, bytes)| !bytes.is_empty())
    }

    /// 全部字节数，日志使用。
    pub fn total_bytes(&self) -> usize {
        AssetKind::ALL.iter().map(|kind| self.get(*kind).len()).sum()
    }
}
