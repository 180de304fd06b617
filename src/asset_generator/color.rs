//! # 背景色解析
//!
//! 只接受 `#RRGGBB`（大小写不敏感），与校验层共用同一条正则。解析失败返回错误，不回退为黑色。

use std::fmt;
use std::str::FromStr;

use image::Rgb;
use once_cell::sync::Lazy;
use regex::Regex;

use super::AssetError;

static HEX_COLOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern should compile")
});

/// 判断字符串是否为合法的 `#RRGGBB` 颜色。
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_PATTERN.is_match(value)
}

/// 不透明 RGB 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 解析 `#RRGGBB`。
    ///
    /// # 示例
    /// ```rust
    /// use expo_branding::asset_generator::Color;
    ///
    /// assert_eq!(Color::parse_hex("#0066FF")?, Color::new(0, 102, 255));
    /// assert!(Color::parse_hex("0066FF").is_err());
    /// # Ok::<(), expo_branding::asset_generator::AssetError>(())
    /// ```
    pub fn parse_hex(value: &str) -> Result<Self, AssetError> {
        if !is_hex_color(value) {
            return Err(AssetError::InvalidColor(value.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&value[range], 16)
                .map_err(|_| AssetError::InvalidColor(value.to_string()))
        };

        Ok(Self {
            r: channel(1..3)?,
            g: channel(3..5)?,
            b: channel(5..7)?,
        })
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

impl FromStr for Color {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
