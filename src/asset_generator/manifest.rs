//! # manifest 与说明文档
//!
//! `app.json.snippet` 用强类型结构体 + `serde_json` 输出，字段顺序即结构体声明顺序，
//! 应用名中的引号等字符会被正确转义。

use serde::Serialize;

use super::AssetError;
use super::bundle::AssetKind;

/// 默认应用名。
pub const DEFAULT_APP_NAME: &str = "My App";

#[derive(Debug, Serialize)]
struct AppJsonSnippet {
    expo: ExpoConfig,
}

#[derive(Debug, Serialize)]
struct ExpoConfig {
    name: String,
    icon: String,
    android: AndroidConfig,
    splash: SplashConfig,
    web: WebConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AndroidConfig {
    adaptive_icon: AdaptiveIconConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdaptiveIconConfig {
    foreground_image: String,
    background_image: String,
    monochrome_image: String,
    background_color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SplashConfig {
    image: String,
    resize_mode: &'static str,
    background_color: String,
}

#[derive(Debug, Serialize)]
struct WebConfig {
    favicon: String,
}

/// 生成 `app.json` 片段。
///
/// 背景色写入两次（自适应图标、启动屏），六个资源均以 `./assets/branding/<name>.png` 引用。
pub fn app_json_snippet(background_hex: &str, app_name: &str) -> Result<String, AssetError> {
    let snippet = AppJsonSnippet {
        expo: ExpoConfig {
            name: app_name.to_string(),
            icon: AssetKind::Icon.manifest_path(),
            android: AndroidConfig {
                adaptive_icon: AdaptiveIconConfig {
                    foreground_image: AssetKind::AdaptiveIconForeground.manifest_path(),
                    background_image: AssetKind::AdaptiveIconBackground.manifest_path(),
                    monochrome_image: AssetKind::AndroidIconMonochrome.manifest_path(),
                    background_color: background_hex.to_string(),
                },
            },
            splash: SplashConfig {
                image: AssetKind::Splash.manifest_path(),
                resize_mode: "contain",
                background_color: background_hex.to_string(),
            },
            web: WebConfig {
                favicon: AssetKind::Favicon.manifest_path(),
            },
        },
    };

    serde_json::to_string_pretty(&snippet)
        .map_err(|e| AssetError::Archive(format!("app.json 片段序列化失败：{}", e)))
}

/// 生成压缩包根目录下的 `README.txt`。
pub fn readme_content(app_name: &str) -> String {
    let asset_lines: String = AssetKind::ALL
        .iter()
        .map(|kind| {
            let (width, height) = kind.dimensions();
            format!("- **{}** ({}x{}) - {}\n", kind.file_name(), width, height, describe(*kind))
        })
        .collect();

    format!(
        "# {app_name} - Expo Assets

This folder contains all the branding assets required for your Expo project.

## Installation

1. Copy the `assets/branding` folder into your Expo project root directory.

2. Merge the `app.json.snippet` content into your project's `app.json` file:
   - Copy the `expo` object properties from the snippet
   - Paste them into your existing `app.json`

3. Rebuild your app:
   ```bash
   eas build
   ```

## Asset Files

{asset_lines}
splash.png is only included when a splash screen was requested.

Generated with expo-branding
"
    )
}

fn describe(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Icon => "Main app icon",
        AssetKind::AdaptiveIconForeground => {
            "Android adaptive icon foreground with 20% padding"
        }
        AssetKind::AdaptiveIconBackground => "Android adaptive icon background",
        AssetKind::AndroidIconMonochrome => "Monochrome icon for Android",
        AssetKind::Splash => "Splash screen image",
        AssetKind::Favicon => "Web favicon",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_embeds_color_twice_and_name() {
        let snippet = app_json_snippet("#FF3B30", "Demo").expect("serialize");

        assert_eq!(snippet.matches(r##""backgroundColor": "#FF3B30""##).count(), 2);
        assert!(snippet.contains(r#""name": "Demo""#));
        assert!(snippet.contains(r#""resizeMode": "contain""#));
    }

    #[test]
    fn snippet_references_all_six_assets() {
        let snippet = app_json_snippet("#000000", DEFAULT_APP_NAME).expect("serialize");

        for kind in AssetKind::ALL {
            assert!(
                snippet.contains(&format!("\"./assets/branding/{}\"", kind.file_name())),
                "{kind} missing from manifest"
            );
        }
    }

    #[test]
    fn snippet_is_valid_json_even_with_quotes_in_name() {
        let snippet = app_json_snippet("#0066ff", r#"My "Quoted" App"#).expect("serialize");

        let parsed: serde_json::Value = serde_json::from_str(&snippet).expect("valid json");
        assert_eq!(parsed["expo"]["name"], r#"My "Quoted" App"#);
        assert_eq!(parsed["expo"]["android"]["adaptiveIcon"]["backgroundColor"], "#0066ff");
    }

    #[test]
    fn readme_lists_assets_with_dimensions() {
        let readme = readme_content("Demo");

        assert!(readme.starts_with("# Demo - Expo Assets"));
        assert!(readme.contains("- **splash.png** (1242x2436) - Splash screen image"));
        assert!(readme.contains("- **favicon.png** (48x48) - Web favicon"));
    }
}
