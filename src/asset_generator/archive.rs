//! # 压缩包打包
//!
//! 在内存中写出 ZIP：`assets/branding/*.png` + `app.json.snippet` + `README.txt`。
//! 条目顺序固定，压缩方式为 Deflate。

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::AssetError;
use super::bundle::OutputBundle;

/// 下载时的默认文件名。
pub const ARCHIVE_FILE_NAME: &str = "expo-assets.zip";
/// 压缩包 MIME 类型。
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";
/// manifest 片段文件名。
pub const MANIFEST_ENTRY: &str = "app.json.snippet";
/// 说明文档文件名。
pub const README_ENTRY: &str = "README.txt";

/// `Content-Disposition` 头的取值。
pub fn content_disposition() -> String {
    format!("attachment; filename=\"{}\"", ARCHIVE_FILE_NAME)
}

/// 将产物、manifest 与说明文档写入一个 ZIP。
pub fn build_archive(
    bundle: &OutputBundle,
    manifest: &str,
    readme: &str,
) -> Result<Vec<u8>, AssetError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (kind, bytes) in bundle.entries() {
        write_entry(&mut writer, &kind.archive_path(), bytes, options)?;
    }
    write_entry(&mut writer, MANIFEST_ENTRY, manifest.as_bytes(), options)?;
    write_entry(&mut writer, README_ENTRY, readme.as_bytes(), options)?;

    let cursor = writer
        .finish()
        .map_err(|e| AssetError::Archive(format!("写入 ZIP 目录失败：{}", e)))?;

    Ok(cursor.into_inner())
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), AssetError> {
    writer
        .start_file(name, options)
        .map_err(|e| AssetError::Archive(format!("创建条目 {} 失败：{}", name, e)))?;
    writer
        .write_all(bytes)
        .map_err(|e| AssetError::Archive(format!("写入条目 {} 失败：{}", name, e)))
}
