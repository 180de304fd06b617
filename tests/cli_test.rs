// Runs the expo-branding binary against files in a temp directory.
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use zip::ZipArchive;

fn write_logo(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 255) as u8, (y % 255) as u8, 128, 255])
    });

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    std::fs::write(path, cursor.into_inner()).expect("write logo");
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_expo-branding"))
}

#[test]
fn writes_archive_to_requested_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let logo = dir.path().join("logo.png");
    let output = dir.path().join("out.zip");
    write_logo(&logo, 1024, 1024);

    let status = binary()
        .arg("--logo")
        .arg(&logo)
        .args(["--background-color", "#0066FF", "--splash", "--app-name", "Cli App"])
        .args(["--profile", "speed"])
        .arg("--output")
        .arg(&output)
        .status()
        .expect("run binary");

    assert!(status.success());
    let archive = ZipArchive::new(File::open(&output).expect("open zip")).expect("readable zip");
    assert_eq!(archive.len(), 8);
    assert!(archive.file_names().any(|name| name == "assets/branding/splash.png"));
}

#[test]
fn applies_config_file_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let logo = dir.path().join("logo.png");
    let config = dir.path().join("config.json");
    let output = dir.path().join("small.zip");
    write_logo(&logo, 256, 256);
    std::fs::write(&config, r#"{ "min_dimension": 256, "profile": "speed", "parallel": false }"#)
        .expect("write config");

    let status = binary()
        .arg("--logo")
        .arg(&logo)
        .args(["--background-color", "#000000"])
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .status()
        .expect("run binary");

    assert!(status.success());
    let archive = ZipArchive::new(File::open(&output).expect("open zip")).expect("readable zip");
    assert_eq!(archive.len(), 7);
}

#[test]
fn rejects_non_square_logo_with_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let logo = dir.path().join("wide.png");
    let output = dir.path().join("never.zip");
    write_logo(&logo, 1100, 1024);

    let result = binary()
        .arg("--logo")
        .arg(&logo)
        .args(["--background-color", "#FFFFFF"])
        .arg("--output")
        .arg(&output)
        .output()
        .expect("run binary");

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Image must be square. Current: 1100x1024px"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn rejects_invalid_profile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let logo = dir.path().join("logo.png");
    write_logo(&logo, 1024, 1024);

    let result = binary()
        .arg("--logo")
        .arg(&logo)
        .args(["--background-color", "#FFFFFF", "--profile", "turbo"])
        .arg("--output")
        .arg(dir.path().join("x.zip"))
        .output()
        .expect("run binary");

    assert!(!result.status.success());
}
