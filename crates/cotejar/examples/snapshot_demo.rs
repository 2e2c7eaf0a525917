//! Snapshot comparison demo.
//!
//! Establishes a baseline, compares a matching candidate, then a drifted
//! one, and prints where the failure artifacts landed.
//!
//! Run with: `cargo run --example snapshot_demo`

use cotejar::{ComparatorConfig, SnapshotComparator, TestContext};
use image::{ImageEncoder, Rgba, RgbaImage};

fn solid_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .expect("encode demo image");
    buffer
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let workdir = tempfile::tempdir()?;
    let suite = workdir.path().join("demo_suite.rs");
    std::fs::write(&suite, "// demo")?;

    let context = TestContext::new("test_dashboard", &suite);
    let comparator = SnapshotComparator::new(context, ComparatorConfig::default());

    let teal = solid_png(64, 64, Rgba([0, 128, 128, 255]));
    println!("== first run: establishes the baseline");
    comparator.compare(&teal, "main view")?;

    println!("== second run: identical candidate passes");
    comparator.compare(&teal, "main view")?;

    println!("== third run: drifted candidate fails");
    let coral = solid_png(64, 64, Rgba([255, 127, 80, 255]));
    match comparator.compare(&coral, "main view") {
        Err(err) if err.is_mismatch() => {
            println!("comparison failed as expected: {err}");
            let failures = workdir.path().join("snapshot_tests_failures");
            for entry in walk(&failures)? {
                println!("  artifact: {}", entry.display());
            }
        }
        other => println!("unexpected outcome: {other:?}"),
    }

    Ok(())
}

fn walk(root: &std::path::Path) -> std::io::Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    if root.is_dir() {
        for entry in std::fs::read_dir(root)? {
            let path = entry?.path();
            if path.is_dir() {
                files.extend(walk(&path)?);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
