//! Integration tests for the mharender binary
//!
//! Generate test drawings -> run the CLI -> verify the OBJ on disk

use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn generate_drawing_png(path: &Path, width: u32, height: u32) {
    GrayImage::from_fn(width, height, |x, y| {
        // Bright square in the middle of a dark canvas
        let inside = x > 0 && y > 0 && x + 1 < width && y + 1 < height;
        Luma([if inside { 255 } else { 0 }])
    })
    .save(path)
    .expect("Failed to generate PNG");
}

fn generate_texture_png(path: &Path) {
    RgbImage::from_fn(4, 4, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
    .save(path)
    .expect("Failed to generate texture");
}

fn run_mharender(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mharender"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run mharender")
}

fn count_records(obj: &str, tag: &str) -> usize {
    obj.lines()
        .filter(|l| l.split_whitespace().next() == Some(tag))
        .count()
}

/// Test PNG -> OBJ conversion with default output path
#[test]
fn test_default_output_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    generate_drawing_png(&dir.path().join("drawing.png"), 4, 3);

    let out = run_mharender(dir.path(), &["drawing.png"]);
    assert!(out.status.success(), "mharender failed: {:?}", out);

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Model saved to output.obj"));

    let obj = std::fs::read_to_string(dir.path().join("output.obj")).unwrap();
    assert_eq!(count_records(&obj, "v"), 12);
    assert_eq!(count_records(&obj, "vt"), 0);
    assert_eq!(count_records(&obj, "f"), 2 * 3 * 2);
}

/// Test style and texture options
#[test]
fn test_textured_classic() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("drawing.png"), 3, 3);
    generate_texture_png(&dir.path().join("paper.png"));

    let out = run_mharender(
        dir.path(),
        &[
            "drawing.png",
            "--style",
            "classic",
            "--texture",
            "paper.png",
            "--output",
            "model.obj",
        ],
    );
    assert!(out.status.success(), "mharender failed: {:?}", out);

    let obj = std::fs::read_to_string(dir.path().join("model.obj")).unwrap();
    assert_eq!(count_records(&obj, "vt"), 9);
    assert!(obj.contains("f 1/1 4/4 5/5"));
    // Center pixel is white: z = 1.0 * 0.5
    assert!(obj.lines().any(|l| l == "v 1.0 1.0 0.5"));
    assert!(!dir.path().join("model.mtl").exists());
}

/// Test the .mtl sidecar
#[test]
fn test_material_sidecar() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("drawing.png"), 3, 3);
    generate_texture_png(&dir.path().join("paper.png"));

    let out = run_mharender(
        dir.path(),
        &["drawing.png", "-t", "paper.png", "-o", "model.obj", "--material"],
    );
    assert!(out.status.success(), "mharender failed: {:?}", out);

    let obj = std::fs::read_to_string(dir.path().join("model.obj")).unwrap();
    assert!(obj.starts_with("mtllib model.mtl\n"));
    let mtl = std::fs::read_to_string(dir.path().join("model.mtl")).unwrap();
    assert!(mtl.contains("map_Kd paper.png"));
}

/// The .mtl refers to the texture from its own directory
#[test]
fn test_material_sidecar_in_subdirectory() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("drawing.png"), 3, 3);
    generate_texture_png(&dir.path().join("paper.png"));
    std::fs::create_dir(dir.path().join("out")).unwrap();

    let out = run_mharender(
        dir.path(),
        &["drawing.png", "-t", "paper.png", "-o", "out/model.obj", "--material"],
    );
    assert!(out.status.success(), "mharender failed: {:?}", out);

    let out_dir = dir.path().join("out");
    let mtl = std::fs::read_to_string(out_dir.join("model.mtl")).unwrap();
    let map_kd = mtl
        .lines()
        .find_map(|l| l.strip_prefix("map_Kd "))
        .expect("missing map_Kd");
    assert!(out_dir.join(map_kd).is_file(), "map_Kd {} does not resolve", map_kd);
}

/// A broken texture is a warning, not a failure
#[test]
fn test_broken_texture_warns() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("drawing.png"), 3, 3);
    std::fs::write(dir.path().join("broken.png"), b"garbage").unwrap();

    let out = run_mharender(
        dir.path(),
        &["drawing.png", "--texture", "broken.png", "-o", "model.obj"],
    );
    assert!(out.status.success(), "mharender failed: {:?}", out);
    assert!(String::from_utf8_lossy(&out.stderr).contains("warning"));

    let obj = std::fs::read_to_string(dir.path().join("model.obj")).unwrap();
    assert_eq!(count_records(&obj, "vt"), 0);
    assert!(obj.contains("f 1 4 5"));
}

/// Single-row images cannot be triangulated
#[test]
fn test_single_row_fails() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("row.png"), 5, 1);

    let out = run_mharender(dir.path(), &["row.png", "-o", "row.obj"]);
    assert!(!out.status.success());
    assert!(!dir.path().join("row.obj").exists());
}

/// Vector formats are rejected explicitly
#[test]
fn test_pdf_rejected() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("plan.pdf"), b"%PDF-1.4").unwrap();

    let out = run_mharender(dir.path(), &["plan.pdf"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported input format"));
    assert!(!dir.path().join("output.obj").exists());
}

/// Unknown styles never reach the converter
#[test]
fn test_unknown_style_rejected() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("drawing.png"), 3, 3);

    let out = run_mharender(dir.path(), &["drawing.png", "--style", "baroque"]);
    assert!(!out.status.success());
    assert!(!dir.path().join("output.obj").exists());
}

/// Same input twice -> identical bytes
#[test]
fn test_idempotent_output() {
    let dir = tempdir().unwrap();
    generate_drawing_png(&dir.path().join("drawing.png"), 16, 9);

    for name in ["a.obj", "b.obj"] {
        let out = run_mharender(dir.path(), &["drawing.png", "-s", "nostalgic", "-o", name]);
        assert!(out.status.success(), "mharender failed: {:?}", out);
    }
    assert_eq!(
        std::fs::read(dir.path().join("a.obj")).unwrap(),
        std::fs::read(dir.path().join("b.obj")).unwrap()
    );
}
