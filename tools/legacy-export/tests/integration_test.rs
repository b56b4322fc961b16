//! Integration tests for legacy-export
//!
//! Tests the full pipeline: write test inputs -> convert -> verify output

use std::path::Path;
use tempfile::tempdir;

const CUBE_SCENE: &str = r#"
[[face_types]]
color = [255, 128, 0]

[[primitives]]
kind = "quad"
face_type = 0
vertices = [0, 1, 3, 2]
normals = [0, 0, 0, 0]
material = 2

[[primitives]]
kind = "quad"
face_type = 0
vertices = [4, 6, 7, 5]
normals = [1, 1, 1, 1]

[[frames]]
positions = [
    [-256, -256, -256], [-256, -256, 256], [-256, 256, -256], [-256, 256, 256],
    [256, -256, -256], [256, -256, 256], [256, 256, -256], [256, 256, 256],
]
normals = [[-4096, 0, 0], [4096, 0, 0]]

[[frames]]
positions = [
    [-300, -256, -256], [-300, -256, 256], [-300, 256, -256], [-300, 256, 256],
    [300, -256, -256], [300, -256, 256], [300, 256, -256], [300, 256, 256],
]
normals = [[-4096, 0, 0], [4096, 0, 0]]

[[attachments]]
position = [256, 256, 256]
"#;

/// Chunk tags of a chunked file, read in `big_endian` order
fn chunk_tags(data: &[u8], big_endian: bool) -> Vec<String> {
    let mut tags = Vec::new();
    let mut offset = 0;
    while offset + 8 <= data.len() {
        let mut tag = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
        let mut length = [
            data[offset + 4],
            data[offset + 5],
            data[offset + 6],
            data[offset + 7],
        ];
        if !big_endian {
            tag.reverse();
            length.reverse();
        }
        tags.push(String::from_utf8_lossy(&tag).into_owned());
        offset += u32::from_be_bytes(length) as usize;
    }
    assert_eq!(offset, data.len(), "chunks should cover the whole file");
    tags
}

fn run_export(args: &[&str]) {
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_legacy-export"))
        .args(args)
        .status()
        .expect("Failed to run legacy-export");
    assert!(status.success(), "legacy-export {:?} failed", args);
}

fn run_export_expect_failure(args: &[&str]) {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_legacy-export"))
        .args(args)
        .output()
        .expect("Failed to run legacy-export");
    assert!(!output.status.success(), "legacy-export {:?} should fail", args);
}

fn write_bitmap_png(path: &Path) {
    // Left half opaque red, right half transparent
    let img = image::RgbaImage::from_fn(256, 256, |x, _| {
        if x < 128 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    img.save(path).expect("Failed to write PNG");
}

fn write_frames(dir: &Path, count: usize) {
    std::fs::create_dir_all(dir).expect("Failed to create frame dir");
    for i in 0..count {
        let img = image::RgbaImage::from_fn(64, 48, |x, y| {
            if (x + y) as usize % (i + 2) == 0 {
                image::Rgba([0, 0, 0, 0])
            } else {
                image::Rgba([(x * 4) as u8, (y * 5) as u8, 64 * i as u8, 255])
            }
        });
        img.save(dir.join(format!("{:04}.png", i + 1)))
            .expect("Failed to write frame");
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_scene_to_model() {
    let dir = tempdir().expect("Failed to create temp dir");
    let scene = dir.path().join("cube.toml");
    let output = dir.path().join("cube.cobj");
    std::fs::write(&scene, CUBE_SCENE).unwrap();

    run_export(&[
        "model",
        path_str(&scene),
        "-o",
        path_str(&output),
        "--platform",
        "mac",
    ]);

    let data = std::fs::read(&output).expect("Failed to read model");
    assert_eq!(data.len() % 4, 0);
    assert_eq!(&data[0..4], b"4DGI");
    assert_eq!(
        chunk_tags(&data, true),
        vec![
            "4DGI", "3DTL", "3DQL", "3DRF", "3DRF", "3DRF", "4DVL", "4DVL", "4DNL", "4DNL",
            "3DRL", "3DRL", "3DBB", "AnmD"
        ]
    );

    // Two frames, Macintosh platform byte
    assert_eq!(&data[12..14], &[0, 2]);
    assert_eq!(data[14], 2);
    // Corner 7 moves in frame 1, so the attachment gets its own position
    assert_eq!(&data[48..52], &[8, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_model_default_output_and_platforms() {
    let dir = tempdir().expect("Failed to create temp dir");
    let scene = dir.path().join("cube.toml");
    std::fs::write(&scene, CUBE_SCENE).unwrap();

    run_export(&["model", path_str(&scene), "--platform", "playstation"]);
    let ps = std::fs::read(dir.path().join("cube.cobj")).expect("Failed to read model");
    run_export(&["model", path_str(&scene), "--platform", "windows"]);
    let pc = std::fs::read(dir.path().join("cube.cobj")).expect("Failed to read model");

    assert_eq!(&pc[0..4], b"IGD4");
    assert_eq!(ps.len(), pc.len());
    assert_eq!(ps[14], 0);
    assert_eq!(pc[14], 1);
}

#[test]
fn test_invalid_scene_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let scene = dir.path().join("bad.toml");
    std::fs::write(
        &scene,
        r#"
        [[primitives]]
        kind = "quad"
        face_type = 3

        [[frames]]
        positions = [[0, 0, 0]]
        "#,
    )
    .unwrap();

    run_export_expect_failure(&["model", path_str(&scene)]);
    assert!(!dir.path().join("bad.cobj").exists());
}

#[test]
fn test_png_to_bitmap() {
    let dir = tempdir().expect("Failed to create temp dir");
    let png = dir.path().join("hull.png");
    write_bitmap_png(&png);

    let ps_out = dir.path().join("hull_ps.cbmp");
    run_export(&[
        "bitmap",
        path_str(&png),
        "-o",
        path_str(&ps_out),
        "-p",
        "playstation",
    ]);
    let ps = std::fs::read(&ps_out).expect("Failed to read bitmap");
    assert_eq!(chunk_tags(&ps, false), vec!["CCB ", "PDAT", "PLUT"]);
    // First row: 128 red pixels then 128 transparent
    let indices = &ps[8 + 0x44 + 8..];
    let red = indices[0];
    assert_ne!(red, 0);
    assert!(indices[..128].iter().all(|&i| i == red));
    assert!(indices[128..256].iter().all(|&i| i == 0));

    let mac_out = dir.path().join("hull_mac.cbmp");
    run_export(&[
        "bitmap",
        path_str(&png),
        "-o",
        path_str(&mac_out),
        "-p",
        "macintosh",
    ]);
    let mac = std::fs::read(&mac_out).expect("Failed to read bitmap");
    assert_eq!(chunk_tags(&mac, true), vec!["CCB ", "LkUp", "PX16", "PLUT"]);
}

#[test]
fn test_wrong_size_bitmap_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let png = dir.path().join("small.png");
    image::RgbaImage::from_pixel(16, 16, image::Rgba([1, 2, 3, 255]))
        .save(&png)
        .unwrap();
    run_export_expect_failure(&["bitmap", path_str(&png)]);
}

#[test]
fn test_font() {
    let dir = tempdir().expect("Failed to create temp dir");
    let sheet = dir.path().join("glyphs.png");
    image::GrayImage::from_fn(256, 8, |x, _| image::Luma([if x < 2 { 255 } else { 0 }]))
        .save(&sheet)
        .unwrap();
    let description = dir.path().join("small.toml");
    std::fs::write(
        &description,
        r#"
        sheet = "glyphs.png"

        [[glyphs]]
        code = "A"
        width = 2
        height = 8
        left = 0
        top = 0
        x_advance = 3
        "#,
    )
    .unwrap();

    run_export(&["font", path_str(&description)]);
    let data = std::fs::read(dir.path().join("small.pfnt")).expect("Failed to read font");
    assert_eq!(&data[0..4], &0x5054_4E46u32.to_le_bytes());
    assert_eq!(&data[10..12], &[1, 0]);
    assert_eq!(data[0x20], b'A');
    // Image starts after the image header at 0x30
    assert_eq!(data[0x40], 0xFF);
    assert_eq!(data[0x41], 0x00);
    assert_eq!(data.len(), 0x40 + 128 * 8);
}

#[test]
fn test_animation_strip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let frames = dir.path().join("boom");
    write_frames(&frames, 3);
    let output = dir.path().join("boom.anm");

    run_export(&[
        "anim",
        path_str(&frames),
        "-o",
        path_str(&output),
        "--frames",
        "2",
    ]);
    let data = std::fs::read(&output).expect("Failed to read strip");
    assert_eq!(data.len(), 4 + 512 + 2 * 64 * 48);
    assert_eq!(&data[0..4], &[2, 0, 0, 0]);
    // Pixel (0, 0) of frame 0 is transparent
    assert_eq!(data[4 + 512], 0);
    assert_ne!(data[4 + 512 + 1], 0);
}

#[test]
fn test_build_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    std::fs::write(root.join("cube.toml"), CUBE_SCENE).unwrap();
    write_bitmap_png(&root.join("hull.png"));
    write_frames(&root.join("boom"), 2);

    let manifest = root.join("assets.toml");
    std::fs::write(
        &manifest,
        format!(
            r#"
            [output]
            dir = "{out}"
            platform = "macintosh"

            [models]
            cube = "{cube}"
            cube_ps = {{ path = "{cube}", platform = "playstation" }}

            [bitmaps]
            hull = "{hull}"

            [animations]
            boom = {{ path = "{boom}", frames = 1 }}
            "#,
            out = root.join("out").display(),
            cube = root.join("cube.toml").display(),
            hull = root.join("hull.png").display(),
            boom = root.join("boom").display(),
        ),
    )
    .unwrap();

    run_export(&["check", path_str(&manifest)]);
    run_export(&["build", path_str(&manifest)]);

    let out = root.join("out");
    let cube = std::fs::read(out.join("cube.cobj")).expect("Failed to read model");
    let cube_ps = std::fs::read(out.join("cube_ps.cobj")).expect("Failed to read model");
    assert_eq!(&cube[0..4], b"4DGI");
    assert_eq!(&cube_ps[0..4], b"IGD4");
    assert!(out.join("hull.cbmp").exists());
    let boom = std::fs::read(out.join("boom.anm")).expect("Failed to read strip");
    assert_eq!(&boom[0..4], &[0, 0, 0, 1]);
}

#[test]
fn test_check_missing_source_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = dir.path().join("assets.toml");
    std::fs::write(&manifest, "[models]\nghost = \"nowhere/ghost.toml\"\n").unwrap();
    run_export_expect_failure(&["check", path_str(&manifest)]);
}
