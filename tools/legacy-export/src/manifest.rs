//! Manifest parsing and build orchestration
//!
//! Parses assets.toml and coordinates asset conversion. Entries are built in
//! name order so repeated builds produce identical logs and outputs.
//!
//! ```toml
//! [output]
//! dir = "build/"
//! platform = "macintosh"
//!
//! [models]
//! ship = "scenes/ship.toml"
//!
//! [bitmaps]
//! hull = { path = "art/hull.png", platform = "playstation" }
//!
//! [animations]
//! explosion = { path = "frames/explosion", frames = 12 }
//! ```

use anyhow::{Context, Result};
use legacy_common::Platform;
use legacy_common::formats::{ANIMATION_EXT, BITMAP_EXT, FONT_EXT, MODEL_EXT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub models: BTreeMap<String, AssetEntry>,
    #[serde(default)]
    pub bitmaps: BTreeMap<String, AssetEntry>,
    #[serde(default)]
    pub fonts: BTreeMap<String, AssetEntry>,
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_platform")]
    pub platform: Platform,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            platform: default_platform(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

fn default_platform() -> Platform {
    Platform::Windows
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AssetEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        platform: Option<Platform>,
    },
}

impl AssetEntry {
    pub fn path(&self) -> &Path {
        match self {
            AssetEntry::Simple(p) => p,
            AssetEntry::Detailed { path, .. } => path,
        }
    }

    pub fn platform(&self) -> Option<Platform> {
        match self {
            AssetEntry::Simple(_) => None,
            AssetEntry::Detailed { platform, .. } => *platform,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AnimationEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        frames: Option<usize>,
        #[serde(default)]
        platform: Option<Platform>,
    },
}

impl AnimationEntry {
    pub fn path(&self) -> &Path {
        match self {
            AnimationEntry::Simple(p) => p,
            AnimationEntry::Detailed { path, .. } => path,
        }
    }

    pub fn frames(&self) -> Option<usize> {
        match self {
            AnimationEntry::Simple(_) => None,
            AnimationEntry::Detailed { frames, .. } => *frames,
        }
    }

    pub fn platform(&self) -> Option<Platform> {
        match self {
            AnimationEntry::Simple(_) => None,
            AnimationEntry::Detailed { platform, .. } => *platform,
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    // Check that all source files exist
    for (name, entry) in &manifest.models {
        if !entry.path().exists() {
            anyhow::bail!("Model '{}' source not found: {:?}", name, entry.path());
        }
    }
    for (name, entry) in &manifest.bitmaps {
        if !entry.path().exists() {
            anyhow::bail!("Bitmap '{}' source not found: {:?}", name, entry.path());
        }
    }
    for (name, entry) in &manifest.fonts {
        if !entry.path().exists() {
            anyhow::bail!("Font '{}' source not found: {:?}", name, entry.path());
        }
    }
    for (name, entry) in &manifest.animations {
        if !entry.path().is_dir() {
            anyhow::bail!(
                "Animation '{}' frame directory not found: {:?}",
                name,
                entry.path()
            );
        }
    }
    Ok(())
}

/// Build all assets from a manifest
pub fn build_all(
    manifest: &Manifest,
    output_override: Option<&Path>,
    platform_override: Option<Platform>,
) -> Result<()> {
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    let default_platform = platform_override.unwrap_or(manifest.output.platform);

    // Convert models
    for (name, entry) in &manifest.models {
        let output = output_dir.join(format!("{}.{}", name, MODEL_EXT));
        let platform = entry.platform().unwrap_or(default_platform);
        tracing::info!("Converting model: {} -> {:?}", name, output);
        crate::model::convert_scene(entry.path(), &output, platform)
            .with_context(|| format!("Model '{}'", name))?;
    }

    // Convert bitmaps
    for (name, entry) in &manifest.bitmaps {
        let output = output_dir.join(format!("{}.{}", name, BITMAP_EXT));
        let platform = entry.platform().unwrap_or(default_platform);
        tracing::info!("Converting bitmap: {} -> {:?}", name, output);
        crate::bitmap::convert_image(entry.path(), &output, platform)
            .with_context(|| format!("Bitmap '{}'", name))?;
    }

    // Convert fonts
    for (name, entry) in &manifest.fonts {
        let output = output_dir.join(format!("{}.{}", name, FONT_EXT));
        let platform = entry.platform().unwrap_or(default_platform);
        tracing::info!("Converting font: {} -> {:?}", name, output);
        crate::font::convert_font(entry.path(), &output, platform)
            .with_context(|| format!("Font '{}'", name))?;
    }

    // Convert animation strips
    for (name, entry) in &manifest.animations {
        let output = output_dir.join(format!("{}.{}", name, ANIMATION_EXT));
        let platform = entry.platform().unwrap_or(default_platform);
        tracing::info!("Converting animation strip: {} -> {:?}", name, output);
        crate::anim::convert_strip(entry.path(), &output, platform, entry.frames())
            .with_context(|| format!("Animation '{}'", name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let manifest: Manifest = toml::from_str(
            r#"
            [output]
            dir = "out"
            platform = "macintosh"

            [models]
            ship = "ship.toml"
            tank = { path = "tank.toml", platform = "playstation" }

            [animations]
            boom = { path = "boom", frames = 4 }
            "#,
        )
        .unwrap();

        assert_eq!(manifest.output.dir, PathBuf::from("out"));
        assert_eq!(manifest.output.platform, Platform::Macintosh);
        let names: Vec<&str> = manifest.models.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["ship", "tank"]);
        assert_eq!(manifest.models["ship"].platform(), None);
        assert_eq!(manifest.models["tank"].platform(), Some(Platform::Playstation));
        assert_eq!(manifest.models["tank"].path(), Path::new("tank.toml"));
        assert_eq!(manifest.animations["boom"].frames(), Some(4));
        assert!(manifest.bitmaps.is_empty());
    }

    #[test]
    fn test_defaults() {
        let manifest: Manifest = toml::from_str("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("assets/"));
        assert_eq!(manifest.output.platform, Platform::Windows);
    }

    #[test]
    fn test_validate_missing_source() {
        let manifest: Manifest = toml::from_str(
            r#"
            [fonts]
            small = "definitely/not/here.toml"
            "#,
        )
        .unwrap();
        let err = validate(&manifest).unwrap_err();
        assert!(err.to_string().contains("small"));
    }
}
