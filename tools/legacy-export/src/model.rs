//! Scene converter (TOML scene -> .cobj)

use anyhow::{Context, Result};
use legacy_common::{EncodedModel, Platform};
use std::path::Path;

use crate::scene::load_scene;

/// Convert a scene file to an in-memory encoded model
pub fn convert_scene_to_memory(input: &Path, platform: Platform) -> Result<EncodedModel> {
    let scene = load_scene(input)?;
    let mut model = scene
        .to_model()
        .with_context(|| format!("Invalid scene: {:?}", input))?;
    let encoded = model
        .encode(platform)
        .with_context(|| format!("Failed to encode model: {:?}", input))?;

    for warning in &encoded.warnings {
        tracing::warn!("{:?}: {}", input, warning);
    }
    Ok(encoded)
}

/// Convert a scene file to an object model for `platform`
pub fn convert_scene(input: &Path, output: &Path, platform: Platform) -> Result<()> {
    let encoded = convert_scene_to_memory(input, platform)?;
    std::fs::write(output, &encoded.bytes)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!(
        "Converted model ({}): {} bytes, {} alignment warnings",
        platform,
        encoded.bytes.len(),
        encoded.warnings.len()
    );
    Ok(())
}
