//! legacy-export - legacy runtime asset export tool
//!
//! Converts scene descriptions and images to the platform binary formats
//! (.cobj, .cbmp, .pfnt, .anm)

use anyhow::Result;
use clap::{Parser, Subcommand};
use legacy_common::Platform;
use legacy_common::formats::{ANIMATION_EXT, BITMAP_EXT, FONT_EXT, MODEL_EXT};
use std::path::PathBuf;

// Use modules from library
use legacy_export::{anim, bitmap, font, manifest, model};

#[derive(Parser)]
#[command(name = "legacy-export")]
#[command(about = "Legacy runtime asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets from a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target platform for entries without their own (overrides manifest)
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },

    /// Export a single scene file as an object model
    Model {
        /// Input scene (.toml)
        input: PathBuf,

        /// Output .cobj file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target platform (playstation, windows, macintosh)
        #[arg(short, long, default_value = "windows")]
        platform: Platform,
    },

    /// Export a single 256x256 image as a bitmap
    Bitmap {
        /// Input PNG/JPG file
        input: PathBuf,

        /// Output .cbmp file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target platform (playstation, windows, macintosh)
        #[arg(short, long, default_value = "windows")]
        platform: Platform,
    },

    /// Export a bitmap font from a glyph table
    Font {
        /// Input glyph table (.toml)
        input: PathBuf,

        /// Output .pfnt file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target platform (playstation, windows, macintosh)
        #[arg(short, long, default_value = "windows")]
        platform: Platform,
    },

    /// Export a directory of 64x48 PNG frames as an animation strip
    Anim {
        /// Input frame directory
        input: PathBuf,

        /// Output .anm file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target platform (playstation, windows, macintosh)
        #[arg(short, long, default_value = "windows")]
        platform: Platform,

        /// Only use the first N frames
        #[arg(short, long)]
        frames: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            platform,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building assets from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref(), platform)?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Model {
            input,
            output,
            platform,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(MODEL_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            model::convert_scene(&input, &output, platform)?;
            tracing::info!("Done!");
        }

        Commands::Bitmap {
            input,
            output,
            platform,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(BITMAP_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            bitmap::convert_image(&input, &output, platform)?;
            tracing::info!("Done!");
        }

        Commands::Font {
            input,
            output,
            platform,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(FONT_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            font::convert_font(&input, &output, platform)?;
            tracing::info!("Done!");
        }

        Commands::Anim {
            input,
            output,
            platform,
            frames,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(ANIMATION_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            anim::convert_strip(&input, &output, platform, frames)?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
