// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Attesta CLI — compress certificate assets (images and PDFs) towards a
// size budget. Assets that cannot be shrunk are copied through unchanged;
// only I/O failures exit non-zero.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};

use attesta_compress::{AdaptiveCompressor, BatchReport};
use attesta_core::config::CompressionConfig;
use attesta_core::error::Result;
use attesta_core::types::{Asset, CompressionBudget, MediaType};

/// Adaptive size-budget compression for certificate assets.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input files (images or PDFs)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target size per asset, in kilobytes (default 200)
    #[arg(long)]
    budget_kb: Option<u32>,

    /// Directory for compressed output (defaults to each input's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// JSON file overriding the default compression configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(dir) = &args.out_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut assets = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let data = tokio::fs::read(path).await?;
        let media_type = sniff_media_type(path);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());
        info!(
            input = %path.display(),
            media = media_type.mime_type(),
            bytes = data.len(),
            "loaded asset"
        );
        assets.push(Asset::new(name, media_type, data));
    }

    let original_sizes: Vec<u64> = assets.iter().map(Asset::byte_len).collect();

    let compressor = AdaptiveCompressor::new(config);
    let outputs = compressor.compress_all(assets).await;

    for (path, output) in args.inputs.iter().zip(&outputs) {
        let target = output_path(path, args.out_dir.as_deref(), output.media_type());
        tokio::fs::write(&target, output.data()).await?;
        info!(
            output = %target.display(),
            bytes = output.byte_len(),
            sha256 = output.sha256(),
            "wrote asset"
        );
    }

    let pairs: Vec<(u64, u64)> = original_sizes
        .into_iter()
        .zip(outputs.iter().map(Asset::byte_len))
        .collect();
    println!("{}", BatchReport::from_sizes(&pairs));

    Ok(())
}

fn load_config(args: &Args) -> Result<CompressionConfig> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => CompressionConfig::default(),
    };

    if let Some(kilobytes) = args.budget_kb {
        match CompressionBudget::try_from_kilobytes(kilobytes) {
            Some(budget) => config.budget = budget,
            None => warn!(
                "--budget-kb must be positive, keeping {}",
                config.budget
            ),
        }
    }

    Ok(config)
}

/// Media type from the file extension. Unknown extensions become an opaque
/// type that the compressor passes through untouched.
fn sniff_media_type(path: &Path) -> MediaType {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaType::from_extension)
        .unwrap_or_else(|| MediaType::Other("application/octet-stream".to_string()))
}

/// Output path: `<stem>.compressed.<ext>`, next to the input unless an
/// output directory is given. Pass-through assets keep their original
/// extension.
fn output_path(input: &Path, out_dir: Option<&Path>, media_type: &MediaType) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());

    let extension = match media_type {
        MediaType::Other(_) => input
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_string(),
        known => known.extension().to_string(),
    };

    let file_name = format!("{}.compressed.{}", stem, extension);
    match out_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}
