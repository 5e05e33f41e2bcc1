// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Attesta.

use thiserror::Error;

/// Top-level error type for all Attesta operations.
///
/// Note that `AdaptiveCompressor::compress` never surfaces these to its
/// caller — a failed compression degrades to returning the original asset.
/// The variants exist for the internal attempt pipeline and for surfaces
/// (CLI, config loading) where failure is a real outcome.
#[derive(Debug, Error)]
pub enum AttestaError {
    // -- Codec errors --
    #[error("raster decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    /// Media type outside the image/document families. Informational:
    /// the compressor passes such assets through rather than raising.
    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    // -- Runtime --
    #[error("background task failed: {0}")]
    Task(String),

    // -- I/O and config --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AttestaError>;
