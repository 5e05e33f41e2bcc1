// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// attesta-compress — Adaptive size-budget compression for certificate assets.
//
// Provides the quality-ladder retry loop (`AdaptiveCompressor`), the codec
// capability seams (`Rasterizer`, `Encoder`) with concrete image and PDF
// backends, and aggregate batch reporting.

pub mod codec;
pub mod compressor;
pub mod ladder;
pub mod report;

// Re-export the primary types so callers can use `attesta_compress::AdaptiveCompressor` etc.
pub use codec::pdf::{PdfPageEncoder, PdfRasterizer};
pub use codec::raster::{ImageRasterizer, JpegSurfaceEncoder};
pub use codec::{Encoder, FamilyCodec, Rasterizer};
pub use compressor::AdaptiveCompressor;
pub use ladder::QualityLadder;
pub use report::BatchReport;
