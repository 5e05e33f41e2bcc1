// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-family codec backends built on the `image` crate.

use attesta_core::error::{AttestaError, Result};
use attesta_core::types::{MediaType, Quality};
use image::DynamicImage;

use super::{Encoder, Rasterizer};

/// Decodes any raster format the `image` crate recognises (JPEG, PNG, TIFF,
/// WebP, ...) by sniffing the byte content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRasterizer;

impl Rasterizer for ImageRasterizer {
    fn rasterize(&self, data: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(data)
            .map_err(|err| AttestaError::Decode(format!("failed to decode image: {}", err)))
    }
}

/// Re-encodes a surface as lossy JPEG at the requested quality.
///
/// Alpha is flattened by the RGB8 conversion; JPEG is the only
/// quality-parameterised output format in play.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegSurfaceEncoder;

impl Encoder for JpegSurfaceEncoder {
    fn encode(&self, raster: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
        encode_jpeg(raster, quality)
    }

    fn media_type(&self) -> MediaType {
        MediaType::Jpeg
    }
}

/// Encode a surface as JPEG bytes. Shared with the PDF page encoder, which
/// embeds the identical bytes as a DCTDecode stream.
pub(crate) fn encode_jpeg(raster: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = raster.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.percent());
    rgb.write_with_encoder(encoder)
        .map_err(|err| AttestaError::Encode(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}
