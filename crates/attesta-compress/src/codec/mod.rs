// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec capability seams. The retry-budget algorithm only ever talks to a
// `Rasterizer` (bytes in, raster surface out) and an `Encoder` (surface plus
// quality in, encoded blob out), so concrete backends can be swapped without
// touching the loop.

use std::sync::Arc;

use attesta_core::error::Result;
use attesta_core::types::{MediaType, Quality};

pub mod pdf;
pub mod raster;

/// Turns raw asset bytes into a rasterizable surface.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, data: &[u8]) -> Result<image::DynamicImage>;
}

/// Turns a raster surface plus a quality parameter into an encoded blob of
/// a declared media type.
pub trait Encoder: Send + Sync {
    fn encode(&self, raster: &image::DynamicImage, quality: Quality) -> Result<Vec<u8>>;

    /// Media type of the blobs this encoder produces.
    fn media_type(&self) -> MediaType;
}

/// The injectable collaborator pair for one media family.
#[derive(Clone)]
pub struct FamilyCodec {
    rasterizer: Arc<dyn Rasterizer>,
    encoder: Arc<dyn Encoder>,
}

impl FamilyCodec {
    pub fn new(rasterizer: impl Rasterizer + 'static, encoder: impl Encoder + 'static) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            encoder: Arc::new(encoder),
        }
    }

    /// Build from already-shared trait objects (useful for tests that keep
    /// a handle on a recording backend).
    pub fn from_parts(rasterizer: Arc<dyn Rasterizer>, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            rasterizer,
            encoder,
        }
    }

    pub fn rasterizer(&self) -> Arc<dyn Rasterizer> {
        Arc::clone(&self.rasterizer)
    }

    pub fn encoder(&self) -> Arc<dyn Encoder> {
        Arc::clone(&self.encoder)
    }

    pub fn output_media_type(&self) -> MediaType {
        self.encoder.media_type()
    }
}
