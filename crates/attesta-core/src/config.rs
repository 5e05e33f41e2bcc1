// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compression pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::types::{CompressionBudget, PaperSize, Quality};

/// Tunables for the adaptive compression pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Target maximum size for each compressed asset.
    pub budget: CompressionBudget,
    /// Quality the image-family ladder starts at.
    pub image_start_quality: Quality,
    /// Quality the document-family ladder starts at.
    pub document_start_quality: Quality,
    /// Percentage points removed per ladder rung.
    pub quality_step: u8,
    /// Minimum quality below which further compression is not attempted.
    pub quality_floor: Quality,
    /// Canonical page size for re-wrapped document output.
    pub page_size: PaperSize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            budget: CompressionBudget::default(),
            image_start_quality: Quality::new(90),
            document_start_quality: Quality::new(70),
            quality_step: 5,
            quality_floor: Quality::new(30),
            page_size: PaperSize::A4,
        }
    }
}
