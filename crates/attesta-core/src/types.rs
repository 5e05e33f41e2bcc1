// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Attesta compression pipeline.

use std::num::NonZeroU32;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Unique identifier for an asset passing through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse media category deciding which encode strategy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaFamily {
    /// Rasterizable images — re-encoded as lossy JPEG.
    Image,
    /// PDF-like documents — rasterized and re-wrapped in a page container.
    Document,
    /// Everything else — passed through untouched.
    Unsupported,
}

/// Declared media type of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Jpeg,
    Png,
    Tiff,
    WebP,
    Pdf,
    /// Any other MIME type. `image/*` values still classify as the image
    /// family; everything else is unsupported.
    Other(String),
}

impl MediaType {
    /// MIME type string.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
            Self::Pdf => "application/pdf",
            Self::Other(mime) => mime,
        }
    }

    /// Parse a MIME string into a media type. Unknown values are preserved
    /// verbatim in `Other` so family classification can still inspect them.
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/tiff" => Self::Tiff,
            "image/webp" => Self::WebP,
            "application/pdf" => Self::Pdf,
            other => Self::Other(other.to_string()),
        }
    }

    /// Infer media type from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Preferred file extension for this media type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff => "tif",
            Self::WebP => "webp",
            Self::Pdf => "pdf",
            Self::Other(_) => "bin",
        }
    }

    /// Classify into a compression family.
    pub fn family(&self) -> MediaFamily {
        match self {
            Self::Jpeg | Self::Png | Self::Tiff | Self::WebP => MediaFamily::Image,
            Self::Pdf => MediaFamily::Document,
            Self::Other(mime) if mime.starts_with("image/") => MediaFamily::Image,
            Self::Other(_) => MediaFamily::Unsupported,
        }
    }
}

/// An in-memory binary payload with a declared media type.
///
/// The payload lives behind an `Arc` so assets clone cheaply across the
/// batch fan-out and into blocking codec tasks. Immutable once built.
#[derive(Debug, Clone)]
pub struct Asset {
    id: AssetId,
    name: String,
    media_type: MediaType,
    data: Arc<[u8]>,
    sha256: String,
}

impl Asset {
    /// Build an asset from raw bytes, computing its SHA-256 digest.
    pub fn new(name: impl Into<String>, media_type: MediaType, data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let sha256 = sha256_hex(&data);
        Self {
            id: AssetId::new(),
            name: name.into(),
            media_type,
            data,
            sha256,
        }
    }

    /// Build the compressed counterpart of this asset: same identity and
    /// name, new media type and bytes, fresh digest.
    pub fn derived(&self, media_type: MediaType, data: Vec<u8>) -> Self {
        let data: Arc<[u8]> = data.into();
        let sha256 = sha256_hex(&data);
        Self {
            id: self.id,
            name: self.name.clone(),
            media_type,
            data,
            sha256,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Hex-encoded SHA-256 digest of the payload.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Target maximum size, in kilobytes, for a compressed asset.
///
/// Positivity is enforced by the `NonZeroU32` representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionBudget {
    kilobytes: NonZeroU32,
}

impl CompressionBudget {
    pub const DEFAULT_KILOBYTES: u32 = 200;

    pub fn from_kilobytes(kilobytes: NonZeroU32) -> Self {
        Self { kilobytes }
    }

    /// Fallible constructor for surfaces parsing plain integers.
    pub fn try_from_kilobytes(kilobytes: u32) -> Option<Self> {
        NonZeroU32::new(kilobytes).map(|kilobytes| Self { kilobytes })
    }

    pub fn kilobytes(&self) -> u32 {
        self.kilobytes.get()
    }

    pub fn as_bytes(&self) -> u64 {
        self.kilobytes.get() as u64 * 1024
    }
}

impl Default for CompressionBudget {
    fn default() -> Self {
        Self {
            kilobytes: NonZeroU32::new(Self::DEFAULT_KILOBYTES).expect("non-zero default"),
        }
    }
}

impl std::fmt::Display for CompressionBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} KB", self.kilobytes)
    }
}

/// Lossy-encode quality as an integer percentage in 1..=100.
///
/// Stored as a percent rather than a 0..1 float so the quality ladder can
/// step and compare without floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(percent: u8) -> Self {
        Self(percent.clamp(1, 100))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Quality as the 0..1 fraction lossy encoders are usually specified in.
    pub fn as_fraction(&self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Canonical page sizes for the document container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height). 1 pt = 1/72 inch.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w_mm, h_mm) = self.dimensions_mm();
        (mm_to_pt(w_mm), mm_to_pt(h_mm))
    }
}

fn mm_to_pt(mm: u32) -> f32 {
    mm as f32 * 72.0 / 25.4
}
