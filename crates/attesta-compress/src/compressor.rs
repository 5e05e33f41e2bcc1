// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive compressor — walks a descending quality ladder until an asset
// fits its size budget or the quality floor is reached. Compression is a
// best-effort optimisation: any internal failure degrades to returning the
// original asset, never an error.

use std::sync::Arc;

use attesta_core::config::CompressionConfig;
use attesta_core::error::{AttestaError, Result};
use attesta_core::types::{Asset, MediaFamily};
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::codec::FamilyCodec;
use crate::codec::pdf::{PdfPageEncoder, PdfRasterizer};
use crate::codec::raster::{ImageRasterizer, JpegSurfaceEncoder};
use crate::ladder::QualityLadder;
use crate::report::BatchReport;

/// Size-budgeted re-encoder for image and document assets.
///
/// Holds one codec pair per media family. Cheap to clone; clones share the
/// configuration and codecs, so a single compressor can fan out across a
/// batch.
#[derive(Clone)]
pub struct AdaptiveCompressor {
    config: Arc<CompressionConfig>,
    image_codec: FamilyCodec,
    document_codec: FamilyCodec,
}

impl AdaptiveCompressor {
    /// Wire the concrete backends: `image`-crate decode + JPEG encode for
    /// the image family, lopdf extract + single-page re-wrap for documents.
    pub fn new(config: CompressionConfig) -> Self {
        let document_codec = FamilyCodec::new(PdfRasterizer, PdfPageEncoder::new(config.page_size));
        Self {
            image_codec: FamilyCodec::new(ImageRasterizer, JpegSurfaceEncoder),
            document_codec,
            config: Arc::new(config),
        }
    }

    /// Inject arbitrary codec pairs, keeping the retry-budget algorithm
    /// independent of any concrete decode/encode backend.
    pub fn with_codecs(
        config: CompressionConfig,
        image_codec: FamilyCodec,
        document_codec: FamilyCodec,
    ) -> Self {
        Self {
            config: Arc::new(config),
            image_codec,
            document_codec,
        }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress one asset towards the configured budget.
    ///
    /// Returns the asset unchanged when it already fits, when its media
    /// type is unsupported, when re-encoding cannot shrink it, or when any
    /// decode/encode step fails. The output is never larger than the input.
    #[instrument(skip(self, asset), fields(asset = %asset.id(), name = %asset.name(), bytes = asset.byte_len()))]
    pub async fn compress(&self, asset: Asset) -> Asset {
        if asset.byte_len() <= self.config.budget.as_bytes() {
            debug!(budget = %self.config.budget, "asset already within budget");
            return asset;
        }

        let (codec, start_quality) = match asset.media_type().family() {
            MediaFamily::Image => (&self.image_codec, self.config.image_start_quality),
            MediaFamily::Document => (&self.document_codec, self.config.document_start_quality),
            MediaFamily::Unsupported => {
                debug!(
                    media = asset.media_type().mime_type(),
                    "unsupported media type, passing through"
                );
                return asset;
            }
        };

        let ladder = QualityLadder::descending(
            start_quality,
            self.config.quality_floor,
            self.config.quality_step,
        );

        match self.attempt(&asset, codec, &ladder).await {
            Ok(best) if (best.len() as u64) < asset.byte_len() => {
                info!(
                    compressed_bytes = best.len(),
                    media = codec.output_media_type().mime_type(),
                    "asset compressed"
                );
                asset.derived(codec.output_media_type(), best)
            }
            Ok(best) => {
                debug!(
                    attempt_bytes = best.len(),
                    "re-encoding did not shrink asset, keeping original"
                );
                asset
            }
            Err(err) => {
                warn!(%err, "compression failed, keeping original");
                asset
            }
        }
    }

    /// One compression run: rasterize once, then encode down the ladder,
    /// keeping the smallest attempt. Stops at the first rung that fits the
    /// budget; otherwise the ladder bounds the iteration count.
    ///
    /// Decode and encode are CPU-bound, so each step runs on the blocking
    /// pool and the caller suspends at each step boundary.
    async fn attempt(
        &self,
        asset: &Asset,
        codec: &FamilyCodec,
        ladder: &QualityLadder,
    ) -> Result<Vec<u8>> {
        let budget_bytes = self.config.budget.as_bytes();

        let rasterizer = codec.rasterizer();
        let input = asset.clone();
        let mut surface = task::spawn_blocking(move || rasterizer.rasterize(input.data()))
            .await
            .map_err(join_error)??;

        let mut best: Option<Vec<u8>> = None;
        for quality in ladder.iter() {
            let encoder = codec.encoder();
            let moved = surface;
            let (returned, encoded) = task::spawn_blocking(move || {
                let result = encoder.encode(&moved, quality);
                (moved, result)
            })
            .await
            .map_err(join_error)?;
            surface = returned;

            let encoded = encoded?;
            let fits = encoded.len() as u64 <= budget_bytes;
            debug!(quality = %quality, bytes = encoded.len(), fits, "encode attempt");

            if best.as_ref().is_none_or(|b| encoded.len() < b.len()) {
                best = Some(encoded);
            }
            if fits {
                break;
            }
        }

        best.ok_or_else(|| AttestaError::Encode("quality ladder produced no attempts".into()))
    }

    /// Compress a batch concurrently, preserving input order.
    ///
    /// Each element is its own failure domain: a panicked task degrades to
    /// that element's original asset without affecting siblings. Aggregate
    /// sizes are logged as an observability side effect.
    pub async fn compress_all(&self, assets: Vec<Asset>) -> Vec<Asset> {
        let original_sizes: Vec<u64> = assets.iter().map(Asset::byte_len).collect();

        let mut handles = Vec::with_capacity(assets.len());
        for asset in &assets {
            let compressor = self.clone();
            let asset = asset.clone();
            handles.push(tokio::spawn(async move { compressor.compress(asset).await }));
        }

        let mut outputs = Vec::with_capacity(handles.len());
        for (handle, original) in handles.into_iter().zip(assets) {
            match handle.await {
                Ok(compressed) => outputs.push(compressed),
                Err(err) => {
                    warn!(%err, asset = %original.id(), "compression task aborted, keeping original");
                    outputs.push(original);
                }
            }
        }

        let pairs: Vec<(u64, u64)> = original_sizes
            .into_iter()
            .zip(outputs.iter().map(Asset::byte_len))
            .collect();
        let report = BatchReport::from_sizes(&pairs);
        info!(
            assets = report.asset_count,
            original_bytes = report.original_bytes,
            compressed_bytes = report.compressed_bytes,
            percent_saved = report.percent_saved(),
            "batch compression complete"
        );

        outputs
    }
}

impl Default for AdaptiveCompressor {
    fn default() -> Self {
        Self::new(CompressionConfig::default())
    }
}

fn join_error(err: task::JoinError) -> AttestaError {
    AttestaError::Task(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use attesta_core::types::{CompressionBudget, MediaType, Quality};
    use image::DynamicImage;

    use crate::codec::{Encoder, Rasterizer};

    /// Rasterizer returning a tiny fixed surface, optionally refusing
    /// payloads whose first byte matches a marker.
    struct StubRasterizer {
        fail_marker: Option<u8>,
    }

    impl StubRasterizer {
        fn ok() -> Self {
            Self { fail_marker: None }
        }

        fn failing_on(marker: u8) -> Self {
            Self {
                fail_marker: Some(marker),
            }
        }
    }

    impl Rasterizer for StubRasterizer {
        fn rasterize(&self, data: &[u8]) -> attesta_core::error::Result<DynamicImage> {
            if self.fail_marker.is_some_and(|marker| data.first() == Some(&marker)) {
                return Err(AttestaError::Decode("stub refused payload".into()));
            }
            Ok(DynamicImage::new_rgb8(4, 4))
        }
    }

    /// Rasterizer that always fails.
    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn rasterize(&self, _data: &[u8]) -> attesta_core::error::Result<DynamicImage> {
            Err(AttestaError::Decode("decoder is broken".into()))
        }
    }

    /// Encoder producing blobs whose size is a pure function of the
    /// quality, recording every quality it is asked for.
    struct ScriptedEncoder {
        media: MediaType,
        size_for: fn(Quality) -> usize,
        calls: Mutex<Vec<Quality>>,
    }

    impl ScriptedEncoder {
        fn new(media: MediaType, size_for: fn(Quality) -> usize) -> Arc<Self> {
            Arc::new(Self {
                media,
                size_for,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<u8> {
            self.calls.lock().unwrap().iter().map(|q| q.percent()).collect()
        }
    }

    impl Encoder for ScriptedEncoder {
        fn encode(&self, _raster: &DynamicImage, quality: Quality) -> attesta_core::error::Result<Vec<u8>> {
            self.calls.lock().unwrap().push(quality);
            Ok(vec![0u8; (self.size_for)(quality)])
        }

        fn media_type(&self) -> MediaType {
            self.media.clone()
        }
    }

    fn compressor_with(
        encoder: Arc<ScriptedEncoder>,
        rasterizer: impl Rasterizer + 'static,
    ) -> AdaptiveCompressor {
        let codec = FamilyCodec::from_parts(Arc::new(rasterizer), encoder);
        AdaptiveCompressor::with_codecs(CompressionConfig::default(), codec.clone(), codec)
    }

    fn image_asset(name: &str, size: usize) -> Asset {
        Asset::new(name, MediaType::Png, vec![1u8; size])
    }

    // Size script: proportional to quality, so the ladder crosses the
    // 200 KB default budget exactly at quality 50 (50 * 4096 = 204800).
    fn proportional(quality: Quality) -> usize {
        quality.percent() as usize * 4096
    }

    fn constant_300k(_quality: Quality) -> usize {
        300 * 1024
    }

    fn constant_600k(_quality: Quality) -> usize {
        600 * 1024
    }

    fn panicking(_quality: Quality) -> usize {
        panic!("encoder exploded")
    }

    #[tokio::test]
    async fn under_budget_asset_is_returned_untouched() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let asset = image_asset("small", 10 * 1024);
        let digest = asset.sha256().to_string();
        let out = compressor.compress(asset).await;

        assert_eq!(out.sha256(), digest);
        assert_eq!(out.media_type(), &MediaType::Png);
        assert!(encoder.calls().is_empty(), "no encode iterations expected");
    }

    #[tokio::test]
    async fn ladder_stops_at_first_fitting_quality() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let out = compressor.compress(image_asset("big", 500 * 1024)).await;

        assert_eq!(encoder.calls(), vec![90, 85, 80, 75, 70, 65, 60, 55, 50]);
        assert_eq!(out.byte_len(), 204_800);
        assert_eq!(out.media_type(), &MediaType::Jpeg);
    }

    #[tokio::test]
    async fn image_ladder_is_bounded_by_floor() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, constant_300k);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let out = compressor.compress(image_asset("stubborn", 500 * 1024)).await;

        // Never fits the 200 KB budget, so every rung from 90 to 30 runs.
        let calls = encoder.calls();
        assert_eq!(calls.len(), 13);
        assert_eq!(calls.last(), Some(&30));
        // Best effort: over budget but still smaller than the original.
        assert_eq!(out.byte_len(), 300 * 1024);
    }

    #[tokio::test]
    async fn document_ladder_starts_lower_and_is_shorter() {
        let encoder = ScriptedEncoder::new(MediaType::Pdf, constant_300k);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let asset = Asset::new("cert.pdf", MediaType::Pdf, vec![2u8; 500 * 1024]);
        let out = compressor.compress(asset).await;

        let calls = encoder.calls();
        assert_eq!(calls.len(), 9);
        assert_eq!(calls.first(), Some(&70));
        assert_eq!(calls.last(), Some(&30));
        assert_eq!(out.media_type(), &MediaType::Pdf);
    }

    #[tokio::test]
    async fn output_is_never_larger_than_input() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, constant_600k);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let asset = image_asset("incompressible", 500 * 1024);
        let digest = asset.sha256().to_string();
        let out = compressor.compress(asset).await;

        // The encoder only inflates, so the original wins.
        assert_eq!(out.sha256(), digest);
        assert_eq!(out.byte_len(), 500 * 1024);
    }

    #[tokio::test]
    async fn broken_decoder_degrades_to_original() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        let compressor = compressor_with(encoder.clone(), BrokenRasterizer);

        let asset = image_asset("opaque", 500 * 1024);
        let digest = asset.sha256().to_string();
        let out = compressor.compress(asset).await;

        assert_eq!(out.sha256(), digest);
        assert!(encoder.calls().is_empty());
    }

    #[tokio::test]
    async fn panicking_encoder_degrades_to_original() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, panicking);
        let compressor = compressor_with(encoder, StubRasterizer::ok());

        let asset = image_asset("explosive", 500 * 1024);
        let digest = asset.sha256().to_string();
        let out = compressor.compress(asset).await;

        assert_eq!(out.sha256(), digest);
    }

    #[tokio::test]
    async fn unsupported_media_passes_through() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let asset = Asset::new(
            "notes.txt",
            MediaType::Other("text/plain".into()),
            vec![3u8; 500 * 1024],
        );
        let digest = asset.sha256().to_string();
        let out = compressor.compress(asset).await;

        assert_eq!(out.sha256(), digest);
        assert!(encoder.calls().is_empty());
    }

    #[tokio::test]
    async fn batch_preserves_order_and_isolates_failures() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        // Payloads starting with 0xFF refuse to decode.
        let compressor = compressor_with(encoder, StubRasterizer::failing_on(0xFF));

        let good = image_asset("good", 500 * 1024);
        let bad = Asset::new("bad", MediaType::Png, vec![0xFFu8; 400 * 1024]);
        let bad_digest = bad.sha256().to_string();

        let outputs = compressor.compress_all(vec![good, bad]).await;

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].name(), "good");
        assert_eq!(outputs[1].name(), "bad");
        // The good element shrank; the bad one came back byte-identical.
        assert_eq!(outputs[0].byte_len(), 204_800);
        assert_eq!(outputs[1].sha256(), bad_digest);
    }

    #[tokio::test]
    async fn compressing_an_already_compressed_asset_is_a_noop() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        let compressor = compressor_with(encoder.clone(), StubRasterizer::ok());

        let first = compressor.compress(image_asset("cert", 500 * 1024)).await;
        assert_eq!(first.byte_len(), 204_800);

        let calls_after_first = encoder.calls().len();
        let second = compressor.compress(first.clone()).await;

        assert_eq!(second.sha256(), first.sha256());
        assert_eq!(encoder.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn shrinking_budget_tightens_the_ladder_exit() {
        let encoder = ScriptedEncoder::new(MediaType::Jpeg, proportional);
        let mut config = CompressionConfig::default();
        config.budget = CompressionBudget::try_from_kilobytes(100).unwrap();
        let codec = FamilyCodec::from_parts(Arc::new(StubRasterizer::ok()), encoder.clone());
        let compressor = AdaptiveCompressor::with_codecs(config, codec.clone(), codec);

        let out = compressor.compress(image_asset("tight", 500 * 1024)).await;

        // 100 KB = 102400 bytes; proportional sizes first fit at quality 25,
        // which is below the floor, so the ladder runs out at 30.
        assert_eq!(encoder.calls().len(), 13);
        assert_eq!(out.byte_len(), 30 * 4096);
    }
}
