// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-family codec backends built on `lopdf`.
//
// Rasterization is best-effort: it extracts the largest embedded image
// XObject from the document, which covers the single-page image-backed
// certificates this pipeline produces and consumes. Vector or multi-page
// PDFs carry no extractable raster and fail decode; the compressor then
// degrades to the original asset.

use attesta_core::error::{AttestaError, Result};
use attesta_core::types::{MediaType, PaperSize, Quality};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::raster::encode_jpeg;
use super::{Encoder, Rasterizer};

/// Extracts the dominant raster image from a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRasterizer;

impl Rasterizer for PdfRasterizer {
    fn rasterize(&self, data: &[u8]) -> Result<DynamicImage> {
        let doc = Document::load_mem(data)
            .map_err(|err| AttestaError::Decode(format!("failed to load PDF: {}", err)))?;

        // The page background of an image-backed certificate is by far the
        // largest stream, so pick the image XObject with the most content.
        let mut best: Option<(usize, ObjectId)> = None;
        for (id, object) in doc.objects.iter() {
            if let Object::Stream(stream) = object
                && is_image_stream(stream)
            {
                let len = stream.content.len();
                if best.is_none_or(|(best_len, _)| len > best_len) {
                    best = Some((len, *id));
                }
            }
        }

        let Some((_, id)) = best else {
            return Err(AttestaError::Decode(
                "document contains no raster image stream".to_string(),
            ));
        };

        match doc.objects.get(&id) {
            Some(Object::Stream(stream)) => decode_image_stream(stream),
            _ => Err(AttestaError::Decode(format!(
                "image object {:?} vanished during decode",
                id
            ))),
        }
    }
}

fn is_image_stream(stream: &Stream) -> bool {
    stream
        .dict
        .get(b"Subtype")
        .ok()
        .and_then(|obj| obj.as_name().ok())
        .is_some_and(|name| name == b"Image")
}

/// Decode an image XObject stream into a surface.
///
/// DCTDecode content is handed to the `image` crate as-is; FlateDecode (or
/// unfiltered) content is interpreted through the Width/Height/ColorSpace
/// entries. Exotic color spaces fall back to content sniffing.
fn decode_image_stream(stream: &Stream) -> Result<DynamicImage> {
    if has_dct_filter(stream) {
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        return image::load_from_memory(&content)
            .map_err(|err| AttestaError::Decode(format!("failed to decode DCT stream: {}", err)));
    }

    let content = stream.decompressed_content().map_err(|err| {
        AttestaError::Decode(format!("failed to decompress image stream: {}", err))
    })?;

    let width = dict_u32(stream, b"Width");
    let height = dict_u32(stream, b"Height");
    let color_space = stream
        .dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|obj| obj.as_name().ok())
        .map(<[u8]>::to_vec);

    let pixels = (width as usize) * (height as usize);
    match color_space.as_deref() {
        Some(b"DeviceGray") => gray_from_raw(width, height, content),
        Some(b"DeviceRGB") => rgb_from_raw(width, height, content),
        _ if content.len() == pixels => gray_from_raw(width, height, content),
        _ if content.len() == pixels * 3 => rgb_from_raw(width, height, content),
        _ => image::load_from_memory(&content).map_err(|err| {
            AttestaError::Decode(format!("unrecognised image stream layout: {}", err))
        }),
    }
}

fn has_dct_filter(stream: &Stream) -> bool {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => name == b"DCTDecode",
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|obj| matches!(obj, Object::Name(name) if name == b"DCTDecode")),
        _ => false,
    }
}

fn dict_u32(stream: &Stream, key: &[u8]) -> u32 {
    stream
        .dict
        .get(key)
        .ok()
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0) as u32
}

fn gray_from_raw(width: u32, height: u32, content: Vec<u8>) -> Result<DynamicImage> {
    image::GrayImage::from_raw(width, height, content)
        .map(DynamicImage::ImageLuma8)
        .ok_or_else(|| AttestaError::Decode("grayscale buffer does not match dimensions".into()))
}

fn rgb_from_raw(width: u32, height: u32, content: Vec<u8>) -> Result<DynamicImage> {
    image::RgbImage::from_raw(width, height, content)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| AttestaError::Decode("RGB buffer does not match dimensions".into()))
}

/// Re-wraps a surface, JPEG-encoded at the requested quality, into a
/// single-page PDF sized to a canonical page.
///
/// The JPEG bytes are embedded verbatim as a DCTDecode stream, so document
/// size tracks the quality parameter the ladder turns.
#[derive(Debug, Clone, Copy)]
pub struct PdfPageEncoder {
    page_size: PaperSize,
}

impl PdfPageEncoder {
    pub fn new(page_size: PaperSize) -> Self {
        Self { page_size }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }
}

/// Page margin in millimetres around the placed image.
const PAGE_MARGIN_MM: f32 = 15.0;

impl Encoder for PdfPageEncoder {
    fn encode(&self, raster: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
        let jpeg = encode_jpeg(raster, quality)?;

        let (page_w, page_h) = self.page_size.dimensions_pt();
        let margin_pt = PAGE_MARGIN_MM * 72.0 / 25.4;
        let usable_w = page_w - 2.0 * margin_pt;
        let usable_h = page_h - 2.0 * margin_pt;

        // Scale to fit the usable box, preserving aspect ratio, centred.
        let img_w = raster.width() as f32;
        let img_h = raster.height() as f32;
        let scale = (usable_w / img_w).min(usable_h / img_h);
        let draw_w = img_w * scale;
        let draw_h = img_h * scale;
        let x_offset = margin_pt + (usable_w - draw_w) / 2.0;
        let y_offset = margin_pt + (usable_h - draw_h) / 2.0;

        let mut doc = Document::with_version("1.5");

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width() as i64,
                "Height" => raster.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            jpeg,
        );
        let image_id = doc.add_object(image_stream);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        draw_w.into(),
                        0f32.into(),
                        0f32.into(),
                        draw_h.into(),
                        x_offset.into(),
                        y_offset.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|err| AttestaError::Pdf(format!("failed to encode page content: {}", err)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0f32.into(), 0f32.into(), page_w.into(), page_h.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => Object::Reference(image_id) },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|err| AttestaError::Pdf(format!("failed to serialise document: {}", err)))?;
        Ok(output)
    }

    fn media_type(&self) -> MediaType {
        MediaType::Pdf
    }
}
