//! Image branch of the compressor: decode, fit inside the bounding box,
//! re-encode in the source format and swap the stored file for the
//! `compressed-` output.

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use tourmedia_core::constants::{MAX_IMAGE_HEIGHT, MAX_IMAGE_WIDTH};
use tourmedia_core::{CompressionFailureKind, CompressionResult, UploadedAsset};

use crate::output::{commit_output, compressed_sibling, copy_through, discard};
use crate::traits::MediaCompressor;

const JPEG_QUALITY: f32 = 85.0;
const WEBP_QUALITY: f32 = 90.0;

/// How a stored image is handled, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
    Png,
    WebP,
    /// Animated or vector formats, copied through without re-encoding.
    Passthrough,
}

impl ImageEncoding {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageEncoding::Jpeg),
            "png" => Some(ImageEncoding::Png),
            "webp" => Some(ImageEncoding::WebP),
            "gif" | "svg" => Some(ImageEncoding::Passthrough),
            _ => None,
        }
    }
}

/// Re-encoded bytes plus whether the pixels were downscaled.
#[derive(Debug)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub resized: bool,
    pub width: u32,
    pub height: u32,
}

/// Decode `data`, bound it to 3840x2160 (never enlarging) and re-encode.
pub fn reencode(data: &[u8], encoding: ImageEncoding) -> Result<EncodedImage> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let (img, resized) = fit_within(img, MAX_IMAGE_WIDTH, MAX_IMAGE_HEIGHT);
    let (width, height) = img.dimensions();

    let data = match encoding {
        ImageEncoding::Jpeg => encode_jpeg(&img)?,
        ImageEncoding::Png => encode_png(&img)?,
        ImageEncoding::WebP => encode_webp(&img),
        ImageEncoding::Passthrough => {
            return Err(anyhow!("passthrough formats are not re-encoded"))
        }
    };

    Ok(EncodedImage {
        data,
        resized,
        width,
        height,
    })
}

/// Scale down preserving aspect ratio so both sides fit; smaller images are untouched.
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> (DynamicImage, bool) {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return (img, false);
    }
    (img.resize(max_width, max_height, FilterType::Lanczos3), true)
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(JPEG_QUALITY);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(&rgb_img)?;
    Ok(comp.finish()?)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        &mut buffer,
        CompressionType::Best,
        PngFilterType::Adaptive,
    );
    img.write_with_encoder(encoder)?;
    Ok(buffer)
}

fn encode_webp(img: &DynamicImage) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let rgba_img = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    encoder.encode(WEBP_QUALITY).to_vec()
}

/// Image compressor
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor;

impl ImageCompressor {
    pub fn new() -> Self {
        Self
    }

    async fn reencode_file(
        &self,
        asset: &mut UploadedAsset,
        encoding: ImageEncoding,
        start: Instant,
    ) -> CompressionResult {
        let source = asset.stored_path.clone();
        let original_size = asset.size_bytes;
        let elapsed = || start.elapsed().as_millis() as u64;
        let fail = |error: String| {
            CompressionResult::failed(
                original_size,
                start.elapsed().as_millis() as u64,
                source.display().to_string(),
                CompressionFailureKind::ProcessingError,
                error,
            )
        };

        let data = match tokio::fs::read(&source).await {
            Ok(data) => data,
            Err(e) => return fail(format!("Failed to read image: {}", e)),
        };
        let source_len = data.len();

        // Image decode/encode is CPU-bound; run off the async pool.
        let encoded = match tokio::task::spawn_blocking(move || {
            reencode(&data, encoding).map(|encoded| (encoded, data))
        })
        .await
        {
            Ok(Ok(encoded)) => encoded,
            Ok(Err(e)) => return fail(format!("Image re-encode failed: {}", e)),
            Err(e) => return fail(format!("Image re-encode task failed: {}", e)),
        };
        let (encoded, data) = encoded;

        // Never grow an already-optimal file unless its pixels had to shrink.
        let (output_bytes, kept_source) = if !encoded.resized && encoded.data.len() >= source_len {
            (data, true)
        } else {
            (encoded.data, false)
        };

        let target = compressed_sibling(&source, None);
        if let Err(e) = tokio::fs::write(&target, &output_bytes).await {
            discard(&target).await;
            return fail(format!("Failed to write compressed image: {}", e));
        }

        let compressed_size = match commit_output(&source, &target).await {
            Ok(size) => size,
            Err(e) => return fail(format!("Failed to finalize compressed image: {}", e)),
        };

        tracing::info!(
            path = %target.display(),
            media_kind = "image",
            original_size = original_size,
            compressed_size = compressed_size,
            width = encoded.width,
            height = encoded.height,
            resized = encoded.resized,
            kept_source = kept_source,
            duration_ms = elapsed(),
            "Image compressed"
        );

        asset.stored_path = target.clone();
        asset.size_bytes = compressed_size;

        CompressionResult::succeeded(
            original_size,
            compressed_size,
            elapsed(),
            target.display().to_string(),
        )
    }

    async fn pass_through(&self, asset: &mut UploadedAsset, start: Instant) -> CompressionResult {
        let source = asset.stored_path.clone();
        let target = compressed_sibling(&source, None);

        match copy_through(&source, &target).await {
            Ok(size) => {
                tracing::debug!(
                    path = %target.display(),
                    mime_type = %asset.mime_type,
                    "Image format copied through without re-encoding"
                );
                asset.stored_path = target.clone();
                asset.size_bytes = size;
                CompressionResult::passed_through(
                    size,
                    start.elapsed().as_millis() as u64,
                    target.display().to_string(),
                    format!("{} is stored without re-encoding", asset.mime_type),
                )
            }
            Err(e) => CompressionResult::failed(
                asset.size_bytes,
                start.elapsed().as_millis() as u64,
                source.display().to_string(),
                CompressionFailureKind::ProcessingError,
                format!("Failed to copy image: {}", e),
            ),
        }
    }
}

#[async_trait]
impl MediaCompressor for ImageCompressor {
    async fn compress(&self, asset: &mut UploadedAsset) -> CompressionResult {
        let start = Instant::now();

        let result = match ImageEncoding::from_path(&asset.stored_path) {
            Some(ImageEncoding::Passthrough) => self.pass_through(asset, start).await,
            Some(encoding) => self.reencode_file(asset, encoding, start).await,
            None => CompressionResult::failed(
                asset.size_bytes,
                start.elapsed().as_millis() as u64,
                asset.stored_path.display().to_string(),
                CompressionFailureKind::ProcessingError,
                format!(
                    "Unsupported image extension: {}",
                    asset.stored_path.display()
                ),
            ),
        };

        if !result.success {
            tracing::warn!(
                path = %asset.stored_path.display(),
                error = ?result.error,
                "Image compression failed, keeping original"
            );
        }

        result
    }
}
