//! Pure Rust variant producer.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! Sources are accepted by extension, and only when a decoder for it is
//! compiled in. Tiers are resized and encoded in parallel on the rayon pool.

use super::operations::{SizePlan, plan_variants};
use super::params::EncodeParams;
use super::producer::{ProducerError, VariantProducer};
use crate::request::VariantRequest;
use crate::variants::{EncodingKind, VariantDescriptor, VariantSet};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use rayon::prelude::*;
use std::path::Path;

/// Decoder for a source path, chosen by extension.
///
/// `None` when the extension is unknown or its decoder is not compiled in
/// (AVIF sources, for instance: only the AVIF encoder is enabled).
fn source_format(path: &Path) -> Option<ImageFormat> {
    ImageFormat::from_path(path)
        .ok()
        .filter(|format| format.reading_enabled())
}

/// Producer backed by the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustProducer;

impl RustProducer {
    pub fn new() -> Self {
        Self
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path, format: ImageFormat) -> Result<DynamicImage, ProducerError> {
    let mut reader = ImageReader::open(path)?;
    reader.set_format(format);
    reader
        .decode()
        .map_err(|e| {
            ProducerError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode an already resized image to one output file.
fn encode(img: &DynamicImage, params: &EncodeParams) -> Result<(), ProducerError> {
    let file = std::fs::File::create(&params.output)?;
    let writer = std::io::BufWriter::new(file);
    let quality = params.quality.as_u8();

    let result = match params.encoding {
        EncodingKind::Avif => DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(
            AvifEncoder::new_with_speed_quality(writer, params.avif_speed, quality),
        ),
        EncodingKind::Webp => DynamicImage::ImageRgba8(img.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(writer)),
        EncodingKind::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(writer, quality)),
    };

    result.map_err(|e| {
        ProducerError::ProcessingFailed(format!(
            "{} encode failed for {}: {}",
            params.encoding,
            params.output.display(),
            e
        ))
    })?;
    tracing::debug!(output = %params.output.display(), "encoded variant");
    Ok(())
}

/// Resize once, then write every encoding of that size.
fn encode_size(img: &DynamicImage, plan: &SizePlan) -> Result<Vec<VariantDescriptor>, ProducerError> {
    let (width, height) = (plan.size.width, plan.size.height);
    let resized = if (width, height) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    for output in &plan.outputs {
        encode(&resized, &output.params)?;
    }
    Ok(plan.outputs.iter().map(|o| o.descriptor.clone()).collect())
}

impl VariantProducer for RustProducer {
    fn produce(&self, request: &VariantRequest) -> Result<VariantSet, ProducerError> {
        let source = Path::new(&request.source);
        if !source.is_file() {
            return Err(ProducerError::SourceNotFound(source.to_path_buf()));
        }

        let format = source_format(source).ok_or_else(|| {
            ProducerError::ProcessingFailed(format!(
                "unsupported source format: {}",
                source.display()
            ))
        })?;

        let img = load_image(source, format)?;
        let plan = plan_variants(request, (img.width(), img.height()))?;
        std::fs::create_dir_all(&request.output_dir)?;

        let per_size = plan
            .par_iter()
            .map(|size_plan| encode_size(&img, size_plan))
            .collect::<Result<Vec<_>, ProducerError>>()?;

        Ok(per_size.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PictureConfig;
    use crate::request::build_request;
    use crate::test_helpers::create_test_jpeg;
    use tempfile::TempDir;

    fn fast_config(out: &Path) -> PictureConfig {
        let mut config = PictureConfig::default();
        config.output.dir = out.to_path_buf();
        config.encoding.avif_speed = 10;
        config
    }

    #[test]
    fn source_format_accepts_compiled_decoders() {
        for name in ["a.jpg", "a.JPEG", "a.png", "a.tif", "a.tiff", "a.webp"] {
            assert!(
                source_format(Path::new(name)).is_some(),
                "expected a decoder for {name}"
            );
        }
    }

    #[test]
    fn source_format_rejects_unknown_or_disabled() {
        for name in ["a.gif", "a.avif", "notes.txt", "no_extension"] {
            assert_eq!(source_format(Path::new(name)), None, "{name}");
        }
    }

    #[test]
    fn unsupported_extension_fails_before_decoding() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("cat.gif");
        create_test_jpeg(&source, 400, 250);
        let out = tmp.path().join("img");

        let request = build_request(source.to_str().unwrap(), &fast_config(&out));
        let result = RustProducer::new().produce(&request);

        match result {
            Err(ProducerError::ProcessingFailed(msg)) => {
                assert!(msg.contains("unsupported source format"), "{msg}");
            }
            other => panic!("expected ProcessingFailed, got {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn produce_writes_every_encoding_for_small_tier() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("cat.jpg");
        create_test_jpeg(&source, 400, 250);
        let out = tmp.path().join("img");

        let request = build_request(source.to_str().unwrap(), &fast_config(&out));
        let set = RustProducer::new().produce(&request).unwrap();

        assert_eq!(set.len(), 3);
        for name in ["cat_small.avif", "cat_small.webp", "cat_small.jpeg"] {
            let path = out.join(name);
            assert!(path.exists(), "missing {name}");
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }

        let fallback = set.fallback().unwrap();
        assert_eq!(fallback.url, "/img/cat_small.jpeg");
        assert_eq!((fallback.width, fallback.height), (320, 200));
    }

    #[test]
    fn written_jpeg_has_planned_dimensions() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        create_test_jpeg(&source, 400, 100);
        let out = tmp.path().join("img");

        let request = build_request(source.to_str().unwrap(), &fast_config(&out));
        RustProducer::new().produce(&request).unwrap();

        let dims = image::image_dimensions(out.join("wide_small.jpeg")).unwrap();
        assert_eq!(dims, (320, 80));
    }

    #[test]
    fn undersized_source_kept_at_native_size() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("icon.jpg");
        create_test_jpeg(&source, 120, 90);
        let out = tmp.path().join("img");

        let request = build_request(source.to_str().unwrap(), &fast_config(&out));
        let set = RustProducer::new().produce(&request).unwrap();

        let fallback = set.fallback().unwrap();
        assert_eq!((fallback.width, fallback.height), (120, 90));
        assert!(out.join("icon_small.jpeg").exists());
    }

    #[test]
    fn missing_source_is_source_not_found() {
        let tmp = TempDir::new().unwrap();
        let request = build_request(
            tmp.path().join("nope.jpg").to_str().unwrap(),
            &fast_config(tmp.path()),
        );
        let result = RustProducer::new().produce(&request);
        assert!(matches!(result, Err(ProducerError::SourceNotFound(_))));
    }

    #[test]
    fn undecodable_source_is_processing_failure() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("notes.jpg");
        std::fs::write(&source, "not an image").unwrap();

        let request = build_request(source.to_str().unwrap(), &fast_config(tmp.path()));
        let result = RustProducer::new().produce(&request);
        assert!(matches!(result, Err(ProducerError::ProcessingFailed(_))));
    }
}
