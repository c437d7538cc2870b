//! Shared test utilities for the simple-picture test suite.
//!
//! Provides descriptor/variant-set builders, a synthetic JPEG writer, and
//! markup extractors for asserting on composed `<picture>` output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let set = full_set("cat", 1.5);
//! let html = compose_single(&set, &hints).unwrap().into_string();
//! assert_eq!(source_types(&html), vec!["image/avif", "image/webp", "image/jpeg"]);
//! ```

use crate::naming::WidthTier;
use crate::variants::{EncodingKind, VariantDescriptor, VariantSet};
use image::{ImageEncoder, RgbImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Variant builders
// =========================================================================

/// A descriptor whose output path is just its URL.
pub fn descriptor(url: &str, width: u32, height: u32, encoding: EncodingKind) -> VariantDescriptor {
    VariantDescriptor {
        url: url.to_string(),
        width,
        height,
        encoding,
        output_path: PathBuf::from(url.trim_start_matches('/')),
    }
}

/// Every tier in every encoding, named `/img/{name}_{tier}.{ext}`.
///
/// Heights follow `aspect` (width / height), rounded.
pub fn full_set(name: &str, aspect: f64) -> VariantSet {
    WidthTier::LADDER
        .iter()
        .flat_map(|tier| {
            EncodingKind::PREFERENCE.iter().map(move |&encoding| {
                let width = tier.width();
                let height = (width as f64 / aspect).round() as u32;
                descriptor(
                    &format!("/img/{}_{}.{}", name, tier.label(), encoding.extension()),
                    width,
                    height,
                    encoding,
                )
            })
        })
        .collect()
}

// =========================================================================
// Markup extractors
// =========================================================================

/// `type` attribute of every `<source>`, in document order.
pub fn source_types(html: &str) -> Vec<&str> {
    html.match_indices("<source type=\"")
        .map(|(pos, prefix)| {
            let rest = &html[pos + prefix.len()..];
            let end = rest.find('"').unwrap_or_else(|| panic!("unterminated type in {html}"));
            &rest[..end]
        })
        .collect()
}

// =========================================================================
// Fixture images
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}
