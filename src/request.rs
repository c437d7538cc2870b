//! Variant requests: what a producer is asked to generate for one source.
//!
//! A [`VariantRequest`] pins down everything a producer needs: the three
//! width tiers, the encoding order, where files go, how they are named, and
//! how they are addressed in markup. Building one has no side effects; files
//! are only written once a producer runs it.

use crate::config::PictureConfig;
use crate::imaging::Quality;
use crate::naming::{FilenamePolicy, NamingError, WidthTier};
use crate::variants::EncodingKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct VariantRequest {
    /// Resolved source path, as handed to the producer.
    pub source: String,
    pub tiers: [WidthTier; 3],
    pub formats: [EncodingKind; 3],
    pub output_dir: PathBuf,
    pub url_path: String,
    pub naming: FilenamePolicy,
    pub quality: Quality,
    pub avif_speed: u8,
}

/// Build the request for a resolved source path.
pub fn build_request(resolved_path: &str, config: &PictureConfig) -> VariantRequest {
    VariantRequest {
        source: resolved_path.to_string(),
        tiers: WidthTier::LADDER,
        formats: EncodingKind::PREFERENCE,
        output_dir: config.output.dir.clone(),
        url_path: config.output.url_path.clone(),
        naming: FilenamePolicy::new(config.naming.template.clone()),
        quality: Quality::new(config.encoding.quality),
        avif_speed: config.encoding.avif_speed,
    }
}

impl VariantRequest {
    /// Tier widths, ascending.
    pub fn widths(&self) -> Vec<u32> {
        self.tiers.iter().map(|t| t.width()).collect()
    }

    /// Output filename for one tier and encoding.
    pub fn filename(&self, tier: WidthTier, encoding: EncodingKind) -> Result<String, NamingError> {
        self.naming.filename(&self.source, tier, encoding)
    }

    /// Where a variant file is written.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    /// Public URL of a variant file.
    pub fn url(&self, filename: &str) -> String {
        let prefix = self.url_path.trim_end_matches('/');
        if prefix.is_empty() && !self.url_path.starts_with('/') {
            filename.to_string()
        } else {
            format!("{prefix}/{filename}")
        }
    }
}
