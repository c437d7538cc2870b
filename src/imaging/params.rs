//! Parameter types for encode operations.
//!
//! These structs describe *what* to write, not *how*. They sit between the
//! producer's planning step (which tiers, which names) and the encoder, so
//! the plan can be checked in tests without touching pixels.
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`EncodeParams`]: One output file: target path, encoding, quality.

use crate::variants::EncodingKind;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the encoders take.
    pub fn as_u8(self) -> u8 {
        self.0.min(100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// One file to encode from an already resized image.
///
/// Dimensions live on the [`SizePlan`](super::SizePlan) that owns these
/// params, since every encoding of a size shares one resize.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub output: PathBuf,
    pub encoding: EncodingKind,
    pub quality: Quality,
    pub avif_speed: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_as_u8_stays_in_range() {
        assert_eq!(Quality::new(u32::MAX).as_u8(), 100);
        assert_eq!(Quality::new(1).as_u8(), 1);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
        assert_eq!(Quality::default().as_u8(), 90);
    }
}
