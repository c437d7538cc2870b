//! Output filename policy for generated variants.
//!
//! Every variant file is named from three inputs: the source file stem, the
//! width tier, and the encoding. With the default template:
//!
//! - `cat.jpg` at 320px as AVIF → `cat_small.avif`
//! - `cat.jpg` at 640px as WebP → `cat_medium.webp`
//! - `posts/dog.png` at 1280px as JPEG → `dog_large.jpeg`
//!
//! The mapping is a pure function of those inputs, so rebuilding a site
//! rewrites the same files instead of scattering new ones, and the single and
//! detail shortcodes agree on names for the same source.
//!
//! ## Template placeholders
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{name}` | source file stem (`cat` for `cat.jpg`) |
//! | `{size}` | tier label (`small`, `medium`, `large`) |
//! | `{width}` | tier width in pixels |
//! | `{format}` | encoding extension (`avif`, `webp`, `jpeg`) |

use crate::variants::EncodingKind;
use std::path::Path;
use thiserror::Error;

/// Template used when the config does not override it.
pub const DEFAULT_TEMPLATE: &str = "{name}_{size}.{format}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("width {0}px is not one of the tier widths (320, 640, 1280)")]
    UnknownWidth(u32),
    #[error("source has no file name: {0}")]
    NoFileStem(String),
}

/// The fixed width ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidthTier {
    Small,
    Medium,
    Large,
}

impl WidthTier {
    /// All tiers, ascending by width. Tiers are always requested together.
    pub const LADDER: [WidthTier; 3] = [WidthTier::Small, WidthTier::Medium, WidthTier::Large];

    pub fn width(self) -> u32 {
        match self {
            WidthTier::Small => 320,
            WidthTier::Medium => 640,
            WidthTier::Large => 1280,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WidthTier::Small => "small",
            WidthTier::Medium => "medium",
            WidthTier::Large => "large",
        }
    }

    /// Reverse lookup through the width-to-label table.
    pub fn from_width(width: u32) -> Option<Self> {
        Self::LADDER.into_iter().find(|t| t.width() == width)
    }
}

/// Maps (source, tier, encoding) to an output filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePolicy {
    template: String,
}

impl Default for FilenamePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl FilenamePolicy {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Filename for a tier.
    pub fn filename(
        &self,
        source: &str,
        tier: WidthTier,
        encoding: EncodingKind,
    ) -> Result<String, NamingError> {
        let stem = Path::new(source)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NamingError::NoFileStem(source.to_string()))?;

        Ok(self
            .template
            .replace("{name}", stem)
            .replace("{size}", tier.label())
            .replace("{width}", &tier.width().to_string())
            .replace("{format}", encoding.extension()))
    }

    /// Filename for a raw pixel width, which must be one of the tier widths.
    pub fn filename_for_width(
        &self,
        source: &str,
        width: u32,
        encoding: EncodingKind,
    ) -> Result<String, NamingError> {
        let tier = WidthTier::from_width(width).ok_or(NamingError::UnknownWidth(width))?;
        self.filename(source, tier, encoding)
    }
}
