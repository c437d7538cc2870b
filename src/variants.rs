//! Variant metadata shared between the producer and the markup composer.
//!
//! A [`VariantSet`] is what a producer hands back for one source image: for
//! every [`EncodingKind`], the generated copies ordered by ascending width.
//! Iteration always follows the encoding preference order, so the composer
//! never has to sort anything itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Output encodings, declared in preference order.
///
/// The derived `Ord` follows declaration order, which is what keeps
/// `<source>` elements in avif → webp → jpeg order. JPEG is last because it
/// is the universally supported format and doubles as the `<img>` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingKind {
    Avif,
    Webp,
    Jpeg,
}

impl EncodingKind {
    /// Every encoding, most efficient first.
    pub const PREFERENCE: [EncodingKind; 3] =
        [EncodingKind::Avif, EncodingKind::Webp, EncodingKind::Jpeg];

    /// File extension used for generated files.
    pub fn extension(self) -> &'static str {
        match self {
            EncodingKind::Avif => "avif",
            EncodingKind::Webp => "webp",
            EncodingKind::Jpeg => "jpeg",
        }
    }

    /// MIME type for the `type` attribute of `<source>`.
    pub fn mime_type(self) -> &'static str {
        match self {
            EncodingKind::Avif => "image/avif",
            EncodingKind::Webp => "image/webp",
            EncodingKind::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One generated copy of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    /// Public URL, as written into `src` / `srcset`.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub encoding: EncodingKind,
    /// Where the producer wrote the file.
    pub output_path: PathBuf,
}

impl VariantDescriptor {
    /// `srcset` candidate: `"{url} {width}w"`.
    pub fn srcset_entry(&self) -> String {
        format!("{} {}w", self.url, self.width)
    }
}

/// All variants of one source image, grouped by encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSet {
    formats: BTreeMap<EncodingKind, Vec<VariantDescriptor>>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, keeping its encoding's list sorted by width.
    ///
    /// Equal widths keep insertion order.
    pub fn insert(&mut self, descriptor: VariantDescriptor) {
        let list = self.formats.entry(descriptor.encoding).or_default();
        let pos = list.partition_point(|d| d.width <= descriptor.width);
        list.insert(pos, descriptor);
    }

    /// Descriptors for one encoding, ascending by width.
    pub fn get(&self, encoding: EncodingKind) -> Option<&[VariantDescriptor]> {
        self.formats
            .get(&encoding)
            .map(Vec::as_slice)
            .filter(|list| !list.is_empty())
    }

    /// Non-empty encodings in preference order.
    pub fn iter(&self) -> impl Iterator<Item = (EncodingKind, &[VariantDescriptor])> {
        self.formats
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(encoding, list)| (*encoding, list.as_slice()))
    }

    /// The lowest-width JPEG, used for the plain `<img>`.
    pub fn fallback(&self) -> Option<&VariantDescriptor> {
        self.get(EncodingKind::Jpeg).and_then(|list| list.first())
    }

    /// Total number of descriptors across all encodings.
    pub fn len(&self) -> usize {
        self.formats.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<VariantDescriptor> for VariantSet {
    fn from_iter<I: IntoIterator<Item = VariantDescriptor>>(iter: I) -> Self {
        let mut set = VariantSet::new();
        for descriptor in iter {
            set.insert(descriptor);
        }
        set
    }
}
