//! Responsive `<picture>` markup.
//!
//! Turns one or two [`VariantSet`]s into a single `<picture>` element:
//!
//! ```text
//! <figure>                                   ← only with a caption (detail path)
//!   <picture>
//!     <source type srcset media sizes>       ← detail rows, avif → webp → jpeg
//!     <source type srcset sizes>             ← base rows, avif → webp → jpeg
//!     <img src width height alt loading decoding>
//!   </picture>
//!   <figcaption>…</figcaption>
//! </figure>
//! ```
//!
//! Browsers pick the first `<source>` whose media condition matches and whose
//! type they support, so detail rows must come before the base rows and each
//! group must stay in encoding preference order. [`VariantSet`] iteration
//! already yields that order; this module only concatenates.
//!
//! The `<img>` always points at the base image's smallest JPEG. Consumers
//! that understand neither `<source>` types nor media queries get the generic
//! image, never the art-directed crop.
//!
//! HTML is built with maud, so alt text, captions, and URLs are escaped.

use crate::variants::{EncodingKind, VariantDescriptor, VariantSet};
use maud::{Markup, html};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("alt text is required (use an empty string for decorative images)")]
    MissingAlt,
    #[error("variant set has no jpeg entries to use as the <img> fallback")]
    MissingFallback,
    #[error("detail source and detail media must be given together (missing {missing})")]
    IncompleteDetail { missing: &'static str },
}

/// Presentation hints shared by both shortcodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationHints {
    pub alt: String,
    pub sizes: String,
    pub caption: Option<String>,
}

impl PresentationHints {
    /// Build hints, rejecting a missing alt. An empty alt is fine.
    pub fn new(alt: Option<&str>, sizes: &str) -> Result<Self, ComposeError> {
        let alt = alt.ok_or(ComposeError::MissingAlt)?;
        Ok(Self {
            alt: alt.to_string(),
            sizes: sizes.to_string(),
            caption: None,
        })
    }

    pub fn with_caption(mut self, caption: Option<&str>) -> Self {
        self.caption = caption.map(str::to_string);
        self
    }
}

/// The art-directed stream layered ahead of the base image.
#[derive(Debug, Clone, Copy)]
pub struct DetailStream<'a> {
    pub variants: &'a VariantSet,
    pub media: &'a str,
    pub sizes: &'a str,
}

/// Comma-separated `srcset` for one encoding, ascending width.
pub fn srcset(descriptors: &[VariantDescriptor]) -> String {
    descriptors
        .iter()
        .map(VariantDescriptor::srcset_entry)
        .collect::<Vec<_>>()
        .join(", ")
}

fn source_element(
    encoding: EncodingKind,
    descriptors: &[VariantDescriptor],
    media: Option<&str>,
    sizes: &str,
) -> Markup {
    html! {
        source type=(encoding.mime_type()) srcset=(srcset(descriptors)) media=[media] sizes=(sizes);
    }
}

fn picture(
    base: &VariantSet,
    hints: &PresentationHints,
    detail: Option<&DetailStream<'_>>,
) -> Result<Markup, ComposeError> {
    let fallback = base.fallback().ok_or(ComposeError::MissingFallback)?;

    Ok(html! {
        picture {
            @if let Some(detail) = detail {
                @for (encoding, descriptors) in detail.variants.iter() {
                    (source_element(encoding, descriptors, Some(detail.media), detail.sizes))
                }
            }
            @for (encoding, descriptors) in base.iter() {
                (source_element(encoding, descriptors, None, &hints.sizes))
            }
            img src=(fallback.url)
                width=(fallback.width)
                height=(fallback.height)
                alt=(hints.alt)
                loading="lazy"
                decoding="async";
        }
    })
}

/// `<picture>` for a single image. Never wrapped in a figure; the caption
/// in `hints` is ignored.
pub fn compose_single(
    variants: &VariantSet,
    hints: &PresentationHints,
) -> Result<Markup, ComposeError> {
    picture(variants, hints, None)
}

/// `<picture>` with an optional detail stream, figure-wrapped when the hints
/// carry a caption.
///
/// Without a detail stream and caption the output is byte-identical to
/// [`compose_single`].
pub fn compose_dual(
    base: &VariantSet,
    hints: &PresentationHints,
    detail: Option<&DetailStream<'_>>,
) -> Result<Markup, ComposeError> {
    let markup = picture(base, hints, detail)?;
    Ok(match &hints.caption {
        Some(caption) => wrap_figure(markup, caption),
        None => markup,
    })
}

/// Wrap a fragment in `<figure>` with a trailing `<figcaption>`.
pub fn wrap_figure(content: Markup, caption: &str) -> Markup {
    html! {
        figure {
            (content)
            figcaption { (caption) }
        }
    }
}
