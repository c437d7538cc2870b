//! # Simple Picture
//!
//! Responsive `<picture>` markup for static sites. One source image becomes
//! nine files (three widths in three encodings) and a `<picture>` element
//! that lets the browser pick the best one.
//!
//! # Architecture
//!
//! A shortcode invocation flows through four steps:
//!
//! ```text
//! 1. Resolve   "cat.jpg" + page dir   →  "./src/posts/cat.jpg"
//! 2. Request   resolved path + config →  VariantRequest (widths, formats, naming)
//! 3. Produce   VariantRequest         →  VariantSet (files written to disk)
//! 4. Compose   VariantSet + hints     →  <picture> … </picture>
//! ```
//!
//! Steps 1, 2 and 4 are pure. Only the producer touches the filesystem, and
//! it sits behind the [`imaging::VariantProducer`] trait so everything above
//! it is testable with a mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`paths`] | Source reference resolution relative to the invoking page |
//! | [`naming`] | Width ladder (`small`/`medium`/`large`) and the output filename policy |
//! | [`request`] | Builds the fixed-shape `VariantRequest` handed to a producer |
//! | [`variants`] | `EncodingKind`, `VariantDescriptor`, `VariantSet` (producer output) |
//! | [`imaging`] | Tier planning plus the pure-Rust producer: decode, resize, encode |
//! | [`markup`] | Maud composition of `<picture>`, `<source>`, `<img>` and `<figure>` |
//! | [`shortcodes`] | The `image` / `imageWithDetail` handlers and their registry |
//! | [`config`] | `config.toml` loading, merging onto stock defaults, validation |
//! | [`output`] | CLI progress formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Ladder and Format Order
//!
//! Widths are always 320, 640 and 1280 and the `<source>` order is always
//! AVIF, WebP, JPEG. Browsers take the first `<source>` they support, so the
//! order is most efficient first. JPEG doubles as the `<img>` fallback,
//! which is why a set without JPEG cannot be composed.
//!
//! ## Never Upscale
//!
//! Tiers wider than the source are skipped. A source narrower than the
//! smallest tier is emitted once at its native size, under the smallest
//! tier's name, so every image still gets a fallback.
//!
//! ## Art Direction Sources First
//!
//! With a detail image, its `<source>` rows carry a `media` query and come
//! before the base rows. The browser evaluates sources in order; a
//! media-qualified row placed later would never be reached.
//!
//! ## A Registry Instead of Global Hooks
//!
//! The host owns a [`shortcodes::ShortcodeRegistry`] and registers the
//! handlers at start-up. Handlers are plain functions of context and
//! arguments, with no shared mutable state between invocations.
//!
//! ## Maud Over String Concatenation
//!
//! Markup is produced with [Maud](https://maud.lambda.xyz/): all
//! interpolation is escaped, so alt text and captions cannot break out of
//! their attribute or element.

pub mod config;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod output;
pub mod paths;
pub mod request;
pub mod shortcodes;
pub mod variants;

#[cfg(test)]
pub(crate) mod test_helpers;
