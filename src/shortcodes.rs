//! Shortcode handlers and the registry a templating host calls into.
//!
//! Two shortcodes are provided:
//!
//! | Name | Positional arguments |
//! |---|---|
//! | `image` | `src, alt, sizes` |
//! | `imageWithDetail` | `src, alt, sizes, caption, detailSrc, detailMedia, detailSizes` |
//!
//! Instead of mutating global host state, the host owns a
//! [`ShortcodeRegistry`] and this crate fills it at start-up with
//! [`register_picture_shortcodes`]. Handlers are plain functions of
//! `(context, args)` to a markup string.
//!
//! ## Argument rules
//!
//! - `src`, `alt`, `sizes` must be present. `alt` may be empty (decorative
//!   image); leaving it out entirely is an error.
//! - Optional arguments treat an empty string the same as an absent one.
//! - `detailSrc` and `detailMedia` come as a pair. Supplying only one of them
//!   is an error rather than a silent fallback to the plain image.
//! - `detailSizes` defaults to `detail.sizes` from the config (`100vw`).
//!
//! ## Execution
//!
//! Each invocation resolves its source references against the invoking
//! page, asks the producer for variants, and composes markup. For
//! `imageWithDetail` the base and detail images are produced concurrently
//! with `rayon::join`; composition starts once both are done. Both requests
//! are planned first: if the two images would write the same output file
//! (same file stem, e.g. `wide/room.jpg` and `tall/room.jpg`) the invocation
//! fails with [`ShortcodeError::DetailNameCollision`] before anything is
//! written.

use crate::config::PictureConfig;
use crate::imaging::{ProducerError, VariantProducer};
use crate::markup::{ComposeError, DetailStream, PresentationHints, compose_dual, compose_single};
use crate::naming::NamingError;
use crate::paths;
use crate::request::{VariantRequest, build_request};
use crate::variants::VariantSet;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Registry name of the single-image shortcode.
pub const IMAGE: &str = "image";
/// Registry name of the base + detail shortcode.
pub const IMAGE_WITH_DETAIL: &str = "imageWithDetail";

#[derive(Error, Debug)]
pub enum ShortcodeError {
    #[error("unknown shortcode `{0}`")]
    UnknownShortcode(String),
    #[error("{shortcode}: missing required argument `{name}`")]
    MissingArgument {
        shortcode: &'static str,
        name: &'static str,
    },
    #[error("base and detail images would both write {}; rename one of the sources", .0.display())]
    DetailNameCollision(PathBuf),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Naming(#[from] NamingError),
    #[error(transparent)]
    Producer(#[from] ProducerError),
}

/// What the host knows about the page invoking a shortcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Input path of the invoking template, e.g. `./src/posts/index.md`.
    pub page_input_path: String,
}

impl InvocationContext {
    pub fn new(page_input_path: impl Into<String>) -> Self {
        Self {
            page_input_path: page_input_path.into(),
        }
    }

    /// Directory bare image references are resolved against.
    pub fn page_dir(&self) -> &str {
        paths::page_dir(&self.page_input_path)
    }
}

/// Positional shortcode arguments. `None` = the host passed nothing there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<Option<String>>);

impl Args {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self(values)
    }

    /// Argument as given, empty strings included.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|v| v.as_deref())
    }

    /// Argument, with empty strings treated as absent.
    pub fn non_empty(&self, index: usize) -> Option<&str> {
        self.get(index).filter(|v| !v.is_empty())
    }

    fn required(
        &self,
        index: usize,
        shortcode: &'static str,
        name: &'static str,
    ) -> Result<&str, ShortcodeError> {
        self.get(index)
            .ok_or(ShortcodeError::MissingArgument { shortcode, name })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Option<String>>> for Args {
    fn from(values: Vec<Option<String>>) -> Self {
        Self(values)
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for Args {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        Self(iter.into_iter().map(|v| v.map(Into::into)).collect())
    }
}

/// Arguments of the `image` shortcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageArgs<'a> {
    pub src: &'a str,
    pub alt: Option<&'a str>,
    pub sizes: &'a str,
}

impl<'a> ImageArgs<'a> {
    pub fn from_positional(args: &'a Args) -> Result<Self, ShortcodeError> {
        Ok(Self {
            src: args.required(0, IMAGE, "src")?,
            alt: args.get(1),
            sizes: args.required(2, IMAGE, "sizes")?,
        })
    }
}

/// Arguments of the `imageWithDetail` shortcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailImageArgs<'a> {
    pub src: &'a str,
    pub alt: Option<&'a str>,
    pub sizes: &'a str,
    pub caption: Option<&'a str>,
    pub detail_src: Option<&'a str>,
    pub detail_media: Option<&'a str>,
    pub detail_sizes: Option<&'a str>,
}

impl<'a> DetailImageArgs<'a> {
    pub fn from_positional(args: &'a Args) -> Result<Self, ShortcodeError> {
        Ok(Self {
            src: args.required(0, IMAGE_WITH_DETAIL, "src")?,
            alt: args.get(1),
            sizes: args.required(2, IMAGE_WITH_DETAIL, "sizes")?,
            caption: args.non_empty(3),
            detail_src: args.non_empty(4),
            detail_media: args.non_empty(5),
            detail_sizes: args.non_empty(6),
        })
    }

    /// The detail pair, all or nothing.
    fn detail_pair(&self) -> Result<Option<(&'a str, &'a str)>, ComposeError> {
        match (self.detail_src, self.detail_media) {
            (Some(src), Some(media)) => Ok(Some((src, media))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ComposeError::IncompleteDetail {
                missing: "detail media",
            }),
            (None, Some(_)) => Err(ComposeError::IncompleteDetail {
                missing: "detail source",
            }),
        }
    }
}

/// Progress events, one per produced variant set.
#[derive(Debug, Clone)]
pub enum ProduceEvent {
    Produced {
        /// Reference as written in the template.
        source_ref: String,
        /// Path handed to the producer.
        resolved: String,
        variants: VariantSet,
    },
}

/// The two picture shortcodes, bound to a producer and a config.
pub struct PictureShortcodes<P> {
    producer: P,
    config: PictureConfig,
    events: Option<Sender<ProduceEvent>>,
}

impl<P: VariantProducer> PictureShortcodes<P> {
    pub fn new(producer: P, config: PictureConfig) -> Self {
        Self {
            producer,
            config,
            events: None,
        }
    }

    /// Report every produced variant set on `tx`.
    pub fn with_events(mut self, tx: Sender<ProduceEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &PictureConfig {
        &self.config
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    fn request(&self, ctx: &InvocationContext, source_ref: &str) -> VariantRequest {
        let resolved = paths::resolve(source_ref, ctx.page_dir());
        tracing::debug!(source = source_ref, resolved = %resolved, "resolved image source");
        build_request(&resolved, &self.config)
    }

    fn produce(
        &self,
        source_ref: &str,
        request: &VariantRequest,
    ) -> Result<VariantSet, ShortcodeError> {
        let variants = self.producer.produce(request)?;
        tracing::info!(source = %request.source, variants = variants.len(), "produced variants");

        if let Some(tx) = &self.events {
            tx.send(ProduceEvent::Produced {
                source_ref: source_ref.to_string(),
                resolved: request.source.clone(),
                variants: variants.clone(),
            })
            .ok();
        }
        Ok(variants)
    }

    /// `image(src, alt, sizes)`.
    pub fn image(
        &self,
        ctx: &InvocationContext,
        args: &ImageArgs<'_>,
    ) -> Result<String, ShortcodeError> {
        let hints = PresentationHints::new(args.alt, args.sizes)?;
        let request = self.request(ctx, args.src);
        let variants = self.produce(args.src, &request)?;
        Ok(compose_single(&variants, &hints)?.into_string())
    }

    /// `imageWithDetail(src, alt, sizes, caption, detailSrc, detailMedia, detailSizes)`.
    pub fn image_with_detail(
        &self,
        ctx: &InvocationContext,
        args: &DetailImageArgs<'_>,
    ) -> Result<String, ShortcodeError> {
        let hints = PresentationHints::new(args.alt, args.sizes)?.with_caption(args.caption);
        let pair = args.detail_pair()?;

        let base_request = self.request(ctx, args.src);
        let detail_request = pair.map(|(src, _)| (src, self.request(ctx, src)));
        if let Some((_, detail_request)) = &detail_request
            && let Some(path) = shared_output(&base_request, detail_request)?
        {
            return Err(ShortcodeError::DetailNameCollision(path));
        }

        let (base, detail_variants) = rayon::join(
            || self.produce(args.src, &base_request),
            || {
                detail_request
                    .as_ref()
                    .map(|(src, request)| self.produce(src, request))
                    .transpose()
            },
        );
        let base = base?;
        let detail_variants = detail_variants?;

        let detail = detail_variants
            .as_ref()
            .zip(pair)
            .map(|(variants, (_, media))| DetailStream {
                variants,
                media,
                sizes: args.detail_sizes.unwrap_or(&self.config.detail.sizes),
            });

        Ok(compose_dual(&base, &hints, detail.as_ref())?.into_string())
    }
}

/// Every output file a request will write, whatever the source dimensions.
fn planned_outputs(request: &VariantRequest) -> Result<BTreeSet<PathBuf>, NamingError> {
    request
        .tiers
        .iter()
        .flat_map(|&tier| {
            request
                .formats
                .iter()
                .map(move |&encoding| request.filename(tier, encoding))
        })
        .map(|filename| filename.map(|name| request.output_path(&name)))
        .collect()
}

/// First output file both requests would write, if any.
fn shared_output(
    base: &VariantRequest,
    detail: &VariantRequest,
) -> Result<Option<PathBuf>, NamingError> {
    let base_outputs = planned_outputs(base)?;
    Ok(planned_outputs(detail)?
        .into_iter()
        .find(|path| base_outputs.contains(path)))
}

/// A shortcode handler as stored in the registry.
pub type Handler =
    Box<dyn Fn(&InvocationContext, &Args) -> Result<String, ShortcodeError> + Send + Sync>;

/// Named shortcode handlers, owned by the host.
#[derive(Default)]
pub struct ShortcodeRegistry {
    handlers: BTreeMap<String, Handler>,
}

impl ShortcodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&InvocationContext, &Args) -> Result<String, ShortcodeError> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn invoke(
        &self,
        name: &str,
        ctx: &InvocationContext,
        args: &Args,
    ) -> Result<String, ShortcodeError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ShortcodeError::UnknownShortcode(name.to_string()))?;
        handler(ctx, args)
    }
}

/// Register `image` and `imageWithDetail` backed by `shortcodes`.
pub fn register_picture_shortcodes<P>(
    registry: &mut ShortcodeRegistry,
    shortcodes: Arc<PictureShortcodes<P>>,
) where
    P: VariantProducer + Send + 'static,
{
    let single = Arc::clone(&shortcodes);
    registry.register(IMAGE, move |ctx, args| {
        single.image(ctx, &ImageArgs::from_positional(args)?)
    });
    registry.register(IMAGE_WITH_DETAIL, move |ctx, args| {
        shortcodes.image_with_detail(ctx, &DetailImageArgs::from_positional(args)?)
    });
}
