//! Variant production in pure Rust, with no system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Plan tiers** | [`plan_tier_sizes`] (never upscales) |
//! | **Name files** | [`FilenamePolicy`](crate::naming::FilenamePolicy) via the request |
//! | **Resize** | Lanczos3 |
//! | **Encode** | rav1e (AVIF), lossless WebP, JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing encode operations
//! - **Operations**: Planning that combines calculations with a request
//! - **Producer**: [`VariantProducer`] trait + [`RustProducer`]

mod calculations;
pub mod operations;
mod params;
pub mod producer;
pub mod rust_producer;

pub use calculations::{PlannedSize, plan_tier_sizes};
pub use operations::{PlannedOutput, SizePlan, plan_variants};
pub use params::{EncodeParams, Quality};
pub use producer::{ProducerError, VariantProducer};
pub use rust_producer::RustProducer;
