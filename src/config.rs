//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! dir = "dist/img"          # Where generated variants are written
//! url_path = "/img/"        # URL prefix for src/srcset
//!
//! [encoding]
//! quality = 90              # AVIF/JPEG quality (1-100)
//! avif_speed = 6            # rav1e speed (1 = slowest/best, 10 = fastest)
//!
//! [naming]
//! template = "{name}_{size}.{format}"
//!
//! [detail]
//! sizes = "100vw"           # sizes for detail <source> rows when omitted
//!
//! [processing]
//! max_processes = 4         # Max parallel workers, at least 1 (omit for auto = CPU cores)
//! ```
//!
//! The width ladder (320/640/1280) and the encoding order (avif, webp, jpeg)
//! are fixed and deliberately not configurable.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictureConfig {
    /// Output location and public URL prefix of generated variants.
    pub output: OutputConfig,
    /// Encoder settings.
    pub encoding: EncodingConfig,
    /// Output filename template.
    pub naming: NamingConfig,
    /// Defaults for the detail (art-directed) stream.
    pub detail: DetailConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PictureConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.quality) {
            return Err(ConfigError::Validation(
                "encoding.quality must be 1-100".into(),
            ));
        }
        if !(1..=10).contains(&self.encoding.avif_speed) {
            return Err(ConfigError::Validation(
                "encoding.avif_speed must be 1-10".into(),
            ));
        }
        let template = &self.naming.template;
        if !template.contains("{name}") || !template.contains("{format}") {
            return Err(ConfigError::Validation(
                "naming.template must contain {name} and {format}".into(),
            ));
        }
        if !template.contains("{size}") && !template.contains("{width}") {
            return Err(ConfigError::Validation(
                "naming.template must contain {size} or {width}".into(),
            ));
        }
        if self.output.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.dir must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1 (omit it to use every core)".into(),
            ));
        }
        Ok(())
    }
}

/// Where variants go on disk and how they are addressed in markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory the producer writes variants into.
    pub dir: PathBuf,
    /// URL prefix joined with each variant filename. Empty = bare filenames.
    pub url_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist/img"),
            url_path: "/img/".to_string(),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// AVIF/JPEG quality (1 = worst, 100 = best). WebP is written lossless.
    pub quality: u32,
    /// rav1e speed preset.
    pub avif_speed: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            avif_speed: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Filename template, see [`crate::naming`] for placeholders.
    pub template: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            template: crate::naming::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetailConfig {
    /// `sizes` used on detail `<source>` rows when the shortcode omits it.
    pub sizes: String,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            sizes: "100vw".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encoding workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PictureConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PictureConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PictureConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, on top of stock
/// defaults.
pub fn load_config(root: &Path) -> Result<PictureConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Picture Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory generated variants are written to.
dir = "dist/img"

# URL prefix for src/srcset. Use "" to reference bare filenames.
url_path = "/img/"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# AVIF and JPEG quality (1 = worst, 100 = best). WebP is always lossless.
quality = 90

# AVIF encoder speed (1 = slowest/smallest, 10 = fastest).
avif_speed = 6

# ---------------------------------------------------------------------------
# Naming
# ---------------------------------------------------------------------------
[naming]
# Placeholders: {name} (source stem), {size} (small/medium/large),
# {width} (320/640/1280), {format} (avif/webp/jpeg).
template = "{name}_{size}.{format}"

# ---------------------------------------------------------------------------
# Detail images
# ---------------------------------------------------------------------------
[detail]
# sizes attribute for detail <source> rows when the shortcode omits it.
sizes = "100vw"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel encoding workers (at least 1).
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
