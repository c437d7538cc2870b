//! CLI output formatting.
//!
//! The binary prints composed markup on stdout, so everything here goes to
//! stderr. Each produced image is shown by its reference as written in the
//! template, with the resolved path and per-encoding widths as indented
//! context:
//!
//! ```text
//! cat.jpg
//!     Source: ./src/posts/cat.jpg
//!     avif: 320w 640w 1280w
//!     webp: 320w 640w 1280w
//!     jpeg: 320w 640w 1280w
//!     Fallback: /img/cat_small.jpeg (320x200)
//! ```
//!
//! Each event has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that does the writing.

use crate::shortcodes::ProduceEvent;
use crate::variants::VariantDescriptor;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Widths of one encoding, e.g. `320w 640w`.
fn width_list(descriptors: &[VariantDescriptor]) -> String {
    descriptors
        .iter()
        .map(|d| format!("{}w", d.width))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a single produce event as display lines.
pub fn format_produce_event(event: &ProduceEvent) -> Vec<String> {
    match event {
        ProduceEvent::Produced {
            source_ref,
            resolved,
            variants,
        } => {
            let mut lines = vec![source_ref.clone()];
            if resolved != source_ref {
                lines.push(format!("{}Source: {}", indent(1), resolved));
            }
            for (encoding, descriptors) in variants.iter() {
                lines.push(format!("{}{}: {}", indent(1), encoding, width_list(descriptors)));
            }
            match variants.fallback() {
                Some(fallback) => lines.push(format!(
                    "{}Fallback: {} ({}x{})",
                    indent(1),
                    fallback.url,
                    fallback.width,
                    fallback.height
                )),
                None => lines.push(format!("{}Fallback: none", indent(1))),
            }
            lines
        }
    }
}

pub fn print_produce_event(event: &ProduceEvent) {
    for line in format_produce_event(event) {
        eprintln!("{}", line);
    }
}
