//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::naming::WidthTier;

/// One variant size to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSize {
    /// Tier the file is named after.
    pub tier: WidthTier,
    /// Output width.
    pub width: u32,
    /// Output height, aspect ratio preserved.
    pub height: u32,
}

/// Work out which tiers to generate for a source of the given dimensions.
///
/// Tiers are widths, not longer edges. Tiers wider than the source are
/// skipped so nothing is upscaled. If every tier is wider than the source,
/// the source is emitted once at its native size under the smallest tier's
/// name, so the fallback `<img>` always has something to point at.
///
/// # Examples
/// ```
/// # use simple_picture::imaging::plan_tier_sizes;
/// # use simple_picture::naming::WidthTier;
/// let sizes = plan_tier_sizes((1000, 500), &WidthTier::LADDER);
/// assert_eq!(sizes.len(), 2);
/// assert_eq!((sizes[1].width, sizes[1].height), (640, 320));
/// ```
pub fn plan_tier_sizes(original: (u32, u32), tiers: &[WidthTier]) -> Vec<PlannedSize> {
    let (orig_w, orig_h) = original;

    let mut result: Vec<PlannedSize> = tiers
        .iter()
        .filter(|tier| tier.width() <= orig_w)
        .map(|&tier| {
            let width = tier.width();
            let ratio = width as f64 / orig_w as f64;
            let height = ((orig_h as f64 * ratio).round() as u32).max(1);
            PlannedSize {
                tier,
                width,
                height,
            }
        })
        .collect();

    if result.is_empty()
        && let Some(&smallest) = tiers.iter().min()
    {
        result.push(PlannedSize {
            tier: smallest,
            width: orig_w,
            height: orig_h,
        });
    }

    result
}
