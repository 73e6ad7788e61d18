//! Greedy consolidation of fragmented text detections.
//!
//! Detectors tend to split one label ("Glomerulus") into several boxes
//! ("Glo", "merulus"). [`merge_regions`] folds such fragments together in a
//! single deterministic pass:
//!
//! 1. Regions are stably sorted by the y-coordinate of their top-left corner.
//! 2. Each region is compared, in order, against the regions emitted so far.
//! 3. The first emitted region that is *near* (both edge gaps strictly below
//!    the limits) or *adjacent* (overlapping or touching within
//!    [`TOUCH_TOLERANCE`]) absorbs it in place.
//! 4. A region with no partner is emitted unchanged.
//!
//! This is first-fit, not a clustering: two fragments that only connect
//! through a third are joined only if the sorted order reaches them that way.

use super::region::{BoundingBox, MergedRegion, Region, TOUCH_TOLERANCE};

/// Per-axis pixel limits for the proximity test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeLimits {
    pub x: f64,
    pub y: f64,
}

impl MergeLimits {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Consolidate `regions` using the given per-axis limits.
pub fn merge_regions(regions: Vec<Region>, x_limit: f64, y_limit: f64) -> Vec<MergedRegion> {
    merge_with_limits(regions, MergeLimits::new(x_limit, y_limit))
}

pub fn merge_with_limits(mut regions: Vec<Region>, limits: MergeLimits) -> Vec<MergedRegion> {
    let input_len = regions.len();
    if regions.is_empty() {
        return Vec::new();
    }

    regions.sort_by(|a, b| a.top_left().y.total_cmp(&b.top_left().y));

    let mut merged: Vec<MergedRegion> = Vec::with_capacity(regions.len());
    for region in regions {
        let incoming = region.bounding_box();
        let partner = merged
            .iter()
            .position(|existing| should_merge(&existing.bounding_box(), &incoming, limits));

        match partner {
            Some(idx) => {
                let combined = combine(&merged[idx], &region);
                merged[idx] = combined;
            }
            None => merged.push(region),
        }
    }

    tracing::debug!("Merged {} regions into {}", input_len, merged.len());
    merged
}

fn should_merge(existing: &BoundingBox, incoming: &BoundingBox, limits: MergeLimits) -> bool {
    let (x_gap, y_gap) = existing.edge_gaps(incoming);
    let near = x_gap < limits.x && y_gap < limits.y;
    near || existing.intersects(incoming) || existing.touches(incoming, TOUCH_TOLERANCE)
}

fn combine(existing: &MergedRegion, incoming: &Region) -> MergedRegion {
    let bbox = existing.bounding_box().union(&incoming.bounding_box());
    let mut text = String::with_capacity(existing.text.len() + incoming.text.len() + 1);
    text.push_str(&existing.text);
    text.push(' ');
    text.push_str(&incoming.text);

    Region {
        quad: bbox.to_quad(),
        text,
        confidence: existing.confidence.max(incoming.confidence),
    }
}
