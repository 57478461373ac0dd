//! Position exchange between two widgets of similar footprint.

use crate::grid::GridModel;
use crate::id::WidgetId;
use crate::model::GridRect;
use crate::occupancy::OccupancyIndex;

pub const DEFAULT_SWAP_THRESHOLD: f32 = 0.5;

/// Result of a validated swap: the new rectangle for each widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub a: (WidgetId, GridRect),
    pub b: (WidgetId, GridRect),
}

#[derive(Debug, Clone, Copy)]
pub struct SwapResolver {
    /// Maximum relative footprint difference, exclusive.
    threshold: f32,
}

impl Default for SwapResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SWAP_THRESHOLD)
    }
}

impl SwapResolver {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Footprints differ by less than `threshold` of the larger one.
    pub fn can_swap(&self, a: &GridRect, b: &GridRect) -> bool {
        let size_a = a.area();
        let size_b = b.area();
        let larger = size_a.max(size_b);
        if larger <= 0 {
            return false;
        }
        let diff = (size_a - size_b).abs() as f32 / larger as f32;
        diff < self.threshold
    }

    /// Exchange origins; each rectangle keeps its own extent.
    pub fn swap(a: &GridRect, b: &GridRect) -> (GridRect, GridRect) {
        (a.at(b.origin()), b.at(a.origin()))
    }

    /// Swap `a` and `b` if their footprints are compatible and the exchanged
    /// rectangles stay in the grid without colliding with each other or any
    /// third widget.
    pub fn resolve(
        &self,
        grid: &GridModel,
        index: &OccupancyIndex<'_>,
        a: WidgetId,
        b: WidgetId,
    ) -> Option<SwapOutcome> {
        if a == b {
            return None;
        }
        let rect_a = index.get(a)?.position;
        let widget_b = index.get(b)?;
        if !widget_b.visible {
            return None;
        }
        let rect_b = widget_b.position;
        if !self.can_swap(&rect_a, &rect_b) {
            log::debug!("swap {a} <-> {b} rejected: footprints {} vs {}", rect_a.area(), rect_b.area());
            return None;
        }

        let (new_a, new_b) = Self::swap(&rect_a, &rect_b);
        let pair = [a, b];
        let valid = grid.contains_rect(&new_a)
            && grid.contains_rect(&new_b)
            && !new_a.overlaps(&new_b)
            && index.is_free_excluding_all(&new_a, &pair)
            && index.is_free_excluding_all(&new_b, &pair);
        if !valid {
            log::debug!("swap {a} <-> {b} rejected: exchanged rectangles collide");
            return None;
        }
        Some(SwapOutcome {
            a: (a, new_a),
            b: (b, new_b),
        })
    }
}
