//! Collision queries over a widget snapshot.
//!
//! Linear scans: dashboards hold tens of widgets, so every query is cheap
//! enough to run on each pointer-move.

use crate::id::WidgetId;
use crate::model::{GridRect, Widget};

/// Read-only occupancy view of one widget snapshot.
///
/// Invisible widgets take no space and cannot be hit.
#[derive(Debug, Clone, Copy)]
pub struct OccupancyIndex<'a> {
    widgets: &'a [Widget],
}

impl<'a> OccupancyIndex<'a> {
    pub fn new(widgets: &'a [Widget]) -> Self {
        Self { widgets }
    }

    /// Visible widgets, in snapshot order.
    pub fn visible(self) -> impl Iterator<Item = &'a Widget> {
        self.widgets.iter().filter(|w| w.visible)
    }

    /// Look up a widget (visible or not) by id.
    pub fn get(&self, id: WidgetId) -> Option<&'a Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.visible().next().is_none()
    }

    /// First visible widget (other than `exclude`) overlapping `rect`.
    pub fn first_overlap(&self, rect: &GridRect, exclude: Option<WidgetId>) -> Option<&'a Widget> {
        self.visible()
            .filter(|w| Some(w.id) != exclude)
            .find(|w| w.position.overlaps(rect))
    }

    /// `true` iff no visible widget other than `exclude` overlaps `rect`.
    pub fn is_free(&self, rect: &GridRect, exclude: Option<WidgetId>) -> bool {
        self.first_overlap(rect, exclude).is_none()
    }

    /// Like [`is_free`](Self::is_free) but ignoring every id in `exclude`.
    pub fn is_free_excluding_all(&self, rect: &GridRect, exclude: &[WidgetId]) -> bool {
        !self
            .visible()
            .filter(|w| !exclude.contains(&w.id))
            .any(|w| w.position.overlaps(rect))
    }

    /// First visible widget whose rectangle contains cell `(x, y)`.
    pub fn widget_at(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.visible()
            .find(|w| w.position.contains(x, y))
            .map(|w| w.id)
    }

    /// Lowest occupied row boundary (`max(y + h)`), or 0 when empty.
    pub fn max_bottom(&self) -> i32 {
        self.visible().map(|w| w.position.bottom()).max().unwrap_or(0)
    }

    /// Every overlapping pair of visible widgets.
    pub fn overlapping_pairs(&self) -> Vec<(WidgetId, WidgetId)> {
        let visible: Vec<&Widget> = self.visible().collect();
        let mut pairs = Vec::new();
        for (i, a) in visible.iter().enumerate() {
            for b in &visible[i + 1..] {
                if a.position.overlaps(&b.position) {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }
}
