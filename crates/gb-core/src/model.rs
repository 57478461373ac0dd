//! Core data model for dashboard widgets on the placement grid.
//!
//! All geometry is in integer grid units. A `GridRect` is half-open:
//! it covers columns `x..x + w` and rows `y..y + h`.

use crate::id::WidgetId;
use serde::{Deserialize, Serialize};

// ─── Geometry ─────────────────────────────────────────────────────────────

/// A grid cell (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in grid units: origin `(x, y)`, extent `(w, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// First column to the right of this rectangle.
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// First row below this rectangle.
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn origin(&self) -> GridCell {
        GridCell::new(self.x, self.y)
    }

    /// Footprint in grid units (`w * h`).
    pub const fn area(&self) -> i32 {
        self.w * self.h
    }

    /// Same extent, moved to `cell`.
    pub const fn at(&self, cell: GridCell) -> Self {
        Self::new(cell.x, cell.y, self.w, self.h)
    }

    /// AABB overlap. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &GridRect) -> bool {
        !(self.x >= other.right()
            || self.right() <= other.x
            || self.y >= other.bottom()
            || self.bottom() <= other.y)
    }

    /// Whether cell `(px, py)` lies inside this rectangle.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

// ─── Widget ───────────────────────────────────────────────────────────────

/// A dashboard widget record.
///
/// The record is owned by the dashboard state; the engine only ever
/// changes `position` and `visible`, and only through a commit port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    pub position: GridRect,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opaque category tag (`"chart"`, `"kpi"`, ...). Not used for placement.
    #[serde(rename = "type", alias = "category", default)]
    pub kind: String,
    /// Display title, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl Widget {
    pub fn new(id: WidgetId, kind: impl Into<String>, position: GridRect) -> Self {
        Self {
            id,
            position,
            visible: true,
            kind: kind.into(),
            title: None,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Shorthand constructor used throughout tests and fixtures.
pub fn widget(id: &str, x: i32, y: i32, w: i32, h: i32) -> Widget {
    Widget::new(WidgetId::intern(id), "generic", GridRect::new(x, y, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_excludes_shared_edges() {
        let a = GridRect::new(0, 0, 4, 2);
        assert!(!a.overlaps(&GridRect::new(4, 0, 4, 2)));
        assert!(!a.overlaps(&GridRect::new(0, 2, 4, 2)));
        assert!(a.overlaps(&GridRect::new(3, 1, 4, 2)));
        assert!(a.overlaps(&GridRect::new(1, 0, 2, 1)));
    }

    #[test]
    fn contains_is_half_open() {
        let r = GridRect::new(2, 2, 3, 2);
        assert!(r.contains(2, 2));
        assert!(r.contains(4, 3));
        assert!(!r.contains(5, 3));
        assert!(!r.contains(4, 4));
    }

    #[test]
    fn widget_json_uses_dashboard_field_names() {
        let json = r#"{"id":"sales","position":{"x":0,"y":0,"w":4,"h":2},"type":"chart"}"#;
        let w: Widget = serde_json::from_str(json).unwrap();
        assert_eq!(w.id.as_str(), "sales");
        assert!(w.visible, "visible defaults to true");
        assert_eq!(w.kind, "chart");

        let out = serde_json::to_value(&w).unwrap();
        assert_eq!(out["type"], "chart");
        assert!(out.get("title").is_none());
    }
}
