//! Grid geometry and the pixel → cell transform.
//!
//! The container rectangle is supplied fresh on every pointer event; nothing
//! here caches it, because the dashboard can reflow mid-drag.

use crate::model::{GridCell, GridRect};
use serde::{Deserialize, Serialize};

pub const COLUMNS: i32 = 12;
pub const ROWS: i32 = 12;
pub const CELL_HEIGHT_PX: f32 = 80.0;
pub const MIN_W: i32 = 2;
pub const MAX_W: i32 = 12;
pub const MIN_H: i32 = 1;
pub const MAX_H: i32 = 8;

/// Live bounding box of the grid container, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

impl ContainerRect {
    pub const fn new(left: f32, top: f32, width: f32) -> Self {
        Self { left, top, width }
    }
}

/// Fixed grid geometry for one dashboard instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridModel {
    pub columns: i32,
    pub rows: i32,
    pub cell_height_px: f32,
    pub min_w: i32,
    pub max_w: i32,
    pub min_h: i32,
    pub max_h: i32,
}

impl Default for GridModel {
    fn default() -> Self {
        Self {
            columns: COLUMNS,
            rows: ROWS,
            cell_height_px: CELL_HEIGHT_PX,
            min_w: MIN_W,
            max_w: MAX_W,
            min_h: MIN_H,
            max_h: MAX_H,
        }
    }
}

impl GridModel {
    /// Convert a pointer position to the grid cell beneath it, clamped into
    /// the grid.
    pub fn pixel_to_cell(&self, pointer_x: f32, pointer_y: f32, container: ContainerRect) -> GridCell {
        let cell_width = container.width / self.columns as f32;
        let gx = if cell_width > 0.0 && cell_width.is_finite() {
            ((pointer_x - container.left) / cell_width).floor()
        } else {
            0.0
        };
        let gy = if self.cell_height_px > 0.0 {
            ((pointer_y - container.top) / self.cell_height_px).floor()
        } else {
            0.0
        };
        // `as` saturates and maps NaN to 0, so the clamp below is total.
        GridCell::new(
            (gx as i32).clamp(0, self.columns - 1),
            (gy as i32).clamp(0, self.rows - 1),
        )
    }

    /// Whether `rect` lies entirely inside the grid.
    pub fn contains_rect(&self, rect: &GridRect) -> bool {
        rect.x >= 0
            && rect.y >= 0
            && rect.w > 0
            && rect.h > 0
            && rect.right() <= self.columns
            && rect.bottom() <= self.rows
    }

    /// Whether `(w, h)` is within the widget size limits.
    pub fn is_valid_size(&self, w: i32, h: i32) -> bool {
        (self.min_w..=self.max_w).contains(&w) && (self.min_h..=self.max_h).contains(&h)
    }

    /// Clamp a size into the widget size limits (and the grid itself).
    pub fn clamp_size(&self, w: i32, h: i32) -> (i32, i32) {
        (
            w.clamp(self.min_w, self.max_w.min(self.columns)),
            h.clamp(self.min_h, self.max_h.min(self.rows)),
        )
    }

    /// Place a `w × h` rectangle with its origin at `cell`, shifted back so
    /// it stays inside the grid.
    pub fn clamp_to_grid(&self, cell: GridCell, w: i32, h: i32) -> GridRect {
        let x = cell.x.clamp(0, (self.columns - w).max(0));
        let y = cell.y.clamp(0, (self.rows - h).max(0));
        GridRect::new(x, y, w, h)
    }

    /// Bounds invariant plus size limits.
    pub fn is_valid_rect(&self, rect: &GridRect) -> bool {
        self.contains_rect(rect) && self.is_valid_size(rect.w, rect.h)
    }
}
