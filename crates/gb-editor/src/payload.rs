//! Drag payload wire format.
//!
//! The browser's drag-and-drop channel only carries strings, so the drag
//! source serializes the full widget record plus an `isDraggingExisting`
//! flag, and the drop target decodes it here:
//!
//! ```json
//! {"id":"sales","position":{"x":0,"y":0,"w":4,"h":2},"visible":true,
//!  "type":"chart","isDraggingExisting":false}
//! ```

use gb_core::grid::GridModel;
use gb_core::model::Widget;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed drag payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("drag payload for `{id}` has invalid size {w}x{h}")]
    InvalidSize { id: String, w: i32, h: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(flatten)]
    pub widget: Widget,
    /// `true` when repositioning a tile already on the grid, `false` for a
    /// palette item.
    #[serde(default)]
    pub is_dragging_existing: bool,
}

impl DragPayload {
    pub fn new_widget(widget: Widget) -> Self {
        Self {
            widget,
            is_dragging_existing: false,
        }
    }

    pub fn existing(widget: Widget) -> Self {
        Self {
            widget,
            is_dragging_existing: true,
        }
    }

    /// Decode a payload and check its declared size against `grid`.
    ///
    /// # Errors
    /// Returns [`PayloadError`] for unparseable JSON, missing fields, or a
    /// size outside the widget limits.
    pub fn from_json(json: &str, grid: &GridModel) -> Result<Self, PayloadError> {
        let payload: DragPayload = serde_json::from_str(json)?;
        let p = payload.widget.position;
        if !grid.is_valid_size(p.w, p.h) {
            return Err(PayloadError::InvalidSize {
                id: payload.widget.id.as_str().to_string(),
                w: p.w,
                h: p.h,
            });
        }
        Ok(payload)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
