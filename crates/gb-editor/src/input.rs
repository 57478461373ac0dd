//! Input abstraction layer.
//!
//! Normalizes the browser's native drag-and-drop events and the pointer
//! events of resize handles into one `GridEvent` enum consumed by the
//! controller. Coordinates are page pixels; the container rectangle is
//! sampled by the caller at the time of each event.

use crate::payload::DragPayload;
use crate::resize::ResizeHandle;
use gb_core::grid::ContainerRect;
use gb_core::id::WidgetId;

#[derive(Debug, Clone)]
pub enum GridEvent {
    /// `dragstart` on a palette item or a widget tile.
    DragStart { payload: DragPayload },

    /// `dragover` on the grid container.
    DragOver {
        x: f32,
        y: f32,
        container: ContainerRect,
    },

    /// `dragleave` on the grid container. `still_inside` is set when the
    /// pointer only moved onto a child of the container.
    DragLeave { still_inside: bool },

    /// `drop` on the grid container, with the raw `dataTransfer` payload.
    Drop {
        x: f32,
        y: f32,
        container: ContainerRect,
        payload: String,
    },

    /// `dragend` on the drag source.
    DragEnd,

    /// `pointerdown` on one of a tile's corner handles.
    ResizeStart { id: WidgetId, handle: ResizeHandle },

    /// Global `pointermove` while a resize is active.
    PointerMove {
        x: f32,
        y: f32,
        container: ContainerRect,
    },

    /// Global `pointerup` while a resize is active.
    PointerUp,

    /// `lostpointercapture`: the browser took the pointer away mid-resize.
    PointerCaptureLost,
}

impl GridEvent {
    pub fn drag_over(x: f32, y: f32, container: ContainerRect) -> Self {
        Self::DragOver { x, y, container }
    }

    pub fn drop(x: f32, y: f32, container: ContainerRect, payload: impl Into<String>) -> Self {
        Self::Drop {
            x,
            y,
            container,
            payload: payload.into(),
        }
    }

    pub fn pointer_move(x: f32, y: f32, container: ContainerRect) -> Self {
        Self::PointerMove { x, y, container }
    }

    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::DragOver { x, y, .. } | Self::Drop { x, y, .. } | Self::PointerMove { x, y, .. } => {
                Some((*x, *y))
            }
            _ => None,
        }
    }
}
