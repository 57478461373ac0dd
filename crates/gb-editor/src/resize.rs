//! Resize session: dragging one corner handle of a tile.
//!
//! Global pointer-move / pointer-up listeners exist only while a session is
//! alive. The session owns a [`ListenerGuard`] that attaches them on start
//! and detaches them when the session is dropped, so every exit path
//! (pointer-up, capture loss, customization turned off, controller drop)
//! releases them exactly once.
//!
//! There is no cancel: the last valid rectangle stays committed.

use gb_core::grid::GridModel;
use gb_core::id::WidgetId;
use gb_core::model::{GridCell, GridRect};
use gb_core::occupancy::OccupancyIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Corner handle of a widget tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    /// Handle moves the left edge.
    fn west(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    /// Handle moves the top edge.
    fn north(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }
}

impl FromStr for ResizeHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nw" => Ok(Self::Nw),
            "ne" => Ok(Self::Ne),
            "sw" => Ok(Self::Sw),
            "se" => Ok(Self::Se),
            other => Err(format!("unknown resize handle `{other}`")),
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nw => "nw",
            Self::Ne => "ne",
            Self::Sw => "sw",
            Self::Se => "se",
        })
    }
}

// ─── Listener scope ──────────────────────────────────────────────────────

/// Host hooks for the global pointer listeners used during a resize.
pub trait PointerListeners {
    fn attach(&self);
    fn detach(&self);
}

/// For hosts that route pointer events unconditionally.
#[derive(Debug, Default)]
pub struct NoopListeners;

impl PointerListeners for NoopListeners {
    fn attach(&self) {}
    fn detach(&self) {}
}

/// Attaches on construction, detaches on drop.
pub struct ListenerGuard {
    listeners: Rc<dyn PointerListeners>,
}

impl ListenerGuard {
    pub fn acquire(listeners: Rc<dyn PointerListeners>) -> Self {
        listeners.attach();
        Self { listeners }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.listeners.detach();
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ListenerGuard")
    }
}

// ─── Session ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ResizeSession {
    widget_id: WidgetId,
    handle: ResizeHandle,
    origin: GridRect,
    current: GridRect,
    _listeners: ListenerGuard,
}

impl ResizeSession {
    pub fn start(
        widget_id: WidgetId,
        handle: ResizeHandle,
        origin: GridRect,
        listeners: Rc<dyn PointerListeners>,
    ) -> Self {
        log::debug!("resize start {widget_id} via {handle} from {origin:?}");
        Self {
            widget_id,
            handle,
            origin,
            current: origin,
            _listeners: ListenerGuard::acquire(listeners),
        }
    }

    pub fn widget_id(&self) -> WidgetId {
        self.widget_id
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// Rectangle at resize start.
    pub fn origin(&self) -> GridRect {
        self.origin
    }

    /// Last committed rectangle.
    pub fn current(&self) -> GridRect {
        self.current
    }

    /// Candidate rectangle for the pointer at `cell`, clamped to the size
    /// limits only.
    pub fn candidate(&self, cell: GridCell, grid: &GridModel) -> GridRect {
        let o = self.origin;
        let mut rect = o;

        if self.handle.west() {
            let right = o.right();
            rect.x = cell.x.clamp(0, (right - grid.min_w).max(0));
            rect.w = (right - rect.x).clamp(grid.min_w, grid.max_w);
        } else {
            rect.w = (cell.x - o.x + 1).clamp(grid.min_w, grid.max_w);
        }

        if self.handle.north() {
            let bottom = o.bottom();
            rect.y = cell.y.clamp(0, (bottom - grid.min_h).max(0));
            rect.h = (bottom - rect.y).clamp(grid.min_h, grid.max_h);
        } else {
            rect.h = (cell.y - o.y + 1).clamp(grid.min_h, grid.max_h);
        }
        rect
    }

    /// Track the pointer. Returns the new rectangle when it differs from the
    /// last committed one and is free; otherwise the resize sticks.
    pub fn pointer_move(
        &mut self,
        cell: GridCell,
        grid: &GridModel,
        index: &OccupancyIndex<'_>,
    ) -> Option<GridRect> {
        let mut rect = self.candidate(cell, grid);
        // Trim east/south growth at the grid edge.
        rect.w = rect.w.min(grid.columns - rect.x);
        rect.h = rect.h.min(grid.rows - rect.y);

        if rect == self.current || !grid.is_valid_rect(&rect) {
            return None;
        }
        if !index.is_free(&rect, Some(self.widget_id)) {
            log::trace!("resize {} blocked at {rect:?}", self.widget_id);
            return None;
        }
        self.current = rect;
        Some(rect)
    }
}
