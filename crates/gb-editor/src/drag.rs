//! Drag session: one palette drop or one tile reposition.
//!
//! ```text
//! Idle ──start──▶ Dragging ──drag_over──▶ Dragging
//!                    │
//!                    ├──drop────▶ Dropped   (DropDecision)
//!                    └──leave/end▶ Cancelled (no commit)
//! ```
//!
//! `Idle` is the absence of a session; the controller holds at most one.
//! Everything before the drop is advisory: previews never commit.

use crate::payload::DragPayload;
use gb_core::grid::{ContainerRect, GridModel};
use gb_core::id::WidgetId;
use gb_core::model::{GridCell, GridRect, Widget};
use gb_core::occupancy::OccupancyIndex;
use gb_core::placement::PlacementSolver;
use gb_core::swap::{SwapOutcome, SwapResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Dragged in from the widget palette.
    NewWidget,
    /// Repositioning a tile already on the grid.
    ExistingWidget(WidgetId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Dragging,
    Dropped,
    Cancelled,
}

/// What the drop should commit.
#[derive(Debug, Clone, PartialEq)]
pub enum DropDecision {
    /// The clamped target is free.
    Place(GridRect),
    /// Exchange origins with the occupant of the target.
    Swap(SwapOutcome),
    /// Target blocked; the placement solver found this rectangle instead.
    Relocate(GridRect),
    /// Nowhere to put it. The widget keeps its prior position.
    Rejected,
}

impl DropDecision {
    /// Final rectangle of the dragged widget, if anything is committed.
    pub fn target(&self) -> Option<GridRect> {
        match self {
            Self::Place(rect) | Self::Relocate(rect) => Some(*rect),
            Self::Swap(outcome) => Some(outcome.a.1),
            Self::Rejected => None,
        }
    }
}

/// Advisory state for highlighting the drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropPreview {
    pub target: GridRect,
    pub free: bool,
    pub swap_candidate: Option<WidgetId>,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    kind: DragKind,
    widget: Widget,
    phase: DragPhase,
    current_cell: Option<GridCell>,
    swap_candidate: Option<WidgetId>,
}

impl DragSession {
    pub fn start(payload: DragPayload) -> Self {
        let kind = if payload.is_dragging_existing {
            DragKind::ExistingWidget(payload.widget.id)
        } else {
            DragKind::NewWidget
        };
        log::debug!("drag start {:?} ({}x{})", kind, payload.widget.position.w, payload.widget.position.h);
        Self {
            kind,
            widget: payload.widget,
            phase: DragPhase::Dragging,
            current_cell: None,
            swap_candidate: None,
        }
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The dragged record as carried by the payload.
    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// Declared `(w, h)`.
    pub fn size(&self) -> (i32, i32) {
        (self.widget.position.w, self.widget.position.h)
    }

    pub fn current_cell(&self) -> Option<GridCell> {
        self.current_cell
    }

    pub fn swap_candidate(&self) -> Option<WidgetId> {
        self.swap_candidate
    }

    fn dragged_id(&self) -> Option<WidgetId> {
        match self.kind {
            DragKind::ExistingWidget(id) => Some(id),
            DragKind::NewWidget => None,
        }
    }

    /// Track the pointer. Returns a preview of where a drop would land.
    pub fn drag_over(
        &mut self,
        grid: &GridModel,
        index: &OccupancyIndex<'_>,
        x: f32,
        y: f32,
        container: ContainerRect,
        customizing: bool,
    ) -> DropPreview {
        let cell = grid.pixel_to_cell(x, y, container);
        self.current_cell = Some(cell);
        self.swap_candidate = if customizing {
            index
                .widget_at(cell.x, cell.y)
                .filter(|id| Some(*id) != self.dragged_id())
        } else {
            None
        };
        log::trace!("drag over cell ({}, {}) candidate {:?}", cell.x, cell.y, self.swap_candidate);

        let (w, h) = self.size();
        let target = grid.clamp_to_grid(cell, w, h);
        DropPreview {
            target,
            free: index.is_free(&target, self.dragged_id()),
            swap_candidate: self.swap_candidate,
        }
    }

    /// Resolve the drop at `cell` and move to `Dropped`.
    ///
    /// Order: free target, then swap with the occupant, then the placement
    /// solver. Swapping is limited to existing widgets and only happens
    /// while `customizing` is set; outside customization an occupied target
    /// always falls through to the solver.
    pub fn drop_at(
        &mut self,
        cell: GridCell,
        grid: &GridModel,
        index: &OccupancyIndex<'_>,
        solver: &PlacementSolver,
        swapper: &SwapResolver,
        customizing: bool,
    ) -> DropDecision {
        self.phase = DragPhase::Dropped;
        self.current_cell = Some(cell);
        let (w, h) = self.size();
        let target = grid.clamp_to_grid(cell, w, h);
        let me = self.dragged_id();

        if index.is_free(&target, me) {
            return DropDecision::Place(target);
        }

        if customizing && let Some(me) = me {
            let occupant = index
                .widget_at(cell.x, cell.y)
                .filter(|id| *id != me)
                .or_else(|| index.first_overlap(&target, Some(me)).map(|w| w.id));
            if let Some(other) = occupant
                && let Some(outcome) = swapper.resolve(grid, index, me, other)
            {
                return DropDecision::Swap(outcome);
            }
        }

        let fallback = match me {
            Some(me) => solver.find_free_position_excluding(index, w, h, me),
            None => solver.find_free_position(index, w, h),
        };
        match fallback {
            Some(origin) => DropDecision::Relocate(GridRect::new(origin.x, origin.y, w, h)),
            None => {
                log::warn!("drop of {:?} rejected: grid has no room for {w}x{h}", self.widget.id);
                DropDecision::Rejected
            }
        }
    }

    pub fn cancel(&mut self) {
        log::debug!("drag cancelled {:?}", self.kind);
        self.phase = DragPhase::Cancelled;
        self.swap_candidate = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_core::model::widget;

    const CONTAINER: ContainerRect = ContainerRect::new(0.0, 0.0, 1200.0);

    fn tools() -> (GridModel, PlacementSolver, SwapResolver) {
        let grid = GridModel::default();
        (grid, PlacementSolver::new(grid), SwapResolver::default())
    }

    /// Pixel center of cell `(x, y)` on a 1200px-wide container.
    fn px(x: i32, y: i32) -> (f32, f32) {
        (x as f32 * 100.0 + 50.0, y as f32 * 80.0 + 40.0)
    }

    #[test]
    fn drag_over_tracks_cell_and_candidate() {
        let (grid, ..) = tools();
        let widgets = vec![widget("a", 0, 0, 4, 2), widget("b", 4, 0, 4, 2)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::existing(widgets[0].clone()));

        let (x, y) = px(5, 1);
        let preview = session.drag_over(&grid, &index, x, y, CONTAINER, true);
        assert_eq!(session.current_cell(), Some(GridCell::new(5, 1)));
        assert_eq!(preview.swap_candidate, Some(WidgetId::intern("b")));
        assert!(!preview.free);

        // Hovering over itself is not a swap, and its own cells count as free.
        let (x, y) = px(0, 0);
        let preview = session.drag_over(&grid, &index, x, y, CONTAINER, true);
        assert_eq!(preview.swap_candidate, None);
        assert!(preview.free);
    }

    #[test]
    fn candidate_requires_customizing() {
        let (grid, ..) = tools();
        let widgets = vec![widget("a", 0, 0, 4, 2)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::new_widget(widget("new", 0, 0, 2, 2)));
        let (x, y) = px(1, 0);
        let preview = session.drag_over(&grid, &index, x, y, CONTAINER, false);
        assert_eq!(preview.swap_candidate, None);
    }

    #[test]
    fn drop_on_free_cell_places_there() {
        let (grid, solver, swapper) = tools();
        let widgets = vec![widget("a", 0, 0, 4, 2)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::new_widget(widget("new", 0, 0, 4, 2)));
        let decision = session.drop_at(GridCell::new(6, 3), &grid, &index, &solver, &swapper, true);
        assert_eq!(decision, DropDecision::Place(GridRect::new(6, 3, 4, 2)));
        assert_eq!(session.phase(), DragPhase::Dropped);
    }

    #[test]
    fn drop_near_edge_is_clamped() {
        let (grid, solver, swapper) = tools();
        let mut session = DragSession::start(DragPayload::new_widget(widget("new", 0, 0, 4, 2)));
        let decision = session.drop_at(
            GridCell::new(11, 11),
            &grid,
            &OccupancyIndex::new(&[]),
            &solver,
            &swapper,
            true,
        );
        assert_eq!(decision, DropDecision::Place(GridRect::new(8, 10, 4, 2)));
    }

    #[test]
    fn drop_onto_similar_widget_swaps() {
        let (grid, solver, swapper) = tools();
        let widgets = vec![widget("a", 0, 0, 4, 2), widget("b", 4, 0, 4, 2)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::existing(widgets[0].clone()));
        let decision = session.drop_at(GridCell::new(5, 0), &grid, &index, &solver, &swapper, true);
        match decision {
            DropDecision::Swap(outcome) => {
                assert_eq!(outcome.a, (WidgetId::intern("a"), GridRect::new(4, 0, 4, 2)));
                assert_eq!(outcome.b, (WidgetId::intern("b"), GridRect::new(0, 0, 4, 2)));
            }
            other => panic!("expected Swap, got {other:?}"),
        }
    }

    #[test]
    fn occupied_drop_outside_customization_relocates() {
        let (grid, solver, swapper) = tools();
        let widgets = vec![widget("a", 0, 0, 4, 2), widget("b", 4, 0, 4, 2)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::existing(widgets[0].clone()));
        let decision = session.drop_at(GridCell::new(5, 0), &grid, &index, &solver, &swapper, false);
        match decision {
            DropDecision::Relocate(rect) => assert!(!rect.overlaps(&widgets[1].position)),
            other => panic!("expected Relocate, got {other:?}"),
        }
    }

    #[test]
    fn incompatible_swap_falls_back_to_solver() {
        let (grid, solver, swapper) = tools();
        let widgets = vec![widget("small", 0, 0, 2, 1), widget("big", 4, 0, 8, 4)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::existing(widgets[0].clone()));
        let decision = session.drop_at(GridCell::new(6, 1), &grid, &index, &solver, &swapper, true);
        // No room right of `big`, so below-lowest wins over the scan.
        assert_eq!(decision, DropDecision::Relocate(GridRect::new(0, 4, 2, 1)));
    }

    #[test]
    fn full_grid_rejects_new_widget() {
        let (grid, solver, swapper) = tools();
        let widgets = vec![widget("wall", 0, 0, 12, 12)];
        let index = OccupancyIndex::new(&widgets);
        let mut session = DragSession::start(DragPayload::new_widget(widget("new", 0, 0, 2, 1)));
        let decision = session.drop_at(GridCell::new(3, 3), &grid, &index, &solver, &swapper, true);
        assert_eq!(decision, DropDecision::Rejected);
        assert_eq!(decision.target(), None);
    }
}
