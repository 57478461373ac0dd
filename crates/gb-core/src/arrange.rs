//! Batch repack of all visible widgets.
//!
//! Widgets are sorted by footprint (largest first, then id) and row-filled
//! left to right. The whole batch is computed before the caller commits
//! anything.

use crate::grid::GridModel;
use crate::id::WidgetId;
use crate::model::{GridRect, Widget};
use crate::occupancy::OccupancyIndex;
use crate::placement::PlacementSolver;
use serde::{Deserialize, Serialize};

/// What to do with widgets the row-fill pushes below the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverflowPolicy {
    /// Retry in any remaining hole; hide the widget if none fits.
    #[default]
    Hide,
    /// Emit the overflowing rectangle unchanged.
    Keep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrangeOutcome {
    /// New rectangle per widget, in packing order.
    pub moves: Vec<(WidgetId, GridRect)>,
    /// Widgets that no longer fit and should be hidden.
    pub hidden: Vec<WidgetId>,
    /// At least one emitted rectangle extends past the last row.
    pub overflowed: bool,
}

#[derive(Debug, Clone)]
pub struct AutoArranger {
    grid: GridModel,
    overflow: OverflowPolicy,
    solver: PlacementSolver,
}

impl AutoArranger {
    pub fn new(grid: GridModel, overflow: OverflowPolicy) -> Self {
        Self {
            grid,
            overflow,
            solver: PlacementSolver::new(grid),
        }
    }

    /// Use `solver` for the overflow retry pass.
    #[must_use]
    pub fn with_solver(mut self, solver: PlacementSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Greedy row-fill of visible widgets, largest footprint first.
    pub fn rearrange(&self, widgets: &[Widget]) -> ArrangeOutcome {
        let mut order: Vec<&Widget> = widgets.iter().filter(|w| w.visible).collect();
        order.sort_by(|a, b| {
            b.position
                .area()
                .cmp(&a.position.area())
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut cursor_x = 0;
        let mut cursor_y = 0;
        let mut row_height = 0;
        let mut packed: Vec<(WidgetId, GridRect)> = Vec::with_capacity(order.len());
        for widget in order {
            let GridRect { w, h, .. } = widget.position;
            if cursor_x + w <= self.grid.columns {
                packed.push((widget.id, GridRect::new(cursor_x, cursor_y, w, h)));
                cursor_x += w;
                row_height = row_height.max(h);
            } else {
                cursor_y += row_height;
                cursor_x = 0;
                packed.push((widget.id, GridRect::new(cursor_x, cursor_y, w, h)));
                cursor_x += w;
                row_height = h;
            }
        }

        match self.overflow {
            OverflowPolicy::Keep => {
                let overflowed = packed.iter().any(|(_, r)| r.bottom() > self.grid.rows);
                if overflowed {
                    log::warn!("auto-arrange overflowed past row {}", self.grid.rows);
                }
                ArrangeOutcome {
                    moves: packed,
                    hidden: Vec::new(),
                    overflowed,
                }
            }
            OverflowPolicy::Hide => self.settle_overflow(widgets, packed),
        }
    }

    /// Keep rows that fit; re-place the rest with the placement solver or
    /// hide them.
    fn settle_overflow(&self, widgets: &[Widget], packed: Vec<(WidgetId, GridRect)>) -> ArrangeOutcome {
        let (fitting, overflow): (Vec<_>, Vec<_>) = packed
            .into_iter()
            .partition(|(_, rect)| self.grid.contains_rect(rect));

        let mut placed: Vec<Widget> = fitting
            .iter()
            .filter_map(|(id, rect)| {
                let original = widgets.iter().find(|w| w.id == *id)?;
                let mut moved = original.clone();
                moved.position = *rect;
                Some(moved)
            })
            .collect();
        let mut outcome = ArrangeOutcome {
            moves: fitting,
            ..ArrangeOutcome::default()
        };

        for (id, rect) in overflow {
            let index = OccupancyIndex::new(&placed);
            match self.solver.find_free_position(&index, rect.w, rect.h) {
                Some(cell) => {
                    let relocated = rect.at(cell);
                    if let Some(original) = widgets.iter().find(|w| w.id == id) {
                        let mut moved = original.clone();
                        moved.position = relocated;
                        placed.push(moved);
                    }
                    outcome.moves.push((id, relocated));
                }
                None => {
                    log::warn!("auto-arrange: no room for {id}, hiding it");
                    outcome.hidden.push(id);
                }
            }
        }
        outcome
    }
}
