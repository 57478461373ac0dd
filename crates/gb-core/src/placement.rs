//! Free-position search for new or relocated widgets.
//!
//! Strategies run in order and the first hit wins. The default order keeps
//! new widgets next to existing ones (adjacent-right, then below the lowest
//! widget) and only then falls back to an exhaustive row-major scan, so a
//! position is found whenever one exists.

use crate::grid::GridModel;
use crate::id::WidgetId;
use crate::model::{GridCell, GridRect, Widget};
use crate::occupancy::OccupancyIndex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One heuristic in the placement chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementStrategy {
    /// Immediately right of an existing widget, same top row.
    AdjacentRight,
    /// Column 0, directly below the lowest widget.
    BelowLowest,
    /// Row-major scan over every origin.
    Scan,
}

pub const DEFAULT_ORDER: [PlacementStrategy; 3] = [
    PlacementStrategy::AdjacentRight,
    PlacementStrategy::BelowLowest,
    PlacementStrategy::Scan,
];

#[derive(Debug, Clone)]
pub struct PlacementSolver {
    grid: GridModel,
    order: SmallVec<[PlacementStrategy; 3]>,
}

impl PlacementSolver {
    pub fn new(grid: GridModel) -> Self {
        Self::with_order(grid, &DEFAULT_ORDER)
    }

    /// Use a custom strategy order. Duplicates are dropped and `Scan` is
    /// appended when missing.
    pub fn with_order(grid: GridModel, order: &[PlacementStrategy]) -> Self {
        let mut deduped: SmallVec<[PlacementStrategy; 3]> = SmallVec::new();
        for strategy in order {
            if !deduped.contains(strategy) {
                deduped.push(*strategy);
            }
        }
        if !deduped.contains(&PlacementStrategy::Scan) {
            deduped.push(PlacementStrategy::Scan);
        }
        Self {
            grid,
            order: deduped,
        }
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn order(&self) -> &[PlacementStrategy] {
        &self.order
    }

    /// Find an origin for a `w × h` rectangle that overlaps no visible widget.
    pub fn find_free_position(&self, index: &OccupancyIndex<'_>, w: i32, h: i32) -> Option<GridCell> {
        self.search(index, w, h, None)
    }

    /// Same search, but `exclude` is treated as absent (relocating it).
    pub fn find_free_position_excluding(
        &self,
        index: &OccupancyIndex<'_>,
        w: i32,
        h: i32,
        exclude: WidgetId,
    ) -> Option<GridCell> {
        self.search(index, w, h, Some(exclude))
    }

    fn search(
        &self,
        index: &OccupancyIndex<'_>,
        w: i32,
        h: i32,
        exclude: Option<WidgetId>,
    ) -> Option<GridCell> {
        if w <= 0 || h <= 0 || w > self.grid.columns || h > self.grid.rows {
            return None;
        }

        let mut others: Vec<&Widget> = index
            .visible()
            .filter(|widget| Some(widget.id) != exclude)
            .collect();
        if others.is_empty() {
            return Some(GridCell::new(0, 0));
        }
        others.sort_by_key(|widget| (widget.position.y, widget.position.x));

        for strategy in &self.order {
            let found = match strategy {
                PlacementStrategy::AdjacentRight => self.adjacent_right(index, &others, w, h, exclude),
                PlacementStrategy::BelowLowest => self.below_lowest(index, &others, w, h, exclude),
                PlacementStrategy::Scan => self.scan(index, w, h, exclude),
            };
            if let Some(cell) = found {
                log::trace!("placement {w}x{h} -> ({}, {}) via {strategy:?}", cell.x, cell.y);
                return Some(cell);
            }
        }
        log::debug!("no free position for {w}x{h}");
        None
    }

    fn fits(&self, index: &OccupancyIndex<'_>, rect: &GridRect, exclude: Option<WidgetId>) -> bool {
        self.grid.contains_rect(rect) && index.is_free(rect, exclude)
    }

    fn adjacent_right(
        &self,
        index: &OccupancyIndex<'_>,
        others: &[&Widget],
        w: i32,
        h: i32,
        exclude: Option<WidgetId>,
    ) -> Option<GridCell> {
        others
            .iter()
            .map(|widget| GridRect::new(widget.position.right(), widget.position.y, w, h))
            .find(|rect| self.fits(index, rect, exclude))
            .map(|rect| rect.origin())
    }

    fn below_lowest(
        &self,
        index: &OccupancyIndex<'_>,
        others: &[&Widget],
        w: i32,
        h: i32,
        exclude: Option<WidgetId>,
    ) -> Option<GridCell> {
        let max_bottom = others
            .iter()
            .map(|widget| widget.position.bottom())
            .max()
            .unwrap_or(0);
        let rect = GridRect::new(0, max_bottom, w, h);
        self.fits(index, &rect, exclude).then(|| rect.origin())
    }

    fn scan(
        &self,
        index: &OccupancyIndex<'_>,
        w: i32,
        h: i32,
        exclude: Option<WidgetId>,
    ) -> Option<GridCell> {
        for y in 0..=(self.grid.rows - h) {
            for x in 0..=(self.grid.columns - w) {
                let rect = GridRect::new(x, y, w, h);
                if index.is_free(&rect, exclude) {
                    return Some(rect.origin());
                }
            }
        }
        None
    }
}
