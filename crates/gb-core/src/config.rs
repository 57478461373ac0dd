//! Engine configuration.
//!
//! Every field has a default matching the stock 12×12 dashboard, so an
//! empty JSON object is a valid config.

use crate::arrange::{AutoArranger, OverflowPolicy};
use crate::grid::GridModel;
use crate::placement::{DEFAULT_ORDER, PlacementSolver, PlacementStrategy};
use crate::swap::{DEFAULT_SWAP_THRESHOLD, SwapResolver};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("swapThreshold must be in (0, 1], got {0}")]
    SwapThreshold(f32),
    #[error("grid must have at least one column and row, got {columns}x{rows}")]
    GridSize { columns: i32, rows: i32 },
    #[error("widget size limits are inconsistent: {0}")]
    SizeLimits(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub grid: GridModel,
    /// Maximum relative footprint difference for a swap. Default: **0.5**.
    pub swap_threshold: f32,
    /// Placement heuristics, tried in order. `scan` is always appended.
    pub placement_order: Vec<PlacementStrategy>,
    /// Auto-arrange behaviour past the last row. Default: **hide**.
    pub overflow: OverflowPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridModel::default(),
            swap_threshold: DEFAULT_SWAP_THRESHOLD,
            placement_order: DEFAULT_ORDER.to_vec(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Decode and validate a JSON config.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.swap_threshold > 0.0 && self.swap_threshold <= 1.0) {
            return Err(ConfigError::SwapThreshold(self.swap_threshold));
        }
        let g = &self.grid;
        if g.columns < 1 || g.rows < 1 {
            return Err(ConfigError::GridSize {
                columns: g.columns,
                rows: g.rows,
            });
        }
        if g.min_w < 1 || g.min_h < 1 || g.min_w > g.max_w || g.min_h > g.max_h {
            return Err(ConfigError::SizeLimits(format!(
                "w {}..={}, h {}..={}",
                g.min_w, g.max_w, g.min_h, g.max_h
            )));
        }
        if g.min_w > g.columns || g.min_h > g.rows {
            return Err(ConfigError::SizeLimits(format!(
                "minimum {}x{} does not fit a {}x{} grid",
                g.min_w, g.min_h, g.columns, g.rows
            )));
        }
        Ok(())
    }

    pub fn solver(&self) -> PlacementSolver {
        PlacementSolver::with_order(self.grid, &self.placement_order)
    }

    pub fn swapper(&self) -> SwapResolver {
        SwapResolver::new(self.swap_threshold)
    }

    pub fn arranger(&self) -> AutoArranger {
        AutoArranger::new(self.grid, self.overflow).with_solver(self.solver())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.grid.columns, 12);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = EngineConfig::from_json(
            r#"{"swapThreshold":0.25,"placementOrder":["belowLowest"],"overflow":"keep","grid":{"cellHeightPx":64}}"#,
        )
        .unwrap();
        assert_eq!(config.swap_threshold, 0.25);
        assert_eq!(config.overflow, OverflowPolicy::Keep);
        assert_eq!(config.grid.cell_height_px, 64.0);
        assert_eq!(config.grid.rows, 12);
        assert_eq!(
            config.solver().order(),
            &[PlacementStrategy::BelowLowest, PlacementStrategy::Scan]
        );
    }

    #[test]
    fn rejects_bad_threshold() {
        let err = EngineConfig::from_json(r#"{"swapThreshold":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SwapThreshold(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineConfig::from_json("{swapThreshold").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn rejects_inverted_size_limits() {
        let err = EngineConfig::from_json(r#"{"grid":{"minW":6,"maxW":4}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SizeLimits(_)));
    }
}
