pub mod arrange;
pub mod config;
pub mod grid;
pub mod id;
pub mod lint;
pub mod model;
pub mod occupancy;
pub mod placement;
pub mod swap;

pub use arrange::{ArrangeOutcome, AutoArranger, OverflowPolicy};
pub use config::{ConfigError, EngineConfig};
pub use grid::{COLUMNS, ContainerRect, GridModel, ROWS};
pub use id::WidgetId;
pub use lint::{LayoutDiagnostic, LintSeverity, is_valid_layout, lint_layout};
pub use model::*;
pub use occupancy::OccupancyIndex;
pub use placement::{PlacementSolver, PlacementStrategy};
pub use swap::{SwapOutcome, SwapResolver};
