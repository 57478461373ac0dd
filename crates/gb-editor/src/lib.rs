pub mod controller;
pub mod drag;
pub mod input;
pub mod payload;
pub mod port;
pub mod resize;

pub use controller::{DashboardController, EventOutcome};
pub use drag::{DragKind, DragPhase, DragSession, DropDecision, DropPreview};
pub use input::GridEvent;
pub use payload::{DragPayload, PayloadError};
pub use port::{CommitPort, GridMutation, LocalBoard};
pub use resize::{ListenerGuard, NoopListeners, PointerListeners, ResizeHandle, ResizeSession};
