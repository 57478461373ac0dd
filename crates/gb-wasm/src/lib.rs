//! WASM bridge for Gridboard: exposes the dashboard controller to the
//! browser.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards its
//! drag-and-drop and pointer events here with the grid container's
//! bounding rectangle sampled at event time; results come back as JSON
//! strings or short outcome names.

use gb_core::arrange::ArrangeOutcome;
use gb_core::config::EngineConfig;
use gb_core::grid::ContainerRect;
use gb_core::id::WidgetId;
use gb_core::lint::{LayoutDiagnostic, LintSeverity, lint_layout};
use gb_core::model::{GridRect, Widget};
use gb_editor::controller::{DashboardController, EventOutcome};
use gb_editor::drag::DropPreview;
use gb_editor::input::GridEvent;
use gb_editor::payload::DragPayload;
use gb_editor::port::{CommitPort, GridMutation, LocalBoard};
use gb_editor::resize::{PointerListeners, ResizeHandle};
use serde_json::{Value, json};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

// ─── Commit port with JS notification ────────────────────────────────────

/// Keeps the widget records locally and reports every applied mutation to
/// an optional JS callback as a JSON string.
///
/// Callbacks are queued as microtasks rather than called inline: the board
/// is still borrowed while a commit runs, and a callback that reads it back
/// (say `widgetsJson()` to re-render) would otherwise hit a recursive borrow.
#[derive(Default)]
struct BridgePort {
    board: LocalBoard,
    on_commit: Option<js_sys::Function>,
}

impl BridgePort {
    fn notify(&mut self) {
        let mutations = self.board.take_log();
        let Some(callback) = &self.on_commit else {
            return;
        };
        for mutation in &mutations {
            defer_call(callback, &mutation_json(mutation).to_string());
        }
    }
}

#[wasm_bindgen(inline_js = "export function defer_call(cb, arg) { queueMicrotask(() => cb(arg)); }")]
extern "C" {
    /// Run `cb(arg)` once the current call into the module has returned.
    fn defer_call(cb: &js_sys::Function, arg: &str);
}

impl CommitPort for BridgePort {
    fn snapshot(&self) -> &[Widget] {
        self.board.snapshot()
    }

    fn add_widget(&mut self, widget: Widget, position: GridRect) {
        self.board.add_widget(widget, position);
        self.notify();
    }

    fn remove_widget(&mut self, id: WidgetId) {
        self.board.remove_widget(id);
        self.notify();
    }

    fn toggle_widget(&mut self, id: WidgetId) {
        self.board.toggle_widget(id);
        self.notify();
    }

    fn move_widget(&mut self, id: WidgetId, position: GridRect) {
        self.board.move_widget(id, position);
        self.notify();
    }

    fn move_batch(&mut self, moves: &[(WidgetId, GridRect)]) {
        self.board.move_batch(moves);
        self.notify();
    }
}

// ─── Listener hooks ──────────────────────────────────────────────────────

/// Calls back into JS to add/remove the window-level pointer listeners.
struct JsListeners {
    attach: js_sys::Function,
    detach: js_sys::Function,
}

impl PointerListeners for JsListeners {
    fn attach(&self) {
        if let Err(err) = self.attach.call0(&JsValue::NULL) {
            log::warn!("attach listeners threw: {err:?}");
        }
    }

    fn detach(&self) {
        if let Err(err) = self.detach.call0(&JsValue::NULL) {
            log::warn!("detach listeners threw: {err:?}");
        }
    }
}

// ─── GridBoard ───────────────────────────────────────────────────────────

/// The WASM-facing dashboard grid.
///
/// Owns the widget records (through its commit port) and the active drag
/// or resize session. All interaction from the page goes through here.
#[wasm_bindgen]
pub struct GridBoard {
    controller: DashboardController<BridgePort>,
}

impl Default for GridBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GridBoard {
    /// Create an empty board with the stock 12×12 configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            controller: DashboardController::new(BridgePort::default()),
        }
    }

    /// Replace the engine configuration, keeping the current widgets.
    /// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn configure(&mut self, config_json: &str) -> String {
        let applied = EngineConfig::from_json(config_json).and_then(|config| self.controller.set_config(config));
        match applied {
            Ok(()) => ok_json(),
            Err(err) => error_json(&err.to_string()),
        }
    }

    /// Register `callback(mutationJson)`, called once per commit in commit
    /// order. Calls run as microtasks after the triggering method returns,
    /// so the callback may read the board.
    pub fn set_on_commit(&mut self, callback: js_sys::Function) {
        self.controller.port_mut().on_commit = Some(callback);
    }

    /// Register the functions that add and remove the window-level
    /// `pointermove`/`pointerup` listeners used during a resize.
    pub fn set_pointer_listeners(&mut self, attach: js_sys::Function, detach: js_sys::Function) {
        self.controller.set_listeners(Rc::new(JsListeners { attach, detach }));
    }

    /// Load a widget list (default layout or restored configuration).
    /// Returns the diagnostics of the input as JSON, or an error object.
    pub fn load(&mut self, widgets_json: &str) -> String {
        let widgets: Vec<Widget> = match serde_json::from_str(widgets_json) {
            Ok(widgets) => widgets,
            Err(err) => return error_json(&err.to_string()),
        };
        let diags = self.controller.load(widgets);
        diagnostics_json(&diags).to_string()
    }

    /// Current widget records as a JSON array.
    pub fn widgets_json(&self) -> String {
        serde_json::to_string(self.controller.widgets()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn set_customizing(&mut self, on: bool) {
        self.controller.set_customizing(on);
    }

    pub fn is_customizing(&self) -> bool {
        self.controller.is_customizing()
    }

    // ── Drag and drop ───────────────────────────────────────────────────

    pub fn drag_start(&mut self, payload_json: &str) -> String {
        let grid = self.controller.config().grid;
        match DragPayload::from_json(payload_json, &grid) {
            Ok(payload) => self.dispatch(GridEvent::DragStart { payload }),
            Err(err) => {
                log::warn!("drag start ignored: {err}");
                outcome_name(EventOutcome::Ignored).to_string()
            }
        }
    }

    pub fn drag_over(&mut self, x: f32, y: f32, left: f32, top: f32, width: f32) -> String {
        self.dispatch(GridEvent::drag_over(x, y, ContainerRect::new(left, top, width)))
    }

    /// Hover preview of the active drag as JSON, or `null`.
    pub fn drag_preview_json(&self) -> String {
        match self.controller.drag_preview() {
            Some(preview) => preview_json(&preview).to_string(),
            None => "null".to_string(),
        }
    }

    pub fn drag_leave(&mut self, still_inside: bool) -> String {
        self.dispatch(GridEvent::DragLeave { still_inside })
    }

    pub fn drop_payload(&mut self, x: f32, y: f32, left: f32, top: f32, width: f32, payload: String) -> String {
        self.dispatch(GridEvent::drop(x, y, ContainerRect::new(left, top, width), payload))
    }

    pub fn drag_end(&mut self) -> String {
        self.dispatch(GridEvent::DragEnd)
    }

    // ── Resize ──────────────────────────────────────────────────────────

    /// `handle` is one of `nw`, `ne`, `sw`, `se`.
    pub fn resize_start(&mut self, id: &str, handle: &str) -> String {
        match handle.parse::<ResizeHandle>() {
            Ok(handle) => self.dispatch(GridEvent::ResizeStart {
                id: WidgetId::intern(id),
                handle,
            }),
            Err(err) => {
                log::warn!("{err}");
                outcome_name(EventOutcome::Ignored).to_string()
            }
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, left: f32, top: f32, width: f32) -> String {
        self.dispatch(GridEvent::pointer_move(x, y, ContainerRect::new(left, top, width)))
    }

    pub fn pointer_up(&mut self) -> String {
        self.dispatch(GridEvent::PointerUp)
    }

    pub fn pointer_capture_lost(&mut self) -> String {
        self.dispatch(GridEvent::PointerCaptureLost)
    }

    // ── Commands ────────────────────────────────────────────────────────

    pub fn toggle_widget(&mut self, id: &str) -> String {
        outcome_name(self.controller.toggle_widget(WidgetId::intern(id))).to_string()
    }

    pub fn remove_widget(&mut self, id: &str) -> String {
        outcome_name(self.controller.remove_widget(WidgetId::intern(id))).to_string()
    }

    /// Repack the board. Returns `{"moved":n,"hidden":[...],"overflowed":b}`.
    pub fn auto_arrange(&mut self) -> String {
        arrange_json(&self.controller.auto_arrange()).to_string()
    }

    /// End any active session without committing.
    pub fn reset(&mut self) {
        self.controller.reset();
    }
}

impl GridBoard {
    fn dispatch(&mut self, event: GridEvent) -> String {
        outcome_name(self.controller.handle(event)).to_string()
    }
}

// ─── Standalone functions ────────────────────────────────────────────────

/// Lint a widget list against the stock grid. Returns a JSON array of
/// diagnostics, or an error object for malformed input.
#[wasm_bindgen]
pub fn lint(widgets_json: &str) -> String {
    match serde_json::from_str::<Vec<Widget>>(widgets_json) {
        Ok(widgets) => {
            let diags = lint_layout(&widgets, &EngineConfig::default().grid);
            diagnostics_json(&diags).to_string()
        }
        Err(err) => error_json(&err.to_string()),
    }
}

// ─── JSON shapes ─────────────────────────────────────────────────────────

fn outcome_name(outcome: EventOutcome) -> &'static str {
    match outcome {
        EventOutcome::Ignored => "ignored",
        EventOutcome::Changed => "changed",
        EventOutcome::Committed => "committed",
        EventOutcome::Rejected => "rejected",
    }
}

fn ok_json() -> String {
    json!({ "ok": true }).to_string()
}

fn error_json(message: &str) -> String {
    json!({ "ok": false, "error": message }).to_string()
}

fn rect_json(rect: &GridRect) -> Value {
    json!({ "x": rect.x, "y": rect.y, "w": rect.w, "h": rect.h })
}

fn mutation_json(mutation: &GridMutation) -> Value {
    match mutation {
        GridMutation::AddWidget { widget, position } => json!({
            "op": "add",
            "widget": widget,
            "position": rect_json(position),
        }),
        GridMutation::RemoveWidget { id } => json!({ "op": "remove", "id": id }),
        GridMutation::ToggleWidget { id } => json!({ "op": "toggle", "id": id }),
        GridMutation::MoveWidget { id, position } => json!({
            "op": "move",
            "id": id,
            "position": rect_json(position),
        }),
        GridMutation::MoveBatch { moves } => json!({
            "op": "moveBatch",
            "moves": moves
                .iter()
                .map(|(id, rect)| json!({ "id": id, "position": rect_json(rect) }))
                .collect::<Vec<_>>(),
        }),
    }
}

fn preview_json(preview: &DropPreview) -> Value {
    json!({
        "target": rect_json(&preview.target),
        "free": preview.free,
        "swapCandidate": preview.swap_candidate,
    })
}

fn diagnostics_json(diags: &[LayoutDiagnostic]) -> Value {
    Value::Array(
        diags
            .iter()
            .map(|d| {
                json!({
                    "widgetId": d.widget_id,
                    "rule": d.rule,
                    "severity": match d.severity {
                        LintSeverity::Error => "error",
                        LintSeverity::Warning => "warning",
                    },
                    "message": d.message,
                })
            })
            .collect(),
    )
}

fn arrange_json(outcome: &ArrangeOutcome) -> Value {
    json!({
        "moved": outcome.moves.len(),
        "hidden": outcome.hidden,
        "overflowed": outcome.overflowed,
    })
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Gridboard WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
