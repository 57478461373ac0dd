//! Dashboard controller: routes [`GridEvent`]s into drag and resize
//! sessions and commits their decisions through a [`CommitPort`].
//!
//! At most one session is active. Every commit is checked against a fresh
//! snapshot from the port, so the no-overlap and bounds invariants hold
//! after each event whether it commits or not.

use crate::drag::{DragKind, DragSession, DropDecision, DropPreview};
use crate::input::GridEvent;
use crate::payload::DragPayload;
use crate::port::CommitPort;
use crate::resize::{NoopListeners, PointerListeners, ResizeHandle, ResizeSession};
use gb_core::arrange::{ArrangeOutcome, AutoArranger};
use gb_core::config::{ConfigError, EngineConfig};
use gb_core::grid::{ContainerRect, GridModel};
use gb_core::id::WidgetId;
use gb_core::lint::{LayoutDiagnostic, lint_layout};
use gb_core::model::{GridRect, Widget};
use gb_core::occupancy::OccupancyIndex;
use gb_core::placement::PlacementSolver;
use gb_core::swap::SwapResolver;
use std::collections::HashSet;
use std::rc::Rc;

/// Result of feeding one event or command to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Nothing happened (no matching session, gated, or bad input).
    Ignored,
    /// Session state changed; nothing committed.
    Changed,
    /// At least one mutation went through the port.
    Committed,
    /// The operation was valid but had nowhere to go.
    Rejected,
}

#[derive(Debug, Default)]
enum Session {
    #[default]
    Idle,
    Drag(DragSession),
    Resize(ResizeSession),
}

pub struct DashboardController<P: CommitPort> {
    config: EngineConfig,
    solver: PlacementSolver,
    swapper: SwapResolver,
    arranger: AutoArranger,
    port: P,
    customizing: bool,
    session: Session,
    preview: Option<DropPreview>,
    listeners: Rc<dyn PointerListeners>,
}

impl<P: CommitPort> DashboardController<P> {
    pub fn new(port: P) -> Self {
        let config = EngineConfig::default();
        Self {
            solver: config.solver(),
            swapper: config.swapper(),
            arranger: config.arranger(),
            config,
            port,
            customizing: false,
            session: Session::Idle,
            preview: None,
            listeners: Rc::new(NoopListeners),
        }
    }

    /// # Errors
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn with_config(config: EngineConfig, port: P) -> Result<Self, ConfigError> {
        let mut controller = Self::new(port);
        controller.set_config(config)?;
        Ok(controller)
    }

    /// Swap in a new configuration, keeping the port, listeners and
    /// customization flag. Any active session ends first. On error the
    /// current configuration stays in place.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.reset();
        self.solver = config.solver();
        self.swapper = config.swapper();
        self.arranger = config.arranger();
        self.config = config;
        Ok(())
    }

    /// Hooks attached for the lifetime of each resize session.
    #[must_use]
    pub fn with_listeners(mut self, listeners: Rc<dyn PointerListeners>) -> Self {
        self.set_listeners(listeners);
        self
    }

    /// Replace the listener hooks. An active resize keeps the hooks it
    /// started with.
    pub fn set_listeners(&mut self, listeners: Rc<dyn PointerListeners>) {
        self.listeners = listeners;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn grid(&self) -> GridModel {
        self.config.grid
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Direct port access, for callers that own record lifecycle.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    pub fn widgets(&self) -> &[Widget] {
        self.port.snapshot()
    }

    pub fn is_customizing(&self) -> bool {
        self.customizing
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        match &self.session {
            Session::Drag(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn resize_session(&self) -> Option<&ResizeSession> {
        match &self.session {
            Session::Resize(resize) => Some(resize),
            _ => None,
        }
    }

    /// Latest hover preview of the active drag.
    pub fn drag_preview(&self) -> Option<DropPreview> {
        self.preview
    }

    fn visible_record(&self, id: WidgetId) -> Option<&Widget> {
        self.port.snapshot().iter().find(|w| w.id == id && w.visible)
    }

    // ─── Session lifecycle ───────────────────────────────────────────────

    /// End whatever session is active without committing.
    pub fn reset(&mut self) {
        if let Session::Drag(drag) = &mut self.session {
            drag.cancel();
        }
        self.session = Session::Idle;
        self.preview = None;
    }

    /// Toggle customization mode. Leaving it ends an active resize.
    pub fn set_customizing(&mut self, on: bool) {
        if self.customizing == on {
            return;
        }
        log::debug!("customization mode {}", if on { "on" } else { "off" });
        self.customizing = on;
        if !on && matches!(self.session, Session::Resize(_)) {
            self.session = Session::Idle;
        }
    }

    /// End a session that refers to `id`.
    fn release(&mut self, id: WidgetId) {
        let involved = match &self.session {
            Session::Drag(drag) => drag.kind() == DragKind::ExistingWidget(id),
            Session::Resize(resize) => resize.widget_id() == id,
            Session::Idle => false,
        };
        if involved {
            self.reset();
        }
    }

    /// Validate a payload and open a drag session for it.
    fn begin_drag(&self, payload: DragPayload) -> Option<DragSession> {
        let p = payload.widget.position;
        if !self.grid().is_valid_size(p.w, p.h) {
            log::warn!("drag of {} ignored: invalid size {}x{}", payload.widget.id, p.w, p.h);
            return None;
        }
        if payload.is_dragging_existing {
            let Some(record) = self.visible_record(payload.widget.id) else {
                log::warn!("drag of {} ignored: no visible widget with that id", payload.widget.id);
                return None;
            };
            // The port's record is authoritative for the dragged size.
            Some(DragSession::start(DragPayload::existing(record.clone())))
        } else if self.visible_record(payload.widget.id).is_some() {
            log::warn!("palette drag of {} ignored: id already on the grid", payload.widget.id);
            None
        } else {
            let mut payload = payload;
            if payload.widget.id.as_str().is_empty() {
                let prefix = match payload.widget.kind.as_str() {
                    "" => "widget",
                    kind => kind,
                };
                payload.widget.id = WidgetId::with_prefix(prefix);
            }
            Some(DragSession::start(payload))
        }
    }

    // ─── Events ──────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: GridEvent) -> EventOutcome {
        if let Some((x, y)) = event.position() {
            log::trace!("event at ({x}, {y})");
        }
        match event {
            GridEvent::DragStart { payload } => self.on_drag_start(payload),
            GridEvent::DragOver { x, y, container } => self.on_drag_over(x, y, container),
            GridEvent::DragLeave { still_inside: true } => EventOutcome::Ignored,
            GridEvent::DragLeave { still_inside: false } | GridEvent::DragEnd => self.on_drag_cancel(),
            GridEvent::Drop {
                x,
                y,
                container,
                payload,
            } => self.on_drop(x, y, container, &payload),
            GridEvent::ResizeStart { id, handle } => self.on_resize_start(id, handle),
            GridEvent::PointerMove { x, y, container } => self.on_pointer_move(x, y, container),
            GridEvent::PointerUp | GridEvent::PointerCaptureLost => self.on_resize_end(),
        }
    }

    fn on_drag_start(&mut self, payload: DragPayload) -> EventOutcome {
        if matches!(self.session, Session::Resize(_)) {
            log::debug!("drag start ignored during resize");
            return EventOutcome::Ignored;
        }
        match self.begin_drag(payload) {
            Some(drag) => {
                self.session = Session::Drag(drag);
                self.preview = None;
                EventOutcome::Changed
            }
            None => EventOutcome::Ignored,
        }
    }

    fn on_drag_over(&mut self, x: f32, y: f32, container: ContainerRect) -> EventOutcome {
        let Session::Drag(drag) = &mut self.session else {
            return EventOutcome::Ignored;
        };
        let index = OccupancyIndex::new(self.port.snapshot());
        let preview = drag.drag_over(&self.config.grid, &index, x, y, container, self.customizing);
        if self.preview == Some(preview) {
            return EventOutcome::Ignored;
        }
        self.preview = Some(preview);
        EventOutcome::Changed
    }

    fn on_drag_cancel(&mut self) -> EventOutcome {
        if !matches!(self.session, Session::Drag(_)) {
            return EventOutcome::Ignored;
        }
        self.reset();
        EventOutcome::Changed
    }

    fn on_drop(&mut self, x: f32, y: f32, container: ContainerRect, raw: &str) -> EventOutcome {
        if matches!(self.session, Session::Resize(_)) {
            return EventOutcome::Ignored;
        }
        let grid = self.grid();
        let payload = match DragPayload::from_json(raw, &grid) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("drop ignored: {err}");
                self.reset();
                return EventOutcome::Ignored;
            }
        };

        // The payload is self-contained, so a drop that re-entered after a
        // cancelling leave still resolves.
        let session = match std::mem::take(&mut self.session) {
            Session::Drag(drag) if drag.widget().id == payload.widget.id => Some(drag),
            _ => self.begin_drag(payload),
        };
        self.preview = None;
        let Some(mut drag) = session else {
            return EventOutcome::Ignored;
        };

        let cell = grid.pixel_to_cell(x, y, container);
        let index = OccupancyIndex::new(self.port.snapshot());
        let decision = drag.drop_at(cell, &grid, &index, &self.solver, &self.swapper, self.customizing);
        log::debug!("drop {:?} at ({}, {}): {decision:?}", drag.kind(), cell.x, cell.y);
        self.commit_drop(&drag, decision)
    }

    fn commit_drop(&mut self, drag: &DragSession, decision: DropDecision) -> EventOutcome {
        match (drag.kind(), decision) {
            (_, DropDecision::Rejected) => EventOutcome::Rejected,
            (DragKind::ExistingWidget(_), DropDecision::Swap(outcome)) => {
                self.port.move_batch(&[outcome.a, outcome.b]);
                EventOutcome::Committed
            }
            (DragKind::NewWidget, DropDecision::Swap(_)) => EventOutcome::Rejected,
            (DragKind::NewWidget, DropDecision::Place(rect) | DropDecision::Relocate(rect)) => {
                let mut widget = drag.widget().clone();
                widget.visible = true;
                self.port.add_widget(widget, rect);
                EventOutcome::Committed
            }
            (DragKind::ExistingWidget(id), DropDecision::Place(rect) | DropDecision::Relocate(rect)) => {
                if self.visible_record(id).is_some_and(|w| w.position == rect) {
                    return EventOutcome::Ignored;
                }
                self.port.move_widget(id, rect);
                EventOutcome::Committed
            }
        }
    }

    fn on_resize_start(&mut self, id: WidgetId, handle: ResizeHandle) -> EventOutcome {
        if !self.customizing {
            log::debug!("resize of {id} ignored outside customization mode");
            return EventOutcome::Ignored;
        }
        if matches!(self.session, Session::Drag(_)) {
            return EventOutcome::Ignored;
        }
        let Some(origin) = self.visible_record(id).map(|w| w.position) else {
            return EventOutcome::Ignored;
        };
        // Drop any previous resize first so its listeners detach before the
        // new ones attach.
        self.session = Session::Idle;
        self.session = Session::Resize(ResizeSession::start(id, handle, origin, self.listeners.clone()));
        EventOutcome::Changed
    }

    fn on_pointer_move(&mut self, x: f32, y: f32, container: ContainerRect) -> EventOutcome {
        let Session::Resize(resize) = &mut self.session else {
            return EventOutcome::Ignored;
        };
        let id = resize.widget_id();
        if !self.port.snapshot().iter().any(|w| w.id == id && w.visible) {
            log::debug!("resize target {id} disappeared");
            self.session = Session::Idle;
            return EventOutcome::Changed;
        }
        let cell = self.config.grid.pixel_to_cell(x, y, container);
        let index = OccupancyIndex::new(self.port.snapshot());
        let Some(rect) = resize.pointer_move(cell, &self.config.grid, &index) else {
            return EventOutcome::Ignored;
        };
        self.port.move_widget(id, rect);
        EventOutcome::Committed
    }

    fn on_resize_end(&mut self) -> EventOutcome {
        let Session::Resize(resize) = &self.session else {
            return EventOutcome::Ignored;
        };
        log::debug!("resize end {} at {:?}", resize.widget_id(), resize.current());
        self.session = Session::Idle;
        EventOutcome::Changed
    }

    // ─── Commands ────────────────────────────────────────────────────────

    pub fn remove_widget(&mut self, id: WidgetId) -> EventOutcome {
        if !self.port.snapshot().iter().any(|w| w.id == id) {
            return EventOutcome::Ignored;
        }
        self.release(id);
        self.port.remove_widget(id);
        EventOutcome::Committed
    }

    /// Hide a visible widget, or show a hidden one. Showing relocates the
    /// widget when its old rectangle is taken or invalid.
    pub fn toggle_widget(&mut self, id: WidgetId) -> EventOutcome {
        let Some(record) = self.port.snapshot().iter().find(|w| w.id == id) else {
            return EventOutcome::Ignored;
        };
        if record.visible {
            self.release(id);
            self.port.toggle_widget(id);
            return EventOutcome::Committed;
        }

        let grid = self.grid();
        let p = record.position;
        let index = OccupancyIndex::new(self.port.snapshot());
        if grid.is_valid_rect(&p) && index.is_free(&p, Some(id)) {
            self.port.toggle_widget(id);
            return EventOutcome::Committed;
        }
        let (w, h) = grid.clamp_size(p.w, p.h);
        match self.solver.find_free_position_excluding(&index, w, h, id) {
            Some(cell) => {
                self.port.move_widget(id, GridRect::new(cell.x, cell.y, w, h));
                self.port.toggle_widget(id);
                EventOutcome::Committed
            }
            None => {
                log::warn!("cannot show {id}: no room for {w}x{h}");
                EventOutcome::Rejected
            }
        }
    }

    /// Repack all visible widgets. Hides are committed first, then every
    /// move as one batch.
    pub fn auto_arrange(&mut self) -> ArrangeOutcome {
        if matches!(self.session, Session::Resize(_)) {
            self.session = Session::Idle;
        }
        let outcome = self.arranger.rearrange(self.port.snapshot());
        let moves: Vec<(WidgetId, GridRect)> = outcome
            .moves
            .iter()
            .filter(|(id, rect)| self.visible_record(*id).is_some_and(|w| w.position != *rect))
            .copied()
            .collect();

        for &id in &outcome.hidden {
            self.release(id);
            self.port.toggle_widget(id);
        }
        if !moves.is_empty() {
            self.port.move_batch(&moves);
        }
        log::debug!(
            "auto-arrange: {} moved, {} hidden{}",
            moves.len(),
            outcome.hidden.len(),
            if outcome.overflowed { ", overflowed" } else { "" }
        );
        outcome
    }

    /// Bring the port in line with a caller snapshot (default layout or a
    /// restored configuration), repairing it on the way in.
    ///
    /// Visible widgets that are invalid or overlap an earlier one are
    /// relocated, or hidden when the grid has no room. Duplicate ids after
    /// the first are skipped. Visible port records the snapshot does not
    /// mention are hidden. Returns the diagnostics of the input as given.
    pub fn load(&mut self, widgets: Vec<Widget>) -> Vec<LayoutDiagnostic> {
        self.reset();
        let diagnostics = lint_layout(&widgets, &self.grid());
        let repaired = self.repair_loaded(widgets);
        self.commit_loaded(&repaired);
        diagnostics
    }

    fn repair_loaded(&self, widgets: Vec<Widget>) -> Vec<Widget> {
        let grid = self.grid();
        let mut seen = HashSet::new();
        let mut accepted: Vec<Widget> = Vec::with_capacity(widgets.len());
        for mut widget in widgets {
            if !seen.insert(widget.id) {
                log::warn!("load: duplicate widget {} skipped", widget.id);
                continue;
            }
            if widget.visible {
                let p = widget.position;
                let index = OccupancyIndex::new(&accepted);
                if !(grid.is_valid_rect(&p) && index.is_free(&p, None)) {
                    let (w, h) = grid.clamp_size(p.w, p.h);
                    match self.solver.find_free_position(&index, w, h) {
                        Some(cell) => {
                            log::debug!("load: {} relocated to ({}, {})", widget.id, cell.x, cell.y);
                            widget.position = GridRect::new(cell.x, cell.y, w, h);
                        }
                        None => {
                            log::warn!("load: no room for {}, hiding it", widget.id);
                            widget.visible = false;
                        }
                    }
                }
            }
            accepted.push(widget);
        }
        accepted
    }

    /// Commit a repaired layout so every intermediate port state is valid:
    /// hides first, then all position changes as one batch, then shows and
    /// adds into cells the final layout leaves free.
    fn commit_loaded(&mut self, target: &[Widget]) {
        let mentioned: HashSet<WidgetId> = target.iter().map(|w| w.id).collect();
        let current = self.port.snapshot();
        let mut hides: Vec<WidgetId> = current
            .iter()
            .filter(|w| w.visible && !mentioned.contains(&w.id))
            .map(|w| w.id)
            .collect();
        let mut moves = Vec::new();
        let mut shows = Vec::new();
        let mut adds = Vec::new();
        for widget in target {
            let Some(existing) = current.iter().find(|w| w.id == widget.id) else {
                adds.push(widget);
                continue;
            };
            if existing.position != widget.position {
                moves.push((widget.id, widget.position));
            }
            match (existing.visible, widget.visible) {
                (true, false) => hides.push(widget.id),
                (false, true) => shows.push(widget.id),
                _ => {}
            }
        }

        for &id in &hides {
            self.port.toggle_widget(id);
        }
        if !moves.is_empty() {
            self.port.move_batch(&moves);
        }
        for &id in &shows {
            self.port.toggle_widget(id);
        }
        for widget in &adds {
            self.port.add_widget((*widget).clone(), widget.position);
        }
        log::debug!(
            "load: {} hidden, {} moved, {} shown, {} added",
            hides.len(),
            moves.len(),
            shows.len(),
            adds.len()
        );
    }
}
