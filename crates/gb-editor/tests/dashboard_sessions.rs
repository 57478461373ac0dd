//! Integration tests: drag, drop and resize sessions driven through the
//! dashboard controller against an in-memory board.

use gb_core::model::widget;
use gb_core::*;
use gb_editor::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const CONTAINER: ContainerRect = ContainerRect::new(40.0, 120.0, 1200.0);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Page coordinates of the center of cell `(x, y)`.
fn at(x: i32, y: i32) -> (f32, f32) {
    (40.0 + x as f32 * 100.0 + 50.0, 120.0 + y as f32 * 80.0 + 40.0)
}

fn board() -> DashboardController<LocalBoard> {
    init_logger();
    DashboardController::new(LocalBoard::new(vec![
        widget("revenue", 0, 0, 4, 2),
        widget("orders", 4, 0, 4, 2),
        widget("map", 0, 2, 6, 4),
    ]))
}

fn rect(ctl: &DashboardController<LocalBoard>, id: &str) -> GridRect {
    ctl.port().get(WidgetId::intern(id)).unwrap().position
}

fn assert_valid(ctl: &DashboardController<LocalBoard>) {
    let diags = lint_layout(ctl.widgets(), &GridModel::default());
    assert!(!diags.iter().any(LayoutDiagnostic::is_error), "{diags:#?}");
}

fn drag_existing(ctl: &mut DashboardController<LocalBoard>, id: &str, to: (i32, i32)) -> EventOutcome {
    let record = ctl.port().get(WidgetId::intern(id)).unwrap().clone();
    let payload = DragPayload::existing(record);
    ctl.handle(GridEvent::DragStart {
        payload: payload.clone(),
    });
    let (x, y) = at(to.0, to.1);
    ctl.handle(GridEvent::drag_over(x, y, CONTAINER));
    let outcome = ctl.handle(GridEvent::drop(x, y, CONTAINER, payload.to_json()));
    ctl.handle(GridEvent::DragEnd);
    outcome
}

// ─── Drag and drop ──────────────────────────────────────────────────────

#[test]
fn move_to_free_cell() {
    let mut ctl = board();
    assert_eq!(drag_existing(&mut ctl, "orders", (6, 7)), EventOutcome::Committed);
    assert_eq!(rect(&ctl, "orders"), GridRect::new(6, 7, 4, 2));
    assert_valid(&ctl);
}

#[test]
fn drop_past_edge_clamps_into_grid() {
    let mut ctl = board();
    drag_existing(&mut ctl, "orders", (11, 11));
    assert_eq!(rect(&ctl, "orders"), GridRect::new(8, 10, 4, 2));
}

#[test]
fn hover_preview_reports_swap_candidate() {
    let mut ctl = board();
    ctl.set_customizing(true);
    let payload = DragPayload::existing(widget("revenue", 0, 0, 4, 2));
    ctl.handle(GridEvent::DragStart { payload });
    let (x, y) = at(5, 1);
    assert_eq!(ctl.handle(GridEvent::drag_over(x, y, CONTAINER)), EventOutcome::Changed);
    let preview = ctl.drag_preview().unwrap();
    assert_eq!(preview.swap_candidate, Some(WidgetId::intern("orders")));
    assert_eq!(preview.target, GridRect::new(5, 1, 4, 2));
    assert!(!preview.free);

    // Same cell again: nothing new to show.
    assert_eq!(ctl.handle(GridEvent::drag_over(x, y, CONTAINER)), EventOutcome::Ignored);
}

#[test]
fn similar_tiles_swap_in_customization_mode() {
    let mut ctl = board();
    ctl.set_customizing(true);
    assert_eq!(drag_existing(&mut ctl, "revenue", (5, 0)), EventOutcome::Committed);
    assert_eq!(rect(&ctl, "revenue"), GridRect::new(4, 0, 4, 2));
    assert_eq!(rect(&ctl, "orders"), GridRect::new(0, 0, 4, 2));
    assert_valid(&ctl);
}

#[test]
fn dissimilar_tiles_fall_back_to_solver() {
    let mut ctl = board();
    ctl.set_customizing(true);
    // revenue (8) onto map (24): too different to swap.
    drag_existing(&mut ctl, "revenue", (2, 3));
    assert_eq!(rect(&ctl, "map"), GridRect::new(0, 2, 6, 4));
    assert_eq!(rect(&ctl, "revenue"), GridRect::new(8, 0, 4, 2));
    assert_valid(&ctl);
}

#[test]
fn palette_drop_on_occupied_cell_relocates() {
    let mut ctl = board();
    let payload = DragPayload::new_widget(Widget::new(
        WidgetId::intern("tickets"),
        "table",
        GridRect::new(0, 0, 4, 2),
    ));
    let (x, y) = at(1, 1);
    assert_eq!(
        ctl.handle(GridEvent::drop(x, y, CONTAINER, payload.to_json())),
        EventOutcome::Committed
    );
    let tickets = ctl.port().get(WidgetId::intern("tickets")).unwrap();
    assert_eq!(tickets.position, GridRect::new(8, 0, 4, 2));
    assert_eq!(tickets.kind, "table");
    assert!(tickets.visible);
    assert_valid(&ctl);
}

#[test]
fn drop_on_full_grid_is_rejected() {
    init_logger();
    let mut ctl = DashboardController::new(LocalBoard::new(vec![
        widget("top", 0, 0, 12, 6),
        widget("bottom", 0, 6, 12, 6),
    ]));
    let payload = DragPayload::new_widget(widget("late", 0, 0, 2, 1));
    let (x, y) = at(3, 3);
    assert_eq!(
        ctl.handle(GridEvent::drop(x, y, CONTAINER, payload.to_json())),
        EventOutcome::Rejected
    );
    assert!(ctl.port().log().is_empty());
}

#[test]
fn malformed_payloads_never_commit() {
    let mut ctl = board();
    let (x, y) = at(8, 8);
    for raw in [
        "",
        "[]",
        r#"{"id":"x"}"#,
        r#"{"id":"x","position":{"x":0,"y":0,"w":13,"h":2}}"#,
        r#"{"id":"x","position":{"x":0,"y":0,"w":2,"h":0}}"#,
    ] {
        assert_eq!(ctl.handle(GridEvent::drop(x, y, CONTAINER, raw)), EventOutcome::Ignored);
    }
    assert!(ctl.port().log().is_empty());
}

#[test]
fn container_geometry_is_read_per_event() {
    let mut ctl = board();
    let payload = DragPayload::existing(widget("orders", 4, 0, 4, 2));
    ctl.handle(GridEvent::DragStart {
        payload: payload.clone(),
    });
    // Window shrank to 600px between drag-over and drop: cells are 50px.
    let narrow = ContainerRect::new(40.0, 120.0, 600.0);
    ctl.handle(GridEvent::drag_over(440.0, 700.0, CONTAINER));
    ctl.handle(GridEvent::drop(440.0, 700.0, narrow, payload.to_json()));
    assert_eq!(rect(&ctl, "orders"), GridRect::new(8, 7, 4, 2));
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<&'static str>>,
}

impl PointerListeners for Recorder {
    fn attach(&self) {
        self.calls.borrow_mut().push("attach");
    }
    fn detach(&self) {
        self.calls.borrow_mut().push("detach");
    }
}

fn resize(ctl: &mut DashboardController<LocalBoard>, id: &str, handle: ResizeHandle, to: (i32, i32)) {
    ctl.handle(GridEvent::ResizeStart {
        id: WidgetId::intern(id),
        handle,
    });
    let (x, y) = at(to.0, to.1);
    ctl.handle(GridEvent::pointer_move(x, y, CONTAINER));
    ctl.handle(GridEvent::PointerUp);
}

#[test]
fn resize_clamps_at_grid_edge() {
    init_logger();
    let mut ctl = DashboardController::new(LocalBoard::new(vec![widget("kpi", 2, 2, 4, 2)]));
    ctl.set_customizing(true);
    resize(&mut ctl, "kpi", ResizeHandle::Se, (16, 3));
    // The pointer cell clamps to the last column, so the tile grows to the
    // right edge and no further.
    assert_eq!(rect(&ctl, "kpi"), GridRect::new(2, 2, 10, 2));
    assert_valid(&ctl);
}

#[test]
fn resize_each_corner() {
    let mut ctl = board();
    ctl.set_customizing(true);
    ctl.port_mut().move_widget(WidgetId::intern("map"), GridRect::new(4, 6, 4, 2));

    resize(&mut ctl, "map", ResizeHandle::Sw, (2, 8));
    assert_eq!(rect(&ctl, "map"), GridRect::new(2, 6, 6, 3));

    resize(&mut ctl, "map", ResizeHandle::Ne, (9, 4));
    assert_eq!(rect(&ctl, "map"), GridRect::new(2, 4, 8, 5));

    resize(&mut ctl, "map", ResizeHandle::Nw, (5, 5));
    assert_eq!(rect(&ctl, "map"), GridRect::new(5, 5, 5, 4));
    assert_valid(&ctl);
}

#[test]
fn resize_sticks_instead_of_overlapping() {
    let mut ctl = board();
    ctl.set_customizing(true);
    ctl.handle(GridEvent::ResizeStart {
        id: WidgetId::intern("revenue"),
        handle: ResizeHandle::Se,
    });
    let (x, y) = at(3, 1);
    ctl.handle(GridEvent::pointer_move(x, y, CONTAINER));
    // Growing into `orders` is refused; the last valid size stays.
    let (x, y) = at(6, 1);
    assert_eq!(ctl.handle(GridEvent::pointer_move(x, y, CONTAINER)), EventOutcome::Ignored);
    ctl.handle(GridEvent::PointerUp);
    assert_eq!(rect(&ctl, "revenue"), GridRect::new(0, 0, 4, 2));
    assert_valid(&ctl);
}

#[test]
fn listeners_scoped_to_resize() {
    let recorder = Rc::new(Recorder::default());
    let mut ctl = board().with_listeners(recorder.clone());
    ctl.set_customizing(true);

    // Drags never touch the global listeners.
    drag_existing(&mut ctl, "orders", (6, 7));
    assert!(recorder.calls.borrow().is_empty());

    resize(&mut ctl, "orders", ResizeHandle::Se, (9, 8));
    ctl.handle(GridEvent::ResizeStart {
        id: WidgetId::intern("map"),
        handle: ResizeHandle::Ne,
    });
    ctl.reset();
    assert_eq!(*recorder.calls.borrow(), vec!["attach", "detach", "attach", "detach"]);
}

#[test]
fn drag_during_resize_is_ignored() {
    let mut ctl = board();
    ctl.set_customizing(true);
    ctl.handle(GridEvent::ResizeStart {
        id: WidgetId::intern("map"),
        handle: ResizeHandle::Se,
    });
    let payload = DragPayload::existing(widget("orders", 4, 0, 4, 2));
    assert_eq!(ctl.handle(GridEvent::DragStart { payload }), EventOutcome::Ignored);
    assert!(ctl.resize_session().is_some());
    assert!(ctl.drag_session().is_none());
}

// ─── Commands ───────────────────────────────────────────────────────────

#[test]
fn removing_resized_widget_ends_session() {
    let recorder = Rc::new(Recorder::default());
    let mut ctl = board().with_listeners(recorder.clone());
    ctl.set_customizing(true);
    ctl.handle(GridEvent::ResizeStart {
        id: WidgetId::intern("map"),
        handle: ResizeHandle::Se,
    });
    assert_eq!(ctl.remove_widget(WidgetId::intern("map")), EventOutcome::Committed);
    assert!(ctl.resize_session().is_none());
    assert_eq!(*recorder.calls.borrow(), vec!["attach", "detach"]);
    assert_eq!(ctl.remove_widget(WidgetId::intern("map")), EventOutcome::Ignored);
}

#[test]
fn auto_arrange_packs_largest_first() {
    let mut ctl = board();
    let outcome = ctl.auto_arrange();
    assert!(outcome.hidden.is_empty());
    assert_eq!(rect(&ctl, "map"), GridRect::new(0, 0, 6, 4));
    assert_eq!(rect(&ctl, "orders"), GridRect::new(6, 0, 4, 2));
    assert_eq!(rect(&ctl, "revenue"), GridRect::new(0, 4, 4, 2));
    assert_valid(&ctl);
}

#[test]
fn configured_threshold_changes_swap_decision() {
    init_logger();
    let config = EngineConfig::from_json(r#"{"swapThreshold":0.8}"#).unwrap();
    let mut ctl = DashboardController::with_config(
        config,
        LocalBoard::new(vec![widget("small", 0, 0, 2, 2), widget("wide", 0, 2, 6, 2)]),
    )
    .unwrap();
    ctl.set_customizing(true);
    // 4 vs 12: diff 0.67, allowed under 0.8.
    drag_existing(&mut ctl, "small", (3, 2));
    assert_eq!(rect(&ctl, "small"), GridRect::new(0, 2, 2, 2));
    assert_eq!(rect(&ctl, "wide"), GridRect::new(0, 0, 6, 2));
}
