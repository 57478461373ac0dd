//! Commit port: the engine's only side-effecting contract.
//!
//! The dashboard owns the widget records. The engine reads them through
//! [`CommitPort::snapshot`] and changes them only by calling the commit
//! operations below. [`LocalBoard`] is an in-memory port that keeps its own
//! snapshot and a log of everything applied to it.

use gb_core::id::WidgetId;
use gb_core::model::{GridRect, Widget};
use smallvec::SmallVec;

/// A commit expressed as data.
#[derive(Debug, Clone, PartialEq)]
pub enum GridMutation {
    AddWidget {
        widget: Box<Widget>,
        position: GridRect,
    },
    RemoveWidget {
        id: WidgetId,
    },
    ToggleWidget {
        id: WidgetId,
    },
    MoveWidget {
        id: WidgetId,
        position: GridRect,
    },
    /// Several moves applied as one step (swap pairs, auto-arrange).
    MoveBatch {
        moves: SmallVec<[(WidgetId, GridRect); 2]>,
    },
}

pub trait CommitPort {
    /// Current widget records, including invisible ones.
    fn snapshot(&self) -> &[Widget];

    /// Commit a new widget at a resolved position.
    fn add_widget(&mut self, widget: Widget, position: GridRect);

    fn remove_widget(&mut self, id: WidgetId);

    /// Flip `visible`.
    fn toggle_widget(&mut self, id: WidgetId);

    fn move_widget(&mut self, id: WidgetId, position: GridRect);

    /// Apply every move or none. The default forwards to `move_widget` in
    /// order; ports with their own transactions should override it.
    fn move_batch(&mut self, moves: &[(WidgetId, GridRect)]) {
        for &(id, position) in moves {
            self.move_widget(id, position);
        }
    }

    /// Dispatch a mutation to the matching operation.
    fn apply(&mut self, mutation: GridMutation) {
        match mutation {
            GridMutation::AddWidget { widget, position } => self.add_widget(*widget, position),
            GridMutation::RemoveWidget { id } => self.remove_widget(id),
            GridMutation::ToggleWidget { id } => self.toggle_widget(id),
            GridMutation::MoveWidget { id, position } => self.move_widget(id, position),
            GridMutation::MoveBatch { moves } => self.move_batch(&moves),
        }
    }
}

// ─── LocalBoard ──────────────────────────────────────────────────────────

/// In-memory commit port.
#[derive(Debug, Clone, Default)]
pub struct LocalBoard {
    widgets: Vec<Widget>,
    log: Vec<GridMutation>,
}

impl LocalBoard {
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self {
            widgets,
            log: Vec::new(),
        }
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Every mutation applied so far, oldest first.
    pub fn log(&self) -> &[GridMutation] {
        &self.log
    }

    /// Drain the mutation log (e.g. after forwarding it to storage).
    pub fn take_log(&mut self) -> Vec<GridMutation> {
        std::mem::take(&mut self.log)
    }

    fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }
}

impl CommitPort for LocalBoard {
    fn snapshot(&self) -> &[Widget] {
        &self.widgets
    }

    /// Adding an id that already has a record re-shows that record at
    /// `position` instead of duplicating it.
    fn add_widget(&mut self, widget: Widget, position: GridRect) {
        self.log.push(GridMutation::AddWidget {
            widget: Box::new(widget.clone()),
            position,
        });
        match self.get_mut(widget.id) {
            Some(existing) => {
                existing.position = position;
                existing.visible = widget.visible;
            }
            None => {
                let mut widget = widget;
                widget.position = position;
                self.widgets.push(widget);
            }
        }
    }

    fn remove_widget(&mut self, id: WidgetId) {
        self.log.push(GridMutation::RemoveWidget { id });
        self.widgets.retain(|w| w.id != id);
    }

    fn toggle_widget(&mut self, id: WidgetId) {
        self.log.push(GridMutation::ToggleWidget { id });
        if let Some(widget) = self.get_mut(id) {
            widget.visible = !widget.visible;
        }
    }

    fn move_widget(&mut self, id: WidgetId, position: GridRect) {
        self.log.push(GridMutation::MoveWidget { id, position });
        if let Some(widget) = self.get_mut(id) {
            widget.position = position;
        }
    }

    fn move_batch(&mut self, moves: &[(WidgetId, GridRect)]) {
        self.log.push(GridMutation::MoveBatch {
            moves: moves.iter().copied().collect(),
        });
        for &(id, position) in moves {
            if let Some(widget) = self.get_mut(id) {
                widget.position = position;
            }
        }
    }
}
