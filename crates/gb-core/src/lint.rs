//! Layout diagnostics for a widget snapshot.
//!
//! Reports invariant violations without modifying anything. The controller
//! uses the results to repair loaded layouts; tests use them to assert that
//! every commit leaves a valid grid.

use crate::grid::GridModel;
use crate::id::WidgetId;
use crate::model::Widget;
use crate::occupancy::OccupancyIndex;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Breaks a layout invariant (overlap, bounds, duplicate id).
    Error,
    /// Allowed to render, but outside the configured size limits.
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDiagnostic {
    pub widget_id: WidgetId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "overlap", "out-of-bounds").
    pub rule: &'static str,
}

impl LayoutDiagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == LintSeverity::Error
    }
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all layout rules over visible widgets.
#[must_use]
pub fn lint_layout(widgets: &[Widget], grid: &GridModel) -> Vec<LayoutDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(widgets, &mut diags);
    lint_bounds(widgets, grid, &mut diags);
    lint_size_limits(widgets, grid, &mut diags);
    lint_overlaps(widgets, &mut diags);
    diags
}

/// `true` when the snapshot satisfies the no-overlap and bounds invariants.
pub fn is_valid_layout(widgets: &[Widget], grid: &GridModel) -> bool {
    !lint_layout(widgets, grid).iter().any(LayoutDiagnostic::is_error)
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(widgets: &[Widget], diags: &mut Vec<LayoutDiagnostic>) {
    let mut seen = HashSet::new();
    for widget in widgets {
        if !seen.insert(widget.id) {
            diags.push(LayoutDiagnostic {
                widget_id: widget.id,
                message: format!("Widget id `{}` appears more than once.", widget.id),
                severity: LintSeverity::Error,
                rule: "duplicate-id",
            });
        }
    }
}

fn lint_bounds(widgets: &[Widget], grid: &GridModel, diags: &mut Vec<LayoutDiagnostic>) {
    for widget in widgets.iter().filter(|w| w.visible) {
        if !grid.contains_rect(&widget.position) {
            let p = widget.position;
            diags.push(LayoutDiagnostic {
                widget_id: widget.id,
                message: format!(
                    "`{}` at ({}, {}) size {}x{} leaves the {}x{} grid.",
                    widget.id, p.x, p.y, p.w, p.h, grid.columns, grid.rows
                ),
                severity: LintSeverity::Error,
                rule: "out-of-bounds",
            });
        }
    }
}

fn lint_size_limits(widgets: &[Widget], grid: &GridModel, diags: &mut Vec<LayoutDiagnostic>) {
    for widget in widgets.iter().filter(|w| w.visible) {
        let p = widget.position;
        if !grid.is_valid_size(p.w, p.h) {
            diags.push(LayoutDiagnostic {
                widget_id: widget.id,
                message: format!(
                    "`{}` is {}x{}; widgets must be {}..={} wide and {}..={} tall.",
                    widget.id, p.w, p.h, grid.min_w, grid.max_w, grid.min_h, grid.max_h
                ),
                severity: LintSeverity::Warning,
                rule: "size-limit",
            });
        }
    }
}

fn lint_overlaps(widgets: &[Widget], diags: &mut Vec<LayoutDiagnostic>) {
    for (a, b) in OccupancyIndex::new(widgets).overlapping_pairs() {
        diags.push(LayoutDiagnostic {
            widget_id: b,
            message: format!("`{b}` overlaps `{a}`."),
            severity: LintSeverity::Error,
            rule: "overlap",
        });
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::widget;

    #[test]
    fn clean_layout_has_no_diags() {
        let widgets = vec![widget("a", 0, 0, 4, 2), widget("b", 4, 0, 8, 2)];
        assert!(lint_layout(&widgets, &GridModel::default()).is_empty());
    }

    #[test]
    fn reports_overlap_once_per_pair() {
        let widgets = vec![widget("a", 0, 0, 4, 2), widget("b", 2, 1, 4, 2)];
        let diags = lint_layout(&widgets, &GridModel::default());
        assert_eq!(diags.iter().filter(|d| d.rule == "overlap").count(), 1);
        assert!(!is_valid_layout(&widgets, &GridModel::default()));
    }

    #[test]
    fn reports_out_of_bounds() {
        let widgets = vec![widget("a", 10, 0, 4, 2)];
        let diags = lint_layout(&widgets, &GridModel::default());
        assert!(diags.iter().any(|d| d.rule == "out-of-bounds" && d.is_error()));
    }

    #[test]
    fn size_limit_is_a_warning() {
        let widgets = vec![widget("thin", 0, 0, 1, 2)];
        let diags = lint_layout(&widgets, &GridModel::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, LintSeverity::Warning);
        assert!(is_valid_layout(&widgets, &GridModel::default()));
    }

    #[test]
    fn hidden_widgets_are_not_checked() {
        let widgets = vec![widget("a", 0, 0, 4, 2), widget("b", 0, 0, 4, 2).hidden()];
        assert!(lint_layout(&widgets, &GridModel::default()).is_empty());
    }

    #[test]
    fn duplicate_ids_are_errors() {
        let widgets = vec![widget("dup", 0, 0, 4, 2), widget("dup", 4, 0, 4, 2)];
        let diags = lint_layout(&widgets, &GridModel::default());
        assert!(diags.iter().any(|d| d.rule == "duplicate-id"));
    }
}
