//! Plain-text rendering of the live view
//!
//! Used by the terminal client. Lanes are printed top to bottom, each stack
//! as a column of cards with the newest branch first.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::graph::{stack_cards, OwnerGroup};
use crate::models::{Branch, CiState, StackDetail};
use crate::services::ViewState;
use crate::utils::format::time_ago;
use crate::view_state::ViewUiState;

/// Render the whole view as text
pub fn render_view(state: &ViewState, ui: &ViewUiState, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    if let Some(error) = &state.error {
        let _ = writeln!(out, "error: {}", error);
        let _ = writeln!(out, "press r + Enter to retry");
        return out;
    }

    let Some(snapshot) = state.snapshot.as_deref() else {
        if state.loading {
            out.push_str("Loading...\n");
        }
        return out;
    };

    let _ = write!(out, "{}", snapshot.repo.full_name());
    if let Some(updated) = state.last_updated {
        let _ = write!(out, "  (updated {})", time_ago(updated, now));
    }
    out.push('\n');

    let lanes = snapshot.swimlanes();
    if lanes.is_empty() {
        out.push_str("No stacks found\n");
        return out;
    }

    for lane in lanes.lanes() {
        render_lane(&mut out, lane, ui, now);
    }

    let _ = writeln!(out, "---- {} ----", snapshot.repo.trunk);
    out
}

fn render_lane(out: &mut String, lane: &OwnerGroup<'_>, ui: &ViewUiState, now: DateTime<Utc>) {
    let _ = write!(out, "\n{}", lane.label);
    if let Some(active) = lane.last_active {
        let _ = write!(out, "  active {}", time_ago(active, now));
    }
    out.push('\n');

    let window = lane.window(ui.is_expanded(&lane.label));
    for stack in window.visible {
        render_stack(out, stack, ui.selected_name());
    }
    if window.hidden_count > 0 {
        let _ = writeln!(out, "  +{} more", window.hidden_count);
    } else if window.collapsible {
        out.push_str("  (show less)\n");
    }
}

fn render_stack(out: &mut String, stack: &StackDetail, selected: Option<&str>) {
    let summary = &stack.summary;
    let _ = write!(out, "  [{}]", summary.status.label());
    if summary.pr_count > 0 {
        let plural = if summary.pr_count == 1 { "" } else { "s" };
        let _ = write!(out, " {} PR{}", summary.pr_count, plural);
    }
    if !summary.title.is_empty() {
        let _ = write!(out, " {}", summary.title);
    }
    out.push('\n');

    for card in stack_cards(stack, selected) {
        let marker = if card.is_selected { '>' } else { ' ' };
        let current = if card.branch.is_current { "* " } else { "" };
        let _ = write!(out, "   {}| {}{}", marker, current, card.title);
        if card.branch.needs_restack {
            out.push_str(" (needs restack)");
        }
        let _ = writeln!(out, "{}", badges(card.branch));
    }
}

fn badges(branch: &Branch) -> String {
    let mut text = String::new();
    match &branch.pr {
        Some(pr) => {
            let _ = write!(text, "  #{}", pr.number);
            if pr.is_draft {
                text.push_str(" (draft)");
            }
        }
        None => text.push_str("  no PR"),
    }
    match branch.ci.as_ref().map(|ci| ci.status) {
        Some(CiState::Passing) => text.push_str("  CI ok"),
        Some(CiState::Failing) => text.push_str("  CI failing"),
        Some(CiState::Pending) => text.push_str("  CI pending"),
        Some(CiState::None) | None => {}
    }
    if branch.lines_added > 0 {
        let _ = write!(text, "  +{}", branch.lines_added);
    }
    if branch.lines_deleted > 0 {
        let _ = write!(text, "  -{}", branch.lines_deleted);
    }
    text
}
