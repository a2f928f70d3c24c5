//! Transient view state
//!
//! Lane expansion and branch selection belong to whoever is rendering, not
//! to the synchronized snapshot. They survive snapshot replacement and are
//! reconciled against each new snapshot instead of holding stale data.

use std::collections::HashSet;

use crate::graph::Swimlanes;
use crate::models::Branch;
use crate::services::Snapshot;

#[derive(Debug, Clone, Default)]
pub struct ViewUiState {
    expanded: HashSet<String>,
    selected: Option<String>,
}

impl ViewUiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, lane_label: &str) -> bool {
        self.expanded.contains(lane_label)
    }

    /// Flip a lane between collapsed and expanded; returns the new state
    pub fn toggle_lane(&mut self, lane_label: &str) -> bool {
        if self.expanded.remove(lane_label) {
            false
        } else {
            self.expanded.insert(lane_label.to_string());
            true
        }
    }

    pub fn select(&mut self, branch_name: &str) {
        self.selected = Some(branch_name.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected branch as it exists in `snapshot`
    pub fn selected_branch<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Branch> {
        self.selected
            .as_deref()
            .and_then(|name| snapshot.find_branch(name))
    }

    /// Drop selection and expansion entries that no longer match anything
    ///
    /// Returns true if the selection was cleared.
    pub fn reconcile(&mut self, snapshot: &Snapshot, lanes: &Swimlanes<'_>) -> bool {
        let labels: HashSet<&str> = lanes.lanes().map(|g| g.label.as_str()).collect();
        self.expanded.retain(|label| labels.contains(label.as_str()));

        let stale = self
            .selected
            .as_deref()
            .is_some_and(|name| snapshot.find_branch(name).is_none());
        if stale {
            tracing::debug!("Selected branch disappeared from snapshot, clearing selection");
            self.selected = None;
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{branch, repo, stack};

    fn snapshot_with(stacks: Vec<crate::models::StackDetail>) -> Snapshot {
        Snapshot {
            repo: repo(Some("alice")),
            stacks,
        }
    }

    #[test]
    fn test_toggle_lane() {
        let mut ui = ViewUiState::new();
        assert!(!ui.is_expanded("@bob"));
        assert!(ui.toggle_lane("@bob"));
        assert!(ui.is_expanded("@bob"));
        assert!(!ui.toggle_lane("@bob"));
        assert!(!ui.is_expanded("@bob"));
    }

    #[test]
    fn test_selection_resolves_against_snapshot() {
        let snapshot = snapshot_with(vec![stack("a", None, vec![branch("a", None)])]);
        let mut ui = ViewUiState::new();
        ui.select("a");
        assert_eq!(ui.selected_branch(&snapshot).map(|b| b.name.as_str()), Some("a"));
    }

    #[test]
    fn test_reconcile_clears_vanished_selection() {
        let first = snapshot_with(vec![stack("a", None, vec![branch("a", None), branch("b", Some("a"))])]);
        let second = snapshot_with(vec![stack("a", None, vec![branch("a", None)])]);

        let mut ui = ViewUiState::new();
        ui.select("b");
        assert!(!ui.reconcile(&first, &first.swimlanes()));
        assert_eq!(ui.selected_name(), Some("b"));

        assert!(ui.reconcile(&second, &second.swimlanes()));
        assert_eq!(ui.selected_name(), None);
    }

    #[test]
    fn test_reconcile_keeps_expansion_for_live_lanes() {
        let snapshot = snapshot_with(vec![stack("b1", Some("bob"), vec![])]);
        let mut ui = ViewUiState::new();
        ui.toggle_lane("@bob");
        ui.toggle_lane("@carol");

        ui.reconcile(&snapshot, &snapshot.swimlanes());
        assert!(ui.is_expanded("@bob"));
        assert!(!ui.is_expanded("@carol"));
    }
}
