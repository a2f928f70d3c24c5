//! Owner swimlanes
//!
//! Stacks are grouped by owner: the viewer's own stacks (and unowned ones)
//! form the "You" lane, every other owner gets a lane of their own, sorted
//! by owner name. Large lanes start collapsed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::StackDetail;
use crate::utils::format::swimlane_color;

/// Lanes with more stacks than this start collapsed
pub const COLLAPSED_LIMIT: usize = 3;

pub const YOUR_LANE_LABEL: &str = "You";

/// Stacks belonging to one owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerGroup<'a> {
    /// `None` for the viewer's own lane
    pub owner: Option<&'a str>,
    pub label: String,
    /// Background color derived from the label
    pub color: String,
    pub stacks: Vec<&'a StackDetail>,
    /// Newest commit across the lane; only tracked for other owners
    pub last_active: Option<DateTime<Utc>>,
}

/// What a lane shows given its expansion state
#[derive(Debug, Clone, PartialEq)]
pub struct LaneWindow<'g, 'a> {
    pub visible: &'g [&'a StackDetail],
    /// Stacks hidden behind the "+N more" affordance
    pub hidden_count: usize,
    /// Whether the lane is large enough to offer expand/collapse at all
    pub collapsible: bool,
}

impl<'a> OwnerGroup<'a> {
    pub fn is_yours(&self) -> bool {
        self.owner.is_none()
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn collapsible(&self) -> bool {
        self.stacks.len() > COLLAPSED_LIMIT
    }

    /// Stacks to draw; collapsed lanes show the first `COLLAPSED_LIMIT`
    pub fn window(&self, expanded: bool) -> LaneWindow<'_, 'a> {
        let collapsible = self.collapsible();
        if collapsible && !expanded {
            LaneWindow {
                visible: &self.stacks[..COLLAPSED_LIMIT],
                hidden_count: self.stacks.len() - COLLAPSED_LIMIT,
                collapsible,
            }
        } else {
            LaneWindow {
                visible: &self.stacks,
                hidden_count: 0,
                collapsible,
            }
        }
    }
}

/// Every lane for one snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swimlanes<'a> {
    pub yours: OwnerGroup<'a>,
    pub others: Vec<OwnerGroup<'a>>,
}

impl<'a> Swimlanes<'a> {
    /// No stacks at all; callers show "No stacks found"
    pub fn is_empty(&self) -> bool {
        self.yours.is_empty() && self.others.iter().all(|g| g.is_empty())
    }

    /// Lanes in render order, skipping an empty "You" lane
    pub fn lanes(&self) -> impl Iterator<Item = &OwnerGroup<'a>> {
        let yours = (!self.yours.is_empty()).then_some(&self.yours);
        yours.into_iter().chain(self.others.iter())
    }
}

/// Newest parseable commit time across every branch in `stacks`
pub fn last_active<'a, I>(stacks: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a StackDetail>,
{
    stacks
        .into_iter()
        .flat_map(|s| s.branches.iter())
        .filter_map(|b| b.commit_time())
        .max()
}

/// Partition stacks into the viewer's lane and one lane per other owner
pub fn group_by_owner<'a>(stacks: &'a [StackDetail], current_user: Option<&str>) -> Swimlanes<'a> {
    let mut yours = Vec::new();
    let mut others: HashMap<&'a str, Vec<&'a StackDetail>> = HashMap::new();

    for stack in stacks {
        match stack.owner() {
            Some(owner) if !stack.is_owned_by(current_user) => {
                others.entry(owner).or_default().push(stack);
            }
            _ => yours.push(stack),
        }
    }

    let mut others: Vec<(&'a str, Vec<&'a StackDetail>)> = others.into_iter().collect();
    others.sort_by(|a, b| a.0.cmp(b.0));

    Swimlanes {
        yours: OwnerGroup {
            owner: None,
            label: YOUR_LANE_LABEL.to_string(),
            color: swimlane_color(YOUR_LANE_LABEL),
            stacks: yours,
            last_active: None,
        },
        others: others
            .into_iter()
            .map(|(owner, stacks)| {
                let label = format!("@{}", owner);
                OwnerGroup {
                    owner: Some(owner),
                    color: swimlane_color(&label),
                    label,
                    last_active: last_active(stacks.iter().copied()),
                    stacks,
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{branch, branch_at, stack};

    fn roots(group: &OwnerGroup<'_>) -> Vec<String> {
        group
            .stacks
            .iter()
            .map(|s| s.root_branch().to_string())
            .collect()
    }

    #[test]
    fn test_yours_and_others() {
        let stacks = vec![
            stack("a1", Some("alice"), vec![branch("a1", None)]),
            stack("b1", Some("bob"), vec![branch("b1", None)]),
            stack("n1", None, vec![branch("n1", None)]),
        ];
        let lanes = group_by_owner(&stacks, Some("alice"));

        assert_eq!(roots(&lanes.yours), ["a1", "n1"]);
        assert!(lanes.yours.is_yours());
        assert_eq!(lanes.others.len(), 1);
        assert_eq!(lanes.others[0].owner, Some("bob"));
        assert_eq!(lanes.others[0].label, "@bob");
        assert_eq!(lanes.others[0].color, swimlane_color("@bob"));
        assert_eq!(roots(&lanes.others[0]), ["b1"]);
    }

    #[test]
    fn test_others_sorted_and_keep_stack_order() {
        let stacks = vec![
            stack("z1", Some("zed"), vec![]),
            stack("c1", Some("carol"), vec![]),
            stack("z2", Some("zed"), vec![]),
            stack("b1", Some("bob"), vec![]),
        ];
        let lanes = group_by_owner(&stacks, None);

        let owners: Vec<&str> = lanes.others.iter().filter_map(|g| g.owner).collect();
        assert_eq!(owners, ["bob", "carol", "zed"]);
        assert_eq!(roots(&lanes.others[2]), ["z1", "z2"]);
        assert!(lanes.yours.is_empty());
        assert_eq!(lanes.lanes().count(), 3);
    }

    #[test]
    fn test_without_current_user_only_unowned_are_yours() {
        let stacks = vec![
            stack("mine", None, vec![]),
            stack("theirs", Some("alice"), vec![]),
        ];
        let lanes = group_by_owner(&stacks, None);
        assert_eq!(roots(&lanes.yours), ["mine"]);
        assert_eq!(lanes.others.len(), 1);
    }

    #[test]
    fn test_lanes_follow_stack_ownership() {
        let stacks = vec![
            stack("a1", Some("alice"), vec![]),
            stack("n1", None, vec![]),
            stack("b1", Some("bob"), vec![]),
            stack("c1", Some("carol"), vec![]),
        ];
        for user in [Some("alice"), Some("bob"), None] {
            let lanes = group_by_owner(&stacks, user);
            for stack in &stacks {
                let in_yours = lanes.yours.stacks.iter().any(|s| std::ptr::eq(*s, stack));
                assert_eq!(
                    in_yours,
                    stack.is_owned_by(user),
                    "{} for {:?}",
                    stack.root_branch(),
                    user
                );
            }
            let total: usize = lanes.lanes().map(|g| g.len()).sum();
            assert_eq!(total, stacks.len());
        }
    }

    #[test]
    fn test_last_active_is_newest_commit() {
        let stacks = vec![
            stack(
                "b1",
                Some("bob"),
                vec![
                    branch_at("b1", None, "2024-03-01T10:00:00Z"),
                    branch_at("b1-2", Some("b1"), "2024-03-05T10:00:00Z"),
                ],
            ),
            stack(
                "b2",
                Some("bob"),
                vec![branch_at("b2", None, "2024-03-02T10:00:00Z")],
            ),
        ];
        let lanes = group_by_owner(&stacks, Some("alice"));
        let active = lanes.others[0].last_active.unwrap();
        assert_eq!(active.to_rfc3339(), "2024-03-05T10:00:00+00:00");
        assert!(lanes.yours.last_active.is_none());
    }

    #[test]
    fn test_last_active_absent_without_timestamps() {
        let stacks = vec![stack(
            "b1",
            Some("bob"),
            vec![branch_at("b1", None, "not a date")],
        )];
        let lanes = group_by_owner(&stacks, None);
        assert!(lanes.others[0].last_active.is_none());
    }

    #[test]
    fn test_collapse_five_stacks() {
        let stacks: Vec<StackDetail> = (0..5)
            .map(|i| stack(&format!("s{}", i), Some("bob"), vec![]))
            .collect();
        let lanes = group_by_owner(&stacks, None);
        let group = &lanes.others[0];

        let collapsed = group.window(false);
        assert!(collapsed.collapsible);
        assert_eq!(collapsed.visible.len(), 3);
        assert_eq!(collapsed.hidden_count, 2);
        assert_eq!(collapsed.visible[0].root_branch(), "s0");
        assert_eq!(collapsed.visible[2].root_branch(), "s2");

        let expanded = group.window(true);
        assert_eq!(expanded.visible.len(), 5);
        assert_eq!(expanded.hidden_count, 0);
    }

    #[test]
    fn test_small_lane_never_collapses() {
        let stacks: Vec<StackDetail> = (0..3).map(|i| stack(&format!("s{}", i), None, vec![])).collect();
        let lanes = group_by_owner(&stacks, None);
        let window = lanes.yours.window(false);
        assert!(!window.collapsible);
        assert_eq!(window.visible.len(), 3);
        assert_eq!(window.hidden_count, 0);
    }

    #[test]
    fn test_empty_snapshot() {
        let stacks: Vec<StackDetail> = Vec::new();
        let lanes = group_by_owner(&stacks, Some("alice"));
        assert!(lanes.is_empty());
        assert_eq!(lanes.lanes().count(), 0);
    }
}
