//! Stacked-card ordering
//!
//! A stack renders as a column of cards with the newest work (the leaf) on
//! top, so the root-to-leaf preorder is reversed before display.

use serde::Serialize;

use super::tree::BranchTree;
use crate::models::{Branch, StackDetail};
use crate::utils::format::shorten_branch_name;

/// One card in a stack column, top to bottom
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackCard<'a> {
    pub branch: &'a Branch,
    pub title: String,
    /// Topmost card: rounded top corners
    pub is_top: bool,
    /// Bottommost card: rounded bottom corners and closing border
    pub is_bottom: bool,
    pub is_selected: bool,
}

/// Branches of one stack, root first, depth-first
pub fn ordered_branches(branches: &[Branch]) -> Vec<&Branch> {
    BranchTree::new(branches).preorder_branches()
}

/// Branches of one stack, leaf first, as the cards are drawn
pub fn display_order(branches: &[Branch]) -> Vec<&Branch> {
    let mut ordered = ordered_branches(branches);
    ordered.reverse();
    ordered
}

/// Title shown on a card: newest commit message, else the shortened name
pub fn card_title(branch: &Branch) -> String {
    branch
        .head_message()
        .map(str::to_string)
        .unwrap_or_else(|| shorten_branch_name(&branch.name).to_string())
}

/// Build the card column for a stack
pub fn stack_cards<'a>(stack: &'a StackDetail, selected: Option<&str>) -> Vec<StackCard<'a>> {
    let display = display_order(&stack.branches);
    let last = display.len().saturating_sub(1);

    display
        .into_iter()
        .enumerate()
        .map(|(i, branch)| StackCard {
            branch,
            title: card_title(branch),
            is_top: i == 0,
            is_bottom: i == last,
            is_selected: selected == Some(branch.name.as_str()),
        })
        .collect()
}
