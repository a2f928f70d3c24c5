//! Stack topology engine
//!
//! Pure functions over an immutable snapshot: tree reconstruction, diagram
//! layout, stacked-card ordering and owner swimlanes. Nothing here holds
//! state between calls.

pub mod layout;
pub mod ordering;
pub mod swimlane;
pub mod tree;

pub use layout::{compute_tree_layout, LayoutEdge, LayoutNode, TreeLayout};
pub use ordering::{display_order, ordered_branches, stack_cards, StackCard};
pub use swimlane::{group_by_owner, last_active, LaneWindow, OwnerGroup, Swimlanes, COLLAPSED_LIMIT};
pub use tree::BranchTree;
