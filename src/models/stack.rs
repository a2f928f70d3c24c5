//! Stack models

use serde::{Deserialize, Serialize};

use super::Branch;

/// Aggregate stack status, computed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackStatus {
    Shippable,
    Pending,
    Blocked,
    Incomplete,
    #[serde(other)]
    Unknown,
}

impl StackStatus {
    /// Human-readable badge text
    pub fn label(&self) -> &'static str {
        match self {
            StackStatus::Shippable => "Ready to ship",
            StackStatus::Pending => "Needs restack",
            StackStatus::Blocked => "Blocked",
            StackStatus::Incomplete => "Incomplete",
            StackStatus::Unknown => "Unknown",
        }
    }
}

/// Stack summary as listed by `GET /api/stacks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSummary {
    pub root_branch: String,
    #[serde(default)]
    pub title: String,
    pub status: StackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub branch_count: u32,
    #[serde(default)]
    pub pr_count: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absent means the stack belongs to the viewer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Stack summary plus every branch in it, in the order received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDetail {
    #[serde(flatten)]
    pub summary: StackSummary,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

impl StackDetail {
    pub fn root_branch(&self) -> &str {
        &self.summary.root_branch
    }

    pub fn owner(&self) -> Option<&str> {
        self.summary.owner.as_deref()
    }

    /// Whether this stack belongs to `current_user` (or to nobody in particular)
    pub fn is_owned_by(&self, current_user: Option<&str>) -> bool {
        match self.owner() {
            None => true,
            Some(owner) => Some(owner) == current_user,
        }
    }

    pub fn find_branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }
}
