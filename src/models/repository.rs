//! Repository models

use serde::{Deserialize, Serialize};

use super::StackDetail;

/// Repository context for the whole view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub owner: String,
    pub repo: String,
    pub trunk: String,
    #[serde(default)]
    pub current_branch: String,
    #[serde(default)]
    pub remote: String,
    /// Identity used to decide which stacks are "yours"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

impl Repo {
    /// `owner/repo` as shown in the header
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Combined response of `GET /api/view`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub repo: Repo,
    #[serde(default)]
    pub stacks: Vec<StackDetail>,
}
