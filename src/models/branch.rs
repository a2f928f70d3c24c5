//! Branch models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One branch in a stack, as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    /// Name of the branch this one stacks on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Children as reported upstream. Informational only; the tree is
    /// always rebuilt from `parent` links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub needs_restack: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<String>,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub revision: String,
    /// RFC 3339 timestamp of the tip commit
    #[serde(default)]
    pub commit_date: String,
    #[serde(default)]
    pub commit_author: String,
    #[serde(default)]
    pub commit_count: u32,
    #[serde(default)]
    pub lines_added: u32,
    #[serde(default)]
    pub lines_deleted: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<Commit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr: Option<PullRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<RemoteStatus>,
}

impl Branch {
    /// Parsed tip commit time, `None` when the backend sent something unparseable
    pub fn commit_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.commit_date)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Message of the newest commit, if the backend included commits
    pub fn head_message(&self) -> Option<&str> {
        self.commits
            .as_ref()
            .and_then(|commits| commits.first())
            .map(|c| c.message.as_str())
            .filter(|m| !m.is_empty())
    }
}

/// A single commit on a branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub message: String,
}

/// Pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestState {
    Open,
    Merged,
    Closed,
}

/// Pull request attached to a branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u32,
    pub title: String,
    pub state: PullRequestState,
    pub url: String,
    #[serde(default)]
    pub is_draft: bool,
    pub base: String,
}

/// Aggregate CI outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiState {
    Passing,
    Failing,
    Pending,
    None,
}

/// CI and review state for a branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiStatus {
    pub status: CiState,
    #[serde(default)]
    pub review_decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<CheckDetail>>,
}

/// One CI check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDetail {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: String,
}

/// Relationship between a local branch and its remote counterpart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStatus {
    #[serde(default)]
    pub ahead: bool,
    #[serde(default)]
    pub behind: bool,
    #[serde(default)]
    pub diverged: bool,
    #[serde(default)]
    pub missing_remote: bool,
}
