//! HTTP client for the stack backend

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ViewConfig;
use crate::error::{Result, StackViewError};
use crate::models::{Branch, Repo, StackDetail, StackSummary, ViewResponse};

/// Anything that can produce a full view snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_view(&self) -> Result<ViewResponse>;
}

/// Read-only client for the backend's JSON API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("stackview/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(base_url, http))
    }

    /// Use a preconfigured reqwest client
    pub fn with_http(base_url: Url, http: HttpClient) -> Self {
        Self { http, base_url }
    }

    pub fn from_config(config: &ViewConfig) -> Result<Self> {
        Self::new(config.api_url()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an API path, keeping any prefix in the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GET {} failed with {}", url, status);
            return Err(StackViewError::Status {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Repo context plus every stack with its branches
    pub async fn fetch_view(&self) -> Result<ViewResponse> {
        self.get("/api/view").await
    }

    pub async fn fetch_repo(&self) -> Result<Repo> {
        self.get("/api/repo").await
    }

    pub async fn fetch_stacks(&self) -> Result<Vec<StackSummary>> {
        self.get("/api/stacks").await
    }

    pub async fn fetch_stack(&self, root_branch: &str) -> Result<StackDetail> {
        self.get(&format!("/api/stacks/{}", urlencoding::encode(root_branch)))
            .await
            .map_err(|e| match e {
                StackViewError::Status { code: 404, .. } => {
                    StackViewError::StackNotFound(root_branch.to_string())
                }
                e => e,
            })
    }

    pub async fn fetch_branches(&self) -> Result<Vec<Branch>> {
        self.get("/api/branches").await
    }

    pub async fn fetch_branch(&self, name: &str) -> Result<Branch> {
        self.get(&format!("/api/branches/{}", urlencoding::encode(name)))
            .await
            .map_err(|e| match e {
                StackViewError::Status { code: 404, .. } => {
                    StackViewError::BranchNotFound(name.to_string())
                }
                e => e,
            })
    }
}

#[async_trait]
impl SnapshotSource for ApiClient {
    async fn fetch_view(&self) -> Result<ViewResponse> {
        ApiClient::fetch_view(self).await
    }
}
