//! Live view synchronizer
//!
//! Owns the canonical snapshot and keeps it current: one fetch on start, one
//! fetch per push notification, and one per explicit `refresh`. Consumers
//! read through a [`ViewHandle`] and never mutate state themselves.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::api_client::SnapshotSource;
use super::event_stream::{PushChannel, PushStream};
use crate::graph::{compute_tree_layout, group_by_owner, Swimlanes, TreeLayout};
use crate::models::{Branch, Repo, StackDetail, ViewResponse};

/// One complete repo + stacks fetch, replaced as a unit
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub repo: Repo,
    pub stacks: Vec<StackDetail>,
}

impl From<ViewResponse> for Snapshot {
    fn from(view: ViewResponse) -> Self {
        Self {
            repo: view.repo,
            stacks: view.stacks,
        }
    }
}

impl Snapshot {
    pub fn find_stack(&self, root_branch: &str) -> Option<&StackDetail> {
        self.stacks.iter().find(|s| s.root_branch() == root_branch)
    }

    pub fn find_branch(&self, name: &str) -> Option<&Branch> {
        self.stacks.iter().find_map(|s| s.find_branch(name))
    }

    /// Owner lanes for the current user
    pub fn swimlanes(&self) -> Swimlanes<'_> {
        group_by_owner(&self.stacks, self.repo.current_user.as_deref())
    }

    /// Diagram for one stack, `None` if the stack is not in this snapshot
    pub fn stack_layout(&self, root_branch: &str) -> Option<TreeLayout<'_>> {
        self.find_stack(root_branch)
            .map(|s| compute_tree_layout(&s.branches))
    }
}

/// Everything a consumer may observe
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Latest good snapshot; cleared when a fetch fails
    pub snapshot: Option<Arc<Snapshot>>,
    /// True until the first fetch resolves
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub(crate) generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            snapshot: None,
            loading: true,
            error: None,
            last_updated: None,
            generation: 0,
        }
    }
}

impl ViewState {
    pub fn repo(&self) -> Option<&Repo> {
        self.snapshot.as_deref().map(|s| &s.repo)
    }

    pub fn stacks(&self) -> &[StackDetail] {
        self.snapshot
            .as_deref()
            .map(|s| s.stacks.as_slice())
            .unwrap_or(&[])
    }

    /// Generation of the fetch that produced this state
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Shared {
    source: Arc<dyn SnapshotSource>,
    state: watch::Sender<ViewState>,
    next_generation: AtomicU64,
    closed: AtomicBool,
}

impl Shared {
    async fn refresh(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.source.fetch_view().await;

        let now = Utc::now();
        self.state.send_if_modified(move |state| {
            // Checked under the watch lock; `close` sets it under the same lock
            if self.closed.load(Ordering::SeqCst) {
                tracing::debug!("View closed, dropping fetch #{}", generation);
                return false;
            }
            if generation < state.generation {
                tracing::debug!(
                    "Discarding fetch #{}, already showing #{}",
                    generation,
                    state.generation
                );
                return false;
            }

            state.generation = generation;
            state.loading = false;
            match result {
                Ok(view) => {
                    tracing::info!(
                        "Snapshot #{} applied: {} stacks",
                        generation,
                        view.stacks.len()
                    );
                    state.snapshot = Some(Arc::new(Snapshot::from(view)));
                    state.error = None;
                    state.last_updated = Some(now);
                }
                Err(e) => {
                    tracing::warn!("Snapshot #{} failed: {}", generation, e);
                    state.snapshot = None;
                    state.error = Some(e.to_string());
                }
            }
            true
        });
    }

    /// Mark the view closed; no result is applied after this returns
    fn close(&self) {
        self.state.send_if_modified(|_| {
            self.closed.store(true, Ordering::SeqCst);
            false
        });
    }
}

/// Read access to the live view plus the ability to ask for a refresh
#[derive(Clone)]
pub struct ViewHandle {
    rx: watch::Receiver<ViewState>,
    shared: Arc<Shared>,
}

impl ViewHandle {
    /// Current state; cheap, the snapshot itself is shared
    pub fn current(&self) -> ViewState {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change. Returns false once nothing more can change.
    pub async fn changed(&mut self) -> bool {
        if self.shared.closed.load(Ordering::SeqCst) {
            return false;
        }
        self.rx.changed().await.is_ok()
    }

    /// Fetch a new snapshot and wait for it to be applied
    pub async fn refresh(&self) {
        self.shared.refresh().await;
    }

    /// Start a refresh without waiting for it
    pub fn request_refresh(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.refresh().await });
    }
}

/// Owner of the synchronized snapshot and its push subscription
pub struct LiveView {
    shared: Arc<Shared>,
    push_task: Option<JoinHandle<()>>,
}

impl LiveView {
    /// Subscribe to `channel`, perform the initial fetch, and return the live view
    pub async fn start(source: Arc<dyn SnapshotSource>, channel: &dyn PushChannel) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        let shared = Arc::new(Shared {
            source,
            state,
            next_generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        });

        let events = channel.subscribe();
        let push_task = tokio::spawn(listen(Arc::clone(&shared), events));

        shared.refresh().await;

        Self {
            shared,
            push_task: Some(push_task),
        }
    }

    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            rx: self.shared.state.subscribe(),
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn current(&self) -> ViewState {
        self.shared.state.borrow().clone()
    }

    pub async fn refresh(&self) {
        self.shared.refresh().await;
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Stop listening for notifications; in-flight fetches are ignored
    pub fn shutdown(&mut self) {
        self.shared.close();
        if let Some(task) = self.push_task.take() {
            task.abort();
            tracing::info!("Live view shut down");
        }
    }
}

impl Drop for LiveView {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Every notification triggers exactly one refresh
async fn listen(shared: Arc<Shared>, mut events: PushStream) {
    while let Some(event) = events.next().await {
        tracing::debug!("Push notification {}, refreshing", event.name());
        let shared = Arc::clone(&shared);
        tokio::spawn(async move { shared.refresh().await });
    }
    tracing::debug!("Push notifications ended");
}
