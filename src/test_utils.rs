//! Test fixtures and fakes for the live view collaborators

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;
use url::Url;

use crate::error::Result;
use crate::models::{Branch, Repo, StackDetail, StackStatus, StackSummary, ViewResponse};
use crate::services::{PushChannel, PushEvent, PushStream, SnapshotSource};

/// Branch with just a name and parent
pub fn branch(name: &str, parent: Option<&str>) -> Branch {
    Branch {
        name: name.to_string(),
        parent: parent.map(str::to_string),
        ..Default::default()
    }
}

/// Branch with a tip commit date
pub fn branch_at(name: &str, parent: Option<&str>, commit_date: &str) -> Branch {
    Branch {
        commit_date: commit_date.to_string(),
        ..branch(name, parent)
    }
}

pub fn stack(root: &str, owner: Option<&str>, branches: Vec<Branch>) -> StackDetail {
    StackDetail {
        summary: StackSummary {
            root_branch: root.to_string(),
            title: format!("Stack {}", root),
            status: StackStatus::Pending,
            scope: None,
            branch_count: branches.len() as u32,
            pr_count: 0,
            is_current: false,
            description: None,
            owner: owner.map(str::to_string),
        },
        branches,
    }
}

pub fn repo(current_user: Option<&str>) -> Repo {
    Repo {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        trunk: "main".to_string(),
        current_branch: "main".to_string(),
        remote: "origin".to_string(),
        current_user: current_user.map(str::to_string),
    }
}

/// View with one single-branch stack per root
pub fn view(roots: &[&str]) -> ViewResponse {
    ViewResponse {
        repo: repo(Some("alice")),
        stacks: roots
            .iter()
            .map(|root| stack(root, None, vec![branch(root, None)]))
            .collect(),
    }
}

/// Snapshot source that counts calls and replays scripted results
pub struct FakeSource {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<ViewResponse>>>,
    fallback: Mutex<ViewResponse>,
    delay: Mutex<Duration>,
}

impl FakeSource {
    pub fn always(response: ViewResponse) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(response),
            delay: Mutex::new(Duration::ZERO),
        })
    }

    /// Results are returned in order; afterwards an empty view
    pub fn scripted(results: Vec<Result<ViewResponse>>) -> Arc<Self> {
        let source = Self::always(view(&[]));
        *source.script.lock().unwrap() = results.into();
        source
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_response(&self, response: ViewResponse) {
        *self.fallback.lock().unwrap() = response;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn fetch_view(&self) -> Result<ViewResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Push channel that emits a fixed list of events, then stays open
pub struct FakeChannel {
    events: Mutex<Vec<PushEvent>>,
    dropped: Arc<AtomicBool>,
}

impl FakeChannel {
    pub fn silent() -> Self {
        Self::emitting(Vec::new())
    }

    pub fn emitting(events: Vec<PushEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the subscriber has released its stream
    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl PushChannel for FakeChannel {
    fn subscribe(&self) -> PushStream {
        let events = std::mem::take(&mut *self.events.lock().unwrap());
        let guard = DropFlag(Arc::clone(&self.dropped));
        stream::iter(events)
            .chain(stream::pending::<PushEvent>())
            .map(move |event| {
                let _keep = &guard;
                event
            })
            .boxed()
    }
}

/// Poll `condition` until it holds, failing the test after two seconds
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Serve a single HTTP response on a random local port
///
/// Resolves the receiver with the request line that was received.
pub async fn serve_once(status_line: &str, body: &str) -> (Url, oneshot::Receiver<String>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = vec![0u8; 8192];
        let mut read = 0;
        while read < buf.len() {
            let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            read += n;
            if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let request = String::from_utf8_lossy(&buf[..read]);
        let request_line = request.lines().next().unwrap_or("").to_string();
        let _ = tx.send(request_line);

        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    let base = Url::parse(&format!("http://{}", addr)).expect("Failed to build test URL");
    (base, rx)
}
