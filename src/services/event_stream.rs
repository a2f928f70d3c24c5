//! Push notifications from the backend
//!
//! The backend publishes server-sent events on `/api/events`. Only the
//! event name matters: both recognized names mean "fetch a new snapshot".
//! Transport errors are absorbed here and the connection retries on its
//! own, so subscribers only ever see well-formed notifications.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use eventsource_client::{Client, ClientBuilder, ReconnectOptions, SSE};
use futures_util::stream::{BoxStream, Stream};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::ViewConfig;
use crate::error::Result;

const EVENTS_PATH: &str = "/api/events";
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Notification kinds the backend emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushEvent {
    StacksUpdated,
    BranchChanged,
}

impl PushEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stacks_updated" => Some(PushEvent::StacksUpdated),
            "branch_changed" => Some(PushEvent::BranchChanged),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::StacksUpdated => "stacks_updated",
            PushEvent::BranchChanged => "branch_changed",
        }
    }
}

pub type PushStream = BoxStream<'static, PushEvent>;

/// Source of push notifications; dropping the stream unsubscribes
pub trait PushChannel: Send + Sync {
    fn subscribe(&self) -> PushStream;
}

/// Server-sent event connection to the backend
#[derive(Debug, Clone)]
pub struct EventStream {
    url: String,
    reconnect_delay: Duration,
}

impl EventStream {
    pub fn new(base_url: &Url, reconnect_delay: Duration) -> Self {
        Self {
            url: format!("{}{}", base_url.as_str().trim_end_matches('/'), EVENTS_PATH),
            reconnect_delay,
        }
    }

    pub fn from_config(config: &ViewConfig) -> Result<Self> {
        Ok(Self::new(&config.api_url()?, config.reconnect_delay()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PushChannel for EventStream {
    fn subscribe(&self) -> PushStream {
        let (tx, rx) = mpsc::channel(32);
        let task = tokio::spawn(forward_events(self.url.clone(), self.reconnect_delay, tx));
        Box::pin(Subscription { rx, task })
    }
}

/// Receiving end of a live connection; aborts the connection task on drop
struct Subscription {
    rx: mpsc::Receiver<PushEvent>,
    task: JoinHandle<()>,
}

impl Stream for Subscription {
    type Item = PushEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Push subscription closed");
    }
}

async fn forward_events(url: String, reconnect_delay: Duration, tx: mpsc::Sender<PushEvent>) {
    let builder = match ClientBuilder::for_url(&url) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!("Cannot subscribe to {}: {}", url, e);
            return;
        }
    };
    let client = builder
        .reconnect(
            ReconnectOptions::reconnect(true)
                .retry_initial(true)
                .delay(reconnect_delay)
                .backoff_factor(2)
                .delay_max(MAX_RECONNECT_DELAY)
                .build(),
        )
        .build();

    tracing::info!("Subscribing to push notifications at {}", url);

    while !tx.is_closed() {
        let mut stream = client.stream();
        while let Some(item) = stream.next().await {
            match item {
                Ok(SSE::Event(event)) => match PushEvent::from_name(&event.event_type) {
                    Some(push) => {
                        tracing::debug!("Received {}", push.name());
                        if tx.send(push).await.is_err() {
                            return;
                        }
                    }
                    None => tracing::trace!("Ignoring event {:?}", event.event_type),
                },
                Ok(SSE::Connected(_)) => tracing::debug!("Push channel connected"),
                Ok(SSE::Comment(_)) => {}
                Err(e) => tracing::debug!("Push channel error, reconnecting: {}", e),
            }
        }

        tracing::debug!("Push channel ended, reconnecting in {:?}", reconnect_delay);
        tokio::time::sleep(reconnect_delay).await;
    }
}
