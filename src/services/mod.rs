//! Service layer for Stackview
//!
//! Everything that talks to the backend: snapshot fetches, the push
//! notification channel, and the synchronizer that ties them together.

pub mod api_client;
pub mod event_stream;
pub mod sync_service;

pub use api_client::{ApiClient, SnapshotSource};
pub use event_stream::{EventStream, PushChannel, PushEvent, PushStream};
pub use sync_service::{LiveView, Snapshot, ViewHandle, ViewState};
