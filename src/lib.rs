//! StackView - live topology of stacked branches
//!
//! Reconstructs branch trees from a stacking backend, lays them out, groups
//! stacks into owner swimlanes, and keeps everything current through the
//! backend's push notifications.

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod render;
pub mod services;
pub mod utils;
pub mod view_state;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::ViewConfig;
use services::{ApiClient, EventStream, LiveView, ViewState};
use view_state::ViewUiState;

/// Interactive command read from stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    ToggleLane(String),
    Select(String),
    ClearSelection,
    Quit,
}

impl Command {
    /// `r`, `e <lane>`, `s <branch>`, `s`, `q`; anything else is ignored
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };
        match (word, arg) {
            ("r", "") => Some(Command::Refresh),
            ("q", "") => Some(Command::Quit),
            ("s", "") => Some(Command::ClearSelection),
            ("s", name) => Some(Command::Select(name.to_string())),
            ("e", lane) if !lane.is_empty() => Some(Command::ToggleLane(lane.to_string())),
            _ => None,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stackview_lib=debug,stackview=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn redraw(state: &ViewState, ui: &mut ViewUiState) {
    if let Some(snapshot) = state.snapshot.as_deref() {
        ui.reconcile(snapshot, &snapshot.swimlanes());
    }
    println!("{}", render::render_view(state, ui, Utc::now()));
}

/// Run the terminal client until Ctrl-C, `q`, or the view closes
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = ViewConfig::from_env()?;
    tracing::info!("Starting StackView against {}", config.api_url()?);

    let source = Arc::new(ApiClient::from_config(&config)?);
    let channel = EventStream::from_config(&config)?;
    let mut live = LiveView::start(source, &channel).await;
    let mut handle = live.handle();
    let mut ui = ViewUiState::new();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    redraw(&handle.current(), &mut ui);

    loop {
        tokio::select! {
            changed = handle.changed() => {
                if !changed {
                    break;
                }
                redraw(&handle.current(), &mut ui);
            }
            line = input.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        input_open = false;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read input: {}", e);
                        input_open = false;
                        continue;
                    }
                };
                match Command::parse(&line) {
                    Some(Command::Refresh) => handle.request_refresh(),
                    Some(Command::ToggleLane(lane)) => {
                        ui.toggle_lane(&lane);
                        redraw(&handle.current(), &mut ui);
                    }
                    Some(Command::Select(name)) => {
                        ui.select(&name);
                        redraw(&handle.current(), &mut ui);
                    }
                    Some(Command::ClearSelection) => {
                        ui.clear_selection();
                        redraw(&handle.current(), &mut ui);
                    }
                    Some(Command::Quit) => break,
                    None => tracing::debug!("Unknown command {:?}", line),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    live.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("r"), Some(Command::Refresh));
        assert_eq!(Command::parse(" q \n"), Some(Command::Quit));
        assert_eq!(Command::parse("e @bob"), Some(Command::ToggleLane("@bob".to_string())));
        assert_eq!(
            Command::parse("s alice/20240101000000/fix"),
            Some(Command::Select("alice/20240101000000/fix".to_string()))
        );
        assert_eq!(Command::parse("s"), Some(Command::ClearSelection));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("e"), None);
        assert_eq!(Command::parse("r now"), None);
        assert_eq!(Command::parse("refresh"), None);
    }
}
