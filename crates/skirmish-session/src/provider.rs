//! Asynchronous abstraction for sourcing player decisions.
//!
//! Hosts plug in [`BotProvider`] implementations so a seat can be driven by
//! an AI policy, a scripted fixture, or a remote bridge. Decisions are
//! scheduled behind an advisory pacing delay and stay cancelable until they
//! are submitted, so a fresher state can supersede a stale decision.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use skirmish_core::{EventKind, EventPayload, GameState, PlayerId, ViewCommand};

use crate::error::{Result, SessionError};

/// Trait for deciding one event from a projected view.
///
/// Implementations see the same [`ViewCommand`] a renderer would, plus the
/// full state for deeper lookups. They must return a payload whose kind is in
/// the view's legal list; the engine re-validates regardless.
#[async_trait]
pub trait BotProvider: Send + Sync {
    async fn decide(&self, view: &ViewCommand, state: &GameState) -> Result<EventPayload>;
}

/// Fallback provider: acknowledges whatever is pending and otherwise passes.
/// Useful for vacant seats and tests.
pub struct PassingBot;

#[async_trait]
impl BotProvider for PassingBot {
    async fn decide(&self, view: &ViewCommand, _state: &GameState) -> Result<EventPayload> {
        let legal = &view.header().legal;
        if legal.contains(&EventKind::Acknowledge) {
            Ok(EventPayload::Acknowledge)
        } else if legal.contains(&EventKind::ConfirmRoutTest) {
            Ok(EventPayload::ConfirmRoutTest { rolls: None })
        } else if legal.contains(&EventKind::AdvancePhase) {
            Ok(EventPayload::AdvancePhase)
        } else {
            Err(SessionError::Provider(
                "no passable event in the legal set".into(),
            ))
        }
    }
}

/// A scheduled bot decision in flight.
///
/// Spawned onto the tokio runtime; the decision is delivered through the
/// given channel after the pacing delay unless [`cancel`](Self::cancel) runs
/// first. Dropping the handle does not cancel the task.
pub struct ScheduledDecision {
    player: PlayerId,
    handle: JoinHandle<()>,
}

impl ScheduledDecision {
    pub fn schedule(
        provider: Arc<dyn BotProvider>,
        player: PlayerId,
        view: ViewCommand,
        state: GameState,
        delay: Duration,
        out: mpsc::Sender<(PlayerId, EventPayload)>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match provider.decide(&view, &state).await {
                Ok(payload) => {
                    debug!(%player, kind = %payload.kind(), "bot decision ready");
                    let _ = out.send((player, payload)).await;
                }
                Err(err) => {
                    debug!(%player, %err, "bot declined to act");
                }
            }
        });
        Self { player, handle }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Cancels the decision if it has not been submitted yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
