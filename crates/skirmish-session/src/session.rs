//! Game session: one authoritative writer around an engine state.
//!
//! A session owns the state, the transient selection context, and the oracle
//! set, and funnels every mutation through [`GameSession::submit`] one event
//! at a time. There is no interior locking: hosts that share a session across
//! tasks wrap it in their own synchronization, and the engine's turn
//! ownership checks reject events from the player whose turn it is not.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use skirmish_core::{
    DiceOracle, Env, EquipmentOracle, Event, EventPayload, GameEngine, GameSetup, GameState,
    PlayerId, RulesOracle, SelectionContext, ViewCommand,
};

use crate::error::{Result, SessionError};
use crate::oracle::{ChaChaDice, EquipmentCatalog, StandardRules};
use crate::snapshot::{fingerprint, SavedGame};

pub struct GameSession {
    state: GameState,
    ctx: SelectionContext,
    rules: Arc<dyn RulesOracle>,
    equipment: Arc<dyn EquipmentOracle>,
    dice: Arc<dyn DiceOracle>,
}

impl GameSession {
    pub fn new(
        setup: GameSetup,
        rules: Arc<dyn RulesOracle>,
        equipment: Arc<dyn EquipmentOracle>,
        dice: Arc<dyn DiceOracle>,
    ) -> Self {
        let state = GameState::from_setup(setup);
        info!(game = %state.id, scenario = %state.scenario, "session opened");
        Self {
            state,
            ctx: SelectionContext::default(),
            rules,
            equipment,
            dice,
        }
    }

    /// Session with the standard rulebook, catalog, and seeded dice.
    pub fn standard(setup: GameSetup) -> Self {
        Self::new(
            setup,
            Arc::new(StandardRules),
            Arc::new(EquipmentCatalog),
            Arc::new(ChaChaDice),
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn env(&self) -> Env<'_> {
        Env::new(
            self.rules.as_ref(),
            self.equipment.as_ref(),
            self.dice.as_ref(),
        )
    }

    /// Projects the current screen without touching anything.
    pub fn view(&self) -> ViewCommand {
        skirmish_core::view::project(&self.state, &self.ctx, &self.env())
    }

    /// Wraps a payload in an envelope with the next history id and submits it.
    pub fn submit(&mut self, player: PlayerId, payload: EventPayload) -> Result<ViewCommand> {
        let event = Event::new(self.state.next_event_id(), now_millis(), player, payload);
        self.handle(&event)
    }

    /// Dispatches a fully addressed event, local or from a peer.
    pub fn handle(&mut self, event: &Event) -> Result<ViewCommand> {
        let kind = event.kind();
        let env = Env::new(
            self.rules.as_ref(),
            self.equipment.as_ref(),
            self.dice.as_ref(),
        );
        match GameEngine::dispatch(&mut self.state, &mut self.ctx, &env, event) {
            Ok(view) => {
                debug!(
                    game = %self.state.id,
                    event = %event.id,
                    %kind,
                    player = %event.player,
                    phase = %self.state.phase,
                    "event applied"
                );
                Ok(view)
            }
            Err(err) => {
                warn!(game = %self.state.id, %kind, player = %event.player, %err, "event rejected");
                Err(err.into())
            }
        }
    }

    /// Fingerprint of the current state, for resync checks and logging.
    pub fn fingerprint(&self) -> Result<String> {
        fingerprint(&self.state)
    }

    pub fn save(&self) -> SavedGame {
        SavedGame::of(&self.state)
    }

    /// Adopts a peer's snapshot after verifying it against its own history.
    pub fn resync(&mut self, saved: SavedGame) -> Result<()> {
        saved.verify(&self.env())?;
        // Adopt the replayed state rather than the carried one, so transient
        // fields (the pending resolution modal) are rebuilt too.
        let rebuilt = skirmish_core::replay(
            saved.state.initial.clone(),
            &saved.history,
            &self.env(),
        )
        .map_err(skirmish_core::EngineError::from)?;
        info!(game = %rebuilt.id, events = rebuilt.history.len(), "resynced from snapshot");
        self.state = rebuilt;
        self.ctx.clear();
        Ok(())
    }

    /// Error screen for a rejected event, built on the current header.
    pub fn error_view(&self, err: &SessionError) -> ViewCommand {
        let header = self.view().header().clone();
        ViewCommand::Error {
            header,
            message: err.to_string(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
