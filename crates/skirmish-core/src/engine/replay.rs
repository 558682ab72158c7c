//! Replay and undo.
//!
//! Undo is implemented as replay: the state snapshots nothing beyond its
//! initial setup, so rewinding means rebuilding from that setup and
//! re-dispatching a prefix of the recorded history. Recorded events carry
//! their dice, which makes the rebuild bit-for-bit deterministic.

use crate::context::SelectionContext;
use crate::engine::{EngineError, GameEngine, ReplayError, ValidationError};
use crate::env::Env;
use crate::event::{Event, EventId};
use crate::state::{GameSetup, GameState};

/// Rebuilds a game by dispatching `history` over a fresh state from `setup`.
///
/// Every event in a recorded history was accepted once, so a rejection here
/// is a determinism failure and comes back as [`ReplayError`].
pub fn replay(
    setup: GameSetup,
    history: &[Event],
    env: &Env<'_>,
) -> Result<GameState, ReplayError> {
    let mut state = GameState::from_setup(setup);
    let mut ctx = SelectionContext::default();
    for (index, event) in history.iter().enumerate() {
        GameEngine::dispatch(&mut state, &mut ctx, env, event).map_err(|err| ReplayError {
            index,
            event: event.id,
            source: match err {
                EngineError::Validation(source) => source,
                EngineError::Replay(nested) => nested.source,
            },
        })?;
    }
    Ok(state)
}

/// Rewinds the game so `to_event` is the last applied event.
///
/// `EventId(0)` rewinds all the way to the initial setup. The target must
/// otherwise name a recorded event; ids that were never recorded (or were
/// themselves undone earlier) are rejected without touching the state.
pub fn undo_to_event(
    state: &mut GameState,
    env: &Env<'_>,
    to_event: EventId,
) -> Result<(), EngineError> {
    let cut = if to_event == EventId(0) {
        0
    } else {
        match state.history.iter().position(|e| e.id == to_event) {
            Some(index) => index + 1,
            None => return Err(ValidationError::UndoTargetNotFound(to_event).into()),
        }
    };
    let retained: Vec<Event> = state.history[..cut].to_vec();
    let rebuilt = replay(state.initial.clone(), &retained, env)?;
    *state = rebuilt;
    Ok(())
}

/// Rewinds the last `count` recorded events.
pub fn undo_last_events(
    state: &mut GameState,
    env: &Env<'_>,
    count: usize,
) -> Result<(), EngineError> {
    let remaining = state.history.len().saturating_sub(count);
    let target = if remaining == 0 {
        EventId(0)
    } else {
        state.history[remaining - 1].id
    };
    undo_to_event(state, env, target)
}
