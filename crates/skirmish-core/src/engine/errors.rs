//! Error types for the event dispatcher.
//!
//! Two disjoint families: [`ValidationError`] is the ordinary typed rejection
//! of a user event (state and history untouched), while [`ReplayError`] is a
//! fatal internal-consistency failure: a recorded event stopped validating
//! against freshly rebuilt state, which means determinism broke somewhere.

use crate::event::{EventId, EventKind};
use crate::phases::Phase;
use crate::state::{PlayerId, WarriorId};

/// Typed rejection of a submitted event. State and history are left
/// completely unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("game has ended")]
    GameEnded,

    #[error("not {player}'s turn (current: {current})")]
    NotYourTurn { player: PlayerId, current: PlayerId },

    #[error("warrior {0} not found")]
    WarriorNotFound(WarriorId),

    #[error("warrior {warrior} does not belong to {player}")]
    NotOwned { warrior: WarriorId, player: PlayerId },

    #[error("event {kind} is not legal in the {phase} phase")]
    EventNotLegalInPhase { kind: EventKind, phase: Phase },

    #[error("a combat resolution is awaiting acknowledgement")]
    ResolutionPending,

    #[error("a rout test must be resolved first")]
    RoutTestPending,

    #[error("no rout test is pending")]
    NoRoutTestPending,

    #[error("warrior {warrior} cannot act in this phase")]
    CannotActThisPhase { warrior: WarriorId },

    #[error("warrior {warrior} has no ranged weapon")]
    NoRangedWeapon { warrior: WarriorId },

    #[error("invalid target {target}")]
    InvalidTarget { target: WarriorId },

    #[error("target {target} is out of range")]
    TargetOutOfRange { target: WarriorId },

    #[error("move exceeds warrior {warrior}'s allowance")]
    MoveTooFar { warrior: WarriorId },

    #[error("no free square adjacent to {target}")]
    NoRoomToCharge { target: WarriorId },

    #[error("recorded die {value} is outside 1-6")]
    DieOutOfRange { value: u8 },

    #[error("warrior {warrior} is not the current striker")]
    NotCurrentStriker { warrior: WarriorId },

    #[error("warrior {warrior} has no attacks remaining")]
    NoAttacksRemaining { warrior: WarriorId },

    #[error("nothing to acknowledge")]
    NothingToAcknowledge,

    #[error("every warrior must be positioned before setup can advance")]
    SetupIncomplete,

    #[error("event id {id} is not after the last recorded id {last}")]
    StaleEventId { id: EventId, last: EventId },

    #[error("undo target {0} is not in the recorded history")]
    UndoTargetNotFound(EventId),
}

/// A recorded event failed to re-validate during replay: a determinism bug,
/// never a user error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("replay diverged at history index {index} (event {event}): {source}")]
pub struct ReplayError {
    pub index: usize,
    pub event: EventId,
    pub source: ValidationError,
}

/// Errors surfaced by [`crate::engine::GameEngine`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal consistency failure: {0}")]
    Replay(#[from] ReplayError),
}
