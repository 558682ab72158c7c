//! Engine input events.
//!
//! Every command a player (or bot, or remote peer) can issue is one variant of
//! [`EventPayload`], with a strongly-typed payload validated at the dispatcher
//! boundary. Payloads for dice-driven actions carry an optional block of
//! previously-rolled results: the dispatcher fills the block in when it first
//! resolves the event, so a recorded event always replays without re-rolling.

use crate::state::{PlayerId, Position, WarriorId};

/// Strictly increasing identifier for recorded events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// One submitted command with its envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub id: EventId,
    /// Wall-clock stamp supplied by the submitting side; informational only,
    /// never used for rules decisions.
    pub timestamp: u64,
    pub player: PlayerId,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: u64, player: PlayerId, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            player,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Toggleable per-warrior modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ModifierKind {
    /// Break from or drop into hiding.
    Hidden,
    /// Claim or leave hard cover.
    Cover,
}

/// Recorded dice for one attack, in pipeline order. Stages that never ran
/// stay `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRolls {
    pub hit: Option<u8>,
    pub parry: Option<u8>,
    pub wound: Option<u8>,
    pub critical: Option<u8>,
    pub save: Option<u8>,
    pub injury: Option<u8>,
}

impl AttackRolls {
    /// Flattens the trail for audit records.
    pub fn as_vec(&self) -> Vec<u8> {
        [
            self.hit,
            self.parry,
            self.wound,
            self.critical,
            self.save,
            self.injury,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// First recorded value that is not a D6 face, if any. Recorded dice
    /// arrive from peers and must be range-checked before any arithmetic.
    pub fn out_of_range(&self) -> Option<u8> {
        [
            self.hit,
            self.parry,
            self.wound,
            self.critical,
            self.save,
            self.injury,
        ]
        .into_iter()
        .flatten()
        .find(|v| !(1..=6).contains(v))
    }
}

/// Recorded 2d6 for a rally test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RallyRolls {
    pub dice: [u8; 2],
}

impl RallyRolls {
    pub fn out_of_range(&self) -> Option<u8> {
        self.dice.into_iter().find(|v| !(1..=6).contains(v))
    }
}

/// Recorded 2d6 for a rout test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutRolls {
    pub dice: [u8; 2],
}

impl RoutRolls {
    pub fn out_of_range(&self) -> Option<u8> {
        self.dice.into_iter().find(|v| !(1..=6).contains(v))
    }
}

/// Tagged union of every command the engine accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventPayload {
    // -- selection (transient context only, never recorded) ------------------
    SelectWarrior {
        warrior: WarriorId,
    },
    DeselectWarrior,
    SelectTarget {
        target: WarriorId,
    },

    // -- setup ----------------------------------------------------------------
    PositionWarrior {
        warrior: WarriorId,
        position: Position,
    },

    // -- movement -------------------------------------------------------------
    ConfirmMove {
        warrior: WarriorId,
        to: Position,
        running: bool,
    },
    ConfirmCharge {
        warrior: WarriorId,
        target: WarriorId,
    },
    ToggleModifier {
        warrior: WarriorId,
        modifier: ModifierKind,
    },

    // -- shooting / melee -----------------------------------------------------
    ConfirmShoot {
        shooter: WarriorId,
        target: WarriorId,
        rolls: Option<AttackRolls>,
    },
    ConfirmMelee {
        attacker: WarriorId,
        defender: WarriorId,
        attempt_parry: bool,
        rolls: Option<AttackRolls>,
    },

    // -- recovery -------------------------------------------------------------
    Recover {
        warrior: WarriorId,
        rolls: Option<RallyRolls>,
    },
    ConfirmRoutTest {
        rolls: Option<RoutRolls>,
    },

    // -- flow -----------------------------------------------------------------
    AdvancePhase,
    Acknowledge,
    Undo {
        to_event: EventId,
    },
    RequestState,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::SelectWarrior { .. } => EventKind::SelectWarrior,
            EventPayload::DeselectWarrior => EventKind::DeselectWarrior,
            EventPayload::SelectTarget { .. } => EventKind::SelectTarget,
            EventPayload::PositionWarrior { .. } => EventKind::PositionWarrior,
            EventPayload::ConfirmMove { .. } => EventKind::ConfirmMove,
            EventPayload::ConfirmCharge { .. } => EventKind::ConfirmCharge,
            EventPayload::ToggleModifier { .. } => EventKind::ToggleModifier,
            EventPayload::ConfirmShoot { .. } => EventKind::ConfirmShoot,
            EventPayload::ConfirmMelee { .. } => EventKind::ConfirmMelee,
            EventPayload::Recover { .. } => EventKind::Recover,
            EventPayload::ConfirmRoutTest { .. } => EventKind::ConfirmRoutTest,
            EventPayload::AdvancePhase => EventKind::AdvancePhase,
            EventPayload::Acknowledge => EventKind::Acknowledge,
            EventPayload::Undo { .. } => EventKind::Undo,
            EventPayload::RequestState => EventKind::RequestState,
        }
    }

    /// The warrior a command acts through, for dispatcher ownership checks.
    ///
    /// Target ids are deliberately excluded: targets are validated per phase,
    /// not by ownership. Melee attackers are validated against the strike
    /// order instead, since both players' fighters strike during one combat
    /// phase.
    pub fn acting_warrior(&self) -> Option<WarriorId> {
        match self {
            EventPayload::SelectWarrior { warrior }
            | EventPayload::PositionWarrior { warrior, .. }
            | EventPayload::ConfirmMove { warrior, .. }
            | EventPayload::ConfirmCharge { warrior, .. }
            | EventPayload::ToggleModifier { warrior, .. }
            | EventPayload::ConfirmShoot {
                shooter: warrior, ..
            }
            | EventPayload::Recover { warrior, .. } => Some(*warrior),
            _ => None,
        }
    }

    /// Selection and state-request commands mutate only the transient view
    /// context, so they are processed but never appended to history. Undo is
    /// excluded too: it rewrites history rather than extending it.
    pub fn is_recorded(&self) -> bool {
        !matches!(
            self,
            EventPayload::SelectWarrior { .. }
                | EventPayload::DeselectWarrior
                | EventPayload::SelectTarget { .. }
                | EventPayload::RequestState
                | EventPayload::Undo { .. }
        )
    }
}

/// Discriminant of [`EventPayload`], used for legality sets and audit records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    SelectWarrior,
    DeselectWarrior,
    SelectTarget,
    PositionWarrior,
    ConfirmMove,
    ConfirmCharge,
    ToggleModifier,
    ConfirmShoot,
    ConfirmMelee,
    Recover,
    ConfirmRoutTest,
    AdvancePhase,
    Acknowledge,
    Undo,
    RequestState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_events_are_not_recorded() {
        assert!(!EventPayload::DeselectWarrior.is_recorded());
        assert!(!EventPayload::RequestState.is_recorded());
        assert!(!EventPayload::Undo {
            to_event: EventId(3)
        }
        .is_recorded());
        assert!(EventPayload::AdvancePhase.is_recorded());
        assert!(EventPayload::ConfirmMelee {
            attacker: WarriorId(0),
            defender: WarriorId(1),
            attempt_parry: true,
            rolls: None,
        }
        .is_recorded());
    }

    #[test]
    fn acting_warrior_skips_targets() {
        let shoot = EventPayload::ConfirmShoot {
            shooter: WarriorId(4),
            target: WarriorId(9),
            rolls: None,
        };
        assert_eq!(shoot.acting_warrior(), Some(WarriorId(4)));

        let melee = EventPayload::ConfirmMelee {
            attacker: WarriorId(4),
            defender: WarriorId(9),
            attempt_parry: false,
            rolls: None,
        };
        assert_eq!(melee.acting_warrior(), None);
    }
}
