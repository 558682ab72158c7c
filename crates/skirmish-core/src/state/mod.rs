//! Authoritative game state representation.
//!
//! This module owns the canonical mutable record of one game: both warbands,
//! turn/phase bookkeeping, the human-readable log, the audit trail, and the
//! append-only event history. Hosting layers clone or query this state but
//! mutate it exclusively through [`crate::engine::GameEngine`].

mod warband;
mod warrior;

pub use warband::Warband;
pub use warrior::{GameStatus, Position, Profile, TurnFlags, Warrior, WarriorId};

use crate::combat::CombatResolution;
use crate::config::GameConfig;
use crate::event::{Event, EventId, EventKind};
use crate::phases::Phase;
use crate::strike::StrikeOrder;

/// Identifies one game for logging and peer sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

/// One of the two players in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerId {
    #[strum(serialize = "player 1")]
    One,
    #[strum(serialize = "player 2")]
    Two,
}

impl PlayerId {
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

/// One line of the append-only human-readable game log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogLine {
    pub turn: u32,
    pub phase: Phase,
    pub text: String,
}

/// Partial snapshot of a warrior taken before an event mutated it.
///
/// Audit-only data: the undo engine replays events instead of reversing them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarriorSnapshot {
    pub id: WarriorId,
    pub status: GameStatus,
    pub wounds_remaining: u8,
    pub position: Option<Position>,
}

impl WarriorSnapshot {
    pub fn of(warrior: &Warrior) -> Self {
        Self {
            id: warrior.id,
            status: warrior.status,
            wounds_remaining: warrior.wounds_remaining,
            position: warrior.position,
        }
    }
}

/// Audit log entry describing one applied event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRecord {
    pub kind: EventKind,
    pub actor: PlayerId,
    pub warband: usize,
    pub prior: Option<WarriorSnapshot>,
    pub dice: Vec<u8>,
    pub description: String,
}

/// Pending rout test forced by casualties crossing the quarter threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingRout {
    pub player: PlayerId,
    /// Filled once the test has been rolled; the result stays on screen until
    /// acknowledged.
    pub outcome: Option<RoutOutcome>,
}

/// Resolved rout test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutOutcome {
    pub dice: [u8; 2],
    pub leadership: u8,
    pub passed: bool,
}

impl RoutOutcome {
    pub fn total(&self) -> u8 {
        self.dice[0] + self.dice[1]
    }
}

/// Immutable record of how the game began: the structural-clone boundary the
/// undo engine resets to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSetup {
    pub id: GameId,
    pub scenario: String,
    pub seed: u64,
    pub config: GameConfig,
    pub warbands: [Warband; 2],
}

/// Canonical snapshot of one running game.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub id: GameId,
    pub scenario: String,
    /// Base RNG seed, mixed with the history length and actor id for each
    /// fresh dice draw.
    pub seed: u64,
    pub config: GameConfig,

    pub turn: u32,
    pub current_player: PlayerId,
    pub phase: Phase,
    pub warbands: [Warband; 2],

    /// Append-only human-readable log.
    pub log: Vec<LogLine>,
    /// Append-only audit records, one per applied event.
    pub audit: Vec<ActionRecord>,
    /// Append-only history of state-mutating events; replaying it from
    /// `initial` reproduces this state exactly.
    pub history: Vec<Event>,

    pub ended: bool,
    pub winner: Option<PlayerId>,

    /// Strike order for the active combat phase; built on phase entry and
    /// cleared on exit.
    pub strike_order: Option<StrikeOrder>,
    /// Dice trail of the attack awaiting acknowledgement. Transient: rebuilt
    /// by replay, never persisted.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub pending_resolution: Option<CombatResolution>,
    /// Rout test that must be resolved before the phase continues.
    pub pending_rout: Option<PendingRout>,

    /// Warband snapshots taken at game creation; undo resets to these.
    pub initial: GameSetup,
}

impl GameState {
    /// Creates a fresh game from the setup record. The setup itself is
    /// retained inside the state so undo can always rebuild from scratch.
    pub fn from_setup(setup: GameSetup) -> Self {
        Self {
            id: setup.id,
            scenario: setup.scenario.clone(),
            seed: setup.seed,
            config: setup.config.clone(),
            turn: 0,
            current_player: PlayerId::One,
            phase: Phase::Setup,
            warbands: setup.warbands.clone(),
            log: Vec::new(),
            audit: Vec::new(),
            history: Vec::new(),
            ended: false,
            winner: None,
            strike_order: None,
            pending_resolution: None,
            pending_rout: None,
            initial: setup,
        }
    }

    pub fn warband(&self, player: PlayerId) -> &Warband {
        &self.warbands[player.index()]
    }

    pub fn warband_mut(&mut self, player: PlayerId) -> &mut Warband {
        &mut self.warbands[player.index()]
    }

    /// Looks a warrior up across both warbands.
    pub fn warrior(&self, id: WarriorId) -> Option<&Warrior> {
        self.warbands.iter().find_map(|band| band.warrior(id))
    }

    pub fn warrior_mut(&mut self, id: WarriorId) -> Option<&mut Warrior> {
        self.warbands
            .iter_mut()
            .find_map(|band| band.warrior_mut(id))
    }

    /// Which player owns the given warrior.
    pub fn owner_of(&self, id: WarriorId) -> Option<PlayerId> {
        if self.warbands[0].contains(id) {
            Some(PlayerId::One)
        } else if self.warbands[1].contains(id) {
            Some(PlayerId::Two)
        } else {
            None
        }
    }

    /// Locks two warriors in melee, keeping `engaged_with` symmetric.
    pub fn engage(&mut self, a: WarriorId, b: WarriorId) {
        if let Some(w) = self.warrior_mut(a) {
            w.engaged_with.insert(b);
            w.in_combat = true;
        }
        if let Some(w) = self.warrior_mut(b) {
            w.engaged_with.insert(a);
            w.in_combat = true;
        }
    }

    /// Removes a warrior from every melee, restoring symmetry on both sides.
    pub fn disengage_all(&mut self, id: WarriorId) {
        let partners: Vec<WarriorId> = match self.warrior(id) {
            Some(w) => w.engaged_with.iter().copied().collect(),
            None => return,
        };
        for partner in partners {
            if let Some(w) = self.warrior_mut(partner) {
                w.engaged_with.remove(&id);
                w.in_combat = !w.engaged_with.is_empty();
            }
        }
        if let Some(w) = self.warrior_mut(id) {
            w.engaged_with.clear();
            w.in_combat = false;
        }
    }

    /// Takes a warrior out of action: status change, casualty counter bump,
    /// and symmetric disengagement.
    pub fn take_out_of_action(&mut self, id: WarriorId) {
        self.disengage_all(id);
        let owner = self.owner_of(id);
        if let Some(w) = self.warrior_mut(id) {
            w.status = GameStatus::OutOfAction;
            w.wounds_remaining = 0;
            w.flags.remove(TurnFlags::HIDDEN);
        }
        if let Some(owner) = owner {
            self.warband_mut(owner).out_of_action_count += 1;
        }
    }

    /// Appends a line to the human-readable log, stamped with turn and phase.
    pub fn push_log(&mut self, text: impl Into<String>) {
        let line = LogLine {
            turn: self.turn,
            phase: self.phase,
            text: text.into(),
        };
        self.log.push(line);
    }

    /// Id the next recorded event must exceed. History ids are strictly
    /// increasing, which is what undo-to-event cuts on.
    pub fn last_event_id(&self) -> EventId {
        self.history.last().map(|e| e.id).unwrap_or(EventId(0))
    }

    pub fn next_event_id(&self) -> EventId {
        EventId(self.last_event_id().0 + 1)
    }
}
