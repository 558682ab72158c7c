//! Phase state machine and per-phase rule modules.
//!
//! A turn walks the fixed cycle recovery → movement → shooting → combat, with
//! a one-off setup phase for each player at game start. Each phase module
//! validates and mutates state for exactly its own events; everything shared
//! (ownership checks, history append, phase advancement) lives in the
//! dispatcher.

mod combat;
mod movement;
mod recovery;
mod setup;
mod shooting;

pub use combat::CombatPhase;
pub use movement::MovementPhase;
pub use recovery::RecoveryPhase;
pub use setup::SetupPhase;
pub use shooting::ShootingPhase;

use crate::context::SelectionContext;
use crate::engine::ValidationError;
use crate::env::Env;
use crate::event::{EventKind, EventPayload};
use crate::state::{GameState, GameStatus, PlayerId, TurnFlags, Warrior};
use crate::view::ViewCommand;

/// One stage of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Setup,
    Recovery,
    Movement,
    Shooting,
    Combat,
}

/// Behavior of one phase: its event set, its mutations, and its screen.
pub trait PhaseModule: Send + Sync {
    fn phase(&self) -> Phase;

    /// Event kinds this phase accepts (dispatcher-level events excluded).
    fn supported(&self) -> &'static [EventKind];

    /// Validates and applies one event. All validation happens before any
    /// mutation, so an `Err` leaves state untouched. Returns the payload to
    /// record, with any freshly drawn dice filled in.
    fn process(
        &self,
        payload: &EventPayload,
        state: &mut GameState,
        env: &Env<'_>,
        ctx: &mut SelectionContext,
    ) -> Result<EventPayload, ValidationError>;

    /// Projects this phase's screen. Pure; must not mutate anything.
    fn build_screen(&self, state: &GameState, ctx: &SelectionContext, env: &Env<'_>)
        -> ViewCommand;

    /// Called when the phase becomes active.
    fn on_enter(&self, _state: &mut GameState) {}

    /// Called when the phase is left.
    fn on_exit(&self, _state: &mut GameState) {}
}

/// Routes a phase to its (stateless) module.
pub fn module_for(phase: Phase) -> &'static dyn PhaseModule {
    static SETUP: SetupPhase = SetupPhase;
    static RECOVERY: RecoveryPhase = RecoveryPhase;
    static MOVEMENT: MovementPhase = MovementPhase;
    static SHOOTING: ShootingPhase = ShootingPhase;
    static COMBAT: CombatPhase = CombatPhase;
    match phase {
        Phase::Setup => &SETUP,
        Phase::Recovery => &RECOVERY,
        Phase::Movement => &MOVEMENT,
        Phase::Shooting => &SHOOTING,
        Phase::Combat => &COMBAT,
    }
}

/// Where the cycle goes after the current phase: (phase, player, turn).
///
/// Setup runs once for each player; afterwards the four battle phases repeat,
/// handing over to the other player past combat and opening a new turn after
/// player 2's combat.
pub fn next_after(state: &GameState) -> (Phase, PlayerId, u32) {
    let player = state.current_player;
    let turn = state.turn;
    match state.phase {
        Phase::Setup => match player {
            PlayerId::One => (Phase::Setup, PlayerId::Two, turn),
            PlayerId::Two => (Phase::Recovery, PlayerId::One, 1),
        },
        Phase::Recovery => (Phase::Movement, player, turn),
        Phase::Movement => (Phase::Shooting, player, turn),
        Phase::Shooting => (Phase::Combat, player, turn),
        Phase::Combat => match player {
            PlayerId::One => (Phase::Recovery, PlayerId::Two, turn),
            PlayerId::Two => (Phase::Recovery, PlayerId::One, turn + 1),
        },
    }
}

/// Per-phase eligibility, as shown in actable-warrior lists.
pub fn can_act(warrior: &Warrior, phase: Phase) -> bool {
    match phase {
        Phase::Setup => warrior.is_standing() && warrior.position.is_none(),
        Phase::Recovery => {
            matches!(
                warrior.status,
                GameStatus::Fleeing | GameStatus::Stunned | GameStatus::KnockedDown
            ) && !warrior.flags.contains(TurnFlags::RECOVERED)
        }
        Phase::Movement => {
            warrior.is_standing()
                && !warrior.flags.contains(TurnFlags::MOVED)
                && !warrior.in_combat
        }
        Phase::Shooting => {
            warrior.is_standing()
                && !warrior.in_combat
                && !warrior
                    .flags
                    .intersects(TurnFlags::SHOT | TurnFlags::CHARGED | TurnFlags::RUN)
                && !warrior.ranged_weapons.is_empty()
        }
        Phase::Combat => warrior.in_combat && warrior.is_standing(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::{GameId, GameSetup, Position, Profile, Warband, WarriorId};

    fn base_warrior() -> Warrior {
        Warrior::new(
            WarriorId(0),
            "test",
            Profile::new(4, 3, 3, 3, 3, 1, 3, 1, 7),
        )
    }

    #[test]
    fn phase_cycle_hands_over_and_opens_new_turns() {
        let setup = GameSetup {
            id: GameId(1),
            scenario: "s".into(),
            seed: 0,
            config: GameConfig::default(),
            warbands: [
                Warband::new("a", vec![base_warrior()]),
                Warband::new("b", vec![]),
            ],
        };
        let mut state = GameState::from_setup(setup);

        assert_eq!(next_after(&state), (Phase::Setup, PlayerId::Two, 0));

        state.phase = Phase::Combat;
        state.current_player = PlayerId::One;
        state.turn = 1;
        assert_eq!(next_after(&state), (Phase::Recovery, PlayerId::Two, 1));

        state.current_player = PlayerId::Two;
        assert_eq!(next_after(&state), (Phase::Recovery, PlayerId::One, 2));
    }

    #[test]
    fn eligibility_per_phase() {
        let mut w = base_warrior();
        assert!(can_act(&w, Phase::Setup));

        w.position = Some(Position::new(0, 0));
        assert!(!can_act(&w, Phase::Setup));
        assert!(can_act(&w, Phase::Movement));
        assert!(!can_act(&w, Phase::Recovery));
        // No ranged weapon, no shooting.
        assert!(!can_act(&w, Phase::Shooting));

        w.flags.insert(TurnFlags::MOVED);
        assert!(!can_act(&w, Phase::Movement));

        w.status = GameStatus::KnockedDown;
        assert!(can_act(&w, Phase::Recovery));
        w.flags.insert(TurnFlags::RECOVERED);
        assert!(!can_act(&w, Phase::Recovery));

        w.status = GameStatus::Standing;
        w.in_combat = true;
        assert!(can_act(&w, Phase::Combat));
    }
}
