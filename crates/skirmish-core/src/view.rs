//! View projection.
//!
//! `project` is a pure mapping from (state, selection context) to a tagged
//! [`ViewCommand`] carrying only denormalized data a renderer needs, plus the
//! exact list of event kinds that are currently legal. Nothing here is ever
//! cached: every call recomputes from scratch so the view can never drift
//! from the rules after a mutation.

use crate::combat::CombatResolution;
use crate::context::SelectionContext;
use crate::env::Env;
use crate::event::EventKind;
use crate::phases::{module_for, Phase};
use crate::state::{
    GameId, GameState, GameStatus, PlayerId, Position, RoutOutcome, Warband, Warrior, WarriorId,
};
use crate::strike::StrikeOrderEntry;

/// Envelope common to every screen.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewHeader {
    pub game: GameId,
    pub turn: u32,
    pub phase: Phase,
    pub current_player: PlayerId,
    /// Event kinds the engine will currently accept.
    pub legal: Vec<EventKind>,
}

/// Denormalized warrior data for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarriorView {
    pub id: WarriorId,
    pub name: String,
    pub status: GameStatus,
    pub wounds_remaining: u8,
    pub position: Option<Position>,
    pub hidden: bool,
    pub in_cover: bool,
    pub engaged_with: Vec<WarriorId>,
}

impl WarriorView {
    pub fn of(warrior: &Warrior) -> Self {
        Self {
            id: warrior.id,
            name: warrior.name.clone(),
            status: warrior.status,
            wounds_remaining: warrior.wounds_remaining,
            position: warrior.position,
            hidden: warrior.flags.contains(crate::state::TurnFlags::HIDDEN),
            in_cover: warrior.in_cover,
            engaged_with: warrior.engaged_with.iter().copied().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarbandView {
    pub name: String,
    pub out_of_action: u32,
    pub warriors: Vec<WarriorView>,
}

impl WarbandView {
    pub fn of(warband: &Warband) -> Self {
        Self {
            name: warband.name.clone(),
            out_of_action: warband.out_of_action_count,
            warriors: warband.warriors.iter().map(WarriorView::of).collect(),
        }
    }
}

/// The engine's output: one tagged command per screen kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewCommand {
    Setup {
        header: ViewHeader,
        warbands: [WarbandView; 2],
        /// Current player's warriors still awaiting deployment.
        unpositioned: Vec<WarriorId>,
    },
    Recovery {
        header: ViewHeader,
        warbands: [WarbandView; 2],
        recoverable: Vec<WarriorId>,
    },
    Movement {
        header: ViewHeader,
        warbands: [WarbandView; 2],
        movable: Vec<WarriorId>,
        selected: Option<WarriorId>,
        /// Enemies within charge reach of the selected warrior.
        charge_targets: Vec<WarriorId>,
    },
    Shooting {
        header: ViewHeader,
        warbands: [WarbandView; 2],
        shooters: Vec<WarriorId>,
    },
    ShootingTarget {
        header: ViewHeader,
        shooter: WarriorId,
        targets: Vec<WarriorId>,
    },
    ShootingConfirm {
        header: ViewHeader,
        shooter: WarriorId,
        target: WarriorId,
        /// Needed roll after all situational modifiers.
        needed: u8,
    },
    Combat {
        header: ViewHeader,
        warbands: [WarbandView; 2],
        striker: Option<StrikeOrderEntry>,
        /// Enemies the current striker may attack.
        targets: Vec<WarriorId>,
    },
    Resolution {
        header: ViewHeader,
        resolution: CombatResolution,
    },
    RoutTest {
        header: ViewHeader,
        player: PlayerId,
        leadership: u8,
    },
    RoutTestResult {
        header: ViewHeader,
        outcome: RoutOutcome,
    },
    GameOver {
        header: ViewHeader,
        winner: Option<PlayerId>,
    },
    Error {
        header: ViewHeader,
        message: String,
    },
}

impl ViewCommand {
    pub fn header(&self) -> &ViewHeader {
        match self {
            ViewCommand::Setup { header, .. }
            | ViewCommand::Recovery { header, .. }
            | ViewCommand::Movement { header, .. }
            | ViewCommand::Shooting { header, .. }
            | ViewCommand::ShootingTarget { header, .. }
            | ViewCommand::ShootingConfirm { header, .. }
            | ViewCommand::Combat { header, .. }
            | ViewCommand::Resolution { header, .. }
            | ViewCommand::RoutTest { header, .. }
            | ViewCommand::RoutTestResult { header, .. }
            | ViewCommand::GameOver { header, .. }
            | ViewCommand::Error { header, .. } => header,
        }
    }
}

/// Builds the envelope for the current state.
pub fn header(state: &GameState, legal: Vec<EventKind>) -> ViewHeader {
    ViewHeader {
        game: state.id,
        turn: state.turn,
        phase: state.phase,
        current_player: state.current_player,
        legal,
    }
}

pub fn warband_views(state: &GameState) -> [WarbandView; 2] {
    [
        WarbandView::of(state.warband(PlayerId::One)),
        WarbandView::of(state.warband(PlayerId::Two)),
    ]
}

/// The projector. Pure: identical inputs always yield an identical command.
pub fn project(state: &GameState, ctx: &SelectionContext, env: &Env<'_>) -> ViewCommand {
    if state.ended {
        return ViewCommand::GameOver {
            header: header(
                state,
                vec![EventKind::Undo, EventKind::RequestState],
            ),
            winner: state.winner,
        };
    }
    if let Some(resolution) = &state.pending_resolution {
        return ViewCommand::Resolution {
            header: header(
                state,
                vec![
                    EventKind::Acknowledge,
                    EventKind::Undo,
                    EventKind::RequestState,
                ],
            ),
            resolution: resolution.clone(),
        };
    }
    if let Some(rout) = &state.pending_rout {
        return match rout.outcome {
            Some(outcome) => ViewCommand::RoutTestResult {
                header: header(
                    state,
                    vec![
                        EventKind::Acknowledge,
                        EventKind::Undo,
                        EventKind::RequestState,
                    ],
                ),
                outcome,
            },
            None => ViewCommand::RoutTest {
                header: header(
                    state,
                    vec![
                        EventKind::ConfirmRoutTest,
                        EventKind::Undo,
                        EventKind::RequestState,
                    ],
                ),
                player: rout.player,
                leadership: state.warband(rout.player).rout_leadership(),
            },
        };
    }
    module_for(state.phase).build_screen(state, ctx, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{AttackOutcome, HitStage};
    use crate::config::GameConfig;
    use crate::env::testing::{FixtureCatalog, FixtureRules, ScriptedDice};
    use crate::state::{GameSetup, PendingRout, Profile, Warrior};

    fn state() -> GameState {
        let mk = |id: u32, name: &str| {
            Warrior::new(WarriorId(id), name, Profile::new(4, 3, 3, 3, 3, 1, 3, 1, 7))
        };
        GameState::from_setup(GameSetup {
            id: GameId(1),
            scenario: "ambush".into(),
            seed: 3,
            config: GameConfig::default(),
            warbands: [
                Warband::new("reds", vec![mk(0, "askel")]),
                Warband::new("blues", vec![mk(1, "carn")]),
            ],
        })
    }

    fn miss(attacker: WarriorId, defender: WarriorId) -> CombatResolution {
        CombatResolution {
            attacker,
            defender,
            ranged: false,
            weapon: "fists".into(),
            hit: HitStage {
                roll: 1,
                needed: 4,
                success: false,
            },
            parry: None,
            wound: None,
            critical: None,
            save: None,
            injury: None,
            wounds_caused: 0,
            outcome: AttackOutcome::Miss,
        }
    }

    #[test]
    fn identical_inputs_project_identical_commands() {
        let state = state();
        let ctx = SelectionContext::default();
        let dice = ScriptedDice::empty();
        let env = Env::new(&FixtureRules, &FixtureCatalog, &dice);

        let first = project(&state, &ctx, &env);
        let second = project(&state, &ctx, &env);
        assert_eq!(first, second);
        assert!(matches!(first, ViewCommand::Setup { .. }));
        assert_eq!(first.header().phase, Phase::Setup);
    }

    #[test]
    fn pending_resolution_overrides_the_phase_screen() {
        let mut state = state();
        let ctx = SelectionContext::default();
        let dice = ScriptedDice::empty();
        let env = Env::new(&FixtureRules, &FixtureCatalog, &dice);

        state.pending_resolution = Some(miss(WarriorId(0), WarriorId(1)));
        let screen = project(&state, &ctx, &env);
        let ViewCommand::Resolution { header, resolution } = screen else {
            panic!("expected the resolution modal");
        };
        assert_eq!(resolution.outcome, AttackOutcome::Miss);
        assert_eq!(
            header.legal,
            vec![
                EventKind::Acknowledge,
                EventKind::Undo,
                EventKind::RequestState
            ]
        );
    }

    #[test]
    fn pending_rout_locks_the_screen_to_the_test() {
        let mut state = state();
        let ctx = SelectionContext::default();
        let dice = ScriptedDice::empty();
        let env = Env::new(&FixtureRules, &FixtureCatalog, &dice);

        state.pending_rout = Some(PendingRout {
            player: PlayerId::Two,
            outcome: None,
        });
        let screen = project(&state, &ctx, &env);
        let ViewCommand::RoutTest {
            header,
            player,
            leadership,
        } = screen
        else {
            panic!("expected the rout test screen");
        };
        assert_eq!(player, PlayerId::Two);
        assert_eq!(leadership, 7);
        assert!(header.legal.contains(&EventKind::ConfirmRoutTest));
        assert!(!header.legal.contains(&EventKind::AdvancePhase));
    }

    #[test]
    fn an_ended_game_projects_game_over() {
        let mut state = state();
        let ctx = SelectionContext::default();
        let dice = ScriptedDice::empty();
        let env = Env::new(&FixtureRules, &FixtureCatalog, &dice);

        state.ended = true;
        state.winner = Some(PlayerId::One);
        let screen = project(&state, &ctx, &env);
        assert_eq!(
            screen,
            ViewCommand::GameOver {
                header: header(&state, vec![EventKind::Undo, EventKind::RequestState]),
                winner: Some(PlayerId::One),
            }
        );
    }
}
