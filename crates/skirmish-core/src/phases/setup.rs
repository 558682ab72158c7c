//! Setup phase: initial deployment.

use crate::context::SelectionContext;
use crate::engine::ValidationError;
use crate::env::Env;
use crate::event::{EventKind, EventPayload};
use crate::phases::{can_act, Phase, PhaseModule};
use crate::state::{GameState, Position, WarriorId};
use crate::view::{self, ViewCommand};

pub struct SetupPhase;

impl SetupPhase {
    /// Warriors of the current player still awaiting a position.
    fn unpositioned(state: &GameState) -> Vec<WarriorId> {
        state
            .warband(state.current_player)
            .warriors
            .iter()
            .filter(|w| can_act(w, Phase::Setup))
            .map(|w| w.id)
            .collect()
    }

    fn occupant_at(state: &GameState, position: Position) -> Option<WarriorId> {
        state
            .warbands
            .iter()
            .flat_map(|band| band.warriors.iter())
            .find(|w| w.position == Some(position))
            .map(|w| w.id)
    }
}

impl PhaseModule for SetupPhase {
    fn phase(&self) -> Phase {
        Phase::Setup
    }

    fn supported(&self) -> &'static [EventKind] {
        &[EventKind::PositionWarrior]
    }

    fn process(
        &self,
        payload: &EventPayload,
        state: &mut GameState,
        _env: &Env<'_>,
        ctx: &mut SelectionContext,
    ) -> Result<EventPayload, ValidationError> {
        let EventPayload::PositionWarrior { warrior, position } = payload else {
            return Err(ValidationError::EventNotLegalInPhase {
                kind: payload.kind(),
                phase: self.phase(),
            });
        };
        let warrior = *warrior;
        let position = *position;

        {
            let w = state
                .warrior(warrior)
                .ok_or(ValidationError::WarriorNotFound(warrior))?;
            if !can_act(w, Phase::Setup) {
                return Err(ValidationError::CannotActThisPhase { warrior });
            }
        }
        if let Some(occupant) = Self::occupant_at(state, position) {
            return Err(ValidationError::InvalidTarget { target: occupant });
        }

        let name = match state.warrior_mut(warrior) {
            Some(w) => {
                w.position = Some(position);
                w.name.clone()
            }
            None => return Err(ValidationError::WarriorNotFound(warrior)),
        };
        state.push_log(format!(
            "{name} deployed at ({}, {})",
            position.x, position.y
        ));
        ctx.clear();

        Ok(payload.clone())
    }

    fn build_screen(
        &self,
        state: &GameState,
        _ctx: &SelectionContext,
        _env: &Env<'_>,
    ) -> ViewCommand {
        ViewCommand::Setup {
            header: view::header(
                state,
                vec![
                    EventKind::SelectWarrior,
                    EventKind::DeselectWarrior,
                    EventKind::PositionWarrior,
                    EventKind::AdvancePhase,
                    EventKind::Undo,
                    EventKind::RequestState,
                ],
            ),
            warbands: view::warband_views(state),
            unpositioned: Self::unpositioned(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::env::testing::{FixtureCatalog, FixtureRules, ScriptedDice};
    use crate::state::{GameId, GameSetup, Profile, Warband, Warrior};

    fn state() -> GameState {
        let mk = |id: u32, name: &str| {
            Warrior::new(
                WarriorId(id),
                name,
                Profile::new(4, 3, 3, 3, 3, 1, 3, 1, 7),
            )
        };
        GameState::from_setup(GameSetup {
            id: GameId(1),
            scenario: "ambush".into(),
            seed: 3,
            config: GameConfig::default(),
            warbands: [
                Warband::new("reds", vec![mk(0, "askel"), mk(1, "brand")]),
                Warband::new("blues", vec![mk(2, "carn")]),
            ],
        })
    }

    #[test]
    fn positioning_deploys_and_rejects_occupied_squares() {
        let mut state = state();
        let dice = ScriptedDice::empty();
        let env = Env::new(&FixtureRules, &FixtureCatalog, &dice);
        let mut ctx = SelectionContext::default();

        let place = EventPayload::PositionWarrior {
            warrior: WarriorId(0),
            position: Position::new(2, 2),
        };
        SetupPhase
            .process(&place, &mut state, &env, &mut ctx)
            .unwrap();
        assert_eq!(
            state.warrior(WarriorId(0)).unwrap().position,
            Some(Position::new(2, 2))
        );

        // Same square again, different warrior.
        let clash = EventPayload::PositionWarrior {
            warrior: WarriorId(1),
            position: Position::new(2, 2),
        };
        let err = SetupPhase
            .process(&clash, &mut state, &env, &mut ctx)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTarget {
                target: WarriorId(0)
            }
        );

        // Re-deploying an already positioned warrior is rejected.
        let again = EventPayload::PositionWarrior {
            warrior: WarriorId(0),
            position: Position::new(3, 3),
        };
        let err = SetupPhase
            .process(&again, &mut state, &env, &mut ctx)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::CannotActThisPhase {
                warrior: WarriorId(0)
            }
        );
    }

    #[test]
    fn screen_lists_only_unpositioned_current_player_warriors() {
        let mut state = state();
        let dice = ScriptedDice::empty();
        let env = Env::new(&FixtureRules, &FixtureCatalog, &dice);
        state.warrior_mut(WarriorId(0)).unwrap().position = Some(Position::new(0, 0));

        let screen = SetupPhase.build_screen(&state, &SelectionContext::default(), &env);
        match screen {
            ViewCommand::Setup { unpositioned, .. } => {
                assert_eq!(unpositioned, vec![WarriorId(1)]);
            }
            other => panic!("unexpected screen: {other:?}"),
        }
    }
}
