//! Movement phase: walking, running, charging, hiding.

use crate::context::SelectionContext;
use crate::engine::ValidationError;
use crate::env::Env;
use crate::event::{EventKind, EventPayload, ModifierKind};
use crate::phases::{can_act, Phase, PhaseModule};
use crate::state::{GameState, GameStatus, Position, TurnFlags, WarriorId};
use crate::view::{self, ViewCommand};

pub struct MovementPhase;

impl MovementPhase {
    fn movable(state: &GameState) -> Vec<WarriorId> {
        state
            .warband(state.current_player)
            .warriors
            .iter()
            .filter(|w| can_act(w, Phase::Movement))
            .map(|w| w.id)
            .collect()
    }

    /// Enemies a positioned warrior could charge: visible, not yet out of the
    /// fight, and within charge reach.
    pub(crate) fn charge_targets(
        state: &GameState,
        warrior: WarriorId,
        env: &Env<'_>,
    ) -> Vec<WarriorId> {
        let Some(attacker) = state.warrior(warrior) else {
            return Vec::new();
        };
        let (Some(from), Some(owner)) = (attacker.position, state.owner_of(warrior)) else {
            return Vec::new();
        };
        let reach = env.rules.charge_distance(attacker.profile.movement) as i64;
        state
            .warband(owner.opponent())
            .warriors
            .iter()
            .filter(|t| {
                !matches!(t.status, GameStatus::OutOfAction | GameStatus::Fleeing)
                    && !t.flags.contains(TurnFlags::HIDDEN)
                    && t.position
                        .is_some_and(|p| from.distance_sq(p) <= reach * reach)
            })
            .map(|t| t.id)
            .collect()
    }

    /// Square for the charger to stop on: the one adjacent to the target on
    /// the line back toward the charger, or the nearest free neighbor when a
    /// previous charger already holds it. `None` when the target is boxed in
    /// on every side.
    fn contact_square(
        state: &GameState,
        warrior: WarriorId,
        from: Position,
        target: Position,
    ) -> Option<Position> {
        let free = |p: Position| {
            !state
                .warbands
                .iter()
                .flat_map(|band| band.warriors.iter())
                .any(|w| w.id != warrior && w.position == Some(p))
        };
        let step = |d: i32| d.signum();
        let direct = Position::new(
            target.x - step(target.x - from.x),
            target.y - step(target.y - from.y),
        );
        if direct == target {
            // Already on top of the target square; stay put.
            return Some(from);
        }
        if free(direct) {
            return Some(direct);
        }
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| (dx, dy) != (0, 0))
            .map(|(dx, dy)| Position::new(target.x + dx, target.y + dy))
            .filter(|&p| free(p))
            .min_by_key(|&p| from.distance_sq(p))
    }

    fn confirm_move(
        state: &mut GameState,
        env: &Env<'_>,
        warrior: WarriorId,
        to: Position,
        running: bool,
    ) -> Result<(), ValidationError> {
        let (from, movement, name) = {
            let w = state
                .warrior(warrior)
                .ok_or(ValidationError::WarriorNotFound(warrior))?;
            if !can_act(w, Phase::Movement) {
                return Err(ValidationError::CannotActThisPhase { warrior });
            }
            let from = w
                .position
                .ok_or(ValidationError::CannotActThisPhase { warrior })?;
            (from, w.profile.movement, w.name.clone())
        };

        let allowance = if running {
            env.rules.run_distance(movement) as i64
        } else {
            movement as i64
        };
        if from.distance_sq(to) > allowance * allowance {
            return Err(ValidationError::MoveTooFar { warrior });
        }
        if let Some(occupant) = state
            .warbands
            .iter()
            .flat_map(|band| band.warriors.iter())
            .find(|w| w.id != warrior && w.position == Some(to))
        {
            return Err(ValidationError::InvalidTarget {
                target: occupant.id,
            });
        }

        if let Some(w) = state.warrior_mut(warrior) {
            w.position = Some(to);
            w.flags.insert(TurnFlags::MOVED | TurnFlags::ACTED);
            if running {
                // Running breaks hiding.
                w.flags.insert(TurnFlags::RUN);
                w.flags.remove(TurnFlags::HIDDEN);
            }
        }
        let verb = if running { "runs" } else { "moves" };
        state.push_log(format!("{name} {verb} to ({}, {})", to.x, to.y));
        Ok(())
    }

    fn confirm_charge(
        state: &mut GameState,
        env: &Env<'_>,
        warrior: WarriorId,
        target: WarriorId,
    ) -> Result<(), ValidationError> {
        let (from, movement, name) = {
            let w = state
                .warrior(warrior)
                .ok_or(ValidationError::WarriorNotFound(warrior))?;
            if !can_act(w, Phase::Movement) {
                return Err(ValidationError::CannotActThisPhase { warrior });
            }
            let from = w
                .position
                .ok_or(ValidationError::CannotActThisPhase { warrior })?;
            (from, w.profile.movement, w.name.clone())
        };
        let (target_pos, target_name) = {
            let owner = state.owner_of(warrior);
            let t = state
                .warrior(target)
                .ok_or(ValidationError::WarriorNotFound(target))?;
            let enemy = state.owner_of(target) != owner;
            // Hidden and fleeing warriors cannot be singled out.
            if !enemy
                || matches!(t.status, GameStatus::OutOfAction | GameStatus::Fleeing)
                || t.flags.contains(TurnFlags::HIDDEN)
            {
                return Err(ValidationError::InvalidTarget { target });
            }
            let pos = t
                .position
                .ok_or(ValidationError::InvalidTarget { target })?;
            (pos, t.name.clone())
        };

        let reach = env.rules.charge_distance(movement) as i64;
        if from.distance_sq(target_pos) > reach * reach {
            return Err(ValidationError::TargetOutOfRange { target });
        }

        let contact = Self::contact_square(state, warrior, from, target_pos)
            .ok_or(ValidationError::NoRoomToCharge { target })?;
        if let Some(w) = state.warrior_mut(warrior) {
            w.position = Some(contact);
            w.flags
                .insert(TurnFlags::MOVED | TurnFlags::CHARGED | TurnFlags::ACTED);
            w.flags.remove(TurnFlags::HIDDEN);
        }
        state.engage(warrior, target);
        state.push_log(format!("{name} charges {target_name}"));
        Ok(())
    }

    fn toggle_modifier(
        state: &mut GameState,
        warrior: WarriorId,
        modifier: ModifierKind,
    ) -> Result<(), ValidationError> {
        let name = {
            let w = state
                .warrior(warrior)
                .ok_or(ValidationError::WarriorNotFound(warrior))?;
            if !w.is_standing() || w.in_combat {
                return Err(ValidationError::CannotActThisPhase { warrior });
            }
            // Running this turn rules hiding out.
            if modifier == ModifierKind::Hidden
                && !w.flags.contains(TurnFlags::HIDDEN)
                && w.flags.contains(TurnFlags::RUN)
            {
                return Err(ValidationError::CannotActThisPhase { warrior });
            }
            w.name.clone()
        };

        let text = match state.warrior_mut(warrior) {
            Some(w) => match modifier {
                ModifierKind::Hidden => {
                    w.flags.toggle(TurnFlags::HIDDEN);
                    if w.flags.contains(TurnFlags::HIDDEN) {
                        format!("{name} slips into hiding")
                    } else {
                        format!("{name} breaks from hiding")
                    }
                }
                ModifierKind::Cover => {
                    w.in_cover = !w.in_cover;
                    if w.in_cover {
                        format!("{name} takes cover")
                    } else {
                        format!("{name} leaves cover")
                    }
                }
            },
            None => return Err(ValidationError::WarriorNotFound(warrior)),
        };
        state.push_log(text);
        Ok(())
    }
}

impl PhaseModule for MovementPhase {
    fn phase(&self) -> Phase {
        Phase::Movement
    }

    fn supported(&self) -> &'static [EventKind] {
        &[
            EventKind::ConfirmMove,
            EventKind::ConfirmCharge,
            EventKind::ToggleModifier,
        ]
    }

    fn process(
        &self,
        payload: &EventPayload,
        state: &mut GameState,
        env: &Env<'_>,
        ctx: &mut SelectionContext,
    ) -> Result<EventPayload, ValidationError> {
        match payload {
            EventPayload::ConfirmMove {
                warrior,
                to,
                running,
            } => Self::confirm_move(state, env, *warrior, *to, *running)?,
            EventPayload::ConfirmCharge { warrior, target } => {
                Self::confirm_charge(state, env, *warrior, *target)?
            }
            EventPayload::ToggleModifier { warrior, modifier } => {
                Self::toggle_modifier(state, *warrior, *modifier)?
            }
            other => {
                return Err(ValidationError::EventNotLegalInPhase {
                    kind: other.kind(),
                    phase: self.phase(),
                })
            }
        }
        ctx.clear();
        Ok(payload.clone())
    }

    fn build_screen(
        &self,
        state: &GameState,
        ctx: &SelectionContext,
        env: &Env<'_>,
    ) -> ViewCommand {
        let charge_targets = ctx
            .selected
            .map(|w| Self::charge_targets(state, w, env))
            .unwrap_or_default();
        ViewCommand::Movement {
            header: view::header(
                state,
                vec![
                    EventKind::SelectWarrior,
                    EventKind::DeselectWarrior,
                    EventKind::ConfirmMove,
                    EventKind::ConfirmCharge,
                    EventKind::ToggleModifier,
                    EventKind::AdvancePhase,
                    EventKind::Undo,
                    EventKind::RequestState,
                ],
            ),
            warbands: view::warband_views(state),
            movable: Self::movable(state),
            selected: ctx.selected,
            charge_targets,
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
        let mk = |id: u32, name: &str, x: i32, y: i32| {
            let mut w = Warrior::new(
                WarriorId(id),
                name,
                Profile::new(4, 3, 3, 3, 3, 1, 3, 1, 7),
            );
            w.position = Some(Position::new(x, y));
            w
        };
        let mut state = GameState::from_setup(GameSetup {
            id: GameId(1),
            scenario: "ambush".into(),
            seed: 3,
            config: GameConfig::default(),
            warbands: [
                Warband::new("reds", vec![mk(0, "askel", 0, 0), mk(1, "brand", 0, 4)]),
                Warband::new("blues", vec![mk(2, "carn", 6, 0), mk(3, "dreg", 20, 20)]),
            ],
        });
        state.phase = Phase::Movement;
        state.turn = 1;
        state
    }

    fn env(dice: &ScriptedDice) -> Env<'_> {
        Env::new(&FixtureRules, &FixtureCatalog, dice)
    }

    #[test]
    fn walk_is_bounded_by_movement_and_run_by_double() {
        let mut state = state();
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        // M4 warrior: (0,0) -> (0,5) walking is too far.
        let too_far = EventPayload::ConfirmMove {
            warrior: WarriorId(0),
            to: Position::new(0, 5),
            running: false,
        };
        assert_eq!(
            MovementPhase
                .process(&too_far, &mut state, &env, &mut ctx)
                .unwrap_err(),
            ValidationError::MoveTooFar {
                warrior: WarriorId(0)
            }
        );

        // Running doubles the allowance.
        let run = EventPayload::ConfirmMove {
            warrior: WarriorId(0),
            to: Position::new(0, 5),
            running: true,
        };
        MovementPhase
            .process(&run, &mut state, &env, &mut ctx)
            .unwrap();
        let w = state.warrior(WarriorId(0)).unwrap();
        assert_eq!(w.position, Some(Position::new(0, 5)));
        assert!(w.flags.contains(TurnFlags::RUN));
    }

    #[test]
    fn running_breaks_hiding() {
        let mut state = state();
        state
            .warrior_mut(WarriorId(0))
            .unwrap()
            .flags
            .insert(TurnFlags::HIDDEN);
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        MovementPhase
            .process(
                &EventPayload::ConfirmMove {
                    warrior: WarriorId(0),
                    to: Position::new(0, 6),
                    running: true,
                },
                &mut state,
                &env,
                &mut ctx,
            )
            .unwrap();
        assert!(!state
            .warrior(WarriorId(0))
            .unwrap()
            .flags
            .contains(TurnFlags::HIDDEN));
    }

    #[test]
    fn charge_engages_both_sides_at_contact() {
        let mut state = state();
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        // M4 charge reach 8: (0,0) -> carn at (6,0).
        MovementPhase
            .process(
                &EventPayload::ConfirmCharge {
                    warrior: WarriorId(0),
                    target: WarriorId(2),
                },
                &mut state,
                &env,
                &mut ctx,
            )
            .unwrap();

        let attacker = state.warrior(WarriorId(0)).unwrap();
        assert_eq!(attacker.position, Some(Position::new(5, 0)));
        assert!(attacker.in_combat);
        assert!(attacker.flags.contains(TurnFlags::CHARGED));
        assert!(state.warrior(WarriorId(2)).unwrap().in_combat);
    }

    #[test]
    fn second_charger_takes_the_nearest_free_contact_square() {
        let mut state = state();
        // Both chargers on the same line toward carn at (6,0), so both would
        // want the (5,0) contact square.
        state.warrior_mut(WarriorId(1)).unwrap().position = Some(Position::new(-2, 0));
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        for charger in [WarriorId(0), WarriorId(1)] {
            MovementPhase
                .process(
                    &EventPayload::ConfirmCharge {
                        warrior: charger,
                        target: WarriorId(2),
                    },
                    &mut state,
                    &env,
                    &mut ctx,
                )
                .unwrap();
        }

        let first = state.warrior(WarriorId(0)).unwrap().position.unwrap();
        let second = state.warrior(WarriorId(1)).unwrap().position.unwrap();
        assert_eq!(first, Position::new(5, 0));
        assert_ne!(second, first);
        // Still in base contact with the target.
        assert!(second.distance_sq(Position::new(6, 0)) <= 2);
        assert!(state.warrior(WarriorId(1)).unwrap().in_combat);
    }

    #[test]
    fn charge_against_a_boxed_in_target_is_rejected() {
        let mk = |id: u32, name: &str, x: i32, y: i32| {
            let mut w = Warrior::new(
                WarriorId(id),
                name,
                Profile::new(4, 3, 3, 3, 3, 1, 3, 1, 7),
            );
            w.position = Some(Position::new(x, y));
            w
        };
        let mut reds = vec![mk(0, "askel", 0, 0)];
        // Every square around carn at (6,0) already holds a warrior.
        let mut id = 10;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx, dy) == (0, 0) {
                    continue;
                }
                reds.push(mk(id, "blocker", 6 + dx, dy));
                id += 1;
            }
        }
        let mut state = GameState::from_setup(GameSetup {
            id: GameId(1),
            scenario: "ambush".into(),
            seed: 3,
            config: GameConfig::default(),
            warbands: [
                Warband::new("reds", reds),
                Warband::new("blues", vec![mk(2, "carn", 6, 0)]),
            ],
        });
        state.phase = Phase::Movement;
        state.turn = 1;
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        assert_eq!(
            MovementPhase
                .process(
                    &EventPayload::ConfirmCharge {
                        warrior: WarriorId(0),
                        target: WarriorId(2),
                    },
                    &mut state,
                    &env,
                    &mut ctx,
                )
                .unwrap_err(),
            ValidationError::NoRoomToCharge {
                target: WarriorId(2)
            }
        );
        let charger = state.warrior(WarriorId(0)).unwrap();
        assert_eq!(charger.position, Some(Position::new(0, 0)));
        assert!(!charger.in_combat);
    }

    #[test]
    fn charge_out_of_reach_is_rejected() {
        let mut state = state();
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        assert_eq!(
            MovementPhase
                .process(
                    &EventPayload::ConfirmCharge {
                        warrior: WarriorId(0),
                        target: WarriorId(3),
                    },
                    &mut state,
                    &env,
                    &mut ctx,
                )
                .unwrap_err(),
            ValidationError::TargetOutOfRange {
                target: WarriorId(3)
            }
        );
    }

    #[test]
    fn hidden_enemies_are_not_chargeable() {
        let mut state = state();
        state
            .warrior_mut(WarriorId(2))
            .unwrap()
            .flags
            .insert(TurnFlags::HIDDEN);
        let dice = ScriptedDice::empty();
        let env = env(&dice);

        assert!(MovementPhase::charge_targets(&state, WarriorId(0), &env).is_empty());

        let mut ctx = SelectionContext::default();
        assert_eq!(
            MovementPhase
                .process(
                    &EventPayload::ConfirmCharge {
                        warrior: WarriorId(0),
                        target: WarriorId(2),
                    },
                    &mut state,
                    &env,
                    &mut ctx,
                )
                .unwrap_err(),
            ValidationError::InvalidTarget {
                target: WarriorId(2)
            }
        );
    }

    #[test]
    fn cover_toggle_flips_the_flag() {
        let mut state = state();
        let dice = ScriptedDice::empty();
        let env = env(&dice);
        let mut ctx = SelectionContext::default();

        let toggle = EventPayload::ToggleModifier {
            warrior: WarriorId(0),
            modifier: ModifierKind::Cover,
        };
        MovementPhase
            .process(&toggle, &mut state, &env, &mut ctx)
            .unwrap();
        assert!(state.warrior(WarriorId(0)).unwrap().in_cover);
        MovementPhase
            .process(&toggle, &mut state, &env, &mut ctx)
            .unwrap();
        assert!(!state.warrior(WarriorId(0)).unwrap().in_cover);
    }
}
