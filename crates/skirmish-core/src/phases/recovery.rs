//! Recovery phase: rallying fleeing warriors and getting downed ones up.

use crate::context::SelectionContext;
use crate::engine::ValidationError;
use crate::env::{compute_seed, Env};
use crate::event::{EventKind, EventPayload, RallyRolls};
use crate::phases::{can_act, Phase, PhaseModule};
use crate::state::{GameState, GameStatus, TurnFlags, WarriorId};
use crate::view::{self, ViewCommand};

pub struct RecoveryPhase;

impl RecoveryPhase {
    fn recoverable(state: &GameState) -> Vec<WarriorId> {
        state
            .warband(state.current_player)
            .warriors
            .iter()
            .filter(|w| can_act(w, Phase::Recovery))
            .map(|w| w.id)
            .collect()
    }
}

impl PhaseModule for RecoveryPhase {
    fn phase(&self) -> Phase {
        Phase::Recovery
    }

    fn supported(&self) -> &'static [EventKind] {
        &[EventKind::Recover]
    }

    fn process(
        &self,
        payload: &EventPayload,
        state: &mut GameState,
        env: &Env<'_>,
        ctx: &mut SelectionContext,
    ) -> Result<EventPayload, ValidationError> {
        let EventPayload::Recover { warrior, rolls } = payload else {
            return Err(ValidationError::EventNotLegalInPhase {
                kind: payload.kind(),
                phase: self.phase(),
            });
        };
        let warrior = *warrior;

        let (status, leadership, name) = {
            let w = state
                .warrior(warrior)
                .ok_or(ValidationError::WarriorNotFound(warrior))?;
            if !can_act(w, Phase::Recovery) {
                return Err(ValidationError::CannotActThisPhase { warrior });
            }
            (w.status, w.profile.leadership, w.name.clone())
        };

        let recorded = match status {
            // Fleeing warriors rally on 2D6 against Leadership.
            GameStatus::Fleeing => {
                let dice = match rolls {
                    Some(r) => r.dice,
                    None => {
                        let seed =
                            compute_seed(state.seed, state.next_event_id().0, warrior.0, 0);
                        env.dice.d6_pair(seed)
                    }
                };
                let total = dice[0] + dice[1];
                let passed = total <= leadership;
                if let Some(w) = state.warrior_mut(warrior) {
                    if passed {
                        w.status = GameStatus::Standing;
                    }
                    w.flags.insert(TurnFlags::RECOVERED);
                }
                if passed {
                    state.push_log(format!("{name} rallies ({total} vs Ld {leadership})"));
                } else {
                    state.push_log(format!(
                        "{name} keeps fleeing ({total} vs Ld {leadership})"
                    ));
                }
                Some(RallyRolls { dice })
            }
            // Stunned warriors only manage to roll over, knocked down.
            GameStatus::Stunned => {
                if let Some(w) = state.warrior_mut(warrior) {
                    w.status = GameStatus::KnockedDown;
                    w.flags.insert(TurnFlags::RECOVERED);
                }
                state.push_log(format!("{name} comes to, still down"));
                None
            }
            // Knocked down warriors stand up but strike last this turn.
            GameStatus::KnockedDown => {
                if let Some(w) = state.warrior_mut(warrior) {
                    w.status = GameStatus::Standing;
                    w.flags.insert(TurnFlags::RECOVERED | TurnFlags::STOOD_UP);
                }
                state.push_log(format!("{name} stands back up"));
                None
            }
            _ => return Err(ValidationError::CannotActThisPhase { warrior }),
        };
        ctx.clear();

        Ok(EventPayload::Recover {
            warrior,
            rolls: recorded,
        })
    }

    fn build_screen(
        &self,
        state: &GameState,
        _ctx: &SelectionContext,
        _env: &Env<'_>,
    ) -> ViewCommand {
        ViewCommand::Recovery {
            header: view::header(
                state,
                vec![
                    EventKind::SelectWarrior,
                    EventKind::DeselectWarrior,
                    EventKind::Recover,
                    EventKind::AdvancePhase,
                    EventKind::Undo,
                    EventKind::RequestState,
                ],
            ),
            warbands: view::warband_views(state),
            recoverable: Self::recoverable(state),
        }
    }
}
