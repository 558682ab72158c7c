//! Event dispatcher.
//!
//! [`GameEngine::dispatch`] is the single entry point for mutating a game:
//! it validates the submitted event against the current state, routes it to
//! the owning phase module, appends the roll-enriched payload to the recorded
//! history, and hands back the freshly projected view. Everything a hosting
//! layer does flows through here, including replay: recorded events carry
//! their dice, so re-dispatching a history never re-rolls.

mod errors;
mod replay;

pub use errors::{EngineError, ReplayError, ValidationError};
pub use replay::{replay, undo_last_events, undo_to_event};

use crate::context::SelectionContext;
use crate::env::{compute_seed, Env};
use crate::event::{Event, EventKind, EventPayload, RoutRolls};
use crate::phases::{module_for, next_after, Phase};
use crate::state::{
    ActionRecord, GameState, PendingRout, PlayerId, RoutOutcome, WarriorSnapshot,
};
use crate::view::{self, ViewCommand};

pub struct GameEngine;

impl GameEngine {
    /// Validates and applies one event, returning the view to render next.
    ///
    /// On `Err` the state and history are untouched (undo aside, which
    /// rebuilds the state wholesale before it can fail).
    pub fn dispatch(
        state: &mut GameState,
        ctx: &mut SelectionContext,
        env: &Env<'_>,
        event: &Event,
    ) -> Result<ViewCommand, EngineError> {
        Self::apply(state, ctx, env, event)?;
        Ok(view::project(state, ctx, env))
    }

    fn apply(
        state: &mut GameState,
        ctx: &mut SelectionContext,
        env: &Env<'_>,
        event: &Event,
    ) -> Result<(), EngineError> {
        let payload = &event.payload;

        // State requests and undo stay available even after the game ends.
        match payload {
            EventPayload::RequestState => return Ok(()),
            EventPayload::Undo { to_event } => {
                undo_to_event(state, env, *to_event)?;
                ctx.clear();
                return Ok(());
            }
            _ => {}
        }

        if state.ended {
            return Err(ValidationError::GameEnded.into());
        }

        // Modal gates: a pending resolution or rout test blocks everything
        // except the event that clears it.
        if state.pending_resolution.is_some() && payload.kind() != EventKind::Acknowledge {
            return Err(ValidationError::ResolutionPending.into());
        }
        if let Some(rout) = &state.pending_rout {
            let allowed = match rout.outcome {
                None => payload.kind() == EventKind::ConfirmRoutTest,
                Some(_) => payload.kind() == EventKind::Acknowledge,
            };
            if !allowed {
                return Err(ValidationError::RoutTestPending.into());
            }
        }

        // Selection only touches the transient context.
        match payload {
            EventPayload::SelectWarrior { warrior } => {
                let owner = state
                    .owner_of(*warrior)
                    .ok_or(ValidationError::WarriorNotFound(*warrior))?;
                if owner != event.player {
                    return Err(ValidationError::NotOwned {
                        warrior: *warrior,
                        player: event.player,
                    }
                    .into());
                }
                ctx.selected = Some(*warrior);
                ctx.target = None;
                return Ok(());
            }
            EventPayload::DeselectWarrior => {
                ctx.clear();
                return Ok(());
            }
            EventPayload::SelectTarget { target } => {
                if state.warrior(*target).is_none() {
                    return Err(ValidationError::WarriorNotFound(*target).into());
                }
                ctx.target = Some(*target);
                return Ok(());
            }
            _ => {}
        }

        // Recorded dice arrive from peers and replayed histories; anything
        // that is not a D6 face is rejected before it can reach the rules.
        Self::check_recorded_dice(payload)?;

        // Everything past this point is recorded; ids must move forward.
        let last = state.last_event_id();
        if event.id <= last {
            return Err(ValidationError::StaleEventId {
                id: event.id,
                last,
            }
            .into());
        }

        // Pre-mutation snapshot of whoever the event is about, for the audit
        // trail.
        let subject = match payload {
            EventPayload::ConfirmShoot { target, .. } => Some(*target),
            EventPayload::ConfirmMelee { defender, .. } => Some(*defender),
            other => other.acting_warrior(),
        };
        let prior = subject
            .and_then(|id| state.warrior(id))
            .map(WarriorSnapshot::of);

        let recorded = match payload {
            EventPayload::Acknowledge => Self::acknowledge(state)?,
            EventPayload::ConfirmRoutTest { rolls } => {
                Self::confirm_rout(state, env, event.player, *rolls)?
            }
            EventPayload::AdvancePhase => Self::advance_phase(state, ctx, event.player)?,
            _ => {
                let kind = payload.kind();
                // Melee is exempt from the turn check: both players' fighters
                // strike during one combat phase, governed by the strike
                // order. Ownership of the attacker still holds.
                if let EventPayload::ConfirmMelee { attacker, .. } = payload {
                    let owner = state
                        .owner_of(*attacker)
                        .ok_or(ValidationError::WarriorNotFound(*attacker))?;
                    if owner != event.player {
                        return Err(ValidationError::NotOwned {
                            warrior: *attacker,
                            player: event.player,
                        }
                        .into());
                    }
                } else {
                    if event.player != state.current_player {
                        return Err(ValidationError::NotYourTurn {
                            player: event.player,
                            current: state.current_player,
                        }
                        .into());
                    }
                    if let Some(warrior) = payload.acting_warrior() {
                        let owner = state
                            .owner_of(warrior)
                            .ok_or(ValidationError::WarriorNotFound(warrior))?;
                        if owner != event.player {
                            return Err(ValidationError::NotOwned {
                                warrior,
                                player: event.player,
                            }
                            .into());
                        }
                    }
                }
                let module = module_for(state.phase);
                if !module.supported().contains(&kind) {
                    return Err(ValidationError::EventNotLegalInPhase {
                        kind,
                        phase: state.phase,
                    }
                    .into());
                }
                module.process(payload, state, env, ctx)?
            }
        };

        Self::record(state, event, prior, recorded);
        Self::check_game_end(state);
        Ok(())
    }

    fn check_recorded_dice(payload: &EventPayload) -> Result<(), ValidationError> {
        let bad = match payload {
            EventPayload::ConfirmShoot { rolls: Some(r), .. }
            | EventPayload::ConfirmMelee { rolls: Some(r), .. } => r.out_of_range(),
            EventPayload::Recover { rolls: Some(r), .. } => r.out_of_range(),
            EventPayload::ConfirmRoutTest { rolls: Some(r) } => r.out_of_range(),
            _ => None,
        };
        match bad {
            Some(value) => Err(ValidationError::DieOutOfRange { value }),
            None => Ok(()),
        }
    }

    fn acknowledge(state: &mut GameState) -> Result<EventPayload, ValidationError> {
        if state.pending_resolution.take().is_some() {
            return Ok(EventPayload::Acknowledge);
        }
        if let Some(rout) = &state.pending_rout {
            if let Some(outcome) = rout.outcome {
                let player = rout.player;
                state.pending_rout = None;
                if !outcome.passed {
                    state.warband_mut(player).rout_failed = true;
                    let name = state.warband(player).name.clone();
                    state.ended = true;
                    state.winner = Some(player.opponent());
                    state.push_log(format!("{name} rout from the field"));
                }
                return Ok(EventPayload::Acknowledge);
            }
        }
        Err(ValidationError::NothingToAcknowledge)
    }

    fn confirm_rout(
        state: &mut GameState,
        env: &Env<'_>,
        player: PlayerId,
        rolls: Option<RoutRolls>,
    ) -> Result<EventPayload, ValidationError> {
        let rout = state
            .pending_rout
            .as_ref()
            .ok_or(ValidationError::NoRoutTestPending)?;
        if rout.outcome.is_some() {
            return Err(ValidationError::NoRoutTestPending);
        }
        if rout.player != player {
            return Err(ValidationError::NotYourTurn {
                player,
                current: rout.player,
            });
        }

        let leadership = state.warband(player).rout_leadership();
        let dice = match rolls {
            Some(r) => r.dice,
            None => {
                let seed = compute_seed(
                    state.seed,
                    state.next_event_id().0,
                    player.index() as u32,
                    0,
                );
                env.dice.d6_pair(seed)
            }
        };
        let total = dice[0] + dice[1];
        let passed = total <= leadership;

        state.warband_mut(player).last_rout_test_turn = Some(state.turn);
        state.pending_rout = Some(PendingRout {
            player,
            outcome: Some(RoutOutcome {
                dice,
                leadership,
                passed,
            }),
        });
        let name = state.warband(player).name.clone();
        if passed {
            state.push_log(format!("{name} hold ({total} vs Ld {leadership})"));
        } else {
            state.push_log(format!("{name} break ({total} vs Ld {leadership})"));
        }

        Ok(EventPayload::ConfirmRoutTest {
            rolls: Some(RoutRolls { dice }),
        })
    }

    fn advance_phase(
        state: &mut GameState,
        ctx: &mut SelectionContext,
        player: PlayerId,
    ) -> Result<EventPayload, ValidationError> {
        if player != state.current_player {
            return Err(ValidationError::NotYourTurn {
                player,
                current: state.current_player,
            });
        }
        if state.phase == Phase::Setup
            && state
                .warband(state.current_player)
                .warriors
                .iter()
                .any(|w| w.position.is_none() && !w.is_out_of_action())
        {
            return Err(ValidationError::SetupIncomplete);
        }

        module_for(state.phase).on_exit(state);
        let (phase, next_player, turn) = next_after(state);
        state.phase = phase;
        state.current_player = next_player;
        state.turn = turn;
        ctx.clear();

        // Entering a recovery phase starts that warband's turn.
        if phase == Phase::Recovery {
            if let Some(limit) = state.config.max_turns {
                if turn > limit {
                    state.ended = true;
                    state.winner = None;
                    state.push_log(format!("turn limit {limit} reached, game drawn"));
                    return Ok(EventPayload::AdvancePhase);
                }
            }
            for warrior in &mut state.warband_mut(next_player).warriors {
                warrior.reset_turn_flags();
            }
            let band = state.warband(next_player);
            if band.rout_test_required()
                && !band.rout_failed
                && band.last_rout_test_turn != Some(turn)
            {
                state.pending_rout = Some(PendingRout {
                    player: next_player,
                    outcome: None,
                });
            }
        }

        module_for(state.phase).on_enter(state);
        state.push_log(format!("{next_player} begins the {phase} phase"));
        Ok(EventPayload::AdvancePhase)
    }

    /// Appends the enriched payload to history plus an audit record.
    fn record(
        state: &mut GameState,
        event: &Event,
        prior: Option<WarriorSnapshot>,
        recorded: EventPayload,
    ) {
        let dice = match &recorded {
            EventPayload::ConfirmShoot { rolls: Some(r), .. }
            | EventPayload::ConfirmMelee { rolls: Some(r), .. } => r.as_vec(),
            EventPayload::Recover { rolls: Some(r), .. } => r.dice.to_vec(),
            EventPayload::ConfirmRoutTest { rolls: Some(r) } => r.dice.to_vec(),
            _ => Vec::new(),
        };
        state.audit.push(ActionRecord {
            kind: recorded.kind(),
            actor: event.player,
            warband: event.player.index(),
            prior,
            dice,
            description: recorded.kind().to_string(),
        });
        state.history.push(Event::new(
            event.id,
            event.timestamp,
            event.player,
            recorded,
        ));
    }

    fn check_game_end(state: &mut GameState) {
        if state.ended {
            return;
        }
        let winner = if state.warbands[0].is_wiped_out() {
            Some(PlayerId::Two)
        } else if state.warbands[1].is_wiped_out() {
            Some(PlayerId::One)
        } else {
            return;
        };
        state.ended = true;
        state.winner = winner;
        if let Some(winner) = winner {
            state.push_log(format!("{winner} wins by wipe-out"));
        }
    }
}
