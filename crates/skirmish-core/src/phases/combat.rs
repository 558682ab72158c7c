//! Combat phase: strike-ordered melee resolution.
//!
//! Both players' fighters strike during this one phase, walking the cached
//! [`StrikeOrder`]. Ownership of a melee event is therefore checked against
//! the order's cursor rather than against the phase's current player.

use crate::combat::{
    apply_resolution, armor_basis, resolve_attack, AttackKind, AttackerSpec, DefenderSpec,
    DicePlan,
};
use crate::context::SelectionContext;
use crate::engine::ValidationError;
use crate::env::{compute_seed, Env, WeaponProfile, WeaponTraits};
use crate::event::{EventKind, EventPayload};
use crate::phases::{Phase, PhaseModule};
use crate::state::{GameState, WarriorId};
use crate::strike::StrikeOrder;
use crate::view::{self, ViewCommand};

pub struct CombatPhase;

impl CombatPhase {
    /// The striker's best melee weapon, falling back to bare fists.
    fn melee_weapon(state: &GameState, warrior: WarriorId, env: &Env<'_>) -> WeaponProfile {
        state
            .warrior(warrior)
            .and_then(|w| w.melee_weapons.first().copied())
            .and_then(|h| env.equipment.weapon(h))
            .unwrap_or_else(WeaponProfile::unarmed)
    }

    fn can_parry(state: &GameState, defender: WarriorId, env: &Env<'_>) -> bool {
        state
            .warrior(defender)
            .map(|w| {
                w.is_standing()
                    && w.melee_weapons.iter().any(|h| {
                        env.equipment
                            .weapon(*h)
                            .is_some_and(|p| p.traits.contains(WeaponTraits::PARRY))
                    })
            })
            .unwrap_or(false)
    }
}

impl PhaseModule for CombatPhase {
    fn phase(&self) -> Phase {
        Phase::Combat
    }

    fn supported(&self) -> &'static [EventKind] {
        &[EventKind::ConfirmMelee]
    }

    fn process(
        &self,
        payload: &EventPayload,
        state: &mut GameState,
        env: &Env<'_>,
        ctx: &mut SelectionContext,
    ) -> Result<EventPayload, ValidationError> {
        let EventPayload::ConfirmMelee {
            attacker,
            defender,
            attempt_parry,
            rolls,
        } = payload
        else {
            return Err(ValidationError::EventNotLegalInPhase {
                kind: payload.kind(),
                phase: self.phase(),
            });
        };
        let (attacker, defender) = (*attacker, *defender);

        // Work on a copy of the order so a rejected event leaves the cursor
        // exactly where it was.
        let mut order = state
            .strike_order
            .clone()
            .ok_or(ValidationError::CannotActThisPhase { warrior: attacker })?;
        let current = order
            .advance(state)
            .ok_or(ValidationError::NoAttacksRemaining { warrior: attacker })?;
        if current.warrior != attacker {
            return Err(ValidationError::NotCurrentStriker { warrior: attacker });
        }

        let engaged = state
            .warrior(attacker)
            .ok_or(ValidationError::WarriorNotFound(attacker))?
            .engaged_with
            .contains(&defender);
        if !engaged {
            return Err(ValidationError::InvalidTarget { target: defender });
        }

        let (attacker_spec, defender_spec, names) = {
            let weapon = Self::melee_weapon(state, attacker, env);
            let a = state
                .warrior(attacker)
                .ok_or(ValidationError::WarriorNotFound(attacker))?;
            let d = state
                .warrior(defender)
                .ok_or(ValidationError::WarriorNotFound(defender))?;
            (
                AttackerSpec {
                    id: attacker,
                    weapon_skill: a.profile.weapon_skill,
                    ballistic_skill: a.profile.ballistic_skill,
                    strength: a.profile.strength,
                    weapon,
                },
                DefenderSpec {
                    id: defender,
                    weapon_skill: d.profile.weapon_skill,
                    toughness: d.profile.toughness,
                    wounds_remaining: d.wounds_remaining,
                    base_save: armor_basis(&d.armor, env.equipment),
                    parry_available: Self::can_parry(state, defender, env),
                },
                (a.name.clone(), d.name.clone()),
            )
        };

        let seed = compute_seed(
            state.seed,
            state.next_event_id().0,
            attacker.0,
            current.attacks_used as u32,
        );
        let mut plan = DicePlan::new(*rolls, env.dice, seed);
        let attempt = *attempt_parry || state.config.auto_parry;
        let resolution = resolve_attack(
            &attacker_spec,
            &defender_spec,
            AttackKind::Melee {
                attempt_parry: attempt,
            },
            env.rules,
            &mut plan,
        );
        let recorded = plan.into_rolls();

        order.note_attack();
        state.strike_order = Some(order);
        apply_resolution(state, &resolution);
        state.push_log(format!(
            "{} strikes {}: {}",
            names.0, names.1, resolution.outcome
        ));
        state.pending_resolution = Some(resolution);
        ctx.clear();

        Ok(EventPayload::ConfirmMelee {
            attacker,
            defender,
            attempt_parry: *attempt_parry,
            rolls: Some(recorded),
        })
    }

    fn build_screen(
        &self,
        state: &GameState,
        _ctx: &SelectionContext,
        _env: &Env<'_>,
    ) -> ViewCommand {
        let striker = state
            .strike_order
            .as_ref()
            .and_then(|order| order.peek(state));
        let targets = striker
            .and_then(|s| state.warrior(s.warrior))
            .map(|w| w.engaged_with.iter().copied().collect())
            .unwrap_or_default();
        let legal = if striker.is_some() {
            vec![
                EventKind::SelectTarget,
                EventKind::ConfirmMelee,
                EventKind::AdvancePhase,
                EventKind::Undo,
                EventKind::RequestState,
            ]
        } else {
            vec![
                EventKind::AdvancePhase,
                EventKind::Undo,
                EventKind::RequestState,
            ]
        };
        ViewCommand::Combat {
            header: view::header(state, legal),
            warbands: view::warband_views(state),
            striker,
            targets,
        }
    }

    fn on_enter(&self, state: &mut GameState) {
        state.strike_order = Some(StrikeOrder::build(state));
    }

    fn on_exit(&self, state: &mut GameState) {
        state.strike_order = None;
    }
}
