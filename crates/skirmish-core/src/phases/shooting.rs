//! Shooting phase: missile attacks through the shared combat pipeline.

use crate::combat::{
    apply_resolution, armor_basis, ranged_needed, resolve_attack, AttackKind, AttackerSpec,
    DefenderSpec, DicePlan, HitModifiers,
};
use crate::context::SelectionContext;
use crate::engine::ValidationError;
use crate::env::{compute_seed, Env, WeaponProfile};
use crate::event::{EventKind, EventPayload};
use crate::phases::{can_act, Phase, PhaseModule};
use crate::state::{GameState, GameStatus, TurnFlags, Warrior, WarriorId};
use crate::view::{self, ViewCommand};

pub struct ShootingPhase;

impl ShootingPhase {
    fn shooters(state: &GameState) -> Vec<WarriorId> {
        state
            .warband(state.current_player)
            .warriors
            .iter()
            .filter(|w| can_act(w, Phase::Shooting))
            .map(|w| w.id)
            .collect()
    }

    /// The shooter's readied missile weapon. First carried handle wins; a
    /// handle the catalog cannot resolve is treated as no weapon at all.
    fn ranged_weapon(
        shooter: &Warrior,
        env: &Env<'_>,
    ) -> Result<WeaponProfile, ValidationError> {
        shooter
            .ranged_weapons
            .first()
            .and_then(|h| env.equipment.weapon(*h))
            .ok_or(ValidationError::NoRangedWeapon {
                warrior: shooter.id,
            })
    }

    fn target_legal(state: &GameState, shooter: WarriorId, target: &Warrior) -> bool {
        state.owner_of(target.id) != state.owner_of(shooter)
            && !matches!(target.status, GameStatus::OutOfAction)
            && !target.flags.contains(TurnFlags::HIDDEN)
            // No shooting into an ongoing melee.
            && !target.in_combat
            && target.position.is_some()
    }

    /// Enemies the shooter could legally fire at right now.
    pub(crate) fn shot_targets(
        state: &GameState,
        shooter: WarriorId,
        env: &Env<'_>,
    ) -> Vec<WarriorId> {
        let Some(w) = state.warrior(shooter) else {
            return Vec::new();
        };
        let (Some(from), Ok(weapon), Some(owner)) = (
            w.position,
            Self::ranged_weapon(w, env),
            state.owner_of(shooter),
        ) else {
            return Vec::new();
        };
        let range = weapon.range.unwrap_or(0) as i64;
        state
            .warband(owner.opponent())
            .warriors
            .iter()
            .filter(|t| {
                Self::target_legal(state, shooter, t)
                    && t.position
                        .is_some_and(|p| from.distance_sq(p) <= range * range)
            })
            .map(|t| t.id)
            .collect()
    }

    /// Situational modifiers for one specific shot.
    fn modifiers(shooter: &Warrior, target: &Warrior, weapon: &WeaponProfile) -> HitModifiers {
        let long_range = match (shooter.position, target.position, weapon.range) {
            (Some(from), Some(to), Some(range)) => {
                let half = range as i64 / 2;
                from.distance_sq(to) > half * half
            }
            _ => false,
        };
        HitModifiers {
            cover: target.in_cover,
            long_range,
            moved: shooter.flags.contains(TurnFlags::MOVED),
            large_target: target.large,
        }
    }
}

impl PhaseModule for ShootingPhase {
    fn phase(&self) -> Phase {
        Phase::Shooting
    }

    fn supported(&self) -> &'static [EventKind] {
        &[EventKind::ConfirmShoot]
    }

    fn process(
        &self,
        payload: &EventPayload,
        state: &mut GameState,
        env: &Env<'_>,
        ctx: &mut SelectionContext,
    ) -> Result<EventPayload, ValidationError> {
        let EventPayload::ConfirmShoot {
            shooter,
            target,
            rolls,
        } = payload
        else {
            return Err(ValidationError::EventNotLegalInPhase {
                kind: payload.kind(),
                phase: self.phase(),
            });
        };
        let (shooter, target) = (*shooter, *target);

        let (attacker_spec, defender_spec, modifiers, names) = {
            let s = state
                .warrior(shooter)
                .ok_or(ValidationError::WarriorNotFound(shooter))?;
            if !can_act(s, Phase::Shooting) {
                return Err(ValidationError::CannotActThisPhase { warrior: shooter });
            }
            let weapon = Self::ranged_weapon(s, env)?;
            let t = state
                .warrior(target)
                .ok_or(ValidationError::WarriorNotFound(target))?;
            if !Self::target_legal(state, shooter, t) {
                return Err(ValidationError::InvalidTarget { target });
            }
            let (from, to) = match (s.position, t.position) {
                (Some(from), Some(to)) => (from, to),
                _ => return Err(ValidationError::InvalidTarget { target }),
            };
            let range = weapon.range.unwrap_or(0) as i64;
            if from.distance_sq(to) > range * range {
                return Err(ValidationError::TargetOutOfRange { target });
            }

            let modifiers = Self::modifiers(s, t, &weapon);
            let attacker_spec = AttackerSpec {
                id: shooter,
                weapon_skill: s.profile.weapon_skill,
                ballistic_skill: s.profile.ballistic_skill,
                strength: s.profile.strength,
                weapon,
            };
            let defender_spec = DefenderSpec {
                id: target,
                weapon_skill: t.profile.weapon_skill,
                toughness: t.profile.toughness,
                wounds_remaining: t.wounds_remaining,
                base_save: armor_basis(&t.armor, env.equipment),
                parry_available: false,
            };
            (
                attacker_spec,
                defender_spec,
                modifiers,
                (s.name.clone(), t.name.clone()),
            )
        };

        let seed = compute_seed(state.seed, state.next_event_id().0, shooter.0, 0);
        let mut plan = DicePlan::new(*rolls, env.dice, seed);
        let resolution = resolve_attack(
            &attacker_spec,
            &defender_spec,
            AttackKind::Ranged(modifiers),
            env.rules,
            &mut plan,
        );
        let recorded = plan.into_rolls();

        if let Some(w) = state.warrior_mut(shooter) {
            w.flags.insert(TurnFlags::SHOT | TurnFlags::ACTED);
            // Loosing an arrow gives the position away.
            w.flags.remove(TurnFlags::HIDDEN);
        }
        apply_resolution(state, &resolution);
        state.push_log(format!(
            "{} shoots {}: {}",
            names.0, names.1, resolution.outcome
        ));
        state.pending_resolution = Some(resolution);
        ctx.clear();

        Ok(EventPayload::ConfirmShoot {
            shooter,
            target,
            rolls: Some(recorded),
        })
    }

    fn build_screen(
        &self,
        state: &GameState,
        ctx: &SelectionContext,
        env: &Env<'_>,
    ) -> ViewCommand {
        // Drill in as far as the selection goes: shooter picked, then target.
        if let Some(shooter) = ctx.selected {
            let targets = Self::shot_targets(state, shooter, env);
            if let Some(target) = ctx.target.filter(|t| targets.contains(t)) {
                let needed = match (state.warrior(shooter), state.warrior(target)) {
                    (Some(s), Some(t)) => match Self::ranged_weapon(s, env) {
                        Ok(weapon) => ranged_needed(
                            s.profile.ballistic_skill,
                            Self::modifiers(s, t, &weapon),
                            weapon.accuracy,
                            env.rules,
                        ),
                        Err(_) => 0,
                    },
                    _ => 0,
                };
                return ViewCommand::ShootingConfirm {
                    header: view::header(
                        state,
                        vec![
                            EventKind::DeselectWarrior,
                            EventKind::SelectTarget,
                            EventKind::ConfirmShoot,
                            EventKind::AdvancePhase,
                            EventKind::Undo,
                            EventKind::RequestState,
                        ],
                    ),
                    shooter,
                    target,
                    needed,
                };
            }
            return ViewCommand::ShootingTarget {
                header: view::header(
                    state,
                    vec![
                        EventKind::SelectWarrior,
                        EventKind::DeselectWarrior,
                        EventKind::SelectTarget,
                        EventKind::AdvancePhase,
                        EventKind::Undo,
                        EventKind::RequestState,
                    ],
                ),
                shooter,
                targets,
            };
        }
        ViewCommand::Shooting {
            header: view::header(
                state,
                vec![
                    EventKind::SelectWarrior,
                    EventKind::AdvancePhase,
                    EventKind::Undo,
                    EventKind::RequestState,
                ],
            ),
            warbands: view::warband_views(state),
            shooters: Self::shooters(state),
        }
    }
}
