//! Attack resolution: the full pipeline and its dice trail.

use crate::env::{DiceOracle, RulesOracle, WeaponProfile, WeaponTraits};
use crate::event::AttackRolls;
use crate::state::{GameState, GameStatus, TurnFlags, WarriorId};

use super::hit::{melee_needed, ranged_needed, HitModifiers};
use super::injury::{injury_result, InjuryResult};
use super::save::effective_save;
use super::wound::wound_needed;

// Per-stage seed salts so one base seed yields independent dice.
const SALT_HIT: u64 = 0x68697421;
const SALT_PARRY: u64 = 0x70617272;
const SALT_WOUND: u64 = 0x776f756e;
const SALT_CRITICAL: u64 = 0x63726974;
const SALT_SAVE: u64 = 0x73617665;
const SALT_INJURY: u64 = 0x696e6a75;

/// Dice feed for one attack: recorded rolls replay verbatim, missing rolls
/// are drawn fresh from the oracle, and everything drawn is captured so the
/// dispatcher can record the complete trail into the event.
pub struct DicePlan<'a> {
    recorded: AttackRolls,
    dice: &'a dyn DiceOracle,
    seed: u64,
    drawn: AttackRolls,
}

impl<'a> DicePlan<'a> {
    pub fn new(recorded: Option<AttackRolls>, dice: &'a dyn DiceOracle, seed: u64) -> Self {
        Self {
            recorded: recorded.unwrap_or_default(),
            dice,
            seed,
            drawn: AttackRolls::default(),
        }
    }

    fn draw(&mut self, recorded: Option<u8>, salt: u64) -> u8 {
        recorded.unwrap_or_else(|| self.dice.d6(self.seed ^ salt))
    }

    fn hit(&mut self) -> u8 {
        let roll = self.draw(self.recorded.hit, SALT_HIT);
        self.drawn.hit = Some(roll);
        roll
    }

    fn parry(&mut self) -> u8 {
        let roll = self.draw(self.recorded.parry, SALT_PARRY);
        self.drawn.parry = Some(roll);
        roll
    }

    fn wound(&mut self) -> u8 {
        let roll = self.draw(self.recorded.wound, SALT_WOUND);
        self.drawn.wound = Some(roll);
        roll
    }

    fn critical(&mut self) -> u8 {
        let roll = self.draw(self.recorded.critical, SALT_CRITICAL);
        self.drawn.critical = Some(roll);
        roll
    }

    fn save(&mut self) -> u8 {
        let roll = self.draw(self.recorded.save, SALT_SAVE);
        self.drawn.save = Some(roll);
        roll
    }

    fn injury(&mut self) -> u8 {
        let roll = self.draw(self.recorded.injury, SALT_INJURY);
        self.drawn.injury = Some(roll);
        roll
    }

    /// Every roll actually made, for recording into the event payload.
    pub fn into_rolls(self) -> AttackRolls {
        self.drawn
    }
}

/// Attacker-side inputs to the pipeline.
#[derive(Clone, Debug)]
pub struct AttackerSpec {
    pub id: WarriorId,
    pub weapon_skill: u8,
    pub ballistic_skill: u8,
    pub strength: u8,
    pub weapon: WeaponProfile,
}

/// Defender-side inputs to the pipeline.
#[derive(Clone, Debug)]
pub struct DefenderSpec {
    pub id: WarriorId,
    pub weapon_skill: u8,
    pub toughness: u8,
    pub wounds_remaining: u8,
    /// Combined unmodified save from `save::armor_basis`, shield folded in.
    pub base_save: Option<u8>,
    pub parry_available: bool,
}

/// Which branch of the shared pipeline this attack takes.
#[derive(Clone, Copy, Debug)]
pub enum AttackKind {
    Ranged(HitModifiers),
    Melee { attempt_parry: bool },
}

/// Named terminal outcome of one attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttackOutcome {
    Miss,
    Parried,
    NoWound,
    Saved,
    /// Wounded but still on their feet (multi-wound profiles only).
    Wounded,
    KnockedDown,
    Stunned,
    OutOfAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitStage {
    pub roll: u8,
    pub needed: u8,
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParryStage {
    pub roll: u8,
    /// The hit roll being contested.
    pub against: u8,
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WoundStage {
    pub roll: u8,
    pub needed: u8,
    pub success: bool,
}

/// Critical hit tiers, selected by a D6 sub-roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CriticalTier {
    /// Two wounds, armor saves as normal.
    VitalPart,
    /// Two wounds, no armor save.
    ExposedSpot,
    /// Two wounds, no armor save, +2 on the injury roll.
    MasterStrike,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalStage {
    pub roll: u8,
    pub tier: CriticalTier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveStage {
    pub roll: u8,
    pub needed: u8,
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InjuryStage {
    pub roll: u8,
    pub bonus: u8,
    pub concussion: bool,
    pub result: InjuryResult,
}

/// Complete dice trail for one attack. Transient: shown in the resolution
/// modal, cleared on acknowledge, rebuilt by replay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatResolution {
    pub attacker: WarriorId,
    pub defender: WarriorId,
    pub ranged: bool,
    pub weapon: String,
    pub hit: HitStage,
    pub parry: Option<ParryStage>,
    pub wound: Option<WoundStage>,
    pub critical: Option<CriticalStage>,
    pub save: Option<SaveStage>,
    pub injury: Option<InjuryStage>,
    pub wounds_caused: u8,
    pub outcome: AttackOutcome,
}

/// Run the full pipeline. Each stage executes only if the prior stage's
/// outcome permits it; the returned trail records every roll made.
pub fn resolve_attack(
    attacker: &AttackerSpec,
    defender: &DefenderSpec,
    kind: AttackKind,
    rules: &dyn RulesOracle,
    plan: &mut DicePlan<'_>,
) -> CombatResolution {
    let accuracy = attacker.weapon.accuracy;
    let needed = match kind {
        AttackKind::Ranged(mods) => {
            ranged_needed(attacker.ballistic_skill, mods, accuracy, rules)
        }
        AttackKind::Melee { .. } => {
            melee_needed(attacker.weapon_skill, defender.weapon_skill, accuracy, rules)
        }
    };

    let hit_roll = plan.hit();
    let hit = HitStage {
        roll: hit_roll,
        needed,
        success: hit_roll >= needed,
    };
    let mut resolution = CombatResolution {
        attacker: attacker.id,
        defender: defender.id,
        ranged: matches!(kind, AttackKind::Ranged(_)),
        weapon: attacker.weapon.name.clone(),
        hit,
        parry: None,
        wound: None,
        critical: None,
        save: None,
        injury: None,
        wounds_caused: 0,
        outcome: AttackOutcome::Miss,
    };
    if !hit.success {
        return resolution;
    }

    // Parry: melee only, defender's choice, and never against a natural 6.
    if let AttackKind::Melee { attempt_parry } = kind {
        if attempt_parry && defender.parry_available && hit_roll < 6 {
            let roll = plan.parry();
            let success = roll > hit_roll;
            resolution.parry = Some(ParryStage {
                roll,
                against: hit_roll,
                success,
            });
            if success {
                resolution.outcome = AttackOutcome::Parried;
                return resolution;
            }
        }
    }

    // Wound.
    let strength = attacker.weapon.strength.resolve(attacker.strength);
    let Some(wound_need) = wound_needed(strength, defender.toughness) else {
        resolution.outcome = AttackOutcome::NoWound;
        return resolution;
    };
    let wound_roll = plan.wound();
    let wounded = wound_roll >= wound_need;
    resolution.wound = Some(WoundStage {
        roll: wound_roll,
        needed: wound_need,
        success: wounded,
    });
    if !wounded {
        resolution.outcome = AttackOutcome::NoWound;
        return resolution;
    }

    // Critical: a natural 6 that did not already require a 6.
    let mut injury_bonus = 0u8;
    let mut ignore_armor = false;
    let mut wounds_caused = 1u8;
    if wound_roll == 6 && wound_need < 6 {
        let crit_roll = plan.critical();
        let tier = match crit_roll {
            1..=2 => CriticalTier::VitalPart,
            3..=4 => CriticalTier::ExposedSpot,
            _ => CriticalTier::MasterStrike,
        };
        wounds_caused = 2;
        match tier {
            CriticalTier::VitalPart => {}
            CriticalTier::ExposedSpot => ignore_armor = true,
            CriticalTier::MasterStrike => {
                ignore_armor = true;
                injury_bonus = 2;
            }
        }
        resolution.critical = Some(CriticalStage {
            roll: crit_roll,
            tier,
        });
    }
    resolution.wounds_caused = wounds_caused;

    // Armor save.
    if !ignore_armor {
        if let Some(base) = defender.base_save {
            if let Some(save_need) =
                effective_save(base, rules.save_penalty(strength), attacker.weapon.armor_penalty)
            {
                let roll = plan.save();
                let success = roll >= save_need;
                resolution.save = Some(SaveStage {
                    roll,
                    needed: save_need,
                    success,
                });
                if success {
                    resolution.outcome = AttackOutcome::Saved;
                    resolution.wounds_caused = 0;
                    return resolution;
                }
            }
        }
    }

    // Injury only once the defender is out of wounds.
    if defender.wounds_remaining > wounds_caused {
        resolution.outcome = AttackOutcome::Wounded;
        return resolution;
    }
    let injury_roll = plan.injury();
    let concussion = attacker.weapon.traits.contains(WeaponTraits::CONCUSSION);
    let result = injury_result(injury_roll, injury_bonus, concussion);
    resolution.injury = Some(InjuryStage {
        roll: injury_roll,
        bonus: injury_bonus,
        concussion,
        result,
    });
    resolution.outcome = match result {
        InjuryResult::KnockedDown => AttackOutcome::KnockedDown,
        InjuryResult::Stunned => AttackOutcome::Stunned,
        InjuryResult::OutOfAction => AttackOutcome::OutOfAction,
    };
    resolution
}

/// Apply a resolved attack's consequences to the defender.
pub fn apply_resolution(state: &mut GameState, resolution: &CombatResolution) {
    let defender = resolution.defender;
    match resolution.outcome {
        AttackOutcome::Miss
        | AttackOutcome::Parried
        | AttackOutcome::NoWound
        | AttackOutcome::Saved => {}
        AttackOutcome::Wounded => {
            if let Some(w) = state.warrior_mut(defender) {
                w.wounds_remaining = w.wounds_remaining.saturating_sub(resolution.wounds_caused);
            }
        }
        AttackOutcome::KnockedDown => {
            if let Some(w) = state.warrior_mut(defender) {
                w.wounds_remaining = w.wounds_remaining.saturating_sub(resolution.wounds_caused);
                w.status = GameStatus::KnockedDown;
                w.flags.remove(TurnFlags::HIDDEN);
            }
        }
        AttackOutcome::Stunned => {
            if let Some(w) = state.warrior_mut(defender) {
                w.wounds_remaining = w.wounds_remaining.saturating_sub(resolution.wounds_caused);
                w.status = GameStatus::Stunned;
                w.flags.remove(TurnFlags::HIDDEN);
            }
        }
        AttackOutcome::OutOfAction => {
            state.take_out_of_action(defender);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::testing::{FixtureRules, ScriptedDice};
    use crate::env::WeaponStrength;

    fn attacker(weapon: WeaponProfile) -> AttackerSpec {
        AttackerSpec {
            id: WarriorId(0),
            weapon_skill: 3,
            ballistic_skill: 3,
            strength: 3,
            weapon,
        }
    }

    fn defender() -> DefenderSpec {
        DefenderSpec {
            id: WarriorId(1),
            weapon_skill: 3,
            toughness: 3,
            wounds_remaining: 1,
            base_save: None,
            parry_available: false,
        }
    }

    fn bow() -> WeaponProfile {
        WeaponProfile {
            name: "bow".into(),
            range: Some(24),
            strength: WeaponStrength::Fixed(3),
            armor_penalty: 0,
            accuracy: 0,
            traits: WeaponTraits::empty(),
        }
    }

    #[test]
    fn bs3_hits_on_four_misses_on_three() {
        let rolls = AttackRolls {
            hit: Some(4),
            wound: Some(1),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let res = resolve_attack(
            &attacker(bow()),
            &defender(),
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        assert!(res.hit.success);
        assert_eq!(res.hit.needed, 4);

        let rolls = AttackRolls {
            hit: Some(3),
            ..AttackRolls::default()
        };
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let res = resolve_attack(
            &attacker(bow()),
            &defender(),
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        assert_eq!(res.outcome, AttackOutcome::Miss);
        assert!(res.wound.is_none());
    }

    #[test]
    fn natural_six_cannot_be_parried() {
        let rolls = AttackRolls {
            hit: Some(6),
            wound: Some(2),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let mut def = defender();
        def.parry_available = true;
        let res = resolve_attack(
            &attacker(WeaponProfile::unarmed()),
            &def,
            AttackKind::Melee { attempt_parry: true },
            &FixtureRules,
            &mut plan,
        );
        assert!(res.parry.is_none());
        assert_eq!(res.outcome, AttackOutcome::NoWound);
    }

    #[test]
    fn parry_must_beat_the_hit_roll() {
        let rolls = AttackRolls {
            hit: Some(4),
            parry: Some(5),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let mut def = defender();
        def.parry_available = true;
        let res = resolve_attack(
            &attacker(WeaponProfile::unarmed()),
            &def,
            AttackKind::Melee { attempt_parry: true },
            &FixtureRules,
            &mut plan,
        );
        assert_eq!(res.outcome, AttackOutcome::Parried);

        // Matching the roll is not enough.
        let rolls = AttackRolls {
            hit: Some(4),
            parry: Some(4),
            wound: Some(1),
            ..AttackRolls::default()
        };
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let res = resolve_attack(
            &attacker(WeaponProfile::unarmed()),
            &def,
            AttackKind::Melee { attempt_parry: true },
            &FixtureRules,
            &mut plan,
        );
        assert_eq!(res.outcome, AttackOutcome::NoWound);
    }

    #[test]
    fn toughness_three_ahead_cannot_be_wounded() {
        let rolls = AttackRolls {
            hit: Some(6),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let mut def = defender();
        def.toughness = 6;
        let res = resolve_attack(
            &attacker(bow()),
            &def,
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        assert_eq!(res.outcome, AttackOutcome::NoWound);
        assert!(res.wound.is_none());
    }

    #[test]
    fn critical_exposed_spot_skips_the_save() {
        let rolls = AttackRolls {
            hit: Some(4),
            wound: Some(6),
            critical: Some(3),
            injury: Some(5),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let mut def = defender();
        def.base_save = Some(4);
        let res = resolve_attack(
            &attacker(bow()),
            &def,
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        assert_eq!(
            res.critical.map(|c| c.tier),
            Some(CriticalTier::ExposedSpot)
        );
        assert!(res.save.is_none());
        assert_eq!(res.wounds_caused, 2);
        assert_eq!(res.outcome, AttackOutcome::OutOfAction);
    }

    #[test]
    fn needed_six_cannot_go_critical() {
        // S3 vs T5 needs a 6; rolling it must not trigger the sub-roll.
        let rolls = AttackRolls {
            hit: Some(4),
            wound: Some(6),
            injury: Some(2),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let mut def = defender();
        def.toughness = 5;
        let res = resolve_attack(
            &attacker(bow()),
            &def,
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        assert!(res.critical.is_none());
        assert_eq!(res.outcome, AttackOutcome::KnockedDown);
    }

    #[test]
    fn multi_wound_defender_stays_standing() {
        let rolls = AttackRolls {
            hit: Some(4),
            wound: Some(4),
            ..AttackRolls::default()
        };
        let dice = ScriptedDice::empty();
        let mut plan = DicePlan::new(Some(rolls), &dice, 0);
        let mut def = defender();
        def.wounds_remaining = 2;
        let res = resolve_attack(
            &attacker(bow()),
            &def,
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        assert_eq!(res.outcome, AttackOutcome::Wounded);
        assert!(res.injury.is_none());
    }

    #[test]
    fn fresh_rolls_are_captured_for_recording() {
        let dice = ScriptedDice::new(&[4, 4, 5]);
        let mut plan = DicePlan::new(None, &dice, 99);
        let res = resolve_attack(
            &attacker(bow()),
            &defender(),
            AttackKind::Ranged(HitModifiers::default()),
            &FixtureRules,
            &mut plan,
        );
        let recorded = plan.into_rolls();
        assert_eq!(recorded.hit, Some(res.hit.roll));
        assert!(recorded.wound.is_some());
    }
}
