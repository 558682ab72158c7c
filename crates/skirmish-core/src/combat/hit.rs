//! To-hit calculations.

use crate::env::RulesOracle;

/// Situational to-hit modifiers for a ranged attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitModifiers {
    pub cover: bool,
    pub long_range: bool,
    pub moved: bool,
    pub large_target: bool,
}

impl HitModifiers {
    /// Net bonus to the dice roll (negative makes the shot harder).
    fn bonus(&self) -> i8 {
        let mut bonus = 0i8;
        if self.cover {
            bonus -= 1;
        }
        if self.long_range {
            bonus -= 1;
        }
        if self.moved {
            bonus -= 1;
        }
        if self.large_target {
            bonus += 1;
        }
        bonus
    }
}

/// Clamp a needed roll into the legal [2, 6] window. A 1 always misses and
/// nothing is ever literally impossible to hit.
fn clamp_needed(needed: i8) -> u8 {
    needed.clamp(2, 6) as u8
}

/// Needed roll for a ranged attack: ballistic table, then situational
/// modifiers and the weapon's accuracy bonus.
pub fn ranged_needed(
    ballistic_skill: u8,
    modifiers: HitModifiers,
    accuracy: i8,
    rules: &dyn RulesOracle,
) -> u8 {
    let base = rules.ballistic_to_hit(ballistic_skill) as i8;
    clamp_needed(base - modifiers.bonus() - accuracy)
}

/// Needed roll for a melee attack: Weapon Skill against Weapon Skill, plus
/// the weapon's accuracy bonus.
pub fn melee_needed(
    attacker_ws: u8,
    defender_ws: u8,
    accuracy: i8,
    rules: &dyn RulesOracle,
) -> u8 {
    let base = rules.melee_to_hit(attacker_ws, defender_ws) as i8;
    clamp_needed(base - accuracy)
}
