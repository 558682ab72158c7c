//! Shared oracle fixtures for in-crate tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{
    ArmorHandle, ArmorProfile, DiceOracle, EquipmentOracle, RulesOracle, WeaponHandle,
    WeaponProfile, WeaponStrength, WeaponTraits,
};

/// Rulebook tables as published.
pub struct FixtureRules;

impl RulesOracle for FixtureRules {
    fn ballistic_to_hit(&self, ballistic_skill: u8) -> u8 {
        7u8.saturating_sub(ballistic_skill.clamp(1, 6))
    }

    fn melee_to_hit(&self, attacker_ws: u8, defender_ws: u8) -> u8 {
        if attacker_ws > defender_ws {
            3
        } else if defender_ws > 2 * attacker_ws {
            5
        } else {
            4
        }
    }

    fn save_penalty(&self, strength: u8) -> u8 {
        strength.saturating_sub(3)
    }
}

/// Dice source that pops scripted D6 values in order, ignoring seeds.
/// Once the script runs out it keeps returning 1.
pub struct ScriptedDice {
    rolls: Mutex<VecDeque<u8>>,
}

impl ScriptedDice {
    pub fn new(rolls: &[u8]) -> Self {
        Self {
            rolls: Mutex::new(rolls.iter().copied().collect()),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

impl DiceOracle for ScriptedDice {
    fn next_u32(&self, _seed: u64) -> u32 {
        let mut rolls = self.rolls.lock().unwrap();
        match rolls.pop_front() {
            Some(v) => (v - 1) as u32,
            None => 0,
        }
    }
}

pub const SWORD: WeaponHandle = WeaponHandle(1);
pub const CLUB: WeaponHandle = WeaponHandle(2);
pub const BOW: WeaponHandle = WeaponHandle(3);
pub const LIGHT_ARMOR: ArmorHandle = ArmorHandle(10);
pub const SHIELD: ArmorHandle = ArmorHandle(11);

/// Minimal arsenal covering every special rule the pipeline reacts to.
pub struct FixtureCatalog;

impl EquipmentOracle for FixtureCatalog {
    fn weapon(&self, handle: WeaponHandle) -> Option<WeaponProfile> {
        match handle {
            SWORD => Some(WeaponProfile {
                name: "sword".into(),
                range: None,
                strength: WeaponStrength::OfWielder { bonus: 0 },
                armor_penalty: 0,
                accuracy: 0,
                traits: WeaponTraits::PARRY,
            }),
            CLUB => Some(WeaponProfile {
                name: "club".into(),
                range: None,
                strength: WeaponStrength::OfWielder { bonus: 0 },
                armor_penalty: 0,
                accuracy: 0,
                traits: WeaponTraits::CONCUSSION,
            }),
            BOW => Some(WeaponProfile {
                name: "bow".into(),
                range: Some(24),
                strength: WeaponStrength::Fixed(3),
                armor_penalty: 0,
                accuracy: 0,
                traits: WeaponTraits::empty(),
            }),
            _ => None,
        }
    }

    fn armor(&self, handle: ArmorHandle) -> Option<ArmorProfile> {
        match handle {
            LIGHT_ARMOR => Some(ArmorProfile {
                name: "light armor".into(),
                save: 6,
                shield: false,
            }),
            SHIELD => Some(ArmorProfile {
                name: "shield".into(),
                save: 6,
                shield: true,
            }),
            _ => None,
        }
    }
}
