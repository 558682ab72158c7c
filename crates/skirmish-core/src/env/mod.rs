//! Traits describing read-only collaborators.
//!
//! Oracles expose the static rules tables, the equipment catalog, and the
//! dice source. The [`Env`] aggregate bundles them so the engine can reach
//! everything it needs without hard coupling to concrete implementations.

mod dice;
mod equipment;
mod rules;

#[cfg(test)]
pub mod testing;

pub use dice::{compute_seed, DiceOracle, PcgDice};
pub use equipment::{
    ArmorHandle, ArmorProfile, EquipmentOracle, WeaponHandle, WeaponProfile, WeaponStrength,
    WeaponTraits,
};
pub use rules::RulesOracle;

/// Aggregates the read-only oracles required by the dispatcher and pipeline.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    pub rules: &'a dyn RulesOracle,
    pub equipment: &'a dyn EquipmentOracle,
    pub dice: &'a dyn DiceOracle,
}

impl<'a> Env<'a> {
    pub fn new(
        rules: &'a dyn RulesOracle,
        equipment: &'a dyn EquipmentOracle,
        dice: &'a dyn DiceOracle,
    ) -> Self {
        Self {
            rules,
            equipment,
            dice,
        }
    }
}
