//! Oracle for the static rules tables.
//!
//! Characteristic charts live outside the engine; the pipeline only looks
//! needed values up here. Implementations provide the published to-hit charts
//! and strength-based armor penalties.

/// Oracle providing the rule-book lookup tables.
pub trait RulesOracle: Send + Sync {
    /// Needed roll for a ranged attack at the given Ballistic Skill, before
    /// situational modifiers.
    fn ballistic_to_hit(&self, ballistic_skill: u8) -> u8;

    /// Needed roll for a melee attack, Weapon Skill against Weapon Skill.
    fn melee_to_hit(&self, attacker_ws: u8, defender_ws: u8) -> u8;

    /// Armor save penalty inflicted by the given attacking Strength
    /// (0 = no penalty, 1 = save worsens by one, ...).
    fn save_penalty(&self, strength: u8) -> u8;

    /// Maximum run distance in inches for the given Movement.
    fn run_distance(&self, movement: u8) -> u32 {
        2 * movement as u32
    }

    /// Maximum charge distance in inches for the given Movement.
    fn charge_distance(&self, movement: u8) -> u32 {
        2 * movement as u32
    }
}
