//! Combat resolution pipeline.
//!
//! The shared dice-driven chain used by both shooting and melee:
//! to-hit → parry → wound → critical → armor save → injury. Every stage is a
//! pure function; [`resolve_attack`] strings them together and returns the
//! complete dice trail so replay never has to re-roll.

pub mod hit;
pub mod injury;
pub mod save;
pub mod wound;

mod result;

pub use hit::{melee_needed, ranged_needed, HitModifiers};
pub use injury::{injury_result, InjuryResult};
pub use result::{
    apply_resolution, resolve_attack, AttackKind, AttackOutcome, AttackerSpec, CombatResolution,
    CriticalStage, CriticalTier, DefenderSpec, DicePlan, HitStage, InjuryStage, ParryStage,
    SaveStage, WoundStage,
};
pub use save::{armor_basis, effective_save};
pub use wound::wound_needed;
