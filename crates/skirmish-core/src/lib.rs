//! Deterministic turn engine for tabletop skirmish battles.
//!
//! `skirmish-core` defines the canonical rules: the phase state machine, the
//! shared combat-resolution pipeline, the strike order for simultaneous
//! melee, and the event-sourced undo/replay machinery. Everything here is
//! pure and synchronous; hosting concerns (async sessions, persistence,
//! transports) live in supporting crates that depend on the types re-exported
//! here. All state mutation flows through [`engine::GameEngine`].
pub mod combat;
pub mod config;
pub mod context;
pub mod engine;
pub mod env;
pub mod event;
pub mod phases;
pub mod state;
pub mod strike;
pub mod view;

pub use combat::{
    resolve_attack, AttackKind, AttackOutcome, AttackerSpec, CombatResolution, DefenderSpec,
    DicePlan, HitModifiers, InjuryResult,
};
pub use config::GameConfig;
pub use context::SelectionContext;
pub use engine::{
    replay, undo_last_events, undo_to_event, EngineError, GameEngine, ReplayError,
    ValidationError,
};
pub use env::{
    compute_seed, ArmorHandle, ArmorProfile, DiceOracle, Env, EquipmentOracle, PcgDice,
    RulesOracle, WeaponHandle, WeaponProfile, WeaponStrength, WeaponTraits,
};
pub use event::{
    AttackRolls, Event, EventId, EventKind, EventPayload, ModifierKind, RallyRolls, RoutRolls,
};
pub use phases::{can_act, module_for, Phase, PhaseModule};
pub use state::{
    GameId, GameSetup, GameState, GameStatus, PlayerId, Position, Profile, Warband, Warrior,
    WarriorId,
};
pub use strike::{StrikeOrder, StrikeOrderEntry};
pub use view::{project, ViewCommand, ViewHeader, WarbandView, WarriorView};
