//! In-game warrior representation.
//!
//! Warriors live in an id-indexed arena owned by their warband. All relations
//! between warriors (melee engagement) are stored as id sets rather than
//! object references, so snapshotting for undo is a plain structural clone.

use std::collections::BTreeSet;

use crate::env::{ArmorHandle, WeaponHandle};

/// Globally unique warrior identifier, assigned once at game creation.
///
/// Ids are allocated sequentially across both warbands and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarriorId(pub u32);

impl std::fmt::Display for WarriorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Tabletop position in inch units.
///
/// Distances are compared in squared units throughout the engine so range
/// checks stay integer-exact and replay-deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared distance to another position.
    pub fn distance_sq(&self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

/// Nine-characteristic profile (Movement, Weapon Skill, Ballistic Skill,
/// Strength, Toughness, Wounds, Initiative, Attacks, Leadership).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    pub movement: u8,
    pub weapon_skill: u8,
    pub ballistic_skill: u8,
    pub strength: u8,
    pub toughness: u8,
    pub wounds: u8,
    pub initiative: u8,
    pub attacks: u8,
    pub leadership: u8,
}

impl Profile {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(m: u8, ws: u8, bs: u8, s: u8, t: u8, w: u8, i: u8, a: u8, ld: u8) -> Self {
        Self {
            movement: m,
            weapon_skill: ws,
            ballistic_skill: bs,
            strength: s,
            toughness: t,
            wounds: w,
            initiative: i,
            attacks: a,
            leadership: ld,
        }
    }
}

/// A warrior's tabletop status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    Standing,
    KnockedDown,
    Stunned,
    OutOfAction,
    Fleeing,
}

bitflags::bitflags! {
    /// Per-turn bookkeeping flags, reset when a warband's turn begins.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u16 {
        const ACTED     = 1 << 0;
        const MOVED     = 1 << 1;
        const RUN       = 1 << 2;
        const SHOT      = 1 << 3;
        const CHARGED   = 1 << 4;
        const RECOVERED = 1 << 5;
        const HIDDEN    = 1 << 6;
        /// Stood up from knocked down this turn; strikes last in melee.
        const STOOD_UP  = 1 << 7;
    }
}

/// An individual combatant with profile, equipment, and in-game status.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warrior {
    pub id: WarriorId,
    pub name: String,
    pub profile: Profile,
    /// Large targets grant ranged attackers +1 to hit.
    pub large: bool,

    pub melee_weapons: Vec<WeaponHandle>,
    pub ranged_weapons: Vec<WeaponHandle>,
    pub armor: Vec<ArmorHandle>,

    pub status: GameStatus,
    pub wounds_remaining: u8,
    pub flags: TurnFlags,

    pub in_combat: bool,
    pub in_cover: bool,
    /// Enemy warriors this one is locked in melee with. Must stay symmetric:
    /// if A lists B then B lists A.
    pub engaged_with: BTreeSet<WarriorId>,

    /// `None` until deployed during the setup phase.
    pub position: Option<Position>,
}

impl Warrior {
    pub fn new(id: WarriorId, name: impl Into<String>, profile: Profile) -> Self {
        Self {
            id,
            name: name.into(),
            profile,
            large: false,
            melee_weapons: Vec::new(),
            ranged_weapons: Vec::new(),
            armor: Vec::new(),
            status: GameStatus::Standing,
            wounds_remaining: profile.wounds,
            flags: TurnFlags::empty(),
            in_combat: false,
            in_cover: false,
            engaged_with: BTreeSet::new(),
            position: None,
        }
    }

    pub fn with_melee_weapon(mut self, weapon: WeaponHandle) -> Self {
        self.melee_weapons.push(weapon);
        self
    }

    pub fn with_ranged_weapon(mut self, weapon: WeaponHandle) -> Self {
        self.ranged_weapons.push(weapon);
        self
    }

    pub fn with_armor(mut self, armor: ArmorHandle) -> Self {
        self.armor.push(armor);
        self
    }

    pub fn with_large(mut self) -> Self {
        self.large = true;
        self
    }

    pub fn is_standing(&self) -> bool {
        self.status == GameStatus::Standing
    }

    pub fn is_out_of_action(&self) -> bool {
        self.status == GameStatus::OutOfAction
    }

    /// Clears the per-turn flags at the start of the owning warband's turn.
    ///
    /// Hiding persists across turns until broken by running, charging, or
    /// shooting, so the HIDDEN bit survives the reset.
    pub fn reset_turn_flags(&mut self) {
        let hidden = self.flags.contains(TurnFlags::HIDDEN);
        self.flags = TurnFlags::empty();
        self.flags.set(TurnFlags::HIDDEN, hidden);
    }
}
