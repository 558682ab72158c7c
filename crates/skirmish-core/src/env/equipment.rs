//! Oracle for the weapon and armor catalogs.
//!
//! Warriors carry opaque equipment handles; the catalog resolving them is
//! host-provided static data, not engine state.

bitflags::bitflags! {
    /// Special weapon rules the combat pipeline reacts to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct WeaponTraits: u8 {
        /// May contest the attacker's hit roll.
        const PARRY      = 1 << 0;
        /// Unmodified injury rolls of 2-4 become stunned.
        const CONCUSSION = 1 << 1;
    }
}

/// Opaque reference into the host's weapon catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponHandle(pub u16);

/// Opaque reference into the host's armor catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorHandle(pub u16);

/// Where a weapon's Strength comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponStrength {
    /// Wielder's Strength plus a modifier (melee weapons).
    OfWielder { bonus: i8 },
    /// Fixed Strength (missile weapons).
    Fixed(u8),
}

impl WeaponStrength {
    pub fn resolve(&self, wielder_strength: u8) -> u8 {
        match *self {
            WeaponStrength::OfWielder { bonus } => {
                (wielder_strength as i16 + bonus as i16).clamp(1, 10) as u8
            }
            WeaponStrength::Fixed(s) => s,
        }
    }
}

/// Catalog entry for one weapon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponProfile {
    pub name: String,
    /// Maximum range in inches; `None` for melee weapons.
    pub range: Option<u32>,
    pub strength: WeaponStrength,
    /// Extra armor save penalty on top of the strength-based one.
    pub armor_penalty: u8,
    /// To-hit bonus (e.g. an accuracy bonus on well-made pieces).
    pub accuracy: i8,
    pub traits: WeaponTraits,
}

impl WeaponProfile {
    /// Bare fists: wielder's Strength, no reach, no special rules.
    pub fn unarmed() -> Self {
        Self {
            name: "unarmed".into(),
            range: None,
            strength: WeaponStrength::OfWielder { bonus: 0 },
            armor_penalty: 0,
            accuracy: 0,
            traits: WeaponTraits::empty(),
        }
    }
}

/// Catalog entry for one piece of armor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmorProfile {
    pub name: String,
    /// Unmodified save roll this piece grants on its own (e.g. 6 for light
    /// armor). Shields instead improve the combined save by one.
    pub save: u8,
    pub shield: bool,
}

/// Oracle resolving equipment handles to catalog profiles.
pub trait EquipmentOracle: Send + Sync {
    fn weapon(&self, handle: WeaponHandle) -> Option<WeaponProfile>;
    fn armor(&self, handle: ArmorHandle) -> Option<ArmorProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wielder_strength_resolves_with_bonus() {
        let club = WeaponStrength::OfWielder { bonus: 1 };
        assert_eq!(club.resolve(3), 4);

        let bow = WeaponStrength::Fixed(3);
        assert_eq!(bow.resolve(5), 3);
    }
}
