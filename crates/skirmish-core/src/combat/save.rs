//! Armor save calculation.

use crate::env::{ArmorHandle, EquipmentOracle};

/// Combined unmodified save granted by a warrior's armor.
///
/// Regular pieces stack by taking the best (lowest) save; any shield improves
/// the combined save by one, or grants a bare 6+ on its own.
pub fn armor_basis(armor: &[ArmorHandle], equipment: &dyn EquipmentOracle) -> Option<u8> {
    let mut best: Option<u8> = None;
    let mut shield = false;
    for handle in armor {
        let Some(piece) = equipment.armor(*handle) else {
            continue;
        };
        if piece.shield {
            shield = true;
        } else {
            best = Some(best.map_or(piece.save, |b| b.min(piece.save)));
        }
    }
    match (best, shield) {
        (Some(save), true) => Some(save.saturating_sub(1).max(2)),
        (Some(save), false) => Some(save),
        (None, true) => Some(6),
        (None, false) => None,
    }
}

/// Effective save after strength and weapon penalties.
///
/// The needed roll never improves past 2+. A save pushed exactly one point
/// past 6 stays resolvable on a 6; pushed further, no save is possible.
pub fn effective_save(base: u8, strength_penalty: u8, weapon_penalty: u8) -> Option<u8> {
    let raw = base as u16 + strength_penalty as u16 + weapon_penalty as u16;
    match raw {
        0..=6 => Some((raw as u8).max(2)),
        7 => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_point_overflow_stays_resolvable() {
        // Base 6+ against Strength 4 (penalty 1): still saves on 6.
        assert_eq!(effective_save(6, 1, 0), Some(6));
        // Two points of penalty push it out of reach.
        assert_eq!(effective_save(6, 2, 0), None);
        assert_eq!(effective_save(6, 1, 1), None);
    }

    #[test]
    fn save_never_improves_past_two() {
        assert_eq!(effective_save(1, 0, 0), Some(2));
        assert_eq!(effective_save(4, 1, 0), Some(5));
    }
}
