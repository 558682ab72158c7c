//! Wound chart.

/// Needed roll to wound for a Strength vs Toughness matchup.
///
/// `None` when the attack cannot wound at all (Toughness ahead by 3+).
pub fn wound_needed(strength: u8, toughness: u8) -> Option<u8> {
    let diff = strength as i16 - toughness as i16;
    match diff {
        d if d >= 2 => Some(2),
        1 => Some(3),
        0 => Some(4),
        -1 => Some(5),
        -2 => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_matches_rulebook() {
        assert_eq!(wound_needed(4, 3), Some(3));
        assert_eq!(wound_needed(3, 3), Some(4));
        assert_eq!(wound_needed(6, 3), Some(2));
        assert_eq!(wound_needed(3, 4), Some(5));
        assert_eq!(wound_needed(3, 5), Some(6));
        assert_eq!(wound_needed(3, 6), None);
    }
}
