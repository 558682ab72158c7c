//! Injury roll.

/// Final fate of a warrior reduced to zero wounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InjuryResult {
    KnockedDown,
    Stunned,
    OutOfAction,
}

/// Resolve an injury roll: D6 plus any critical bonus; at most 2 knocks
/// down, 3-4 stuns, 5+ takes out of action. Concussion weapons remap an
/// unmodified 2-4 to stunned regardless of the bonus.
pub fn injury_result(roll: u8, bonus: u8, concussion: bool) -> InjuryResult {
    if concussion && (2..=4).contains(&roll) {
        return InjuryResult::Stunned;
    }
    match roll + bonus {
        0..=2 => InjuryResult::KnockedDown,
        3..=4 => InjuryResult::Stunned,
        _ => InjuryResult::OutOfAction,
    }
}
