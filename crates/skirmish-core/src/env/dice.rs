//! Dice oracle for deterministic random number generation.
//!
//! The engine never owns an RNG. Every roll flows through an injected
//! [`DiceOracle`] keyed by an explicit seed, so identical seeds always yield
//! identical dice. Recorded events carry their rolled results anyway; the
//! oracle only matters for the first resolution of a fresh event.

/// Dice oracle for deterministic draws.
///
/// Implementations must be pure: the same seed must always produce the same
/// value.
pub trait DiceOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a single D6 (1-6 inclusive).
    fn d6(&self, seed: u64) -> u8 {
        ((self.next_u32(seed) % 6) + 1) as u8
    }

    /// Roll 2D6 as two independent dice.
    fn d6_pair(&self, seed: u64) -> [u8; 2] {
        [self.d6(seed), self.d6(seed ^ 0xa5a5_a5a5_a5a5_a5a5)]
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output permuted from 64-bit LCG state. Small, fast,
/// branch-free, and statistically solid, which is all a D6 source needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgDice;

impl PcgDice {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl DiceOracle for PcgDice {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Compute a deterministic seed from game state components.
///
/// Combines the per-game base seed, the event sequence position, the acting
/// warrior, and a per-roll context index, so every independent roll in a game
/// gets its own seed. Mixing constants follow SplitMix64/FxHash.
pub fn compute_seed(game_seed: u64, sequence: u64, actor: u32, context: u32) -> u64 {
    let mut hash = game_seed;

    hash ^= sequence.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d6_stays_in_range_and_repeats() {
        let dice = PcgDice;
        for seed in 0..200u64 {
            let roll = dice.d6(seed);
            assert!((1..=6).contains(&roll));
            assert_eq!(roll, dice.d6(seed));
        }
    }

    #[test]
    fn seeds_differ_per_context() {
        let a = compute_seed(42, 3, 7, 0);
        let b = compute_seed(42, 3, 7, 1);
        let c = compute_seed(42, 4, 7, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
