//! Per-game configuration supplied by the hosting application.

/// Knobs fixed at game creation. Part of [`crate::state::GameSetup`], so a
/// replayed game always runs under the configuration it was created with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Hard turn limit; reaching it ends the game as a draw. `None` plays to
    /// rout or wipe-out.
    pub max_turns: Option<u32>,
    /// When a melee payload leaves the parry decision open, parry whenever
    /// the defender carries a parrying weapon.
    pub auto_parry: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            auto_parry: true,
        }
    }
}
