//! Strike order for simultaneous melee.
//!
//! Built once at combat-phase entry and cached on the state until phase exit.
//! Chargers strike first, warriors who stood up this turn strike last, and
//! everyone else goes in descending Initiative. Ties keep roster order
//! (warband one's slots ahead of warband two's), which makes the sort stable
//! and replay-deterministic.

use crate::state::{GameState, PlayerId, TurnFlags, WarriorId};

/// One fighter's slot in the resolution sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeOrderEntry {
    pub warrior: WarriorId,
    pub warband: PlayerId,
    pub initiative: u8,
    pub charged: bool,
    pub stood_up: bool,
    pub attacks: u8,
    pub attacks_used: u8,
}

impl StrikeOrderEntry {
    pub fn attacks_remaining(&self) -> u8 {
        self.attacks.saturating_sub(self.attacks_used)
    }
}

/// The cached resolution sequence for one combat phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeOrder {
    pub entries: Vec<StrikeOrderEntry>,
    /// Index of the fighter currently striking; earlier entries are spent.
    pub cursor: usize,
}

impl StrikeOrder {
    /// Builds the order from every standing warrior locked in melee.
    pub fn build(state: &GameState) -> Self {
        let mut entries: Vec<StrikeOrderEntry> = Vec::new();
        for player in [PlayerId::One, PlayerId::Two] {
            for warrior in &state.warband(player).warriors {
                if !warrior.is_standing() || !warrior.in_combat {
                    continue;
                }
                entries.push(StrikeOrderEntry {
                    warrior: warrior.id,
                    warband: player,
                    initiative: warrior.profile.initiative,
                    charged: warrior.flags.contains(TurnFlags::CHARGED),
                    stood_up: warrior.flags.contains(TurnFlags::STOOD_UP),
                    attacks: warrior.profile.attacks,
                    attacks_used: 0,
                });
            }
        }
        // Stable sort: roster order breaks ties inside each band.
        entries.sort_by_key(|e| (Self::band(e), std::cmp::Reverse(e.initiative)));
        Self { entries, cursor: 0 }
    }

    fn band(entry: &StrikeOrderEntry) -> u8 {
        if entry.charged {
            0
        } else if entry.stood_up {
            2
        } else {
            1
        }
    }

    fn still_eligible(entry: &StrikeOrderEntry, state: &GameState) -> bool {
        entry.attacks_remaining() > 0
            && state
                .warrior(entry.warrior)
                .map(|w| w.is_standing() && w.in_combat && !w.engaged_with.is_empty())
                .unwrap_or(false)
    }

    /// The next fighter due to strike, without touching the cursor.
    ///
    /// Spent and no-longer-eligible fighters (downed or disengaged since the
    /// order was built) are passed over.
    pub fn peek(&self, state: &GameState) -> Option<StrikeOrderEntry> {
        self.entries[self.cursor.min(self.entries.len())..]
            .iter()
            .find(|e| Self::still_eligible(e, state))
            .copied()
    }

    /// Advances the cursor to the next eligible fighter and returns it.
    pub fn advance(&mut self, state: &GameState) -> Option<StrikeOrderEntry> {
        while let Some(entry) = self.entries.get(self.cursor) {
            if Self::still_eligible(entry, state) {
                return Some(*entry);
            }
            self.cursor += 1;
        }
        None
    }

    /// Marks one attack spent for the fighter under the cursor.
    pub fn note_attack(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.attacks_used += 1;
        }
    }

    /// True once every eligible fighter has finished striking.
    pub fn is_exhausted(&self, state: &GameState) -> bool {
        self.peek(state).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::{GameId, GameSetup, GameStatus, Profile, Warband, Warrior};

    fn fighter(id: u32, initiative: u8) -> Warrior {
        let mut w = Warrior::new(
            WarriorId(id),
            format!("fighter {id}"),
            Profile::new(4, 3, 3, 3, 3, 1, initiative, 1, 7),
        );
        w.in_combat = true;
        w.engaged_with.insert(WarriorId(99));
        w
    }

    fn state_with(warriors_one: Vec<Warrior>, warriors_two: Vec<Warrior>) -> GameState {
        GameState::from_setup(GameSetup {
            id: GameId(1),
            scenario: "test".into(),
            seed: 0,
            config: GameConfig::default(),
            warbands: [
                Warband::new("one", warriors_one),
                Warband::new("two", warriors_two),
            ],
        })
    }

    #[test]
    fn chargers_first_stood_up_last_initiative_between() {
        let mut charger = fighter(0, 2);
        charger.flags.insert(TurnFlags::CHARGED);
        let mut riser = fighter(1, 6);
        riser.flags.insert(TurnFlags::STOOD_UP);
        let quick = fighter(2, 5);
        let slow = fighter(3, 3);

        let state = state_with(vec![charger, riser], vec![quick, slow]);
        let order = StrikeOrder::build(&state);
        let ids: Vec<u32> = order.entries.iter().map(|e| e.warrior.0).collect();

        // Charger leads despite the lowest initiative; the stood-up fighter
        // trails despite the highest.
        assert_eq!(ids, vec![0, 2, 3, 1]);
    }

    #[test]
    fn equal_initiative_keeps_roster_order() {
        let a = fighter(0, 4);
        let b = fighter(1, 4);
        let c = fighter(2, 4);
        let state = state_with(vec![a, b], vec![c]);
        let order = StrikeOrder::build(&state);
        let ids: Vec<u32> = order.entries.iter().map(|e| e.warrior.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn fighter_with_attacks_left_stays_current() {
        let mut brute = fighter(0, 4);
        brute.profile.attacks = 2;
        let other = fighter(2, 3);
        let mut state = state_with(vec![brute], vec![other]);
        state.engage(WarriorId(0), WarriorId(2));

        let mut order = StrikeOrder::build(&state);
        assert_eq!(order.advance(&state).map(|e| e.warrior), Some(WarriorId(0)));
        order.note_attack();
        assert_eq!(order.advance(&state).map(|e| e.warrior), Some(WarriorId(0)));
        order.note_attack();
        assert_eq!(order.advance(&state).map(|e| e.warrior), Some(WarriorId(2)));
    }

    #[test]
    fn downed_fighter_is_skipped_mid_sequence() {
        let first = fighter(0, 5);
        let second = fighter(2, 4);
        let mut state = state_with(vec![first], vec![second]);
        state.engage(WarriorId(0), WarriorId(2));

        let mut order = StrikeOrder::build(&state);
        assert_eq!(order.advance(&state).map(|e| e.warrior), Some(WarriorId(0)));
        order.note_attack();

        // The second fighter goes down before their slot arrives.
        state.warrior_mut(WarriorId(2)).unwrap().status = GameStatus::Stunned;
        assert_eq!(order.advance(&state), None);
    }
}
