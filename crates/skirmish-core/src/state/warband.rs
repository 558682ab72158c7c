//! Warband roster and morale bookkeeping.

use super::warrior::{GameStatus, Warrior, WarriorId};

/// A roster of warriors controlled by one player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warband {
    pub name: String,
    pub warriors: Vec<Warrior>,
    /// Preferred source of Leadership for rout tests. Falls back to the best
    /// Leadership still on the table when the leader is out of action.
    pub leader: Option<WarriorId>,
    /// Monotonic non-decreasing casualty counter.
    pub out_of_action_count: u32,
    pub rout_failed: bool,
    /// Turn number of the most recent rout test, so a warband is tested at
    /// most once per turn.
    pub last_rout_test_turn: Option<u32>,
}

impl Warband {
    pub fn new(name: impl Into<String>, warriors: Vec<Warrior>) -> Self {
        let leader = warriors
            .iter()
            .max_by_key(|w| (w.profile.leadership, std::cmp::Reverse(w.id)))
            .map(|w| w.id);
        Self {
            name: name.into(),
            warriors,
            leader,
            out_of_action_count: 0,
            rout_failed: false,
            last_rout_test_turn: None,
        }
    }

    pub fn warrior(&self, id: WarriorId) -> Option<&Warrior> {
        self.warriors.iter().find(|w| w.id == id)
    }

    pub fn warrior_mut(&mut self, id: WarriorId) -> Option<&mut Warrior> {
        self.warriors.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: WarriorId) -> bool {
        self.warriors.iter().any(|w| w.id == id)
    }

    pub fn roster_size(&self) -> u32 {
        self.warriors.len() as u32
    }

    /// Leadership used for rout tests: the designated leader while they are
    /// still in the fight, otherwise the best Leadership remaining.
    pub fn rout_leadership(&self) -> u8 {
        if let Some(leader) = self.leader.and_then(|id| self.warrior(id)) {
            if !leader.is_out_of_action() {
                return leader.profile.leadership;
            }
        }
        self.warriors
            .iter()
            .filter(|w| !w.is_out_of_action())
            .map(|w| w.profile.leadership)
            .max()
            .unwrap_or(0)
    }

    /// A rout test is forced once more than a quarter of the starting roster
    /// is out of action.
    pub fn rout_test_required(&self) -> bool {
        4 * self.out_of_action_count > self.roster_size()
    }

    /// True when no warrior remains able to fight on.
    pub fn is_wiped_out(&self) -> bool {
        self.warriors.iter().all(|w| w.is_out_of_action())
    }

    pub fn standing_count(&self) -> usize {
        self.warriors
            .iter()
            .filter(|w| w.status == GameStatus::Standing)
            .count()
    }
}
