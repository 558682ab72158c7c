//! Transient per-client selection context.
//!
//! Selection is view-navigation state, not game state: it feeds the projector
//! and the dispatcher's selection events, is cleared on phase changes and
//! undo, and is never part of the recorded history.

use crate::state::WarriorId;

/// What the acting client currently has picked out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionContext {
    pub selected: Option<WarriorId>,
    pub target: Option<WarriorId>,
}

impl SelectionContext {
    pub fn clear(&mut self) {
        *self = SelectionContext::default();
    }
}
