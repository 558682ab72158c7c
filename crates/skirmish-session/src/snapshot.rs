//! Saved games and peer resync verification.
//!
//! A [`SavedGame`] is the full transferable record of one game: the current
//! state plus the recorded history that produced it. Peers verify a received
//! snapshot by replaying the history over the embedded initial setup and
//! comparing fingerprints; a mismatch means the snapshot is corrupt or was
//! produced by diverging rules.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skirmish_core::{replay, Env, Event, GameState};

use crate::error::{Result, SessionError};

/// Complete transferable record of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedGame {
    pub state: GameState,
    /// Copy of the recorded history, kept alongside the state so a receiver
    /// can verify one against the other.
    pub history: Vec<Event>,
}

impl SavedGame {
    pub fn of(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            history: state.history.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Fingerprint of the carried state.
    pub fn fingerprint(&self) -> Result<String> {
        fingerprint(&self.state)
    }

    /// Replays the carried history from the embedded initial setup and checks
    /// that it lands on the carried state.
    ///
    /// Validation failures during the replay are determinism breaks and come
    /// back as [`SessionError::Engine`]; a clean replay that lands elsewhere
    /// is a [`SessionError::FingerprintMismatch`].
    pub fn verify(&self, env: &Env<'_>) -> Result<()> {
        let rebuilt = replay(self.state.initial.clone(), &self.history, env)
            .map_err(skirmish_core::EngineError::from)?;
        let expected = self.fingerprint()?;
        let actual = fingerprint(&rebuilt)?;
        if expected != actual {
            return Err(SessionError::FingerprintMismatch { expected, actual });
        }
        Ok(())
    }
}

/// SHA-256 over the bincode encoding of a state, hex-truncated for logging
/// and comparison. Transient fields (the pending resolution modal) are
/// excluded by the state's own serialization rules.
pub fn fingerprint(state: &GameState) -> Result<String> {
    let bytes = bincode::serialize(state)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(&digest[..16]))
}
