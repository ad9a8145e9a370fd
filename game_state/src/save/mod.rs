//! Whole-store save snapshots.
//!
//! The entire [`WorldState`] round-trips as one unit. Storage plumbing
//! (files, slots, cloud sync) lives outside this crate; restoring a
//! snapshot must leave every evaluator behaving identically, with no
//! special-casing, because they are pure functions of the restored state.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::world_state::WorldState;

/// Unique identifier for a play session, stamped on every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A serializable snapshot of one session's entire world state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub session: SessionId,
    pub world: WorldState,
}

impl SaveGame {
    /// Wrap a world state in a snapshot for the given session.
    pub fn new(session: SessionId, world: WorldState) -> Self {
        Self { session, world }
    }

    /// Encode the snapshot as JSON.
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a snapshot from JSON.
    pub fn from_json(raw: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(raw)?)
    }
}
