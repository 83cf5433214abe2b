//! Data captured for client-side prediction and server correction.

use serde::{Deserialize, Serialize};

use crate::request::AbilityRequestFlags;
use crate::state::AbilityState;

/// Ability flags as they were when a move was generated.
///
/// Replaying a saved move re-executes each ability with its saved flag, so a
/// replayed tick sees exactly the requests the first simulation saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedMove {
    pub flags: AbilityRequestFlags,
}

/// Full movement state of one agent at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSnapshot {
    pub tick: u64,
    pub state: AbilityState,
}
