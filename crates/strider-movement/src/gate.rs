//! Global mutual exclusion between special abilities.

use serde::{Deserialize, Serialize};

/// Single-owner lock: at most one special ability may own the agent's input.
///
/// Teleport and wall-run keep the gate closed for their whole active span;
/// jetpack only while thrusting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityGate {
    open: bool,
}

impl AbilityGate {
    /// Returns `true` if a new ability may be activated.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// An ability became the exclusive owner of input.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Other abilities may now be requested.
    pub fn open(&mut self) {
        self.open = true;
    }
}

impl Default for AbilityGate {
    fn default() -> Self {
        Self { open: true }
    }
}
