//! Ability request flags and the client → authority request message.

use serde::{Deserialize, Serialize};

use crate::mode::CustomMode;

/// The three special abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Teleport,
    Jetpack,
    WallRun,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 3] = [Self::Teleport, Self::Jetpack, Self::WallRun];

    /// Custom movement sub-mode driven by this ability.
    pub fn mode(self) -> CustomMode {
        match self {
            Self::Teleport => CustomMode::Teleport,
            Self::Jetpack => CustomMode::Jetpack,
            Self::WallRun => CustomMode::WallRun,
        }
    }
}

/// Requested-ability flags. Only ability `exec` implementations write them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AbilityRequestFlags {
    pub teleport: bool,
    pub jetpack: bool,
    pub wall_run: bool,
}

impl AbilityRequestFlags {
    pub fn get(&self, kind: AbilityKind) -> bool {
        match kind {
            AbilityKind::Teleport => self.teleport,
            AbilityKind::Jetpack => self.jetpack,
            AbilityKind::WallRun => self.wall_run,
        }
    }

    pub fn set(&mut self, kind: AbilityKind, active: bool) {
        match kind {
            AbilityKind::Teleport => self.teleport = active,
            AbilityKind::Jetpack => self.jetpack = active,
            AbilityKind::WallRun => self.wall_run = active,
        }
    }

    /// Number of raised flags.
    pub fn count(&self) -> usize {
        AbilityKind::ALL.iter().filter(|k| self.get(**k)).count()
    }
}

/// `RequestTeleport(bool)` / `RequestJetpack(bool)` / `RequestWallRun(bool)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRequest {
    pub kind: AbilityKind,
    pub active: bool,
}

/// Outbound channel for ability requests from a predicting client.
pub trait AbilityRpcSink {
    fn send(&mut self, request: AbilityRequest);
}

impl AbilityRpcSink for Vec<AbilityRequest> {
    fn send(&mut self, request: AbilityRequest) {
        self.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_get_set() {
        let mut flags = AbilityRequestFlags::default();
        assert_eq!(flags.count(), 0);
        flags.set(AbilityKind::WallRun, true);
        assert!(flags.get(AbilityKind::WallRun));
        assert!(!flags.get(AbilityKind::Jetpack));
        assert_eq!(flags.count(), 1);
    }

    #[test]
    fn test_request_json_roundtrip() {
        let request = AbilityRequest {
            kind: AbilityKind::Jetpack,
            active: true,
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: AbilityRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
