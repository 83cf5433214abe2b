//! Movement modes: the base walk/fall states plus ability-driven custom modes.

use serde::{Deserialize, Serialize};

/// Raw custom sub-mode tag as it travels over the wire.
///
/// Kept as a plain byte so that a peer running a newer build can send a
/// sub-mode this build does not know; [`CustomMode::try_from`] decides
/// whether it is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomModeId(pub u8);

/// The custom sub-modes this build knows how to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CustomMode {
    /// One-shot forward relocation.
    Teleport = 0,
    /// Fuel-limited vertical thrust.
    Jetpack = 1,
    /// Time-limited run along an adjacent wall.
    WallRun = 2,
}

/// A custom sub-mode id with no matching [`CustomMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown custom movement mode {0}")]
pub struct UnknownCustomMode(pub u8);

impl TryFrom<CustomModeId> for CustomMode {
    type Error = UnknownCustomMode;

    fn try_from(id: CustomModeId) -> Result<Self, Self::Error> {
        match id.0 {
            0 => Ok(Self::Teleport),
            1 => Ok(Self::Jetpack),
            2 => Ok(Self::WallRun),
            other => Err(UnknownCustomMode(other)),
        }
    }
}

impl From<CustomMode> for CustomModeId {
    fn from(mode: CustomMode) -> Self {
        CustomModeId(mode as u8)
    }
}

/// The single active movement mode of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// On the ground, driven by input.
    Walking,
    /// Airborne under gravity.
    #[default]
    Falling,
    /// Ability physics, dispatched by sub-mode.
    Custom(CustomModeId),
}

impl MovementMode {
    /// Shorthand for `MovementMode::Custom(mode.into())`.
    pub fn custom(mode: CustomMode) -> Self {
        Self::Custom(mode.into())
    }

    /// Returns `true` if this is exactly the given custom sub-mode.
    pub fn is_custom(self, mode: CustomMode) -> bool {
        self == Self::custom(mode)
    }

    /// Returns the recognised custom sub-mode, if any.
    pub fn custom_mode(self) -> Option<CustomMode> {
        match self {
            Self::Custom(id) => CustomMode::try_from(id).ok(),
            _ => None,
        }
    }
}
