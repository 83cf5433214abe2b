//! Special movement abilities for a networked character controller.
//!
//! [`CharacterMovement`] owns one agent's state and runs a fixed-step tick:
//! scheduled events, base walking/falling or the active ability's physics,
//! then promotion of pending ability requests into custom movement modes.
//! Collision, effects and the request transport are injected through the
//! traits in [`collision`], [`effects`] and [`request`].

pub mod abilities;
pub mod arena;
pub mod base;
pub mod collision;
pub mod curve;
pub mod effects;
pub mod fuel;
pub mod gate;
pub mod kinematics;
pub mod mode;
pub mod movement;
pub mod prediction;
pub mod request;
pub mod state;
pub mod timers;
pub mod tuning;
pub mod wall;

pub use abilities::{Ability, AbilityContext};
pub use arena::TestArena;
pub use collision::{GeometryQuery, MoveOutcome, MovementSolver, SurfaceHit};
pub use curve::ResponseCurve;
pub use effects::{AbilityEffect, EffectLog, EffectSink};
pub use fuel::{FuelDrain, FuelPool, FuelRecovery};
pub use gate::AbilityGate;
pub use kinematics::{Kinematics, MoveInput, NetRole, SpeedModifiers};
pub use mode::{CustomMode, CustomModeId, MovementMode, UnknownCustomMode};
pub use movement::CharacterMovement;
pub use prediction::{MovementSnapshot, SavedMove};
pub use request::{AbilityKind, AbilityRequest, AbilityRequestFlags, AbilityRpcSink};
pub use state::{AbilityState, WallRunSession};
pub use timers::{ScheduledEvent, TimerHandle, TimerQueue};
pub use tuning::{MovementTuning, ThrustModel};
pub use wall::{HitResult, WallDetector, classify_hit_side};
