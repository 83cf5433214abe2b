//! Client/authority plumbing for ability movement: the wire format, the
//! server-authoritative world, client-side prediction and reconciliation.

pub mod authority;
pub mod prediction;
pub mod reconciliation;
pub mod wire;

pub use authority::{
    AbilityCallError, AbilityCallValidator, AuthoritativeWorld, LastProcessedMove, PlayerId,
    ServerTickSchedule,
};
pub use prediction::{BufferedMove, MoveBuffer, predict_move};
pub use reconciliation::{ReconciliationResult, reconcile, states_match};
pub use wire::{AbilityUplink, ClientMessage, ClientMove, RpcChannel, ServerMessage, WireError};
