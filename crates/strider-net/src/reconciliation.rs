//! Server reconciliation: corrects the client's prediction when the
//! authority's snapshot disagrees with what the client predicted for the same
//! tick.
//!
//! On a mismatch the client rewinds to the snapshot and replays every move
//! the authority has not processed yet, each with its saved ability flags.

use strider_movement::{AbilityState, CharacterMovement, MovementSnapshot, MovementSolver};
use tracing::{debug, warn};

use crate::prediction::MoveBuffer;

/// Outcome of one [`reconcile`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciliationResult {
    /// Whether the local state was rewound and replayed.
    pub corrected: bool,
    /// Distance between the predicted and authoritative positions at the
    /// snapshot tick, or zero when there was no prediction to compare.
    pub position_error: f32,
    /// Number of buffered moves re-simulated.
    pub replayed: usize,
}

/// Whether a predicted state agrees with the authoritative one.
///
/// Positions may differ by up to `tolerance` meters; ability state must match
/// exactly.
pub fn states_match(predicted: &AbilityState, server: &AbilityState, tolerance: f32) -> bool {
    let error = predicted
        .kinematics
        .position
        .distance(server.kinematics.position);
    error <= tolerance
        && predicted.mode == server.mode
        && predicted.flags == server.flags
        && predicted.gate == server.gate
        && predicted.fuel.fuel_over() == server.fuel.fuel_over()
}

/// Reconciles the local prediction against an authoritative snapshot.
///
/// 1. Finds the prediction for the snapshot's tick.
/// 2. Discards every move the authority has already processed.
/// 3. If the prediction matched, stops there.
/// 4. Otherwise restores the snapshot and replays the remaining moves.
///
/// Effects are not played again during the replay.
pub fn reconcile(
    snapshot: &MovementSnapshot,
    buffer: &mut MoveBuffer,
    movement: &mut CharacterMovement,
    solver: &mut dyn MovementSolver,
    tolerance: f32,
) -> ReconciliationResult {
    let (needs_correction, position_error) = match buffer.find(snapshot.tick) {
        Some(entry) => (
            !states_match(&entry.predicted, &snapshot.state, tolerance),
            entry
                .predicted
                .kinematics
                .position
                .distance(snapshot.state.kinematics.position),
        ),
        None => (true, 0.0),
    };

    buffer.discard_up_to(snapshot.tick);

    if !needs_correction {
        debug!(tick = snapshot.tick, "prediction confirmed");
        return ReconciliationResult {
            corrected: false,
            position_error,
            replayed: 0,
        };
    }

    let before = movement.kinematics().position;
    movement.restore(snapshot);
    let mut replayed = 0;
    for entry in buffer.entries_mut() {
        movement.replay(&entry.saved);
        movement.tick(&entry.input, entry.dt, solver, &mut ());
        entry.predicted = movement.state().clone();
        replayed += 1;
    }

    warn!(
        tick = snapshot.tick,
        position_error,
        replayed,
        shift = movement.kinematics().position.distance(before),
        mode = ?movement.mode(),
        "prediction corrected"
    );
    ReconciliationResult {
        corrected: true,
        position_error,
        replayed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
