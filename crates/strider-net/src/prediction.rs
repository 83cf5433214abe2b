//! Client-side prediction: moves are simulated locally as soon as they are
//! generated, and kept in a [`MoveBuffer`] with their predicted outcome until
//! the authority confirms or corrects them.

use std::collections::VecDeque;

use strider_movement::{
    AbilityState, CharacterMovement, EffectSink, MoveInput, MovementSolver, SavedMove,
};

use crate::wire::ClientMove;

/// Default maximum number of unacknowledged moves (~2 s at 60 Hz).
pub const DEFAULT_BUFFER_SIZE: usize = 128;

// ---------------------------------------------------------------------------
// BufferedMove
// ---------------------------------------------------------------------------

/// A move sent to the authority and the state it was predicted to produce.
#[derive(Debug, Clone)]
pub struct BufferedMove {
    pub tick: u64,
    pub dt: f32,
    pub input: MoveInput,
    pub saved: SavedMove,
    /// Local state after simulating this move.
    pub predicted: AbilityState,
}

impl BufferedMove {
    pub fn to_client_move(&self) -> ClientMove {
        ClientMove {
            tick: self.tick,
            dt: self.dt,
            input: self.input,
        }
    }
}

// ---------------------------------------------------------------------------
// MoveBuffer
// ---------------------------------------------------------------------------

/// Bounded queue of unacknowledged moves, ordered by tick.
pub struct MoveBuffer {
    entries: VecDeque<BufferedMove>,
    max_size: usize,
}

impl MoveBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Pushes a new move, evicting the oldest if at capacity.
    pub fn push(&mut self, entry: BufferedMove) {
        if self.entries.len() >= self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Drops every move with tick ≤ `tick`; the authority has processed them.
    pub fn discard_up_to(&mut self, tick: u64) {
        while self.entries.front().is_some_and(|e| e.tick <= tick) {
            self.entries.pop_front();
        }
    }

    pub fn find(&self, tick: u64) -> Option<&BufferedMove> {
        self.entries.iter().find(|e| e.tick == tick)
    }

    pub fn entries_after(&self, tick: u64) -> impl Iterator<Item = &BufferedMove> {
        self.entries.iter().filter(move |e| e.tick > tick)
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut BufferedMove> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &VecDeque<BufferedMove> {
        &self.entries
    }
}

impl Default for MoveBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

// ---------------------------------------------------------------------------
// predict_move
// ---------------------------------------------------------------------------

/// Simulates one client move immediately and buffers it.
///
/// The saved flags stay in the buffer for reconciliation; the returned
/// [`ClientMove`] carries only the input the authority simulates.
pub fn predict_move(
    movement: &mut CharacterMovement,
    tick: u64,
    input: MoveInput,
    dt: f32,
    solver: &mut dyn MovementSolver,
    effects: &mut dyn EffectSink,
    buffer: &mut MoveBuffer,
) -> ClientMove {
    let saved = movement.capture();
    movement.tick(&input, dt, solver, effects);
    let entry = BufferedMove {
        tick,
        dt,
        input,
        saved,
        predicted: movement.state().clone(),
    };
    let step = entry.to_client_move();
    buffer.push(entry);
    step
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use strider_movement::{AbilityRequest, MovementTuning, NetRole, TestArena};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn client() -> (CharacterMovement, TestArena) {
        let arena = TestArena::flat();
        let movement = CharacterMovement::new(
            Arc::new(MovementTuning::default()),
            NetRole::AutonomousProxy,
            Vec3::new(0.0, arena.stand_height(), 0.0),
        );
        (movement, arena)
    }

    fn walk_x() -> MoveInput {
        MoveInput {
            direction: Vec3::X,
            ..Default::default()
        }
    }

    #[test]
    fn test_local_move_applies_immediately() {
        let (mut movement, mut arena) = client();
        let mut buffer = MoveBuffer::default();
        let step = predict_move(
            &mut movement,
            1,
            walk_x(),
            DT,
            &mut arena,
            &mut (),
            &mut buffer,
        );
        assert_eq!(step.tick, 1);
        assert!(movement.kinematics().position.x > 0.0);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.find(1).unwrap().predicted, *movement.state());
    }

    #[test]
    fn test_saved_move_holds_flags_from_before_the_tick() {
        let (mut movement, mut arena) = client();
        let mut buffer = MoveBuffer::default();
        movement.set_jetpack(true, &mut Vec::<AbilityRequest>::new());
        let step = predict_move(
            &mut movement,
            1,
            MoveInput::default(),
            DT,
            &mut arena,
            &mut (),
            &mut buffer,
        );
        assert!(buffer.find(step.tick).unwrap().saved.flags.jetpack);
    }

    #[test]
    fn test_buffer_evicts_oldest_when_full() {
        let (mut movement, mut arena) = client();
        let mut buffer = MoveBuffer::new(4);
        for tick in 1..=6 {
            predict_move(
                &mut movement,
                tick,
                walk_x(),
                DT,
                &mut arena,
                &mut (),
                &mut buffer,
            );
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.entries().front().unwrap().tick, 3);
        assert!(buffer.find(2).is_none());
    }

    #[test]
    fn test_discard_and_entries_after() {
        let (mut movement, mut arena) = client();
        let mut buffer = MoveBuffer::default();
        for tick in 1..=5 {
            predict_move(
                &mut movement,
                tick,
                walk_x(),
                DT,
                &mut arena,
                &mut (),
                &mut buffer,
            );
        }
        let after: Vec<u64> = buffer.entries_after(3).map(|e| e.tick).collect();
        assert_eq!(after, vec![4, 5]);

        buffer.discard_up_to(3);
        assert_eq!(buffer.len(), 2);
        buffer.discard_up_to(10);
        assert!(buffer.is_empty());
    }
}
