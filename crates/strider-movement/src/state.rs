//! Everything that makes up one agent's replicated ability state.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::effects::{AbilityEffect, EffectSink};
use crate::fuel::{FuelPool, FuelRecovery};
use crate::gate::AbilityGate;
use crate::kinematics::Kinematics;
use crate::mode::{CustomMode, MovementMode};
use crate::request::AbilityRequestFlags;
use crate::timers::{ScheduledEvent, TimerHandle, TimerQueue};
use crate::tuning::MovementTuning;

/// Per-activation wall-run bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WallRunSession {
    /// Seconds spent in the wall-run mode.
    pub elapsed: f32,
    /// Seconds the request has been held before the mode engaged.
    pub hold_elapsed: f32,
    /// A wall was found on the last step.
    pub running_on_wall: bool,
    /// Sign of the last classified hit side. Survives [`reset`](Self::reset).
    pub last_hit_side: f32,
}

impl WallRunSession {
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.hold_elapsed = 0.0;
        self.running_on_wall = false;
    }
}

/// Mutable per-agent state driven by the movement tick.
///
/// Plain data: cloning it is how snapshots are taken and restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    pub kinematics: Kinematics,
    pub mode: MovementMode,
    pub flags: AbilityRequestFlags,
    pub gate: AbilityGate,
    pub fuel: FuelPool,
    pub wall_run: WallRunSession,
    /// Accumulated thrust time sampled by the curve thrust model.
    pub jetpack_elapsed: f32,
    pub timers: TimerQueue,
    pub recovery_timer: Option<TimerHandle>,
    /// Last effect reported to the effect sink.
    pub active_effect: AbilityEffect,
}

impl AbilityState {
    pub fn new(tuning: &MovementTuning, kinematics: Kinematics) -> Self {
        Self {
            kinematics,
            mode: MovementMode::default(),
            flags: AbilityRequestFlags::default(),
            gate: AbilityGate::default(),
            fuel: FuelPool::new(&tuning.fuel),
            wall_run: WallRunSession::default(),
            jetpack_elapsed: 0.0,
            timers: TimerQueue::new(),
            recovery_timer: None,
            active_effect: AbilityEffect::None,
        }
    }

    /// Switches mode, stopping the effect of a continuous ability being left.
    pub fn set_movement_mode(&mut self, mode: MovementMode, effects: &mut dyn EffectSink) {
        if self.mode == mode {
            return;
        }
        let leaving_continuous = self.mode.is_custom(CustomMode::Jetpack)
            || self.mode.is_custom(CustomMode::WallRun);
        trace!(from = ?self.mode, to = ?mode, "movement mode change");
        self.mode = mode;
        if leaving_continuous {
            self.play_effect(AbilityEffect::None, effects);
        }
    }

    /// Reports `effect` unless it is already playing.
    pub fn play_effect(&mut self, effect: AbilityEffect, effects: &mut dyn EffectSink) {
        if self.active_effect != effect {
            self.active_effect = effect;
            effects.play(effect);
        }
    }

    /// Reopens the gate and stops the current effect.
    pub fn enable_ability(&mut self, effects: &mut dyn EffectSink) {
        self.gate.open();
        self.play_effect(AbilityEffect::None, effects);
    }

    /// Starts the repeating recovery timer unless running or already full.
    pub fn start_fuel_recovery(&mut self) {
        if self.recovery_timer.is_some() || self.fuel.is_full() {
            return;
        }
        let interval = self.fuel.recover_interval();
        self.recovery_timer = Some(
            self.timers
                .schedule_repeating(ScheduledEvent::RecoverFuel, interval),
        );
    }

    pub fn stop_fuel_recovery(&mut self) {
        if let Some(handle) = self.recovery_timer.take() {
            self.timers.cancel(handle);
        }
    }

    /// Runs a fired timer event.
    pub fn fire(&mut self, event: ScheduledEvent, effects: &mut dyn EffectSink) {
        match event {
            ScheduledEvent::EnableAbility => self.enable_ability(effects),
            ScheduledEvent::RecoverFuel => {
                if self.fuel.recover_tick() == FuelRecovery::Full {
                    self.stop_fuel_recovery();
                }
            }
        }
    }

    /// Advances the agent's timers and runs whatever came due.
    pub fn run_timers(&mut self, dt: f32, effects: &mut dyn EffectSink) {
        for event in self.timers.advance(dt) {
            self.fire(event, effects);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectLog;

    fn state() -> AbilityState {
        AbilityState::new(&MovementTuning::default(), Kinematics::default())
    }

    #[test]
    fn test_leaving_jetpack_stops_effect() {
        let mut state = state();
        let mut log = EffectLog::default();
        state.set_movement_mode(MovementMode::custom(CustomMode::Jetpack), &mut log);
        state.play_effect(AbilityEffect::Jetpack, &mut log);
        state.play_effect(AbilityEffect::Jetpack, &mut log);
        state.set_movement_mode(MovementMode::Falling, &mut log);
        assert_eq!(log.played, vec![AbilityEffect::Jetpack, AbilityEffect::None]);
    }

    #[test]
    fn test_leaving_teleport_keeps_effect() {
        let mut state = state();
        let mut log = EffectLog::default();
        state.set_movement_mode(MovementMode::custom(CustomMode::Teleport), &mut log);
        state.play_effect(AbilityEffect::Teleport, &mut log);
        state.set_movement_mode(MovementMode::Walking, &mut log);
        assert_eq!(log.last(), Some(AbilityEffect::Teleport));
    }

    #[test]
    fn test_enable_ability_timer_reopens_gate() {
        let mut state = state();
        let mut log = EffectLog::default();
        state.gate.close();
        state
            .timers
            .schedule_once(ScheduledEvent::EnableAbility, 0.5);
        state.run_timers(0.25, &mut log);
        assert!(!state.gate.is_open());
        state.run_timers(0.25, &mut log);
        assert!(state.gate.is_open());
    }

    #[test]
    fn test_recovery_skipped_when_full() {
        let mut state = state();
        state.start_fuel_recovery();
        assert!(state.recovery_timer.is_none());
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_recovery_stops_when_full() {
        let mut state = state();
        let mut log = EffectLog::default();
        state.fuel.consume(0.5);
        state.start_fuel_recovery();
        assert!(state.recovery_timer.is_some());
        for _ in 0..8 {
            state.run_timers(0.125, &mut log);
        }
        assert!(state.fuel.is_full());
        assert!(state.recovery_timer.is_none());
        assert!(!state.timers.has_event(ScheduledEvent::RecoverFuel));
    }
}
