//! Agent-owned timer queue for cooldowns and fuel recovery.
//!
//! Timers are plain data so that they travel inside snapshots and replay
//! deterministically. They only fire when [`TimerQueue::advance`] runs, which
//! the movement component does at the start of each tick.

use serde::{Deserialize, Serialize};

/// Slack applied when deciding whether a timer is due.
const DUE_EPSILON: f32 = 1e-5;

/// What to do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduledEvent {
    /// Reopen the ability gate and reset the active effect.
    EnableAbility,
    /// Add one fuel recovery quantum.
    RecoverFuel,
}

/// Identifies a scheduled timer for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TimerEntry {
    handle: TimerHandle,
    event: ScheduledEvent,
    remaining: f32,
    /// Re-arm interval; `None` for one-shot timers.
    repeat: Option<f32>,
}

/// Pending timers of one agent, in scheduling order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
    next_handle: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires `event` once after `delay` seconds.
    pub fn schedule_once(&mut self, event: ScheduledEvent, delay: f32) -> TimerHandle {
        self.push(event, delay, None)
    }

    /// Fires `event` every `interval` seconds until cancelled.
    pub fn schedule_repeating(&mut self, event: ScheduledEvent, interval: f32) -> TimerHandle {
        self.push(event, interval, Some(interval))
    }

    /// Cancels a timer. Returns `false` for an unknown or already elapsed handle.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Returns `true` if any timer will fire `event`.
    pub fn has_event(&self, event: ScheduledEvent) -> bool {
        self.entries.iter().any(|e| e.event == event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances every timer by `dt` and returns the events that came due.
    ///
    /// A repeating timer fires at most once per call.
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledEvent> {
        let mut fired = Vec::new();
        self.entries.retain_mut(|entry| {
            entry.remaining -= dt;
            if entry.remaining > DUE_EPSILON {
                return true;
            }
            fired.push(entry.event);
            match entry.repeat {
                Some(interval) => {
                    entry.remaining += interval;
                    true
                }
                None => false,
            }
        });
        fired
    }

    fn push(&mut self, event: ScheduledEvent, delay: f32, repeat: Option<f32>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.entries.push(TimerEntry {
            handle,
            event,
            remaining: delay.max(0.0),
            repeat: repeat.map(|interval| interval.max(DUE_EPSILON)),
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule_once(ScheduledEvent::EnableAbility, 1.0);
        assert!(timers.advance(0.5).is_empty());
        assert!(timers.is_pending(handle));
        assert_eq!(timers.advance(0.5), vec![ScheduledEvent::EnableAbility]);
        assert!(!timers.is_pending(handle));
        assert!(timers.advance(10.0).is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut timers = TimerQueue::new();
        timers.schedule_repeating(ScheduledEvent::RecoverFuel, 0.5);
        let mut count = 0;
        for _ in 0..8 {
            count += timers.advance(0.125).len();
        }
        assert_eq!(count, 2);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_unknown_is_noop() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule_once(ScheduledEvent::EnableAbility, 0.1);
        timers.advance(0.2);
        assert!(!timers.cancel(handle));

        let live = timers.schedule_repeating(ScheduledEvent::RecoverFuel, 0.1);
        assert!(timers.cancel(live));
        assert!(!timers.cancel(live));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_handles_are_unique() {
        let mut timers = TimerQueue::new();
        let a = timers.schedule_once(ScheduledEvent::EnableAbility, 1.0);
        let b = timers.schedule_once(ScheduledEvent::EnableAbility, 1.0);
        assert_ne!(a, b);
        timers.cancel(a);
        assert!(timers.is_pending(b));
        assert!(timers.has_event(ScheduledEvent::EnableAbility));
        assert!(!timers.has_event(ScheduledEvent::RecoverFuel));
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut timers = TimerQueue::new();
        timers.schedule_once(ScheduledEvent::EnableAbility, 0.0);
        assert_eq!(timers.advance(0.0), vec![ScheduledEvent::EnableAbility]);
    }
}
