//! Cosmetic feedback reported by the abilities.

use serde::{Deserialize, Serialize};

/// Effect the presentation layer should be playing for an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Stop whatever is playing.
    #[default]
    None,
    Teleport,
    Jetpack,
    WallRun,
}

/// Receives effect changes. Repeats are filtered before reaching the sink.
pub trait EffectSink {
    fn play(&mut self, effect: AbilityEffect);
}

/// Discards effects; used for headless replay.
impl EffectSink for () {
    fn play(&mut self, _effect: AbilityEffect) {}
}

/// Records every effect in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectLog {
    pub played: Vec<AbilityEffect>,
}

impl EffectLog {
    pub fn last(&self) -> Option<AbilityEffect> {
        self.played.last().copied()
    }
}

impl EffectSink for EffectLog {
    fn play(&mut self, effect: AbilityEffect) {
        self.played.push(effect);
    }
}
