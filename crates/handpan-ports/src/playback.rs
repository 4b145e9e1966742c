use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_loop_enabled() -> bool {
    true
}

fn default_repeats() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_loop_enabled")]
    pub loop_enabled: bool,
    /// Repeat count for steps without a local override.
    #[serde(default = "default_repeats")]
    pub default_repeats: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            loop_enabled: true,
            default_repeats: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteTriggered {
    pub label: String,
    pub at: AudioTime,
}

/// Body hit committed to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercussionTriggered {
    pub hand: PercussionHand,
    pub ghost: bool,
    pub at: AudioTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepAdvanced {
    pub step_index: usize,
    pub label: String,
    pub at: AudioTime,
    pub repeats: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PlaybackNotice {
    NoteTriggered(NoteTriggered),
    PercussionTriggered(PercussionTriggered),
    StepAdvanced(StepAdvanced),
    Stopped,
}

/// Scheduling-time notifications. Called synchronously while a batch is
/// committed, so timestamps lie in the future.
pub trait PlaybackObserver: Send + Sync {
    fn on_note_triggered(&self, _note: &NoteTriggered) {}
    fn on_percussion_triggered(&self, _hit: &PercussionTriggered) {}
    fn on_step_advanced(&self, _step: &StepAdvanced) {}
    fn on_stopped(&self) {}
}
