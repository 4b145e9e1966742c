use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("invalid frequency: {0}")]
    InvalidFrequency(f64),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// A pitched tone to start at `at` on the audio clock.
#[derive(Clone, Debug, PartialEq)]
pub struct ToneTrigger {
    pub frequency_hz: f64,
    pub label: String,
    pub sustain_secs: f64,
    pub at: AudioTime,
    /// Skip visual side effects (previews, modal playback).
    pub suppress_side_effects: bool,
}

/// A percussive body hit to start at `at` on the audio clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PercussionTrigger {
    pub at: AudioTime,
    pub alternate_timbre: bool,
    pub ghost: bool,
    pub suppress_side_effects: bool,
}

/// Sound backend. Calls are fire-and-forget with future timestamps; the sink
/// owns whatever concurrency it needs to realize them.
pub trait AudioSink: Send + Sync {
    /// Current time of the precise monotonic audio clock.
    fn now(&self) -> AudioTime;

    fn play_tone(&self, tone: &ToneTrigger) -> Result<VoiceHandle, AudioError>;

    fn play_percussion(&self, hit: &PercussionTrigger) -> Result<VoiceHandle, AudioError>;

    /// Fade every listed voice to silence over `fade_secs`, then release it.
    fn stop_all(&self, voices: &[VoiceHandle], fade_secs: f64);
}
