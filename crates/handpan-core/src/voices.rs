use handpan_ports::types::{AudioTime, VoiceHandle};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveVoice {
    pub handle: VoiceHandle,
    /// Audio time after which the voice is silent on its own.
    pub ends_at: AudioTime,
}

/// Voices started by the scheduler that may still be sounding.
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    voices: Vec<ActiveVoice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handle: VoiceHandle, ends_at: AudioTime) {
        self.voices.push(ActiveVoice { handle, ends_at });
    }

    /// Forgets voices that finished before `now`.
    pub fn prune(&mut self, now: AudioTime) {
        self.voices.retain(|voice| voice.ends_at > now);
    }

    /// Empties the registry, returning every handle for a bulk stop.
    pub fn drain(&mut self) -> Vec<VoiceHandle> {
        self.voices.drain(..).map(|voice| voice.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
