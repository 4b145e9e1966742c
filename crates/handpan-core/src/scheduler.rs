use crate::config::SchedulerConfig;
use crate::voices::VoiceRegistry;
use handpan_domain_notation::{NoteEvent, ProgressionStep, Sound};
use handpan_ports::audio::{AudioError, AudioSink, PercussionTrigger, ToneTrigger};
use handpan_ports::playback::{
    NoteTriggered, PercussionTriggered, PlaybackObserver, PlaybackSettings, StepAdvanced,
};
use handpan_ports::timer::WakeTimer;
use handpan_ports::types::{AudioTime, Bpm, TimerHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail")]
pub enum PlaybackState {
    Stopped,
    /// `step_index` is the next step to commit; it may point one past the
    /// end until the following wake wraps or stops.
    Scheduling { step_index: usize },
}

/// Lookahead scheduler for a progression.
///
/// Every wake commits one whole step (all of its repeats) to the sink with
/// exact audio-clock timestamps, then arms a single coarse wake shortly before
/// that step ends. Timer lateness only shifts when work happens, never when
/// sounds play.
pub struct PlaybackScheduler {
    sink: Arc<dyn AudioSink>,
    timer: Arc<dyn WakeTimer>,
    observer: Option<Arc<dyn PlaybackObserver>>,
    config: SchedulerConfig,
    bpm: Bpm,
    steps: Vec<ProgressionStep>,
    settings: PlaybackSettings,
    state: PlaybackState,
    next_event_time: AudioTime,
    pending_wake: Option<TimerHandle>,
    voices: VoiceRegistry,
}

impl PlaybackScheduler {
    pub fn new(sink: Arc<dyn AudioSink>, timer: Arc<dyn WakeTimer>, config: SchedulerConfig) -> Self {
        Self {
            sink,
            timer,
            observer: None,
            config,
            bpm: Bpm::default(),
            steps: Vec::new(),
            settings: PlaybackSettings::default(),
            state: PlaybackState::Stopped,
            next_event_time: 0.0,
            pending_wake: None,
            voices: VoiceRegistry::new(),
        }
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn PlaybackObserver>>) {
        self.observer = observer;
    }

    /// Applies from the next committed step on.
    pub fn set_bpm(&mut self, bpm: Bpm) {
        self.bpm = bpm;
    }

    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    /// Loop and repeat settings; a running session picks them up at its next wake.
    pub fn set_settings(&mut self, settings: PlaybackSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Scheduling { .. })
    }

    /// Audio time at which the next uncommitted step begins.
    pub fn next_event_time(&self) -> AudioTime {
        self.next_event_time
    }

    pub fn pending_wake(&self) -> Option<TimerHandle> {
        self.pending_wake
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn start(&mut self, steps: Vec<ProgressionStep>, settings: PlaybackSettings) {
        if self.is_playing() {
            self.stop();
        }

        let now = self.sink.now();
        self.voices.prune(now);
        self.steps = steps;
        self.settings = settings;
        self.state = PlaybackState::Scheduling { step_index: 0 };
        self.next_event_time = now + self.config.start_offset_secs;

        log::debug!(
            "playback: start {} step(s) at {} bpm, loop={}",
            self.steps.len(),
            self.bpm.get(),
            self.settings.loop_enabled
        );
        self.wake();
    }

    /// Silences everything and discards the schedule. Safe to call at any time.
    pub fn stop(&mut self) {
        let was_playing = self.is_playing();
        self.state = PlaybackState::Stopped;

        if let Some(handle) = self.pending_wake.take() {
            self.timer.cancel(handle);
        }

        let voices = self.voices.drain();
        if !voices.is_empty() {
            self.sink.stop_all(&voices, self.config.stop_fade_secs);
        }

        if was_playing {
            log::debug!("playback: stopped, faded {} voice(s)", voices.len());
            if let Some(observer) = &self.observer {
                observer.on_stopped();
            }
        }
    }

    /// Entry point for a fired wake. Handles other than the one currently
    /// armed are stale and ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        if self.pending_wake != Some(handle) {
            log::trace!("playback: ignoring stale wake {handle:?}");
            return;
        }
        self.pending_wake = None;
        self.wake();
    }

    fn wake(&mut self) {
        let PlaybackState::Scheduling { mut step_index } = self.state else {
            return;
        };
        if self.steps.is_empty() {
            self.stop();
            return;
        }
        if step_index >= self.steps.len() {
            if !self.settings.loop_enabled {
                self.stop();
                return;
            }
            step_index = 0;
        }

        let now = self.sink.now();
        self.voices.prune(now);

        let step = &self.steps[step_index];
        let label = step.label.clone();
        let events = step.events.clone();
        let repeats = step.effective_repeats(self.settings.default_repeats);
        let step_start = self.next_event_time;

        if events.is_empty() {
            log::warn!("playback: step {step_index} ('{label}') has no events");
        }
        if let Some(observer) = &self.observer {
            observer.on_step_advanced(&StepAdvanced {
                step_index,
                label: label.clone(),
                at: step_start,
                repeats,
            });
        }

        let pass_secs = self.commit_step(&events, step_start, repeats);

        self.next_event_time = step_start + pass_secs * repeats as f64;
        self.state = PlaybackState::Scheduling {
            step_index: step_index + 1,
        };

        let delay = self.config.wake_delay(self.next_event_time - now);
        self.pending_wake = Some(self.timer.arm(delay));
        log::debug!(
            "playback: committed step {step_index} ('{label}') x{repeats} at {step_start:.3}s, next wake in {:.0}ms",
            delay.as_secs_f64() * 1000.0
        );
    }

    /// Schedules every repeat of one step from `start`; returns the length of
    /// a single pass.
    fn commit_step(&mut self, events: &[NoteEvent], start: AudioTime, repeats: u32) -> f64 {
        let eighth = self.bpm.eighth_note_secs();
        let pass_secs: f64 = events.iter().map(|event| eighth * event.duration).sum();

        for pass in 0..repeats {
            let pass_start = start + pass as f64 * pass_secs;
            let mut offset = 0.0;
            for event in events {
                let at = pass_start + offset;
                for sound in event.sounds() {
                    self.trigger(&sound, at);
                }
                offset += eighth * event.duration;
            }
        }
        pass_secs
    }

    fn trigger(&mut self, sound: &Sound, at: AudioTime) {
        match sound {
            Sound::Percussion { hit } => {
                let trigger = PercussionTrigger {
                    at,
                    alternate_timbre: hit.hand.is_alternate(),
                    ghost: hit.ghost,
                    suppress_side_effects: false,
                };
                log::trace!("playback: {} at {at:.3}s", hit.symbol());
                match self.sink.play_percussion(&trigger) {
                    Ok(voice) => {
                        self.voices.register(voice, at + self.config.percussion_secs);
                        if let Some(observer) = &self.observer {
                            observer.on_percussion_triggered(&PercussionTriggered {
                                hand: hit.hand,
                                ghost: hit.ghost,
                                at,
                            });
                        }
                    }
                    Err(err) => log::warn!("playback: percussion at {at:.3}s failed: {err}"),
                }
            }
            Sound::Pitch { note } => {
                let frequency_hz = note.frequency();
                let label = note.label();
                if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
                    log::error!("playback: skipping {label}, invalid frequency {frequency_hz}");
                    return;
                }

                let tone = ToneTrigger {
                    frequency_hz,
                    label,
                    sustain_secs: self.config.tone_sustain_secs,
                    at,
                    suppress_side_effects: false,
                };
                log::trace!("playback: {} ({frequency_hz:.2} Hz) at {at:.3}s", tone.label);
                match self.sink.play_tone(&tone) {
                    Ok(voice) => {
                        self.voices.register(voice, at + tone.sustain_secs);
                        if let Some(observer) = &self.observer {
                            observer.on_note_triggered(&NoteTriggered {
                                label: tone.label,
                                at,
                            });
                        }
                    }
                    Err(AudioError::InvalidFrequency(hz)) => {
                        log::error!("playback: sink rejected {} at {hz} Hz", tone.label)
                    }
                    Err(err) => log::warn!("playback: tone {} failed: {err}", tone.label),
                }
            }
        }
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
