#![allow(dead_code)]

use handpan_core::{ManualTimer, NoticeReceiver, ObserverQueue, PlaybackScheduler, SchedulerConfig};
use handpan_domain_notation::{e_amara, InstrumentLayout, NotationParser, ProgressionStep};
use handpan_ports::audio::{AudioError, AudioSink, PercussionTrigger, ToneTrigger};
use handpan_ports::playback::PlaybackObserver;
use handpan_ports::types::{AudioTime, VoiceHandle};
use parking_lot::Mutex;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
struct SinkState {
    now: AudioTime,
    next_voice: u64,
    tones: Vec<ToneTrigger>,
    hits: Vec<PercussionTrigger>,
    stops: Vec<(Vec<VoiceHandle>, f64)>,
    rejected_label: Option<String>,
}

/// In-memory sink with a hand-driven clock.
#[derive(Default)]
pub struct RecordingSink {
    state: Mutex<SinkState>,
}

impl RecordingSink {
    pub fn set_now(&self, now: AudioTime) {
        self.state.lock().now = now;
    }

    /// Makes `play_tone` fail for every tone with this label.
    pub fn reject_label(&self, label: &str) {
        self.state.lock().rejected_label = Some(label.to_string());
    }

    pub fn tones(&self) -> Vec<ToneTrigger> {
        self.state.lock().tones.clone()
    }

    pub fn tone_labels(&self) -> Vec<String> {
        self.state.lock().tones.iter().map(|t| t.label.clone()).collect()
    }

    pub fn tone_times(&self) -> Vec<AudioTime> {
        self.state.lock().tones.iter().map(|t| t.at).collect()
    }

    pub fn hits(&self) -> Vec<PercussionTrigger> {
        self.state.lock().hits.clone()
    }

    pub fn stops(&self) -> Vec<(Vec<VoiceHandle>, f64)> {
        self.state.lock().stops.clone()
    }
}

impl AudioSink for RecordingSink {
    fn now(&self) -> AudioTime {
        self.state.lock().now
    }

    fn play_tone(&self, tone: &ToneTrigger) -> Result<VoiceHandle, AudioError> {
        let mut state = self.state.lock();
        if state.rejected_label.as_deref() == Some(tone.label.as_str()) {
            return Err(AudioError::InvalidFrequency(tone.frequency_hz));
        }
        state.next_voice += 1;
        state.tones.push(tone.clone());
        Ok(VoiceHandle(state.next_voice))
    }

    fn play_percussion(&self, hit: &PercussionTrigger) -> Result<VoiceHandle, AudioError> {
        let mut state = self.state.lock();
        state.next_voice += 1;
        state.hits.push(*hit);
        Ok(VoiceHandle(state.next_voice))
    }

    fn stop_all(&self, voices: &[VoiceHandle], fade_secs: f64) {
        self.state.lock().stops.push((voices.to_vec(), fade_secs));
    }
}

pub struct Rig {
    pub sink: Arc<RecordingSink>,
    pub timer: Arc<ManualTimer>,
    pub scheduler: PlaybackScheduler,
    pub notices: NoticeReceiver,
    pub parser: NotationParser,
}

impl Rig {
    pub fn new() -> Self {
        init_logging();
        let sink = Arc::new(RecordingSink::default());
        let timer = Arc::new(ManualTimer::new());
        let (queue, notices) = ObserverQueue::new(256);
        let mut scheduler =
            PlaybackScheduler::new(sink.clone(), timer.clone(), SchedulerConfig::default());
        scheduler.set_observer(Some(Arc::new(queue) as Arc<dyn PlaybackObserver>));
        let layout = InstrumentLayout::from_dto(e_amara()).expect("layout");
        Self {
            sink,
            timer,
            scheduler,
            notices,
            parser: NotationParser::new(&layout),
        }
    }

    pub fn step(&self, label: &str, text: &str, repeats: Option<u32>) -> ProgressionStep {
        ProgressionStep::from_text(label, text, &self.parser, repeats).0
    }

    /// Fires the most recently armed wake.
    pub fn fire(&mut self) {
        let (handle, _) = self.timer.last_armed().expect("armed wake");
        self.scheduler.on_timer(handle);
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
