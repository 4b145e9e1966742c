use handpan_ports::playback::{
    NoteTriggered, PercussionTriggered, PlaybackNotice, PlaybackObserver, StepAdvanced,
};
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};

pub const DEFAULT_NOTICE_CAPACITY: usize = 1024;

/// Producer half: forwards scheduler notifications into a ring buffer
/// without blocking the scheduling path.
pub struct ObserverQueue {
    producer: Mutex<Producer<PlaybackNotice>>,
}

/// Consumer half, owned by whoever turns notices into UI events.
pub struct NoticeReceiver {
    consumer: Consumer<PlaybackNotice>,
}

impl ObserverQueue {
    pub fn new(capacity: usize) -> (Self, NoticeReceiver) {
        let (producer, consumer) = RingBuffer::new(capacity);
        (
            Self {
                producer: Mutex::new(producer),
            },
            NoticeReceiver { consumer },
        )
    }

    fn push(&self, notice: PlaybackNotice) {
        let Some(mut producer) = self.producer.try_lock() else {
            log::warn!("observer queue busy; dropping notice");
            return;
        };
        if producer.push(notice).is_err() {
            log::warn!("observer queue full; dropping notice");
        }
    }
}

impl PlaybackObserver for ObserverQueue {
    fn on_note_triggered(&self, note: &NoteTriggered) {
        self.push(PlaybackNotice::NoteTriggered(note.clone()));
    }

    fn on_percussion_triggered(&self, hit: &PercussionTriggered) {
        self.push(PlaybackNotice::PercussionTriggered(*hit));
    }

    fn on_step_advanced(&self, step: &StepAdvanced) {
        self.push(PlaybackNotice::StepAdvanced(step.clone()));
    }

    fn on_stopped(&self) {
        self.push(PlaybackNotice::Stopped);
    }
}

impl NoticeReceiver {
    pub fn drain(&mut self) -> Vec<PlaybackNotice> {
        let mut notices = Vec::with_capacity(self.consumer.slots());
        while let Ok(notice) = self.consumer.pop() {
            notices.push(notice);
        }
        notices
    }
}
