//! Wake timers for the playback scheduler.

use crate::scheduler::PlaybackScheduler;
use handpan_ports::timer::WakeTimer;
use handpan_ports::types::TimerHandle;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Default)]
struct TimerSlot {
    armed: Option<(TimerHandle, Instant)>,
    shutdown: bool,
}

/// One-shot timer backed by a condvar. A [`TimerDriver`] thread waits on it
/// and forwards fired handles to the scheduler.
#[derive(Default)]
pub struct ThreadTimer {
    slot: Mutex<TimerSlot>,
    signal: Condvar,
    next_id: AtomicU64,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the armed deadline passes and returns its handle, or
    /// `None` once shut down. The slot is cleared before returning.
    fn wait_next(&self) -> Option<TimerHandle> {
        let mut slot = self.slot.lock();
        loop {
            if slot.shutdown {
                return None;
            }
            let armed = slot.armed;
            match armed {
                None => self.signal.wait(&mut slot),
                Some((handle, deadline)) => {
                    if Instant::now() >= deadline {
                        slot.armed = None;
                        return Some(handle);
                    }
                    self.signal.wait_until(&mut slot, deadline);
                }
            }
        }
    }

    fn shutdown(&self) {
        self.slot.lock().shutdown = true;
        self.signal.notify_all();
    }
}

impl WakeTimer for ThreadTimer {
    fn arm(&self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.slot.lock().armed = Some((handle, Instant::now() + delay));
        self.signal.notify_all();
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut slot = self.slot.lock();
        if matches!(slot.armed, Some((armed, _)) if armed == handle) {
            slot.armed = None;
            self.signal.notify_all();
        }
    }
}

/// Background thread that turns [`ThreadTimer`] deadlines into
/// [`PlaybackScheduler::on_timer`] calls.
pub struct TimerDriver {
    timer: Arc<ThreadTimer>,
    worker: Option<JoinHandle<()>>,
}

impl TimerDriver {
    pub fn spawn(
        timer: Arc<ThreadTimer>,
        scheduler: Arc<Mutex<PlaybackScheduler>>,
    ) -> std::io::Result<Self> {
        let waiter = timer.clone();
        let worker = thread::Builder::new()
            .name("handpan-timer".to_string())
            .spawn(move || {
                // The slot lock is released before the scheduler lock is taken.
                while let Some(handle) = waiter.wait_next() {
                    scheduler.lock().on_timer(handle);
                }
                log::debug!("timer driver: exiting");
            })?;

        Ok(Self {
            timer,
            worker: Some(worker),
        })
    }

    pub fn shutdown(&mut self) {
        self.timer.shutdown();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("timer driver: worker panicked");
            }
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    armed: Vec<(TimerHandle, Duration)>,
    cancelled: Vec<TimerHandle>,
}

/// Timer that never fires on its own. Tests read the armed handles and feed
/// them to the scheduler by hand.
#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every arm call so far, in order.
    pub fn armed(&self) -> Vec<(TimerHandle, Duration)> {
        self.state.lock().armed.clone()
    }

    pub fn last_armed(&self) -> Option<(TimerHandle, Duration)> {
        self.state.lock().armed.last().copied()
    }

    pub fn cancelled(&self) -> Vec<TimerHandle> {
        self.state.lock().cancelled.clone()
    }
}

impl WakeTimer for ManualTimer {
    fn arm(&self, delay: Duration) -> TimerHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        let handle = TimerHandle(state.next_id);
        state.armed.push((handle, delay));
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.state.lock().cancelled.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_wake_is_not_returned() {
        let timer = Arc::new(ThreadTimer::new());
        let first = timer.arm(Duration::from_secs(60));
        timer.cancel(first);
        let second = timer.arm(Duration::from_millis(1));
        assert_ne!(first, second);
        assert_eq!(timer.wait_next(), Some(second));
    }

    #[test]
    fn shutdown_releases_waiter() {
        let timer = Arc::new(ThreadTimer::new());
        let waiter = timer.clone();
        let handle = thread::spawn(move || waiter.wait_next());
        thread::sleep(Duration::from_millis(20));
        timer.shutdown();
        assert_eq!(handle.join().unwrap(), None);
    }
}
