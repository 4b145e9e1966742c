use crate::types::TimerHandle;
use std::time::Duration;

/// Coarse, possibly late, one-shot wake-up source.
///
/// The scheduler arms at most one wake at a time; whoever drives the timer
/// hands the returned handle back to the scheduler when it fires.
pub trait WakeTimer: Send + Sync {
    fn arm(&self, delay: Duration) -> TimerHandle;
    fn cancel(&self, handle: TimerHandle);
}
