//! Per-question countdown.
//!
//! The session only talks to the `CountdownTimer` port: it starts one timer per
//! question and cancels it when the question is retired. Events come back tagged
//! with the handle that produced them, so the session can drop anything from a
//! timer it no longer owns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Identifies one started countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    /// One second elapsed; `remaining` is still above zero.
    Tick { remaining: u32 },
    /// The count reached zero. Terminal.
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub handle: TimerHandle,
    pub kind: TimerEventKind,
}

impl TimerEvent {
    #[must_use]
    pub fn tick(handle: TimerHandle, remaining: u32) -> Self {
        Self {
            handle,
            kind: TimerEventKind::Tick { remaining },
        }
    }

    #[must_use]
    pub fn timeout(handle: TimerHandle) -> Self {
        Self {
            handle,
            kind: TimerEventKind::Timeout,
        }
    }
}

/// Scheduling port used by the session state machine.
pub trait CountdownTimer: Send + Sync {
    /// Start counting down from `seconds`.
    fn start(&self, seconds: u32) -> TimerHandle;

    /// Stop all future events for `handle`. Unknown or finished handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

//
// ─── TOKIO ─────────────────────────────────────────────────────────────────────
//

/// Countdown backed by Tokio tasks, delivering events on an unbounded channel.
pub struct TokioCountdown {
    events: mpsc::UnboundedSender<TimerEvent>,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<TimerHandle, AbortHandle>>,
}

impl TokioCountdown {
    /// Returns the timer and the receiving end of its event channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let timer = Self {
            events,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        };
        (timer, rx)
    }

    /// Number of countdown tasks that are still running.
    #[must_use]
    pub fn live_count(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl CountdownTimer for TokioCountdown {
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    fn start(&self, seconds: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut remaining = seconds;
            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                let event = if remaining == 0 {
                    TimerEvent::timeout(handle)
                } else {
                    TimerEvent::tick(handle, remaining)
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(handle, task.abort_handle());
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioCountdown {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, task) in tasks.drain() {
            task.abort();
        }
    }
}

//
// ─── RECORDING ─────────────────────────────────────────────────────────────────
//

/// Timer double that never fires; it only records starts and cancels.
///
/// Tests feed `TimerEvent`s to the session by hand.
#[derive(Debug, Default)]
pub struct RecordingCountdown {
    inner: Mutex<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    next_id: u64,
    started: Vec<(TimerHandle, u32)>,
    cancelled: Vec<TimerHandle>,
}

impl RecordingCountdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles in start order.
    #[must_use]
    pub fn started(&self) -> Vec<TimerHandle> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.started.iter().map(|(handle, _)| *handle).collect()
    }

    #[must_use]
    pub fn cancelled(&self) -> Vec<TimerHandle> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.cancelled.clone()
    }

    /// Started but not yet cancelled.
    #[must_use]
    pub fn live(&self) -> Vec<TimerHandle> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .started
            .iter()
            .map(|(handle, _)| *handle)
            .filter(|handle| !inner.cancelled.contains(handle))
            .collect()
    }

    /// Duration passed to the most recent `start`.
    #[must_use]
    pub fn last_duration(&self) -> Option<u32> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.started.last().map(|(_, seconds)| *seconds)
    }
}

impl CountdownTimer for RecordingCountdown {
    fn start(&self, seconds: u32) -> TimerHandle {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let handle = TimerHandle(inner.next_id);
        inner.started.push((handle, seconds));
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.cancelled.push(handle);
    }
}
