//! Cancellable delayed events on a virtual clock.
//!
//! The scheduler never sleeps. Whoever owns it decides how time passes: the
//! CLI feeds it wall-clock time from tokio, tests advance it directly.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The simulated processing delay has elapsed.
    ProcessingComplete,
    /// The thank-you screen has been shown long enough.
    AutoEject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct ScheduledTask {
    handle: TaskHandle,
    due: Duration,
    event: TimerEvent,
}

#[derive(Debug, Default)]
pub struct TimerScheduler {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            handle,
            due: self.now + delay,
            event,
        });
        handle
    }

    /// Returns false if the task already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.tasks.len();
        self.tasks.clear();
        cancelled
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|task| task.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Absolute deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.iter().map(|task| task.due).min()
    }

    /// Time left until the earliest pending task is due.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|due| due.saturating_sub(self.now))
    }

    /// Removes and returns the earliest task due at or before `until`,
    /// moving the clock to its deadline.
    ///
    /// Ties fire in scheduling order. Tasks scheduled while draining are
    /// picked up by later calls with the same `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerEvent> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= until)
            .min_by_key(|(_, task)| (task.due, task.handle.0))
            .map(|(index, _)| index)?;
        let task = self.tasks.remove(index);
        self.now = self.now.max(task.due);
        Some(task.event)
    }

    /// Moves the clock forward to `until` once every due task has been popped.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
