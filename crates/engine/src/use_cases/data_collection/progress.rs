//! Advisory progress reporting for long-running data set operations.
//!
//! An operation owns a [`ProgressIndicator`] and updates it between steps;
//! observers subscribe to snapshots through a `tokio::sync::watch` channel.
//! Cancelling the indicator makes the operation stop at its next check.

use serde::Serialize;
use std::sync::OnceLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::DataCollectionError;

const MAX_PERCENT: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub percent_complete: u8,
    pub task_description: Option<String>,
}

#[derive(Debug)]
pub struct ProgressIndicator {
    state: watch::Sender<ProgressSnapshot>,
    cancellation: CancellationToken,
    subtask: OnceLock<Box<ProgressIndicator>>,
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// An indicator that stops when `cancellation` is cancelled.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        let (state, _) = watch::channel(ProgressSnapshot::default());
        Self {
            state,
            cancellation,
            subtask: OnceLock::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.borrow().clone()
    }

    pub fn percent_complete(&self) -> u8 {
        self.state.borrow().percent_complete
    }

    /// Values above 100 are clamped.
    pub fn set_percent_complete(&self, percent: u32) {
        let percent = clamp_percent(percent);
        self.state.send_modify(|s| s.percent_complete = percent);
    }

    pub fn increase_percent_complete(&self, by: u32) {
        self.state.send_modify(|s| {
            s.percent_complete = clamp_percent(u32::from(s.percent_complete).saturating_add(by));
        });
    }

    pub fn set_task_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.state
            .send_modify(|s| s.task_description = Some(description));
    }

    /// The nested indicator for the current step, created on first use.
    ///
    /// Cancelling this indicator cancels the subtask too.
    pub fn subtask(&self) -> &ProgressIndicator {
        self.subtask.get_or_init(|| {
            Box::new(ProgressIndicator::with_cancellation(
                self.cancellation.child_token(),
            ))
        })
    }

    pub fn has_subtask(&self) -> bool {
        self.subtask.get().is_some()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn check_cancelled(&self) -> Result<(), DataCollectionError> {
        if self.is_cancelled() {
            return Err(DataCollectionError::Cancelled);
        }
        Ok(())
    }
}

fn clamp_percent(percent: u32) -> u8 {
    // min() keeps the value within u8
    percent.min(MAX_PERCENT) as u8
}

/// `done` of `total` items mapped onto the first `share` percent of a task.
pub(crate) fn scaled_percent(done: usize, total: usize, share: u32) -> u32 {
    if total == 0 {
        return share;
    }
    let done = done.min(total) as u64;
    (u64::from(share) * done / total as u64) as u32
}
