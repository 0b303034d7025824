//! Batch progress tracking.
//!
//! The orchestrator is the only writer of the attempted-file counter. Readers
//! observe it through a [`BatchProgress`] handle or a [`ProgressReporter`]
//! callback; neither blocks workers.

use tokio::sync::watch;

/// Counter snapshot published after every attempted file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub attempted: usize,
    pub failed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.attempted >= self.total
    }

    /// Calculate completion percentage
    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.attempted as f64 / self.total as f64 * 100.0
        }
    }
}

/// Receives progress updates from the orchestrator
pub trait ProgressReporter: Send + Sync {
    /// Called once when the file list is known
    fn start(&self, _total: usize) {}

    /// Called after each file is attempted
    fn report_progress(&self, completed: usize, total: usize);

    /// Called when every file has been attempted
    fn finish(&self, _succeeded: usize, _failed: usize) {}
}

/// Read side of the attempted-file counter
#[derive(Debug, Clone)]
pub struct BatchProgress {
    receiver: watch::Receiver<ProgressSnapshot>,
}

impl BatchProgress {
    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.receiver.borrow()
    }

    pub fn attempted(&self) -> usize {
        self.receiver.borrow().attempted
    }

    /// Wait for the next published update; returns false once the batch is gone
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

/// Write side, owned by the orchestrator
#[derive(Debug)]
pub(crate) struct ProgressPublisher {
    sender: watch::Sender<ProgressSnapshot>,
}

impl ProgressPublisher {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(ProgressSnapshot::default());
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> BatchProgress {
        BatchProgress {
            receiver: self.sender.subscribe(),
        }
    }

    pub(crate) fn publish(&self, snapshot: ProgressSnapshot) {
        self.sender.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_percentage() {
        let snapshot = ProgressSnapshot {
            attempted: 5,
            failed: 1,
            total: 20,
        };
        assert_eq!(snapshot.completion_percentage(), 25.0);
        assert!(!snapshot.is_complete());

        let empty = ProgressSnapshot::default();
        assert_eq!(empty.completion_percentage(), 100.0);
        assert!(empty.is_complete());
    }

    #[tokio::test]
    async fn test_publisher_reaches_subscribers() {
        let publisher = ProgressPublisher::new();
        let mut progress = publisher.subscribe();

        publisher.publish(ProgressSnapshot {
            attempted: 3,
            failed: 0,
            total: 10,
        });

        assert!(progress.changed().await);
        assert_eq!(progress.attempted(), 3);
        assert_eq!(progress.snapshot().total, 10);
    }

    #[tokio::test]
    async fn test_changed_false_after_publisher_dropped() {
        let publisher = ProgressPublisher::new();
        let mut progress = publisher.subscribe();
        drop(publisher);
        assert!(!progress.changed().await);
    }
}
