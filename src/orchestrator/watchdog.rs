// Thu Jan 22 2026 - Alex

use crate::exit;
use crate::facts::FactSink;
use crate::orchestrator::batch::BatchState;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const MAX_POLL: Duration = Duration::from_secs(1);

/// Deadline arithmetic for the batch budget, separated from the thread
/// so it can be exercised with synthetic instants.
#[derive(Debug, Clone, Copy)]
pub struct BudgetTimer {
    deadline: Option<Instant>,
}

impl BudgetTimer {
    /// A zero-minute budget means unbounded: the timer never expires.
    pub fn new(timeout_minutes: u64, now: Instant) -> Self {
        let deadline = if timeout_minutes == 0 {
            None
        } else {
            now.checked_add(Duration::from_secs(timeout_minutes * 60))
        };
        Self { deadline }
    }

    pub fn is_bounded(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| now >= deadline)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Concurrent monitor enforcing a wall-clock budget over the whole
/// batch, not per job. On expiry it forces a final flush and terminates
/// the process; the next invocation resumes via the skip count.
pub struct Watchdog {
    handle: Option<JoinHandle<()>>,
    disarm: Option<Sender<()>>,
}

impl Watchdog {
    pub fn start(timeout_minutes: u64, sink: Arc<dyn FactSink>, state: Arc<BatchState>) -> Self {
        let timer = BudgetTimer::new(timeout_minutes, Instant::now());
        if !timer.is_bounded() {
            return Self {
                handle: None,
                disarm: None,
            };
        }

        log::info!("Watchdog armed: {} minute batch budget", timeout_minutes);
        let (disarm, signal) = mpsc::channel();
        let handle = thread::spawn(move || {
            loop {
                let now = Instant::now();
                if timer.expired(now) {
                    break;
                }
                let wait = timer.remaining(now).unwrap_or_default().min(MAX_POLL);
                match signal.recv_timeout(wait) {
                    // Batch finished (or the handle was dropped) first.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => continue,
                }
            }

            log::error!(
                "Batch budget exhausted at candidate {} ({} analyzed), terminating.",
                state.current_index(),
                state.analyzed()
            );
            log::info!("Dumped {} facts.", sink.emitted());
            if let Err(e) = sink.flush() {
                log::error!("Emergency flush failed: {}", e);
            }
            std::process::exit(exit::TEMP_FAIL);
        });

        Self {
            handle: Some(handle),
            disarm: Some(disarm),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop(mut self) {
        self.shut_down();
    }

    fn shut_down(&mut self) {
        if let Some(disarm) = self.disarm.take() {
            let _ = disarm.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.shut_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::RecordingSink;

    #[test]
    fn test_zero_timeout_never_expires() {
        let start = Instant::now();
        let timer = BudgetTimer::new(0, start);
        assert!(!timer.is_bounded());
        assert!(!timer.expired(start));
        assert!(!timer.expired(start + Duration::from_secs(3600 * 24 * 365)));
        assert_eq!(timer.remaining(start), None);
    }

    #[test]
    fn test_budget_expires_at_deadline() {
        let start = Instant::now();
        let timer = BudgetTimer::new(5, start);
        assert!(timer.is_bounded());
        assert!(!timer.expired(start));
        assert!(!timer.expired(start + Duration::from_secs(299)));
        assert!(timer.expired(start + Duration::from_secs(300)));
        assert!(timer.expired(start + Duration::from_secs(301)));
    }

    #[test]
    fn test_remaining_saturates_to_zero() {
        let start = Instant::now();
        let timer = BudgetTimer::new(1, start);
        assert_eq!(
            timer.remaining(start),
            Some(Duration::from_secs(60))
        );
        assert_eq!(
            timer.remaining(start + Duration::from_secs(90)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_unbounded_watchdog_is_inert() {
        let sink = Arc::new(RecordingSink::new());
        let state = Arc::new(BatchState::new());
        let watchdog = Watchdog::start(0, sink, state);
        assert!(!watchdog.is_armed());
        watchdog.stop();
    }

    #[test]
    fn test_armed_watchdog_disarms_cleanly() {
        let sink = Arc::new(RecordingSink::new());
        let state = Arc::new(BatchState::new());
        // A generous budget; stop() must return without waiting for it.
        let watchdog = Watchdog::start(60, sink, state);
        assert!(watchdog.is_armed());
        watchdog.stop();
    }
}
