// Thu Jan 22 2026 - Alex

use crate::analysis::{AnalysisParameters, JobRunner};
use crate::config::DiscoveryConfiguration;
use crate::discovery::MethodDescriptor;
use crate::facts::FactSink;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress of the running batch. Written only by the orchestrator
/// loop; the watchdog and the exit guard read it for accounting.
pub struct BatchState {
    current_index: AtomicUsize,
    analyzed: AtomicUsize,
    started: Instant,
}

impl BatchState {
    pub fn new() -> Self {
        Self {
            current_index: AtomicUsize::new(0),
            analyzed: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index.load(Ordering::SeqCst)
    }

    pub fn analyzed(&self) -> usize {
        self.analyzed.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn advance(&self, index: usize) {
        self.current_index.store(index, Ordering::SeqCst);
    }

    fn mark_analyzed(&self) {
        self.analyzed.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Drives the candidate sequence strictly sequentially: one job at a
/// time, skip-based resume, per-job crash isolation, and a best-effort
/// flush after every candidate whatever the job's outcome.
pub struct Orchestrator<'a> {
    config: &'a DiscoveryConfiguration,
    sink: Arc<dyn FactSink>,
    state: Arc<BatchState>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a DiscoveryConfiguration, sink: Arc<dyn FactSink>) -> Self {
        Self {
            config,
            sink,
            state: Arc::new(BatchState::new()),
        }
    }

    pub fn state(&self) -> Arc<BatchState> {
        self.state.clone()
    }

    pub fn run(&self, candidates: &[MethodDescriptor], runner: &dyn JobRunner) -> BatchSummary {
        let total = candidates.len();
        let mut failed = 0;

        for (position, candidate) in candidates.iter().enumerate() {
            let index = position + 1;
            self.state.advance(index);

            if index <= self.config.skip {
                log::debug!("[{}/{}] Skipping {}", index, total, candidate);
                continue;
            }

            self.sink.begin_section(candidate);
            log::info!("[{}/{}] Analysing: {}", index, total, candidate);

            let params = AnalysisParameters {
                candidate,
                classpath: self.config.classpath(),
                depth: self.config.depth,
                timeout_minutes: self.config.timeout,
            };

            // The one boundary where job failures are absorbed: an
            // engine error or a panic costs this candidate only.
            match panic::catch_unwind(AssertUnwindSafe(|| {
                runner.run_job(&params, self.sink.as_ref())
            })) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failed += 1;
                    log::error!("Analysis of {} failed: {}", candidate, e);
                }
                Err(payload) => {
                    failed += 1;
                    log::error!(
                        "Analysis of {} crashed: {}",
                        candidate,
                        panic_message(payload.as_ref())
                    );
                }
            }

            if let Err(e) = self.sink.flush() {
                log::error!("Failed to persist facts for {}: {}", candidate, e);
            }

            self.state.mark_analyzed();
        }

        let summary = BatchSummary {
            analyzed: self.state.analyzed(),
            failed,
            elapsed: self.state.elapsed(),
        };
        log::info!(
            "Analyzed {} method{} in {:.2} seconds.",
            summary.analyzed,
            if summary.analyzed == 1 { "" } else { "s" },
            summary.elapsed.as_secs_f64()
        );
        summary
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Termination guarantee: created before the loop starts, its drop runs
/// on every unwinding or returning exit path and routes through the
/// same idempotent flush the loop and the watchdog use.
pub struct FlushGuard {
    sink: Arc<dyn FactSink>,
    state: Arc<BatchState>,
}

impl FlushGuard {
    pub fn new(sink: Arc<dyn FactSink>, state: Arc<BatchState>) -> Self {
        Self { sink, state }
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        log::info!(
            "Dumped {} facts over {} candidates.",
            self.sink.emitted(),
            self.state.analyzed()
        );
        if let Err(e) = self.sink.flush() {
            log::error!("Final flush failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::JobError;
    use crate::config::DiscoveryConfiguration;
    use crate::facts::FactRecord;
    use crate::utils::testing::RecordingSink;
    use parking_lot::Mutex;

    struct ScriptedRunner {
        invoked: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        panic_on: Option<&'static str>,
    }

    impl ScriptedRunner {
        fn new() -> Self {
            Self {
                invoked: Mutex::new(Vec::new()),
                fail_on: None,
                panic_on: None,
            }
        }
    }

    impl JobRunner for ScriptedRunner {
        fn run_job(
            &self,
            params: &AnalysisParameters,
            sink: &dyn FactSink,
        ) -> Result<(), JobError> {
            let name = params.candidate.method_name.clone();
            self.invoked.lock().push(name.clone());

            if self.panic_on == Some(name.as_str()) {
                panic!("engine blew up");
            }
            if self.fail_on == Some(name.as_str()) {
                return Err(JobError::Analysis("checked failure".to_string()));
            }

            sink.emit(FactRecord::new("analyzed", vec![name]));
            Ok(())
        }
    }

    fn config(skip: usize) -> DiscoveryConfiguration {
        DiscoveryConfiguration::from_json_str(&format!(
            r#"{{"sut": [], "testPrograms": [], "skip": {}, "engineCommand": ["engine"]}}"#,
            skip
        ))
        .unwrap()
    }

    fn candidates(names: &[&str]) -> Vec<MethodDescriptor> {
        names
            .iter()
            .map(|name| MethodDescriptor::new(name, "()V", "com.example.FooTest"))
            .collect()
    }

    #[test]
    fn test_skip_produces_no_section_and_no_job() {
        let config = config(2);
        let sink = Arc::new(RecordingSink::new());
        let runner = ScriptedRunner::new();
        let orchestrator = Orchestrator::new(&config, sink.clone());

        let summary = orchestrator.run(&candidates(&["a", "b", "c", "d"]), &runner);

        assert_eq!(*runner.invoked.lock(), vec!["c", "d"]);
        assert_eq!(*sink.sections.lock(), vec!["c", "d"]);
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_skip_beyond_end_analyzes_nothing() {
        let config = config(10);
        let sink = Arc::new(RecordingSink::new());
        let runner = ScriptedRunner::new();
        let orchestrator = Orchestrator::new(&config, sink.clone());

        let summary = orchestrator.run(&candidates(&["a", "b"]), &runner);

        assert!(runner.invoked.lock().is_empty());
        assert!(sink.sections.lock().is_empty());
        assert_eq!(summary.analyzed, 0);
    }

    #[test]
    fn test_job_failure_is_isolated() {
        let config = config(0);
        let sink = Arc::new(RecordingSink::new());
        let mut runner = ScriptedRunner::new();
        runner.fail_on = Some("b");
        let orchestrator = Orchestrator::new(&config, sink.clone());

        let summary = orchestrator.run(&candidates(&["a", "b", "c"]), &runner);

        assert_eq!(*runner.invoked.lock(), vec!["a", "b", "c"]);
        assert_eq!(summary.analyzed, 3);
        assert_eq!(summary.failed, 1);
        // The failed candidate still went through the flush path.
        assert_eq!(*sink.flushes.lock(), 3);
    }

    #[test]
    fn test_job_panic_is_isolated() {
        let config = config(0);
        let sink = Arc::new(RecordingSink::new());
        let mut runner = ScriptedRunner::new();
        runner.panic_on = Some("a");
        let orchestrator = Orchestrator::new(&config, sink.clone());

        let summary = orchestrator.run(&candidates(&["a", "b"]), &runner);

        assert_eq!(*runner.invoked.lock(), vec!["a", "b"]);
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_flush_failure_does_not_escalate() {
        let config = config(0);
        let sink = Arc::new(RecordingSink::failing_flush());
        let runner = ScriptedRunner::new();
        let orchestrator = Orchestrator::new(&config, sink.clone());

        let summary = orchestrator.run(&candidates(&["a", "b"]), &runner);
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_flush_guard_flushes_on_drop() {
        let sink = Arc::new(RecordingSink::new());
        let state = Arc::new(BatchState::new());
        {
            let _guard = FlushGuard::new(sink.clone(), state);
        }
        assert_eq!(*sink.flushes.lock(), 1);
    }

    #[test]
    fn test_state_tracks_progress() {
        let config = config(1);
        let sink = Arc::new(RecordingSink::new());
        let runner = ScriptedRunner::new();
        let orchestrator = Orchestrator::new(&config, sink.clone());
        let state = orchestrator.state();

        orchestrator.run(&candidates(&["a", "b", "c"]), &runner);

        assert_eq!(state.current_index(), 3);
        assert_eq!(state.analyzed(), 2);
    }
}
