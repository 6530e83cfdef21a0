// Thu Jan 22 2026 - Alex

pub mod command;

pub use command::CommandJobRunner;

use crate::discovery::MethodDescriptor;
use crate::facts::FactSink;
use std::path::PathBuf;
use thiserror::Error;

/// Failures a single analysis job can surface. Both kinds are caught at
/// exactly one boundary, the orchestrator's per-candidate step, and
/// never abort the batch.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Analysis engine exhausted resources: {0}")]
    ResourceExhausted(String),
    #[error("Analysis failed: {0}")]
    Analysis(String),
}

#[derive(Debug, Clone)]
pub struct AnalysisParameters<'a> {
    pub candidate: &'a MethodDescriptor,
    pub classpath: &'a [PathBuf],
    pub depth: u32,
    /// Job-local hint only; the batch bound is the watchdog's.
    pub timeout_minutes: u64,
}

/// The symbolic-execution collaborator. Emits zero or more facts into
/// the sink's currently open section.
pub trait JobRunner {
    fn run_job(&self, params: &AnalysisParameters, sink: &dyn FactSink) -> Result<(), JobError>;
}
