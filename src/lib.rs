// Tue Jan 20 2026 - Alex

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod exit;
pub mod facts;
pub mod orchestrator;
pub mod utils;

pub use analysis::{AnalysisParameters, CommandJobRunner, JobError, JobRunner};
pub use config::{ConfigurationError, DiscoveryConfiguration};
pub use discovery::{
    ClassfileIntrospector, DiscoveryError, IntrospectionProvider, MethodDescriptor,
    MethodEnumerator,
};
pub use facts::{DatalogSink, FactRecord, FactSink};
pub use orchestrator::{BatchState, BatchSummary, FlushGuard, Orchestrator, Watchdog};
