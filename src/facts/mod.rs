// Wed Jan 21 2026 - Alex

pub mod record;
pub mod sink;

pub use record::FactRecord;
pub use sink::{DatalogSink, FactSink, SinkError};
