// Thu Jan 22 2026 - Alex

// In-memory doubles for the collaborator seams, shared by the unit
// tests across modules.

use crate::discovery::{IntrospectError, IntrospectionProvider, MethodDescriptor, TypeDescriptor};
use crate::facts::{FactRecord, FactSink, SinkError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;

/// Fact sink that records every interaction instead of persisting.
pub struct RecordingSink {
    pub sections: Mutex<Vec<String>>,
    pub records: Mutex<Vec<FactRecord>>,
    pub flushes: Mutex<usize>,
    fail_flush: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sections: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
            flushes: Mutex::new(0),
            fail_flush: false,
        }
    }

    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::new()
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FactSink for RecordingSink {
    fn begin_section(&self, candidate: &MethodDescriptor) {
        self.sections.lock().push(candidate.method_name.clone());
    }

    fn emit(&self, record: FactRecord) {
        self.records.lock().push(record);
    }

    fn flush(&self) -> Result<(), SinkError> {
        *self.flushes.lock() += 1;
        if self.fail_flush {
            return Err(SinkError::Io(
                PathBuf::from("/recording/sink"),
                std::io::Error::new(std::io::ErrorKind::Other, "flush disabled"),
            ));
        }
        Ok(())
    }

    fn emitted(&self) -> usize {
        self.records.lock().len()
    }
}

/// Introspection provider backed by a name-indexed map; anything not
/// registered fails to resolve.
pub struct FakeProvider {
    types: HashMap<String, TypeDescriptor>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.binary_name.clone(), descriptor);
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IntrospectionProvider for FakeProvider {
    fn resolve(
        &self,
        _classpath: &[PathBuf],
        binary_name: &str,
    ) -> Result<TypeDescriptor, IntrospectError> {
        self.types
            .get(binary_name)
            .cloned()
            .ok_or_else(|| IntrospectError::NotFound(binary_name.to_string()))
    }
}
