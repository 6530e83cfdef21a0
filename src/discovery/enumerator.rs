// Wed Jan 21 2026 - Alex

use crate::config::DiscoveryConfiguration;
use crate::discovery::descriptor::{encode_method_descriptor, MethodDescriptor};
use crate::discovery::introspect::{IntrospectionProvider, MethodInfo, TypeDescriptor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const BEFORE_ANNOTATION: &str = "org.junit.Before";
pub const TEST_ANNOTATION: &str = "org.junit.Test";
pub const IGNORE_ANNOTATION: &str = "org.junit.Ignore";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to enumerate test program root {0}: {1}")]
    Walk(PathBuf, #[source] walkdir::Error),
}

/// Ordered candidate sequence plus the per-class fixture methods found
/// along the way. Order is discovery order and is significant: it
/// drives skip/resume and progress indices.
pub struct MethodEnumerator {
    methods: Vec<MethodDescriptor>,
    before_methods: HashMap<String, Vec<MethodDescriptor>>,
}

enum Classification {
    Fixture,
    Test,
    Dropped,
}

impl MethodEnumerator {
    pub fn discover(
        config: &DiscoveryConfiguration,
        provider: &dyn IntrospectionProvider,
    ) -> Result<Self, DiscoveryError> {
        let mut enumerator = Self {
            methods: Vec::new(),
            before_methods: HashMap::new(),
        };

        log::info!("Loading classes...");
        for root in &config.test_programs {
            for name in enumerate_class_names(Path::new(root))? {
                match provider.resolve(config.classpath(), &name) {
                    Ok(descriptor) => enumerator.collect_type(&descriptor),
                    Err(e) => log::warn!("Skipping {}: {}", name, e),
                }
            }
        }

        // Refine the list of methods to analyze: excludes always apply,
        // includes only restrict further when the list is non-empty.
        enumerator
            .methods
            .retain(|method| !config.exclude_test.contains(&method.method_name));
        if !config.include_test.is_empty() {
            enumerator
                .methods
                .retain(|method| config.include_test.contains(&method.method_name));
        }

        Ok(enumerator)
    }

    fn collect_type(&mut self, descriptor: &TypeDescriptor) {
        if descriptor.is_abstract() {
            log::info!(
                "Analysing class {}: skipping, it's an abstract class.",
                descriptor.binary_name
            );
            return;
        }

        log::info!(
            "Analysing class {}: retrieving valid methods...",
            descriptor.binary_name
        );
        for method in &descriptor.methods {
            if !method.is_accessible() {
                continue;
            }

            match classify(method) {
                Classification::Fixture => {
                    self.before_methods
                        .entry(descriptor.binary_name.clone())
                        .or_default()
                        .push(describe(method, &descriptor.binary_name));
                }
                Classification::Test => {
                    self.methods.push(describe(method, &descriptor.binary_name));
                }
                Classification::Dropped => {}
            }
        }
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn before_methods(&self, class_name: &str) -> Option<&[MethodDescriptor]> {
        self.before_methods.get(class_name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<'a> IntoIterator for &'a MethodEnumerator {
    type Item = &'a MethodDescriptor;
    type IntoIter = std::slice::Iter<'a, MethodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.iter()
    }
}

fn describe(method: &MethodInfo, class_name: &str) -> MethodDescriptor {
    let encoded = encode_method_descriptor(&method.param_types, &method.return_type);
    MethodDescriptor::new(&method.name, &encoded, class_name)
}

// First matching annotation wins: a fixture annotation settles the
// method, an ignore annotation unconditionally removes candidacy.
fn classify(method: &MethodInfo) -> Classification {
    let mut is_test = false;
    for annotation in &method.annotations {
        if annotation == BEFORE_ANNOTATION {
            return Classification::Fixture;
        }
        if annotation.starts_with(IGNORE_ANNOTATION) {
            return Classification::Dropped;
        }
        if annotation.starts_with(TEST_ANNOTATION) {
            is_test = true;
        }
    }

    if is_test {
        Classification::Test
    } else {
        Classification::Dropped
    }
}

/// Enumerates `.class` artifacts under a root in sorted filesystem
/// order, yielding dotted binary type names. Order is deterministic for
/// identical inputs.
fn enumerate_class_names(root: &Path) -> Result<Vec<String>, DiscoveryError> {
    let mut names = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| DiscoveryError::Walk(root.to_path_buf(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("class") {
            continue;
        }

        let relative = match path.strip_prefix(root) {
            Ok(relative) => relative.with_extension(""),
            Err(_) => continue,
        };
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(".");
        names.push(name);
    }

    Ok(names)
}
