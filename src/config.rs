// Tue Jan 20 2026 - Alex

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Fixed bootstrap/runtime classpath entry, always appended after the
/// configured entries.
pub const BOOTSTRAP_CLASSPATH: &str = "data/jre/rt.jar";

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to read configuration file {0}: {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),
    #[error("Error parsing JSON configuration file: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),
}

/// Run parameters for one discovery + analysis batch. Immutable once
/// loaded; defaults are applied at load time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfiguration {
    pub sut: Vec<String>,
    pub test_programs: Vec<String>,
    #[serde(default)]
    pub include_test: Vec<String>,
    #[serde(default)]
    pub exclude_test: Vec<String>,
    #[serde(default)]
    pub additional_classpath: Vec<String>,
    /// Consumed only by the sibling runtime tracing agent; carried here
    /// so one configuration file drives both tools.
    #[serde(default)]
    pub exclude_traced_packages: Vec<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Batch timeout in minutes, 0 = unbounded.
    #[serde(default)]
    pub timeout: u64,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub test_programs_list: Option<PathBuf>,
    /// Argv template launching the symbolic analysis engine, with
    /// {class} {method} {descriptor} {classpath} {depth} {timeout}
    /// placeholders.
    #[serde(default)]
    pub engine_command: Vec<String>,
    #[serde(skip)]
    classpath: Vec<PathBuf>,
}

fn default_depth() -> u32 {
    10
}

impl DiscoveryConfiguration {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        log::info!("Loading configuration...");
        let raw = fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Unreadable(path.to_path_buf(), e))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let mut config: DiscoveryConfiguration =
            serde_json::from_str(raw).map_err(ConfigurationError::Malformed)?;

        if config.engine_command.is_empty() {
            return Err(ConfigurationError::MissingField("engineCommand"));
        }

        config.classpath = config.compose_classpath(runtime_classpath());
        Ok(config)
    }

    /// Effective classpath: test programs, SUT, additional entries, the
    /// bootstrap entry, then the process's own runtime classpath.
    pub fn classpath(&self) -> &[PathBuf] {
        &self.classpath
    }

    pub fn output_file_or_default(&self) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => {
                let now = chrono::Utc::now().format("%Y-%m-%dT%H:%MZ");
                PathBuf::from(format!("inspection-{}.pl", now))
            }
        }
    }

    fn compose_classpath(&self, runtime: Vec<PathBuf>) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = Vec::new();
        entries.extend(self.test_programs.iter().map(PathBuf::from));
        entries.extend(self.sut.iter().map(PathBuf::from));
        entries.extend(self.additional_classpath.iter().map(PathBuf::from));
        entries.push(PathBuf::from(BOOTSTRAP_CLASSPATH));
        entries.extend(runtime);
        entries
    }
}

fn runtime_classpath() -> Vec<PathBuf> {
    match env::var("CLASSPATH") {
        Ok(raw) => env::split_paths(&raw)
            .filter(|entry| !entry.as_os_str().is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}
