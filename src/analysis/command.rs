// Thu Jan 22 2026 - Alex

use crate::analysis::{AnalysisParameters, JobError, JobRunner};
use crate::facts::{FactRecord, FactSink};
use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Runs the symbolic analysis engine as a child process, one invocation
/// per candidate, and forwards fact-shaped stdout lines into the sink.
/// The argv template supports {class}, {method}, {descriptor},
/// {classpath}, {depth} and {timeout} placeholders.
pub struct CommandJobRunner {
    template: Vec<String>,
}

impl CommandJobRunner {
    pub fn new(template: &[String]) -> Self {
        Self {
            template: template.to_vec(),
        }
    }

    fn build_argv(&self, params: &AnalysisParameters) -> Vec<String> {
        let classpath = join_classpath(params.classpath);
        self.template
            .iter()
            .map(|arg| {
                arg.replace("{class}", &params.candidate.class_path_form())
                    .replace("{method}", &params.candidate.method_name)
                    .replace("{descriptor}", &params.candidate.method_descriptor)
                    .replace("{classpath}", &classpath)
                    .replace("{depth}", &params.depth.to_string())
                    .replace("{timeout}", &params.timeout_minutes.to_string())
            })
            .collect()
    }
}

impl JobRunner for CommandJobRunner {
    fn run_job(&self, params: &AnalysisParameters, sink: &dyn FactSink) -> Result<(), JobError> {
        let argv = self.build_argv(params);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| JobError::Analysis("empty engine command".to_string()))?;

        log::debug!("Launching engine: {:?}", argv);
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| JobError::Analysis(format!("failed to launch {}: {}", program, e)))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            match FactRecord::parse(line) {
                Some(record) => sink.emit(record),
                None => {
                    if !line.trim().is_empty() {
                        log::trace!("engine: {}", line);
                    }
                }
            }
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.lines().next().unwrap_or("").trim().to_string();
        match output.status.code() {
            Some(code) => Err(JobError::Analysis(format!(
                "engine exited with status {}: {}",
                code, detail
            ))),
            // Killed by a signal: the usual fate of a job that ran the
            // machine out of memory or stack.
            None => Err(JobError::ResourceExhausted(format!(
                "engine terminated by signal: {}",
                detail
            ))),
        }
    }
}

fn join_classpath(classpath: &[PathBuf]) -> String {
    env::join_paths(classpath)
        .map(|joined| joined.to_string_lossy().into_owned())
        .unwrap_or_else(|_| {
            classpath
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(":")
        })
}
