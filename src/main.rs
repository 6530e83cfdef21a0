// Thu Jan 22 2026 - Alex

use clap::Parser;
use colored::Colorize;
use factminer::{
    exit, utils, ClassfileIntrospector, CommandJobRunner, DatalogSink, DiscoveryConfiguration,
    FactSink, FlushGuard, MethodDescriptor, MethodEnumerator, Orchestrator, Watchdog,
};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Analyzer and orchestrator of test programs", long_about = None)]
struct Args {
    /// JSON file configuring the analysis
    #[arg(short = 'a', long = "analyze", value_name = "CONF_FILE")]
    config: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    utils::logging::init(args.verbose);

    let config = match DiscoveryConfiguration::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Error while loading configuration: {}", e);
            process::exit(exit::USAGE);
        }
    };

    println!("{} Discovering test methods...", "[*]".blue());
    let introspector = ClassfileIntrospector::new();
    let enumerator = match MethodEnumerator::discover(&config, &introspector) {
        Ok(enumerator) => enumerator,
        Err(e) => {
            log::error!("Error while enumerating test programs: {}", e);
            process::exit(exit::SOFTWARE);
        }
    };
    println!(
        "{} Discovered {} candidate test methods",
        "[+]".green(),
        enumerator.len()
    );

    if let Some(list_path) = &config.test_programs_list {
        if let Err(e) = write_candidate_list(list_path, enumerator.methods()) {
            log::error!(
                "Failed to write candidate list to {}: {}",
                list_path.display(),
                e
            );
            process::exit(exit::CONFIG);
        }
        println!(
            "{} Candidate list saved to: {}",
            "[+]".green(),
            list_path.display()
        );
    }

    let output = config.output_file_or_default();
    println!("{} Writing facts to: {}", "[*]".blue(), output.display());
    let sink: Arc<dyn FactSink> = Arc::new(DatalogSink::new(output));

    let orchestrator = Orchestrator::new(&config, sink.clone());

    // Installed before the first candidate: any exit path from here on
    // runs a final accounting log and an idempotent flush.
    let _guard = FlushGuard::new(sink.clone(), orchestrator.state());
    let watchdog = Watchdog::start(config.timeout, sink.clone(), orchestrator.state());

    let runner = CommandJobRunner::new(&config.engine_command);
    let summary = orchestrator.run(enumerator.methods(), &runner);
    watchdog.stop();

    println!(
        "{} Analyzed {} methods ({} failed) in {:.2}s",
        "[+]".green(),
        summary.analyzed,
        summary.failed,
        summary.elapsed.as_secs_f64()
    );
}

fn write_candidate_list(path: &Path, methods: &[MethodDescriptor]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(methods)?;
    std::fs::write(path, json)?;
    Ok(())
}
