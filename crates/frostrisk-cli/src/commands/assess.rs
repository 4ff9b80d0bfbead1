use crate::cli::AssessArgs;
use crate::config::{PartialConfig, ResolvedRun};
use crate::error::Result;
use crate::output;
use crate::utils::progress::CliProgressHandler;
use frostrisk::engine::inputs::AssessmentInputs;
use frostrisk::engine::progress::ProgressReporter;
use frostrisk::workflows::assess::{self, AssessmentReport};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

pub async fn run(args: AssessArgs, quiet: bool, cancel: Arc<AtomicBool>) -> Result<()> {
    let progress_handler = CliProgressHandler::new(quiet);

    println!("Starting Arctic dam risk assessment...");
    let report = tokio::task::block_in_place(|| execute(&args, &progress_handler, &cancel))?;

    print_summary(&report, &args);
    Ok(())
}

fn execute(
    args: &AssessArgs,
    progress_handler: &CliProgressHandler,
    cancel: &AtomicBool,
) -> Result<AssessmentReport> {
    let partial_config = PartialConfig::load(args.inputs.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let ResolvedRun { inputs, config } = partial_config.resolve(&args.inputs, &args.overrides)?;
    info!(
        scenario = %config.scenario,
        target_year = config.target_year,
        assessment_year = config.assessment_year,
        "Configuration resolved."
    );

    info!("Loading input tables from {:?}", &inputs.dams);
    let inputs = AssessmentInputs::load(&inputs)?;

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    info!("Invoking the core assessment workflow...");
    let report = assess::run(&inputs, &config, &reporter, cancel)?;

    output::write_records(&args.output, report.assessments())?;
    if let Some(path) = &args.summary {
        output::write_toml(path, &report.summary)?;
    }
    Ok(report)
}

fn print_summary(report: &AssessmentReport, args: &AssessArgs) {
    let summary = &report.summary;
    let count = |map: &std::collections::BTreeMap<String, usize>, key: &str| {
        map.get(key).copied().unwrap_or(0)
    };

    if summary.cancelled {
        warn!(unscheduled = summary.unscheduled, "Run was interrupted.");
        println!(
            "Warning: interrupted; {} dam(s) were never assessed.",
            summary.unscheduled
        );
    }
    println!(
        "Assessed {} of {} Arctic dam(s) from {} row(s) under {} for {}.",
        summary.assessed,
        summary.arctic_dams,
        summary.total_rows,
        summary.scenario,
        summary.target_year
    );
    println!(
        "  Risk:     HIGH {}  MEDIUM {}  LOW {}",
        count(&summary.risk_categories, "HIGH"),
        count(&summary.risk_categories, "MEDIUM"),
        count(&summary.risk_categories, "LOW"),
    );
    println!(
        "  Weather:  {} real, {} fallback",
        count(&summary.weather_provenance, "real"),
        count(&summary.weather_provenance, "fallback"),
    );
    println!(
        "  Registry: {} validated, {} unvalidated",
        count(&summary.registry_provenance, "validated"),
        count(&summary.registry_provenance, "unvalidated"),
    );
    if !summary.skipped.is_empty() {
        println!("  Skipped:  {} row(s)", summary.skipped.len());
    }
    println!("✓ Records written to: {}", args.output.display());
    if let Some(path) = &args.summary {
        println!("✓ Summary written to: {}", path.display());
    }
}
