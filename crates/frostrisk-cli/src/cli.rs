use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The frostrisk developers",
    version,
    about = "frostrisk - climate-risk scoring for hydropower dams above the Arctic Circle.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence console logging and the progress bar. Errors are still reported,
    /// and `--log-file` keeps recording at the `-v` level
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel scoring.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every Arctic dam and write the per-dam records and the batch summary.
    Assess(AssessArgs),
    /// Build the Arctic dam population and print descriptive statistics.
    Locate(LocateArgs),
}

/// Input tables and configuration shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Path to the main configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dam population CSV. Overrides `inputs.dams` from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub dams: Option<PathBuf>,

    /// Authoritative registry CSV used to validate dam attributes.
    #[arg(short, long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Weather station series CSV. Can be given multiple times.
    #[arg(short, long = "weather", value_name = "PATH")]
    pub weather: Vec<PathBuf>,

    /// Station catalog CSV replacing the built-in Arctic stations.
    #[arg(long, value_name = "PATH")]
    pub stations: Option<PathBuf>,

    /// Climate projection table CSV replacing the built-in table.
    #[arg(long, value_name = "PATH")]
    pub projections: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S weights.permafrost=0.45
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Overrides for the assessment parameters.
#[derive(Args, Debug, Clone, Default)]
pub struct AssessmentOverrides {
    /// Emissions scenario, e.g. SSP2-4.5.
    #[arg(short, long, value_name = "NAME")]
    pub scenario: Option<String>,

    /// Year the climate projection is evaluated for.
    #[arg(short, long, value_name = "YEAR")]
    pub target_year: Option<i32>,

    /// Year dam ages are measured against.
    #[arg(long, value_name = "YEAR")]
    pub assessment_year: Option<i32>,

    /// TOML file with `[soil]` and `[ice]` thermal constants.
    #[arg(long, value_name = "PATH")]
    pub thermal: Option<PathBuf>,
}

/// Arguments for the `assess` subcommand.
#[derive(Args, Debug)]
pub struct AssessArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub overrides: AssessmentOverrides,

    /// Path for the per-dam records CSV.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path for the batch summary TOML.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

/// Arguments for the `locate` subcommand.
#[derive(Args, Debug)]
pub struct LocateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Write the population statistics as TOML instead of printing them.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
