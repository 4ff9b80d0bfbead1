use crate::cli::{AssessmentOverrides, LocateArgs};
use crate::config::{PartialConfig, ResolvedRun};
use crate::error::Result;
use crate::output;
use frostrisk::engine::inputs::AssessmentInputs;
use frostrisk::workflows::locate::{self, LocateReport};
use tracing::info;

pub async fn run(args: LocateArgs) -> Result<()> {
    let report = tokio::task::block_in_place(|| execute(&args))?;

    match &args.output {
        Some(path) => {
            output::write_toml(path, &report.stats)?;
            println!(
                "✓ {} Arctic dam(s) located; statistics written to: {}",
                report.stats.arctic_dams,
                path.display()
            );
        }
        None => print!("{}", output::to_toml(&report.stats)?),
    }
    Ok(())
}

fn execute(args: &LocateArgs) -> Result<LocateReport> {
    let partial_config = PartialConfig::load(args.inputs.config.as_deref())?;
    let ResolvedRun { inputs, config } =
        partial_config.resolve(&args.inputs, &AssessmentOverrides::default())?;

    info!("Loading input tables from {:?}", &inputs.dams);
    let inputs = AssessmentInputs::load(&inputs)?;
    Ok(locate::run(&inputs, &config.zones, &config.territory))
}
