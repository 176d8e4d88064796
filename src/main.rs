use clap::Parser;
use throwgen::{CliArgs, GeneratorConfig, LoggingConfig, init_logging, run_with_config};

fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = GeneratorConfig::from_args(cli)?;

    // Validate configuration before touching the output directory (fail-fast)
    config.validate()?;

    let report = run_with_config(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if config.fail_on_conflict && !report.is_clean() {
        anyhow::bail!(
            "{} conflict(s), {} write failure(s), {} malformed declaration(s)",
            report.conflicts.len(),
            report.write_failures.len(),
            report.malformed.len()
        );
    }
    Ok(())
}
