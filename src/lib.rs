pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod guards;
pub mod logging;
pub mod model;
pub mod sink;
pub mod validation;

pub use codegen::{GenerationDriver, GenerationOptions, RunReport, ShapePolicy};
pub use config::{CliArgs, GeneratorConfig};
pub use diagnostics::{CollectingReporter, DiagnosticReporter, TracingReporter};
pub use discovery::{DeclarationSource, SnapshotSource};
pub use error::{ConflictError, DiscoveryError, MalformedInput, RunError, WriteFailure};
pub use logging::{LoggingConfig, init_logging};
pub use sink::{ArtifactSink, FsSink, MemorySink};

use anyhow::{Context, Result};

/// Runs one generation over `source`.
pub fn run(
    source: &dyn DeclarationSource,
    sink: &mut dyn ArtifactSink,
    diagnostics: &mut dyn DiagnosticReporter,
    options: GenerationOptions,
) -> std::result::Result<RunReport, RunError> {
    GenerationDriver::new(source, sink, diagnostics, options).run()
}

/// Loads the configured snapshot and runs one generation into the output
/// directory, or into memory for a dry run.
pub fn run_with_config(config: &GeneratorConfig) -> Result<RunReport> {
    let span = logging::run_span(&config.snapshot.display().to_string());
    let _entered = span.enter();

    let source = SnapshotSource::load(&config.snapshot)
        .with_context(|| format!("failed to load marker snapshot {:?}", config.snapshot))?;
    let mut diagnostics = TracingReporter;
    let options = config.generation_options();

    let report = if config.dry_run {
        let mut sink = MemorySink::new();
        let mut report = run(&source, &mut sink, &mut diagnostics, options)?;
        tracing::info!(rendered = sink.len(), "dry run; nothing written");
        report.dry_run = true;
        report
    } else {
        let mut sink = FsSink::new(&config.output_dir);
        tracing::info!(output_dir = %config.output_dir.display(), "writing generated sources");
        run(&source, &mut sink, &mut diagnostics, options)?
    };

    Ok(report)
}
