//! Generation driver.
//!
//! ```text
//! Idle → Discovering → Building → Grouping → (per group: Validating → Emitting) → Done
//! ```
//!
//! Only a failing [`DeclarationSource`] aborts a run. Malformed declarations,
//! conflicting groups and failed writes are reported and skipped; the run
//! still reaches `Done`.

use crate::codegen::consistency::{ConsistencyValidator, ShapePolicy};
use crate::codegen::exception::ExceptionTypeEmitter;
use crate::codegen::grouper::group;
use crate::codegen::implementation::{ComponentSettings, ImplementationEmitter};
use crate::codegen::templates::{MetadataHeader, TemplateRegistry};
use crate::diagnostics::DiagnosticReporter;
use crate::discovery::{DeclarationSource, ElementKind, RawDeclaration};
use crate::error::{ConflictError, MalformedInput, RenderError, RunError, WriteFailure};
use crate::guards::{DeterminismGuard, OutputOverlapGuard};
use crate::model::{
    ExceptionCatalog, ExceptionSpec, GeneratedArtifact, Marker, MarkerKind, SymbolRecord, qualify,
};
use crate::sink::{ArtifactSink, write_artifact};
use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Discovering,
    Building,
    Grouping,
    Validating,
    Emitting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Stamp Standard exceptions and implementations with `@Generated`
    pub metadata_header: bool,
    /// Require one component model per group
    pub consistency_check: bool,
    pub shape_policy: ShapePolicy,
    pub component: ComponentSettings,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            metadata_header: true,
            consistency_check: true,
            shape_policy: ShapePolicy::Strict,
            component: ComponentSettings::default(),
        }
    }
}

// =============================================================================
// Run report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub package: String,
    pub name: String,
    /// SHA-256 of the body with the header timestamp masked
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub interface_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailureRecord {
    pub target_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRecord {
    pub declaration: String,
    pub reason: String,
}

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// True once any marker was observed, whatever happened afterwards
    pub claimed: bool,
    /// Rendered only; the sink kept everything in memory
    pub dry_run: bool,
    /// Artifacts accepted by the sink
    pub artifacts_written: usize,
    pub artifacts: Vec<ArtifactRecord>,
    pub conflicts: Vec<ConflictRecord>,
    pub write_failures: Vec<WriteFailureRecord>,
    pub malformed: Vec<MalformedRecord>,
    /// SHA-256 over the normalized input; absent when nothing was claimed
    pub input_fingerprint: Option<String>,
}

impl RunReport {
    /// No conflicts, write failures or malformed declarations.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.write_failures.is_empty() && self.malformed.is_empty()
    }

    pub fn artifact(&self, qualified_name: &str) -> Option<&ArtifactRecord> {
        self.artifacts
            .iter()
            .find(|a| qualify(&a.package, &a.name) == qualified_name)
    }
}

// =============================================================================
// Driver
// =============================================================================

pub struct GenerationDriver<'a> {
    source: &'a dyn DeclarationSource,
    sink: &'a mut dyn ArtifactSink,
    diagnostics: &'a mut dyn DiagnosticReporter,
    options: GenerationOptions,
    header: Option<MetadataHeader>,
    phase: RunPhase,
}

impl<'a> GenerationDriver<'a> {
    pub fn new(
        source: &'a dyn DeclarationSource,
        sink: &'a mut dyn ArtifactSink,
        diagnostics: &'a mut dyn DiagnosticReporter,
        options: GenerationOptions,
    ) -> Self {
        Self {
            source,
            sink,
            diagnostics,
            options,
            header: None,
            phase: RunPhase::Idle,
        }
    }

    /// Uses `header` instead of one stamped at run time. Ignored when the
    /// metadata header is disabled.
    pub fn with_metadata_header(mut self, header: MetadataHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn run(&mut self) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();

        self.enter(RunPhase::Discovering);
        let type_declarations = self.source.discover(MarkerKind::Type)?;
        let method_declarations = self.source.discover(MarkerKind::Method)?;
        if type_declarations.is_empty() && method_declarations.is_empty() {
            tracing::debug!("no marked declarations; nothing to generate");
            self.enter(RunPhase::Done);
            return Ok(report);
        }
        report.claimed = true;

        let templates = TemplateRegistry::new()?;
        let header = match (self.options.metadata_header, self.header.take()) {
            (false, _) => None,
            (true, Some(header)) => Some(header),
            (true, None) => Some(MetadataHeader::now()),
        };

        self.enter(RunPhase::Building);
        let specs = self.build_specs(&type_declarations, &mut report);
        let records = self.build_records(&method_declarations, &mut report);
        report.input_fingerprint = Some(DeterminismGuard::fingerprint(&specs, &records));
        let catalog = ExceptionCatalog::from_specs(&specs);

        self.enter(RunPhase::Grouping);
        let groups = group(records);
        tracing::debug!(
            exceptions = specs.len(),
            groups = groups.len(),
            "partitioned marked declarations"
        );

        let mut overlap = OutputOverlapGuard::new();

        self.enter(RunPhase::Emitting);
        let exceptions = ExceptionTypeEmitter::new(&templates, header.as_ref());
        for spec in &specs {
            let owner = qualify(&spec.package, &spec.origin_interface);
            if let Err(conflict) = overlap.claim(&spec.package, &spec.name, &owner) {
                self.record_conflict(conflict, &mut report);
                continue;
            }
            let target = spec.qualified_name();
            let rendered = exceptions.render(spec, &spec.package);
            self.emit(target, rendered, &mut report);
        }

        let mut validator =
            ConsistencyValidator::new().with_component_model_check(self.options.consistency_check);
        if self.options.shape_policy != ShapePolicy::Off {
            validator = validator.with_catalog(&catalog, self.options.shape_policy);
        }
        let component = self.options.component.clone();
        let implementations = ImplementationEmitter::new(&templates, header.as_ref(), &component);

        for group in groups {
            self.enter(RunPhase::Validating);
            let validated = match validator.validate(group) {
                Ok(validated) => validated,
                Err(conflict) => {
                    self.record_conflict(conflict, &mut report);
                    continue;
                }
            };
            for warning in validated.warnings() {
                tracing::warn!(interface = %warning.interface_name(), "{warning}");
                self.diagnostics.error(&warning.to_string());
            }

            self.enter(RunPhase::Emitting);
            let group = validated.group();
            let owner = group.key().qualified_interface();
            let name = group.implementation_name();
            if let Err(conflict) = overlap.claim(group.package(), &name, &owner) {
                self.record_conflict(conflict, &mut report);
                continue;
            }
            let rendered = implementations.render(&validated);
            self.emit(qualify(group.package(), &name), rendered, &mut report);
        }

        self.enter(RunPhase::Done);
        tracing::info!(
            artifacts = report.artifacts_written,
            conflicts = report.conflicts.len(),
            write_failures = report.write_failures.len(),
            malformed = report.malformed.len(),
            "generation run finished"
        );
        Ok(report)
    }

    fn enter(&mut self, phase: RunPhase) {
        if self.phase != phase {
            tracing::debug!(from = %self.phase, to = %phase, "run phase");
            self.phase = phase;
        }
    }

    fn build_specs(
        &mut self,
        declarations: &[RawDeclaration],
        report: &mut RunReport,
    ) -> Vec<ExceptionSpec> {
        let mut specs = Vec::new();
        for declaration in declarations {
            let Marker::ExceptionMaker(marker) = &declaration.marker else {
                continue;
            };
            let built = expect_element(declaration, ElementKind::Interface)
                .and_then(|()| self.source.resolve_owning_scope(declaration))
                .and_then(|scope| ExceptionSpec::from_marker(declaration, &scope, marker));
            match built {
                Ok(built) => {
                    for spec in &built {
                        let origin = qualify(&spec.package, &spec.origin_interface);
                        tracing::debug!(exception = %spec.qualified_name(), %origin, "exception declared");
                        self.diagnostics
                            .note(&format!("exception {} declared by {origin}", spec.qualified_name()));
                    }
                    specs.extend(built);
                }
                Err(malformed) => self.record_malformed(malformed, report),
            }
        }
        specs
    }

    fn build_records(
        &mut self,
        declarations: &[RawDeclaration],
        report: &mut RunReport,
    ) -> Vec<SymbolRecord> {
        let mut records = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let Marker::ExceptionRunner(marker) = &declaration.marker else {
                continue;
            };
            let built = expect_element(declaration, ElementKind::Method)
                .and_then(|()| self.source.resolve_owning_scope(declaration))
                .and_then(|scope| SymbolRecord::from_declaration(declaration, &scope, marker));
            match built {
                Ok(record) => {
                    self.diagnostics.note(&format!(
                        "method {} of {} throws {}",
                        record.method_name(),
                        record.group_key().qualified_interface(),
                        record.exception_type_name()
                    ));
                    records.push(record);
                }
                Err(malformed) => self.record_malformed(malformed, report),
            }
        }
        records
    }

    fn emit(
        &mut self,
        target: String,
        rendered: Result<GeneratedArtifact, RenderError>,
        report: &mut RunReport,
    ) {
        let artifact = match rendered {
            Ok(artifact) => artifact,
            Err(source) => {
                self.record_write_failure(WriteFailure::Render { target, source }, report);
                return;
            }
        };

        if let Err(source) = write_artifact(&mut *self.sink, &artifact) {
            self.record_write_failure(WriteFailure::Sink { target, source }, report);
            return;
        }

        tracing::info!(artifact = %target, bytes = artifact.body.len(), "generated artifact");
        self.diagnostics.note(&format!("generated {target}"));
        report.artifacts_written += 1;
        report.artifacts.push(ArtifactRecord {
            package: artifact.target_package,
            name: artifact.target_name,
            content_hash: DeterminismGuard::content_hash(&artifact.body),
        });
    }

    fn record_malformed(&mut self, malformed: MalformedInput, report: &mut RunReport) {
        tracing::warn!(declaration = %malformed.declaration(), "skipping malformed declaration: {malformed}");
        self.diagnostics.error(&malformed.to_string());
        report.malformed.push(MalformedRecord {
            declaration: malformed.declaration().to_string(),
            reason: malformed.to_string(),
        });
    }

    fn record_conflict(&mut self, conflict: ConflictError, report: &mut RunReport) {
        tracing::warn!(interface = %conflict.interface_name(), "skipping conflicting output: {conflict}");
        self.diagnostics.error(&conflict.to_string());
        report.conflicts.push(ConflictRecord {
            interface_name: conflict.interface_name().to_string(),
            reason: conflict.to_string(),
        });
    }

    fn record_write_failure(&mut self, failure: WriteFailure, report: &mut RunReport) {
        tracing::warn!(artifact = %failure.target_name(), "skipping artifact: {failure}");
        self.diagnostics.error(&failure.to_string());
        report.write_failures.push(WriteFailureRecord {
            target_name: failure.target_name().to_string(),
            reason: failure.to_string(),
        });
    }
}

fn expect_element(declaration: &RawDeclaration, expected: ElementKind) -> Result<(), MalformedInput> {
    if declaration.element == expected {
        Ok(())
    } else {
        Err(MalformedInput::MisplacedMarker {
            declaration: declaration.display_name(),
            found: declaration.element,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingReporter;
    use crate::discovery::SnapshotSource;
    use crate::error::DiscoveryError;
    use crate::sink::MemorySink;
    use assert_matches::assert_matches;

    const ORDERS: &str = r#"
declarations:
  - element: interface
    package: billing
    name: Orders
    marker: { type: exception_maker, exception_names: [OrderNotFound] }
  - element: method
    package: billing
    enclosing: Orders
    name: find
    return_type: Order
    parameters: [{ type: String, name: id }]
    marker: { type: exception_runner, exception_type: OrderNotFound, component_model: spring }
"#;

    fn options() -> GenerationOptions {
        GenerationOptions {
            metadata_header: false,
            ..GenerationOptions::default()
        }
    }

    fn run(yaml: &str, options: GenerationOptions) -> (RunReport, MemorySink, CollectingReporter) {
        let source = SnapshotSource::from_yaml_str(yaml).unwrap();
        let mut sink = MemorySink::new();
        let mut diagnostics = CollectingReporter::new();
        let report = GenerationDriver::new(&source, &mut sink, &mut diagnostics, options)
            .run()
            .unwrap();
        (report, sink, diagnostics)
    }

    #[test]
    fn empty_snapshot_is_a_quiet_success() {
        let (report, sink, diagnostics) = run("declarations: []", options());
        assert!(!report.claimed);
        assert_eq!(report.artifacts_written, 0);
        assert!(report.input_fingerprint.is_none());
        assert!(sink.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn end_to_end_generates_exception_and_implementation() {
        let (report, sink, diagnostics) = run(ORDERS, options());

        assert!(report.claimed);
        assert!(report.is_clean());
        assert_eq!(report.artifacts_written, 2);
        assert_eq!(
            sink.names().collect::<Vec<_>>(),
            ["billing.OrderNotFound", "billing.OrdersImpl"]
        );
        assert!(
            sink.get("billing.OrdersImpl")
                .unwrap()
                .contains("throw new OrderNotFound(id);")
        );
        assert_eq!(
            diagnostics.notes().collect::<Vec<_>>(),
            [
                "exception billing.OrderNotFound declared by billing.Orders",
                "method find of billing.Orders throws OrderNotFound",
                "generated billing.OrderNotFound",
                "generated billing.OrdersImpl",
            ]
        );
        assert_eq!(diagnostics.errors().count(), 0);
    }

    #[test]
    fn driver_ends_in_done() {
        let source = SnapshotSource::from_yaml_str(ORDERS).unwrap();
        let mut sink = MemorySink::new();
        let mut diagnostics = CollectingReporter::new();
        let mut driver = GenerationDriver::new(&source, &mut sink, &mut diagnostics, options());
        assert_eq!(driver.phase(), RunPhase::Idle);
        driver.run().unwrap();
        assert_eq!(driver.phase(), RunPhase::Done);
    }

    #[test]
    fn misplaced_markers_are_skipped() {
        let yaml = r#"
declarations:
  - element: class
    package: billing
    name: Invoice
    marker: { type: exception_maker, exception_names: [InvoiceMissing] }
  - element: field
    package: billing
    enclosing: Orders
    name: cache
    marker: { type: exception_runner, exception_type: Boom }
"#;
        let (report, sink, diagnostics) = run(yaml, options());
        assert!(report.claimed);
        assert!(sink.is_empty());
        assert_eq!(report.malformed.len(), 2);
        assert_eq!(report.malformed[0].declaration, "billing.Invoice");
        assert_eq!(diagnostics.errors().count(), 2);
    }

    #[test]
    fn strict_shape_policy_skips_only_the_offending_group() {
        let yaml = r#"
declarations:
  - element: interface
    package: billing
    name: Orders
    marker: { type: exception_maker, exception_names: [OrderNotFound] }
  - element: method
    package: billing
    enclosing: Orders
    name: byNumber
    return_type: Order
    parameters: [{ type: long, name: number }]
    marker: { type: exception_runner, exception_type: OrderNotFound }
  - element: method
    package: billing
    enclosing: Invoices
    name: issue
    return_type: void
    parameters: [{ type: String, name: message }]
    marker: { type: exception_runner, exception_type: OrderNotFound }
"#;
        let (report, sink, _) = run(yaml, options());
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].interface_name, "billing.Orders");
        assert!(sink.get("billing.OrdersImpl").is_none());
        assert!(sink.get("billing.InvoicesImpl").is_some());
        assert!(sink.get("billing.OrderNotFound").is_some());
    }

    #[test]
    fn duplicate_exception_names_are_claimed_once() {
        let yaml = r#"
declarations:
  - element: interface
    package: billing
    name: Orders
    marker: { type: exception_maker, exception_names: [Missing] }
  - element: interface
    package: billing
    name: Invoices
    marker: { type: exception_maker, exception_names: [Missing], custom_parameter_order: true }
"#;
        let (report, sink, _) = run(yaml, options());
        assert_eq!(report.artifacts_written, 1);
        assert_matches!(
            report.conflicts.as_slice(),
            [ConflictRecord { interface_name, .. }] if interface_name == "billing.Invoices"
        );
        assert!(sink.get("billing.Missing").unwrap().contains("String message"));
    }

    #[test]
    fn write_failures_skip_one_artifact() {
        let source = SnapshotSource::from_yaml_str(ORDERS).unwrap();
        let mut sink = MemorySink::new().reject_existing();
        sink.preload("billing.OrderNotFound", "// hand written\n");
        let mut diagnostics = CollectingReporter::new();

        let report = GenerationDriver::new(&source, &mut sink, &mut diagnostics, options())
            .run()
            .unwrap();

        assert_eq!(report.artifacts_written, 1);
        assert_eq!(report.write_failures.len(), 1);
        assert_eq!(report.write_failures[0].target_name, "billing.OrderNotFound");
        assert_eq!(sink.get("billing.OrderNotFound"), Some("// hand written\n"));
        assert!(sink.get("billing.OrdersImpl").is_some());
    }

    struct FailingSource;

    impl DeclarationSource for FailingSource {
        fn discover(&self, _kind: MarkerKind) -> Result<Vec<RawDeclaration>, DiscoveryError> {
            Err(DiscoveryError::Source {
                message: "symbol table unavailable".into(),
            })
        }
    }

    #[test]
    fn discovery_failure_is_fatal() {
        let mut sink = MemorySink::new();
        let mut diagnostics = CollectingReporter::new();
        let result =
            GenerationDriver::new(&FailingSource, &mut sink, &mut diagnostics, options()).run();
        assert_matches!(result, Err(RunError::Discovery(DiscoveryError::Source { .. })));
    }
}
