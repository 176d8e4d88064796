//! Code generation pipeline.
//!
//! ```text
//! RawDeclaration → SymbolRecord → Group → ValidatedGroup → Template Rendering → Sink
//! ```
//!
//! ## Modules
//!
//! - **grouper**: partitions records by `(package, interface)`
//! - **consistency**: component-model and constructor-shape checks
//! - **signature**: parameter declaration and forwarding lists
//! - **templates**: built-in Tera templates and the `@Generated` header
//! - **exception** / **implementation**: the two emitters
//! - **driver**: runs the pipeline and builds the [`RunReport`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use throwgen::codegen::{GenerationDriver, GenerationOptions};
//! use throwgen::diagnostics::TracingReporter;
//! use throwgen::discovery::SnapshotSource;
//! use throwgen::sink::FsSink;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = SnapshotSource::load(Path::new("markers.yaml"))?;
//! let mut sink = FsSink::new("generated-sources");
//! let mut diagnostics = TracingReporter;
//!
//! let report =
//!     GenerationDriver::new(&source, &mut sink, &mut diagnostics, GenerationOptions::default())
//!         .run()?;
//! println!("{} artifacts written", report.artifacts_written);
//! # Ok(())
//! # }
//! ```

pub mod consistency;
pub mod driver;
pub mod exception;
pub mod grouper;
pub mod implementation;
pub mod signature;
pub mod templates;

pub use consistency::{ConsistencyValidator, ShapePolicy, ValidatedGroup};
pub use driver::{
    ArtifactRecord, ConflictRecord, GenerationDriver, GenerationOptions, MalformedRecord,
    RunPhase, RunReport, WriteFailureRecord,
};
pub use exception::ExceptionTypeEmitter;
pub use grouper::group;
pub use implementation::{ComponentSettings, ImplementationEmitter};
pub use signature::{ComposedSignature, compose};
pub use templates::{MetadataHeader, TemplateRegistry};
