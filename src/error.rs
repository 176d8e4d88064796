//! Error taxonomy for a generation run.
//!
//! Only [`RunError`] aborts a run. Everything else is recovered at the
//! smallest enclosing scope and recorded in the
//! [`RunReport`](crate::codegen::RunReport):
//!
//! - [`MalformedInput`]: one declaration is skipped
//! - [`ConflictError`]: one group (or one claimed target) is skipped
//! - [`WriteFailure`]: one artifact is skipped

use crate::discovery::ElementKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Inconsistent configuration within a group, or a target claimed twice in one run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// Members of one interface disagree on the component model
    #[error(
        "all marked methods of {interface} must share the same component model: \
         '{expected}' on the first method, '{found}' on {method}"
    )]
    ComponentModelMismatch {
        interface: String,
        method: String,
        expected: String,
        found: String,
    },

    /// Forwarded arguments cannot match any constructor of a Standard exception
    #[error(
        "{interface}.{method} forwards ({parameters}) to {exception}, which only declares \
         (String) and (String, Object[]) constructors; declare it with custom parameter order"
    )]
    ConstructorShape {
        interface: String,
        method: String,
        exception: String,
        parameters: String,
    },

    /// A target (package + type name) was already claimed earlier in the run
    #[error("{target} is already generated by {owner}; {interface} cannot claim it again")]
    DuplicateTarget {
        interface: String,
        target: String,
        owner: String,
    },
}

impl ConflictError {
    /// Name of the interface whose output is skipped
    pub fn interface_name(&self) -> &str {
        match self {
            ConflictError::ComponentModelMismatch { interface, .. }
            | ConflictError::ConstructorShape { interface, .. }
            | ConflictError::DuplicateTarget { interface, .. } => interface,
        }
    }
}

/// A marker or declaration missing a required piece of information.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedInput {
    #[error("{declaration}: {field} must not be empty")]
    EmptyField {
        declaration: String,
        field: &'static str,
    },

    #[error("{declaration}: '{value}' is not a valid {kind}")]
    InvalidName {
        declaration: String,
        kind: &'static str,
        value: String,
    },

    #[error("{declaration}: marker placed on {found} declaration, expected {expected}")]
    MisplacedMarker {
        declaration: String,
        found: ElementKind,
        expected: ElementKind,
    },

    #[error("{declaration}: owning type could not be resolved")]
    UnresolvedScope { declaration: String },

    #[error("{declaration}: parameter name '{name}' is declared more than once")]
    DuplicateParameter { declaration: String, name: String },
}

impl MalformedInput {
    /// Display name of the offending declaration
    pub fn declaration(&self) -> &str {
        match self {
            MalformedInput::EmptyField { declaration, .. }
            | MalformedInput::InvalidName { declaration, .. }
            | MalformedInput::MisplacedMarker { declaration, .. }
            | MalformedInput::UnresolvedScope { declaration }
            | MalformedInput::DuplicateParameter { declaration, .. } => declaration,
        }
    }
}

/// Failure of the external discovery collaborator.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read marker snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse marker snapshot {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("unsupported marker snapshot format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("declaration source failed: {message}")]
    Source { message: String },
}

/// Errors raised by an [`ArtifactSink`](crate::sink::ArtifactSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{target} already exists")]
    AlreadyExists { target: String },

    #[error("invalid target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("I/O error on {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: io::Error,
    },
}

/// Template compilation or rendering failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to register template '{name}': {source}")]
    Register {
        name: &'static str,
        #[source]
        source: tera::Error,
    },

    #[error("failed to render template '{name}': {source}")]
    Render {
        name: &'static str,
        #[source]
        source: tera::Error,
    },
}

/// One artifact could not be produced or handed to the sink.
#[derive(Debug, Error)]
pub enum WriteFailure {
    #[error("could not render {target}: {source}")]
    Render {
        target: String,
        #[source]
        source: RenderError,
    },

    #[error("could not write {target}: {source}")]
    Sink {
        target: String,
        #[source]
        source: SinkError,
    },
}

impl WriteFailure {
    /// Qualified name of the artifact that was skipped
    pub fn target_name(&self) -> &str {
        match self {
            WriteFailure::Render { target, .. } | WriteFailure::Sink { target, .. } => target,
        }
    }
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("built-in templates are unusable: {0}")]
    Templates(#[from] RenderError),
}
