//! Diagnostic channel to the host toolchain.
//!
//! Notes describe what was generated. Errors describe what was skipped and
//! why; they never abort the run.

use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiagnosticLevel {
    Note,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

pub trait DiagnosticReporter {
    fn report(&mut self, level: DiagnosticLevel, message: &str);

    fn note(&mut self, message: &str) {
        self.report(DiagnosticLevel::Note, message);
    }

    fn error(&mut self, message: &str) {
        self.report(DiagnosticLevel::Error, message);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl DiagnosticReporter for TracingReporter {
    fn report(&mut self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Note => {
                tracing::info!(target: "throwgen::diagnostics", "{message}")
            }
            DiagnosticLevel::Error => {
                tracing::error!(target: "throwgen::diagnostics", "{message}")
            }
        }
    }
}

/// Keeps every diagnostic in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.messages(DiagnosticLevel::Note)
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages(DiagnosticLevel::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn messages(&self, level: DiagnosticLevel) -> impl Iterator<Item = &str> {
        self.diagnostics
            .iter()
            .filter(move |d| d.level == level)
            .map(|d| d.message.as_str())
    }
}

impl DiagnosticReporter for CollectingReporter {
    fn report(&mut self, level: DiagnosticLevel, message: &str) {
        self.diagnostics.push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}
