use crate::config::ConverterOptions;
use tracing::{debug, error, warn};
use us2cs_core::diagnostics::{Diagnostic, DiagnosticLevel};

/// Diagnostics gathered across the stages of a batch.
#[derive(Debug, Default, Clone)]
pub struct PipelineDiagnostics {
    pub items: Vec<Diagnostic>,
    logged: usize,
}

impl PipelineDiagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        self.items.extend(diagnostics);
    }

    /// Logs the diagnostics added since the previous call.
    pub fn emit_stage(&mut self, stage: &'static str, options: &ConverterOptions) {
        for diagnostic in &self.items[self.logged..] {
            match diagnostic.level {
                DiagnosticLevel::Error => error!(stage, "{}", diagnostic),
                DiagnosticLevel::Warning => warn!(stage, "{}", diagnostic),
                DiagnosticLevel::Info if options.debug.verbose => debug!(stage, "{}", diagnostic),
                DiagnosticLevel::Info => {}
            }
        }
        self.logged = self.items.len();
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{stage}] {message}")]
pub struct PipelineError {
    pub stage: &'static str,
    pub message: String,
}

impl PipelineError {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    /// Attributes the failure to `stage` unless a stage already claimed it.
    pub fn claimed_by(self, stage: &'static str) -> Self {
        if self.stage == stage {
            self
        } else {
            Self::new(stage, self.message)
        }
    }
}
