//! The stages one unit flows through: front end, symbol scan, rewrite passes, emission.

use crate::error::{PipelineDiagnostics, PipelineError};
use crate::pipeline::PipelineStage;
use std::sync::Arc;
use tracing::debug;
use us2cs_core::ast::{SourceFile, SourceUnit};
use us2cs_core::diagnostics::Diagnostic;
use us2cs_core::frontend::LanguageFrontend;
use us2cs_core::ty::TypeTable;
use us2cs_core::{Error, UnitSerializer};
use us2cs_passes::{PassContext, RewritePass};
use us2cs_preprocessor::{collect_symbols, PreprocessorSymbolReference};

pub const STAGE_FRONTEND: &str = "frontend";
pub const STAGE_PREPROCESSOR: &str = "preprocessor-symbols";
pub const STAGE_PASSES: &str = "rewrite-passes";
pub const STAGE_EMIT: &str = "emit";

/// Records `error` against `file` and turns it into the stage failure.
fn abort(
    stage: &'static str,
    file: &str,
    error: Error,
    diagnostics: &mut PipelineDiagnostics,
) -> PipelineError {
    diagnostics.push(Diagnostic::from_error(file, &error));
    PipelineError::new(stage, error.to_string())
}

/// A unit with its annotated tree.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub file: SourceFile,
    pub unit: SourceUnit,
    pub symbols: Vec<PreprocessorSymbolReference>,
}

#[derive(Debug, Clone)]
pub struct EmittedUnit {
    pub source_file_name: String,
    pub output: SourceFile,
}

pub struct FrontendStage {
    frontend: Arc<dyn LanguageFrontend>,
}

impl FrontendStage {
    pub fn new(frontend: Arc<dyn LanguageFrontend>) -> Self {
        Self { frontend }
    }
}

impl PipelineStage for FrontendStage {
    type SrcCtx = SourceFile;
    type DstCtx = ParsedUnit;

    fn name(&self) -> &'static str {
        STAGE_FRONTEND
    }

    fn run(
        &self,
        file: SourceFile,
        diagnostics: &mut PipelineDiagnostics,
    ) -> Result<ParsedUnit, PipelineError> {
        let unit = self
            .frontend
            .parse_and_resolve(&file)
            .map_err(|err| abort(STAGE_FRONTEND, &file.file_name, err, diagnostics))?;
        debug!(
            language = self.frontend.language(),
            decls = unit.decls.len(),
            "annotated tree ready"
        );
        Ok(ParsedUnit {
            file,
            unit,
            symbols: Vec::new(),
        })
    }
}

/// Scans the unit's source text for conditional-compilation expressions.
pub struct PreprocessorStage;

impl PipelineStage for PreprocessorStage {
    type SrcCtx = ParsedUnit;
    type DstCtx = ParsedUnit;

    fn name(&self) -> &'static str {
        STAGE_PREPROCESSOR
    }

    fn run(
        &self,
        mut parsed: ParsedUnit,
        diagnostics: &mut PipelineDiagnostics,
    ) -> Result<ParsedUnit, PipelineError> {
        let text = parsed
            .unit
            .source_text
            .as_deref()
            .unwrap_or(&parsed.file.contents);
        parsed.symbols = collect_symbols(&parsed.file.file_name, text);
        if !parsed.symbols.is_empty() {
            diagnostics.push(
                Diagnostic::info(format!(
                    "{} conditional compilation directive(s) collected",
                    parsed.symbols.len()
                ))
                .with_file(parsed.file.file_name.clone())
                .with_code(STAGE_PREPROCESSOR),
            );
        }
        Ok(parsed)
    }
}

pub struct PassesStage {
    passes: Arc<Vec<Box<dyn RewritePass>>>,
    context: PassContext,
    print_passes: bool,
}

impl PassesStage {
    pub fn new(passes: Arc<Vec<Box<dyn RewritePass>>>, context: PassContext) -> Self {
        Self {
            passes,
            context,
            print_passes: false,
        }
    }

    /// Log the tree as JSON after every pass.
    pub fn with_print_passes(mut self, enabled: bool) -> Self {
        self.print_passes = enabled;
        self
    }
}

impl PipelineStage for PassesStage {
    type SrcCtx = ParsedUnit;
    type DstCtx = ParsedUnit;

    fn name(&self) -> &'static str {
        STAGE_PASSES
    }

    fn run(
        &self,
        mut parsed: ParsedUnit,
        diagnostics: &mut PipelineDiagnostics,
    ) -> Result<ParsedUnit, PipelineError> {
        let file_name = parsed.file.file_name.clone();
        for pass in self.passes.iter() {
            debug!(pass = pass.name(), "running rewrite pass");
            parsed.unit = pass
                .rewrite_unit(parsed.unit, &self.context)
                .map_err(|err| {
                    let err = abort(STAGE_PASSES, &file_name, err, diagnostics);
                    PipelineError::new(STAGE_PASSES, format!("{}: {}", pass.name(), err.message))
                })?;
            if self.print_passes {
                match serde_json::to_string(&parsed.unit) {
                    Ok(tree) => debug!(pass = pass.name(), %tree, "tree after pass"),
                    Err(err) => debug!(pass = pass.name(), %err, "tree not printable"),
                }
            }
        }
        Ok(parsed)
    }
}

pub struct EmitStage {
    serializer: Arc<dyn UnitSerializer>,
    types: Arc<TypeTable>,
}

impl EmitStage {
    pub fn new(serializer: Arc<dyn UnitSerializer>, types: Arc<TypeTable>) -> Self {
        Self { serializer, types }
    }
}

impl PipelineStage for EmitStage {
    type SrcCtx = ParsedUnit;
    type DstCtx = EmittedUnit;

    fn name(&self) -> &'static str {
        STAGE_EMIT
    }

    fn run(
        &self,
        parsed: ParsedUnit,
        diagnostics: &mut PipelineDiagnostics,
    ) -> Result<EmittedUnit, PipelineError> {
        let file_name = parsed.file.file_name;
        let contents = self
            .serializer
            .serialize_unit(&parsed.unit, &self.types)
            .map_err(|err| abort(STAGE_EMIT, &file_name, err, diagnostics))?;
        let output_name = self.serializer.output_file_name(&file_name);
        Ok(EmittedUnit {
            source_file_name: file_name,
            output: SourceFile::new(output_name, contents),
        })
    }
}
