//! Batch conversion of UnityScript files into C# files.

use crate::config::ConverterOptions;
use crate::error::PipelineDiagnostics;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{
    EmitStage, EmittedUnit, FrontendStage, ParsedUnit, PassesStage, PreprocessorStage,
};
use std::sync::Arc;
use tracing::{info, info_span, warn};
use us2cs_core::ast::SourceFile;
use us2cs_core::diagnostics::Diagnostic;
use us2cs_core::frontend::LanguageFrontend;
use us2cs_csharp::CSharpSerializer;
use us2cs_passes::{standard_passes, RewritePass};
use us2cs_preprocessor::PreprocessorSymbolReference;

/// Everything a batch produced.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// One file per unit that converted, in input order.
    pub outputs: Vec<SourceFile>,
    pub diagnostics: Vec<Diagnostic>,
    /// Conditional-compilation expressions, in file then appearance order.
    pub symbols: Vec<PreprocessorSymbolReference>,
}

impl ConversionReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn output(&self, file_name: &str) -> Option<&SourceFile> {
        self.outputs.iter().find(|output| output.file_name == file_name)
    }

    /// Diagnostics reported against `file_name`.
    pub fn diagnostics_for<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.file.as_deref() == Some(file_name))
    }
}

pub struct Converter {
    options: ConverterOptions,
    front: Pipeline<SourceFile, ParsedUnit>,
    back: Pipeline<ParsedUnit, EmittedUnit>,
}

impl Converter {
    pub fn new(frontend: Arc<dyn LanguageFrontend>, options: ConverterOptions) -> Self {
        Self::with_passes(frontend, options, standard_passes())
    }

    /// Converter running `passes` instead of the standard sequence.
    pub fn with_passes(
        frontend: Arc<dyn LanguageFrontend>,
        options: ConverterOptions,
        passes: Vec<Box<dyn RewritePass>>,
    ) -> Self {
        let types = frontend.type_table();
        let front = PipelineBuilder::new()
            .add_stage(FrontendStage::new(frontend))
            .add_stage(PreprocessorStage)
            .build();
        let passes = PassesStage::new(Arc::new(passes), options.pass_context(types.clone()))
            .with_print_passes(options.debug.print_passes);
        let serializer = Arc::new(CSharpSerializer::new(options.printer_config()));
        let back = PipelineBuilder::new()
            .add_stage(passes)
            .add_stage(EmitStage::new(serializer, types))
            .build();
        Self {
            options,
            front,
            back,
        }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Stage names in the order a unit visits them.
    pub fn stages(&self) -> Vec<&'static str> {
        self.front
            .stages()
            .iter()
            .chain(self.back.stages())
            .copied()
            .collect()
    }

    /// Converts every file; a failing unit is skipped and reported, the others still convert.
    pub fn convert(&self, files: &[SourceFile]) -> ConversionReport {
        let mut diagnostics = PipelineDiagnostics::default();
        let mut report = ConversionReport::default();
        for (index, file) in files.iter().enumerate() {
            let span = info_span!("unit", file = %file.file_name);
            let _enter = span.enter();

            let converted = self
                .front
                .run(file.clone(), &mut diagnostics, &self.options)
                .and_then(|parsed| {
                    report.symbols.extend(parsed.symbols.iter().cloned());
                    self.back.run(parsed, &mut diagnostics, &self.options)
                });
            match converted {
                Ok(emitted) => {
                    info!(output = %emitted.output.file_name, "unit converted");
                    report.outputs.push(emitted.output);
                }
                Err(err) => {
                    warn!(stage = err.stage, "unit aborted: {}", err.message);
                    if !self.options.error_tolerance.continue_on_error {
                        warn!("stopping batch after the first failed unit");
                        for skipped in &files[index + 1..] {
                            diagnostics.push(
                                Diagnostic::warning("not converted: an earlier unit failed")
                                    .with_file(skipped.file_name.clone())
                                    .with_suggestion("enable error_tolerance.continue_on_error"),
                            );
                        }
                        break;
                    }
                }
            }
        }
        report.diagnostics = diagnostics.into_items();
        report
    }
}
