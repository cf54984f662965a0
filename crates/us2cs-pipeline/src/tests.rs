use crate::config::ConverterOptions;
use crate::error::{PipelineDiagnostics, PipelineError};
use crate::pipeline::{PipelineBuilder, PipelineStage};
use pretty_assertions::assert_eq;
use us2cs_core::diagnostics::Diagnostic;

struct Double;

impl PipelineStage for Double {
    type SrcCtx = i64;
    type DstCtx = i64;

    fn name(&self) -> &'static str {
        "double"
    }

    fn run(&self, value: i64, _diagnostics: &mut PipelineDiagnostics) -> Result<i64, PipelineError> {
        Ok(value * 2)
    }
}

struct RejectOdd;

impl PipelineStage for RejectOdd {
    type SrcCtx = i64;
    type DstCtx = String;

    fn name(&self) -> &'static str {
        "reject-odd"
    }

    fn run(&self, value: i64, diagnostics: &mut PipelineDiagnostics) -> Result<String, PipelineError> {
        if value % 2 != 0 {
            diagnostics.push(Diagnostic::error(format!("{} is odd", value)));
            return Err(PipelineError::new("inner", "odd value"));
        }
        Ok(value.to_string())
    }
}

#[test]
fn stages_run_in_order() {
    let pipeline = PipelineBuilder::new()
        .add_stage(Double)
        .add_stage(Double)
        .add_stage(RejectOdd)
        .build();
    assert_eq!(pipeline.stages(), ["double", "double", "reject-odd"]);
    let mut diagnostics = PipelineDiagnostics::default();
    let result = pipeline.run(3, &mut diagnostics, &ConverterOptions::default());
    assert_eq!(result, Ok("12".to_string()));
    assert!(diagnostics.items.is_empty());
}

#[test]
fn failing_stage_names_itself() {
    let pipeline = PipelineBuilder::new().add_stage(RejectOdd).build();
    let mut diagnostics = PipelineDiagnostics::default();
    let err = pipeline
        .run(3, &mut diagnostics, &ConverterOptions::default())
        .unwrap_err();
    assert_eq!(err, PipelineError::new("reject-odd", "odd value"));
    assert_eq!(err.to_string(), "[reject-odd] odd value");
    assert!(diagnostics.has_errors());
}

#[test]
fn options_default_to_unity_conventions() {
    let options = ConverterOptions::default();
    assert_eq!(options.baseline_imports, vec!["UnityEngine", "System.Collections"]);
    assert_eq!(options.extension, "cs");
    assert_eq!(options.indent_width, 4);
    assert!(options.serializable_classes);
    assert!(options.error_tolerance.continue_on_error);
    assert!(!options.known_apis.is_empty());
}

#[test]
fn options_load_from_partial_json() {
    let options = ConverterOptions::from_json(
        r#"{ "indent_width": 2, "serializable_classes": false, "error_tolerance": { "continue_on_error": false } }"#,
    )
    .unwrap();
    assert_eq!(options.indent_width, 2);
    assert!(!options.serializable_classes);
    assert!(!options.error_tolerance.continue_on_error);
    assert_eq!(options.extension, "cs");

    let printer = options.printer_config();
    assert_eq!(printer.indent_width, 2);
    assert_eq!(printer.baseline_imports, options.baseline_imports);
}

#[test]
fn malformed_options_are_rejected() {
    let err = ConverterOptions::from_json("{ \"indent_width\": \"wide\" }").unwrap_err();
    assert!(err.to_string().contains("invalid converter options"));
}

#[test]
fn errors_keep_the_stage_that_raised_them() {
    let claimed = PipelineError::new("emit", "no output").claimed_by("emit");
    assert_eq!(claimed, PipelineError::new("emit", "no output"));
    let relabelled = PipelineError::new("inner", "no output").claimed_by("emit");
    assert_eq!(relabelled.stage, "emit");
    assert_eq!(relabelled.message, "no output");
}
