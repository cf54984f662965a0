//! Typed stage composition for one unit's trip through the converter.
//!
//! A [`Pipeline`] is built by appending [`PipelineStage`]s whose input matches the previous
//! output. Each stage runs inside a `stage` tracing span; its diagnostics are logged as soon
//! as it returns and any failure is attributed to it.

use crate::config::ConverterOptions;
use crate::error::{PipelineDiagnostics, PipelineError};
use tracing::{debug, debug_span};

pub trait PipelineStage: Send + Sync {
    type SrcCtx;
    type DstCtx;

    fn name(&self) -> &'static str;
    fn run(
        &self,
        context: Self::SrcCtx,
        diagnostics: &mut PipelineDiagnostics,
    ) -> Result<Self::DstCtx, PipelineError>;
}

type RunFn<In, Out> =
    dyn Fn(In, &mut PipelineDiagnostics, &ConverterOptions) -> Result<Out, PipelineError> + Send + Sync;

pub struct Pipeline<In, Out> {
    stages: Vec<&'static str>,
    run: Box<RunFn<In, Out>>,
}

impl<In, Out> Pipeline<In, Out> {
    pub fn run(
        &self,
        input: In,
        diagnostics: &mut PipelineDiagnostics,
        options: &ConverterOptions,
    ) -> Result<Out, PipelineError> {
        (self.run)(input, diagnostics, options)
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> &[&'static str] {
        &self.stages
    }
}

/// Runs `stage` on `input` inside its span, then logs what it reported.
fn run_stage<S: PipelineStage>(
    stage: &S,
    input: S::SrcCtx,
    diagnostics: &mut PipelineDiagnostics,
    options: &ConverterOptions,
) -> Result<S::DstCtx, PipelineError> {
    let name = stage.name();
    let span = debug_span!("stage", name);
    let _enter = span.enter();
    let result = stage.run(input, diagnostics);
    diagnostics.emit_stage(name, options);
    result.map_err(|err| {
        debug!(error = %err, "stage failed");
        err.claimed_by(name)
    })
}

pub struct PipelineBuilder<In, Out> {
    pipeline: Pipeline<In, Out>,
}

impl<In: 'static> PipelineBuilder<In, In> {
    pub fn new() -> Self {
        let identity = |input: In, _: &mut PipelineDiagnostics, _: &ConverterOptions| Ok(input);
        Self {
            pipeline: Pipeline {
                stages: Vec::new(),
                run: Box::new(identity),
            },
        }
    }
}

impl<In: 'static> Default for PipelineBuilder<In, In> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: 'static, Out: 'static> PipelineBuilder<In, Out> {
    pub fn add_stage<Next, S>(self, stage: S) -> PipelineBuilder<In, Next>
    where
        S: PipelineStage<SrcCtx = Out, DstCtx = Next> + 'static,
        Next: 'static,
    {
        let Pipeline { mut stages, run: previous } = self.pipeline;
        stages.push(stage.name());
        let run = move |input: In, diagnostics: &mut PipelineDiagnostics, options: &ConverterOptions| {
            let context = previous(input, diagnostics, options)?;
            run_stage(&stage, context, diagnostics, options)
        };
        PipelineBuilder {
            pipeline: Pipeline {
                stages,
                run: Box::new(run),
            },
        }
    }

    pub fn build(self) -> Pipeline<In, Out> {
        self.pipeline
    }
}
