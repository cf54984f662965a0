//! Batch driver: runs the front end, the rewrite passes and the C# emitter over each unit,
//! aborting a unit at its first error and collecting diagnostics and preprocessor symbols.

pub mod config;
pub mod converter;
pub mod error;
pub mod pipeline;
pub mod stages;

pub use config::{ConverterOptions, DebugOptions, ErrorToleranceOptions};
pub use converter::{ConversionReport, Converter};
pub use error::{PipelineDiagnostics, PipelineError};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineStage};

#[cfg(test)]
mod tests;
