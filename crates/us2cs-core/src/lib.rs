#[macro_use]
pub mod macros;

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod frontend;
pub mod keywords;
pub mod serializer;
pub mod span;
pub mod ty;

// Re-export commonly used items for convenience
pub use tracing;

pub use frontend::{JsonFrontend, LanguageFrontend};
pub use serializer::UnitSerializer;

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;

#[cfg(test)]
mod tests;
