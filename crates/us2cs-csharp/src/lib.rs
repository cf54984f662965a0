//! C# code generation for rewritten UnityScript trees

pub mod precedence;
pub mod printer;
pub mod serializer;

pub use printer::CSharpPrinterConfig;
pub use serializer::CSharpSerializer;

#[cfg(test)]
mod tests;
