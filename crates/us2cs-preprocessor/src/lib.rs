//! Preprocessor symbol collection.
//!
//! After a batch converts, external tooling needs to know which conditional-compilation
//! expressions the sources referenced. [`SymbolCollector`] scans each file's text for `#if` and
//! `#elif` directives and keeps one [`PreprocessorSymbolReference`] per occurrence, in file then
//! appearance order. `#else`, `#endif` and `#pragma` are structural and never recorded.

pub mod scanner;

use scanner::DirectiveScanner;
use tracing::debug;
use us2cs_core::ast::SourceFile;

/// One directive expression found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PreprocessorSymbolReference {
    pub file_name: String,
    /// 1-based.
    pub line_number: u32,
    pub expression_text: String,
}

impl PreprocessorSymbolReference {
    pub fn new(file_name: impl Into<String>, line_number: u32, expression_text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            line_number,
            expression_text: expression_text.into(),
        }
    }
}

/// Scans `text` and returns its directive expressions in appearance order.
pub fn collect_symbols(file_name: &str, text: &str) -> Vec<PreprocessorSymbolReference> {
    DirectiveScanner::new(text)
        .filter(|directive| directive.kind.carries_expression())
        .map(|directive| PreprocessorSymbolReference::new(file_name, directive.line, directive.argument))
        .collect()
}

/// Accumulates references across the files of a batch.
#[derive(Debug, Clone, Default)]
pub struct SymbolCollector {
    references: Vec<PreprocessorSymbolReference>,
}

impl SymbolCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan(&mut self, file_name: &str, text: &str) -> usize {
        let found = collect_symbols(file_name, text);
        let count = found.len();
        if count > 0 {
            debug!(file = file_name, count, "collected preprocessor symbols");
        }
        self.references.extend(found);
        count
    }

    pub fn scan_file(&mut self, file: &SourceFile) -> usize {
        self.scan(&file.file_name, &file.contents)
    }

    pub fn references(&self) -> &[PreprocessorSymbolReference] {
        &self.references
    }

    pub fn into_references(self) -> Vec<PreprocessorSymbolReference> {
        self.references
    }
}

#[cfg(test)]
mod tests;
