use eyre::WrapErr;
use us2cs_csharp::CSharpPrinterConfig;
use us2cs_passes::{KnownApiTable, PassContext};
use us2cs_core::ty::TypeTable;
use std::sync::Arc;

/// Converter options
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConverterOptions {
    /// Namespaces every output imports after the unit's own imports
    pub baseline_imports: Vec<String>,
    /// Extension of the emitted files, without the dot
    pub extension: String,
    /// Spaces per indentation level
    pub indent_width: usize,
    /// Attach `[System.Serializable]` to every declared class
    pub serializable_classes: bool,
    /// Methods whose result is cast to the type named by their arguments
    pub known_apis: KnownApiTable,
    /// Debug options
    pub debug: DebugOptions,
    /// Error tolerance options
    pub error_tolerance: ErrorToleranceOptions,
}

/// Debug configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DebugOptions {
    /// Log informational diagnostics too
    pub verbose: bool,
    /// Log the unit name after every rewrite pass
    pub print_passes: bool,
}

/// Error tolerance configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ErrorToleranceOptions {
    /// Keep converting the remaining units after one aborts
    pub continue_on_error: bool,
}

impl Default for ErrorToleranceOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
        }
    }
}

impl Default for ConverterOptions {
    fn default() -> Self {
        let printer = CSharpPrinterConfig::standard();
        Self {
            baseline_imports: printer.baseline_imports,
            extension: printer.extension,
            indent_width: printer.indent_width,
            serializable_classes: true,
            known_apis: KnownApiTable::unity_defaults(),
            debug: DebugOptions::default(),
            error_tolerance: ErrorToleranceOptions::default(),
        }
    }
}

impl ConverterOptions {
    /// Parses options from JSON; absent keys keep their defaults.
    pub fn from_json(json: &str) -> eyre::Result<Self> {
        serde_json::from_str(json).wrap_err("invalid converter options")
    }

    pub fn printer_config(&self) -> CSharpPrinterConfig {
        CSharpPrinterConfig {
            indent_width: self.indent_width,
            baseline_imports: self.baseline_imports.clone(),
            extension: self.extension.clone(),
        }
    }

    pub fn pass_context(&self, types: Arc<TypeTable>) -> PassContext {
        PassContext::new(types)
            .with_known_apis(Arc::new(self.known_apis.clone()))
            .with_serializable_classes(self.serializable_classes)
    }
}
