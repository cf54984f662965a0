//! Annotated program tree.
//!
//! Every expression carries its resolved [`Ty`](crate::ty::Ty) and every reference its binding.
//! Nodes exclusively own their children; passes consume a tree and return a new one.

mod expr;
mod ident;
mod item;
mod stmt;

pub use expr::*;
pub use ident::*;
pub use item::*;
pub use stmt::*;

/// One input file as handed to the converter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceFile {
    pub file_name: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// File name without directory and extension.
    pub fn stem(&self) -> &str {
        file_stem(&self.file_name)
    }
}

pub fn file_stem(file_name: &str) -> &str {
    let name = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

common_struct! {
    /// Annotated tree of one source file.
    pub struct SourceUnit {
        pub file_name: String,
        /// Explicit `import` directives in source order.
        #[serde(default)]
        pub imports: Vec<String>,
        /// Namespaces required by synthesized syntax, in first-use order.
        #[serde(default)]
        pub implicit_imports: Vec<String>,
        #[serde(default)]
        pub decls: Vec<TypeDecl>,
        /// Top level statements of the script body.
        #[serde(default)]
        pub globals: Vec<Stmt>,
        /// UnityScript text of the unit, used for preprocessor scanning when the file contents are not source text.
        #[serde(default)]
        pub source_text: Option<String>,
    }
}

impl SourceUnit {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            imports: Vec::new(),
            implicit_imports: Vec::new(),
            decls: Vec::new(),
            globals: Vec::new(),
            source_text: None,
        }
    }

    /// Records an implicit import once, keeping first-use order.
    pub fn require_import(&mut self, namespace: &str) {
        if !self.imports.iter().any(|import| import == namespace)
            && !self.implicit_imports.iter().any(|import| import == namespace)
        {
            self.implicit_imports.push(namespace.to_string());
        }
    }

    pub fn script_class(&self) -> Option<&TypeDecl> {
        self.decls.iter().find(|decl| decl.is_script)
    }
}
