//! C# printer configuration, type names and literal spelling

use itertools::Itertools;
use us2cs_core::ast::Literal;
use us2cs_core::error::{Error, Result};
use us2cs_core::keywords::escape_identifier;
use us2cs_core::span::Span;
use us2cs_core::ty::{Ty, TypeDelegate, TypeId, TypeTable};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CSharpPrinterConfig {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Namespaces every unit imports after its own imports.
    pub baseline_imports: Vec<String>,
    pub extension: String,
}

impl CSharpPrinterConfig {
    pub fn standard() -> Self {
        Self {
            indent_width: 4,
            baseline_imports: vec!["UnityEngine".to_string(), "System.Collections".to_string()],
            extension: "cs".to_string(),
        }
    }

    pub fn indent_string(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

impl Default for CSharpPrinterConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Spells resolved types the way a unit with the given `using` directives sees them.
pub struct TypeNames<'a> {
    types: &'a TypeTable,
    imports: &'a [String],
}

impl<'a> TypeNames<'a> {
    pub fn new(types: &'a TypeTable, imports: &'a [String]) -> Self {
        Self { types, imports }
    }

    pub fn types(&self) -> &'a TypeTable {
        self.types
    }

    pub fn imports(&self) -> &'a [String] {
        self.imports
    }

    fn imports_namespace(&self, namespace: &str) -> bool {
        self.imports.iter().any(|import| import == namespace)
    }

    /// Short name when the namespace is imported, qualified name otherwise.
    pub fn named(&self, id: TypeId) -> Result<String> {
        let Some(info) = self.types.get(id) else {
            return Err(Error::unresolved(
                format!("type handle {} is not in the type table", id.0),
                Span::null(),
            ));
        };
        let name = escape_identifier(&info.name);
        Ok(match &info.namespace {
            Some(namespace) if !self.imports_namespace(namespace) => format!("{}.{}", namespace, name),
            _ => name,
        })
    }

    pub fn render(&self, ty: &Ty) -> Result<String> {
        Ok(match ty {
            Ty::Void => "void".to_string(),
            Ty::Null => "object".to_string(),
            Ty::Primitive(primitive) => primitive.keyword().to_string(),
            Ty::Named(id) => self.named(*id)?,
            Ty::Array(elem) => format!("{}[]", self.render(elem)?),
            Ty::Generic(id, args) => format!("{}<{}>", self.named(*id)?, self.render_list(args)?),
            Ty::Delegate(delegate) => self.render_delegate(delegate)?,
        })
    }

    pub fn render_list(&self, tys: &[Ty]) -> Result<String> {
        Ok(tys.iter().map(|ty| self.render(ty)).collect::<Result<Vec<_>>>()?.join(", "))
    }

    fn render_delegate(&self, delegate: &TypeDelegate) -> Result<String> {
        let system = if self.imports_namespace("System") {
            ""
        } else {
            "System."
        };
        let mut args = delegate
            .params
            .iter()
            .map(|param| self.render(param))
            .collect::<Result<Vec<_>>>()?;
        let name = if delegate.ret.is_void() {
            "Action"
        } else {
            args.push(self.render(&delegate.ret)?);
            "Func"
        };
        Ok(if args.is_empty() {
            format!("{}{}", system, name)
        } else {
            format!("{}{}<{}>", system, name, args.iter().join(", "))
        })
    }

    /// Attribute types are always fully qualified, without the `Attribute` suffix.
    pub fn attribute(&self, ty: &Ty) -> Result<String> {
        let Some(info) = ty.type_id().and_then(|id| self.types.get(id)) else {
            return self.render(ty);
        };
        let full_name = info.full_name();
        Ok(match full_name.strip_suffix("Attribute") {
            Some(stripped) if !stripped.is_empty() && !stripped.ends_with('.') => stripped.to_string(),
            _ => full_name,
        })
    }
}

pub fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_string(),
        Literal::Bool(value) => value.to_string(),
        Literal::Int(value) => value.to_string(),
        Literal::Long(value) => format!("{}L", value),
        Literal::Float(value) => format!("{:?}f", value),
        Literal::Double(value) => format!("{:?}", value),
        Literal::Char(value) => format!("'{}'", escape_char(*value, '\'')),
        Literal::String(value) => format!(
            "\"{}\"",
            value.chars().map(|c| escape_char(c, '"')).collect::<String>()
        ),
    }
}

/// Escape sequence for `c` inside a literal delimited by `quote`.
fn escape_char(c: char, quote: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\0' => "\\0".to_string(),
        c if c == quote => format!("\\{}", c),
        c if c.is_control() => format!("\\u{:04x}", c as u32),
        c => c.to_string(),
    }
}
