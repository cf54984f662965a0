use crate::span::Span;
use std::result;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The annotated tree lacks a type or binding the front end was supposed to provide.
    #[error("unresolved binding: {message}")]
    UnresolvedBinding { message: String, span: Span },
    /// A recognized construct with no rewrite rule.
    #[error("unsupported construct: {message}")]
    UnsupportedConstruct { message: String, span: Span },
    #[error("malformed attribute arguments: {message}")]
    MalformedAttributeArguments { message: String, span: Span },
    /// Syntax or binding failure reported by the front end.
    #[error("{file}:{line}: {message}")]
    Frontend {
        file: String,
        line: u32,
        message: String,
    },
    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn unresolved(message: impl Into<String>, span: Span) -> Self {
        Error::UnresolvedBinding {
            message: message.into(),
            span,
        }
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Error::UnsupportedConstruct {
            message: message.into(),
            span,
        }
    }

    pub fn malformed_attribute(message: impl Into<String>, span: Span) -> Self {
        Error::MalformedAttributeArguments {
            message: message.into(),
            span,
        }
    }

    /// Stable code used when the error becomes a diagnostic.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnresolvedBinding { .. } => "unresolved-binding",
            Error::UnsupportedConstruct { .. } => "unsupported-construct",
            Error::MalformedAttributeArguments { .. } => "malformed-attribute-arguments",
            Error::Frontend { .. } => "frontend",
            Error::Generic(_) => "generic",
        }
    }

    /// Line the error points at, 0 when unknown.
    pub fn line(&self) -> u32 {
        match self {
            Error::UnresolvedBinding { span, .. }
            | Error::UnsupportedConstruct { span, .. }
            | Error::MalformedAttributeArguments { span, .. } => span.line,
            Error::Frontend { line, .. } => *line,
            Error::Generic(_) => 0,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
