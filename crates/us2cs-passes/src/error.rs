use us2cs_core::error::Error;
use us2cs_core::span::Span;

/// Create an error for a construct the rewrite passes have no rule for
pub fn unsupported(message: impl Into<String>, span: Span) -> Error {
    Error::unsupported(message, span)
}

/// Create an error for a tree that is missing a type or binding
pub fn unresolved(message: impl Into<String>, span: Span) -> Error {
    Error::unresolved(message, span)
}

/// Create an error for attribute arguments C# cannot express
pub fn malformed_attribute(message: impl Into<String>, span: Span) -> Error {
    Error::malformed_attribute(message, span)
}

// Convenience macros for raising pass errors

/// Macro to return early with a pass error of the given kind
#[macro_export]
macro_rules! pass_bail {
    (unsupported, $span:expr, $($arg:tt)*) => {
        return Err($crate::error::unsupported(format!($($arg)*), $span))
    };
    (unresolved, $span:expr, $($arg:tt)*) => {
        return Err($crate::error::unresolved(format!($($arg)*), $span))
    };
    (attribute, $span:expr, $($arg:tt)*) => {
        return Err($crate::error::malformed_attribute(format!($($arg)*), $span))
    };
}

/// Macro to ensure a condition is true, or return a pass error
#[macro_export]
macro_rules! pass_ensure {
    ($cond:expr, $kind:ident, $span:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::pass_bail!($kind, $span, $($arg)*);
        }
    };
}
