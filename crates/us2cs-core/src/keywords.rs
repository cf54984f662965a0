use once_cell::sync::Lazy;
use std::collections::HashSet;

/// C# reserved words that cannot be used as plain identifiers.
///
/// Contextual keywords the source language could not already reject are included too.
pub const CSHARP_RESERVED_WORDS: &[&str] = &[
    "abstract", "alias", "as", "async", "await", "base", "bool", "break", "byte", "case", "catch",
    "char", "checked", "class", "const", "continue", "decimal", "default", "delegate", "do",
    "double", "dynamic", "else", "enum", "event", "explicit", "extern", "false", "finally",
    "fixed", "float", "for", "foreach", "goto", "if", "implicit", "in", "int", "interface",
    "internal", "is", "lock", "long", "nameof", "namespace", "new", "null", "object", "operator",
    "out", "override", "params", "private", "protected", "public", "readonly", "ref", "remove",
    "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static", "string", "struct",
    "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe",
    "ushort", "using", "virtual", "void", "volatile", "while",
];

static RESERVED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| CSHARP_RESERVED_WORDS.iter().copied().collect());

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED.contains(name)
}

/// Verbatim spelling of `name` (`@name`) when it collides with a reserved word.
pub fn escape_identifier(name: &str) -> String {
    if is_reserved_word(name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}
