//! Line scanner that finds conditional-compilation directives.
//!
//! Directives are only recognized at the start of a line (after whitespace) and never inside
//! a block comment that spans lines.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DirectiveKind {
    If,
    Elif,
    Else,
    Endif,
    Pragma,
    Other,
}

impl DirectiveKind {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "if" => DirectiveKind::If,
            "elif" => DirectiveKind::Elif,
            "else" => DirectiveKind::Else,
            "endif" => DirectiveKind::Endif,
            "pragma" => DirectiveKind::Pragma,
            _ => DirectiveKind::Other,
        }
    }

    /// Directives whose argument is a boolean symbol expression.
    pub fn carries_expression(self) -> bool {
        matches!(self, DirectiveKind::If | DirectiveKind::Elif)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            DirectiveKind::If => "#if",
            DirectiveKind::Elif => "#elif",
            DirectiveKind::Else => "#else",
            DirectiveKind::Endif => "#endif",
            DirectiveKind::Pragma => "#pragma",
            DirectiveKind::Other => "#<other>",
        };
        f.write_str(keyword)
    }
}

/// One directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: DirectiveKind,
    /// 1-based.
    pub line: u32,
    /// Argument text with surrounding whitespace and any trailing `//` comment removed.
    pub argument: &'a str,
}

pub struct DirectiveScanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    in_block_comment: bool,
}

impl<'a> DirectiveScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            in_block_comment: false,
        }
    }

    /// Updates the block-comment state with the code on `line`.
    fn track_comments(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut quote: Option<u8> = None;
        let mut pos = 0;
        while pos < bytes.len() {
            let current = bytes[pos];
            let next = bytes.get(pos + 1).copied();
            if self.in_block_comment {
                if current == b'*' && next == Some(b'/') {
                    self.in_block_comment = false;
                    pos += 1;
                }
            } else if let Some(open) = quote {
                if current == b'\\' {
                    pos += 1;
                } else if current == open {
                    quote = None;
                }
            } else {
                match (current, next) {
                    (b'/', Some(b'/')) => return,
                    (b'/', Some(b'*')) => {
                        self.in_block_comment = true;
                        pos += 1;
                    }
                    (b'"' | b'\'', _) => quote = Some(current),
                    _ => {}
                }
            }
            pos += 1;
        }
    }
}

impl<'a> Iterator for DirectiveScanner<'a> {
    type Item = Directive<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, line) = self.lines.next()?;
            if self.in_block_comment {
                self.track_comments(line);
                continue;
            }
            let Some(rest) = line.trim_start().strip_prefix('#') else {
                self.track_comments(line);
                continue;
            };
            let rest = rest.trim_start();
            let keyword_end = rest
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len());
            let (keyword, argument) = rest.split_at(keyword_end);
            let argument = match argument.find("//") {
                Some(comment) => &argument[..comment],
                None => argument,
            };
            return Some(Directive {
                kind: DirectiveKind::from_keyword(keyword),
                line: index as u32 + 1,
                argument: argument.trim(),
            });
        }
    }
}
