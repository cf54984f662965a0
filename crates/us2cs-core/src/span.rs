/// Source position of a node, 1-based line and column. `line == 0` means unknown.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Span {
    pub fn new(line: u32, column: u32) -> Span {
        Span { line, column }
    }

    pub fn null() -> Span {
        Span::default()
    }

    pub fn is_null(&self) -> bool {
        self.line == 0
    }

    /// First known span of the two.
    pub fn or(self, other: Span) -> Span {
        if self.is_null() {
            other
        } else {
            self
        }
    }
}
