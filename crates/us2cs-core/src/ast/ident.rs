use std::fmt::{Display, Formatter};

/// A declared or referenced name.
///
/// `escaped` is set by identifier escaping when the name collides with a C# reserved word;
/// the logical name never changes.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default)]
    pub escaped: bool,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            escaped: false,
        }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    /// Spelling used in emitted code.
    pub fn render(&self) -> String {
        if self.escaped {
            format!("@{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Ident::new(name)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}
