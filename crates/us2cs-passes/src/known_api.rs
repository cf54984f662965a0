//! Registry of reflection-style APIs whose results need a cast at the call site.

use us2cs_core::ty::{TypeId, TypeInfo, TypeTable};

/// `(declaring type, method)` pair whose general return type is narrowed by an argument.
///
/// The narrower type is recovered from the argument at `type_argument`, which is either a
/// type token (`typeof(T)`) or a string literal naming the type, or from an explicit generic
/// type argument.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnownApi {
    pub declaring_type: String,
    pub method: String,
    #[serde(default)]
    pub type_argument: usize,
}

impl KnownApi {
    pub fn new(declaring_type: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method: method.into(),
            type_argument: 0,
        }
    }

    fn matches(&self, declaring: &TypeInfo, method: &str) -> bool {
        self.method == method
            && (self.declaring_type == declaring.full_name() || self.declaring_type == declaring.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KnownApiTable {
    entries: Vec<KnownApi>,
}

impl KnownApiTable {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Component lookup APIs of the Unity runtime.
    pub fn unity_defaults() -> Self {
        let mut table = Self::empty();
        for declaring in ["UnityEngine.Component", "UnityEngine.GameObject"] {
            for method in [
                "GetComponent",
                "GetComponentInChildren",
                "GetComponentInParent",
                "AddComponent",
            ] {
                table.register(KnownApi::new(declaring, method));
            }
        }
        table.register(KnownApi::new("UnityEngine.Object", "FindObjectOfType"));
        table
    }

    pub fn register(&mut self, api: KnownApi) {
        if !self.entries.contains(&api) {
            self.entries.push(api);
        }
    }

    pub fn entries(&self) -> &[KnownApi] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, types: &TypeTable, declaring: TypeId, method: &str) -> Option<&KnownApi> {
        let info = types.get(declaring)?;
        self.entries.iter().find(|api| api.matches(info, method))
    }

    pub fn from_json(json: &str) -> us2cs_core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for KnownApiTable {
    fn default() -> Self {
        Self::unity_defaults()
    }
}
