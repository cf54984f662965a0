use crate::known_api::KnownApiTable;
use std::sync::Arc;
use us2cs_core::ty::TypeTable;

/// Read-only state shared by every pass of a batch.
#[derive(Debug, Clone)]
pub struct PassContext {
    pub types: Arc<TypeTable>,
    pub known_apis: Arc<KnownApiTable>,
    /// Attach `[System.Serializable]` to every declared class.
    pub serializable_classes: bool,
}

impl PassContext {
    pub fn new(types: Arc<TypeTable>) -> Self {
        Self {
            types,
            known_apis: Arc::new(KnownApiTable::unity_defaults()),
            serializable_classes: true,
        }
    }

    pub fn with_known_apis(mut self, known_apis: Arc<KnownApiTable>) -> Self {
        self.known_apis = known_apis;
        self
    }

    pub fn with_serializable_classes(mut self, enabled: bool) -> Self {
        self.serializable_classes = enabled;
        self
    }
}
