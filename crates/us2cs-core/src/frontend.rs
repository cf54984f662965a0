use crate::ast::{SourceFile, SourceUnit};
use crate::error::{Error, Result};
use crate::ty::TypeTable;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait implemented by every source-language front end.
///
/// A front end parses one file and resolves every type and binding against the shared
/// type table, reporting syntax or binding errors as [`Error::Frontend`].
pub trait LanguageFrontend: Send + Sync {
    fn language(&self) -> &'static str;
    fn extensions(&self) -> &'static [&'static str];
    /// Program-wide table every annotated tree refers to.
    fn type_table(&self) -> Arc<TypeTable>;
    fn parse_and_resolve(&self, file: &SourceFile) -> Result<SourceUnit>;
}

/// Front end reading pre-annotated trees serialized as JSON.
pub struct JsonFrontend {
    types: Arc<TypeTable>,
}

impl JsonFrontend {
    pub fn new(types: Arc<TypeTable>) -> Self {
        Self { types }
    }

    /// Loads the type table from its JSON form.
    pub fn from_type_table_json(json: &str) -> Result<Self> {
        let table: TypeTable = serde_json::from_str(json)?;
        Ok(Self::new(Arc::new(table)))
    }
}

impl LanguageFrontend for JsonFrontend {
    fn language(&self) -> &'static str {
        "unityscript-annotated-json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn type_table(&self) -> Arc<TypeTable> {
        self.types.clone()
    }

    fn parse_and_resolve(&self, file: &SourceFile) -> Result<SourceUnit> {
        let mut unit: SourceUnit =
            serde_json::from_str(&file.contents).map_err(|err| Error::Frontend {
                file: file.file_name.clone(),
                line: err.line() as u32,
                message: err.to_string(),
            })?;
        if unit.file_name.is_empty() {
            unit.file_name = file.file_name.clone();
        }
        Ok(unit)
    }
}

/// Front end handing out trees that were annotated in memory, keyed by file name.
pub struct PreparedFrontend {
    types: Arc<TypeTable>,
    units: HashMap<String, SourceUnit>,
}

impl PreparedFrontend {
    pub fn new(types: Arc<TypeTable>) -> Self {
        Self {
            types,
            units: HashMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: SourceUnit) -> Self {
        self.units.insert(unit.file_name.clone(), unit);
        self
    }
}

impl LanguageFrontend for PreparedFrontend {
    fn language(&self) -> &'static str {
        "unityscript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js"]
    }

    fn type_table(&self) -> Arc<TypeTable> {
        self.types.clone()
    }

    fn parse_and_resolve(&self, file: &SourceFile) -> Result<SourceUnit> {
        self.units
            .get(&file.file_name)
            .cloned()
            .ok_or_else(|| Error::Frontend {
                file: file.file_name.clone(),
                line: 0,
                message: "no annotated tree available".to_string(),
            })
    }
}
