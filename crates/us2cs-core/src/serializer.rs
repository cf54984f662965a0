use crate::ast::SourceUnit;
use crate::ty::TypeTable;

/// Renders a fully rewritten unit as target-language source text.
pub trait UnitSerializer: Send + Sync {
    /// Extension of the produced files, without the dot.
    fn extension(&self) -> &str;
    fn serialize_unit(&self, unit: &SourceUnit, types: &TypeTable) -> crate::Result<String>;

    /// Output name for `file_name`: same stem, target extension.
    fn output_file_name(&self, file_name: &str) -> String {
        let stem_end = file_name
            .rfind('.')
            .filter(|dot| !file_name[dot + 1..].contains(['/', '\\']) && *dot > 0)
            .unwrap_or(file_name.len());
        format!("{}.{}", &file_name[..stem_end], self.extension())
    }
}
