use crate::ast::*;
use crate::diagnostics::{Diagnostic, DiagnosticLevel};
use crate::error::Error;
use crate::frontend::{JsonFrontend, LanguageFrontend};
use crate::keywords::{escape_identifier, is_reserved_word};
use crate::span::Span;
use crate::ty::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn table_with_enum_and_struct() -> (TypeTable, TypeId, TypeId, TypeId) {
    let mut table = TypeTable::new();
    let color = table.declare(TypeInfo::new(None, "Color", TypeKind::Enum));
    let point = table.declare(
        TypeInfo::new(None, "Point", TypeKind::Struct).with_constructor(Signature::new(
            vec![Param::new("x", Ty::int()), Param::new("y", Ty::int())],
            Ty::Void,
        )),
    );
    let base = table.declare(TypeInfo::class(None, "Base"));
    (table, color, point, base)
}

#[test]
fn numeric_widening_follows_rank() {
    let table = TypeTable::new();
    assert!(table.is_implicitly_convertible(&Ty::int(), &Ty::long()));
    assert!(table.is_implicitly_convertible(&Ty::int(), &Ty::float()));
    assert!(table.is_implicitly_convertible(&Ty::long(), &Ty::double()));
    assert!(table.is_implicitly_convertible(&Ty::float(), &Ty::double()));
    assert!(!table.is_implicitly_convertible(&Ty::float(), &Ty::int()));
    assert!(!table.is_implicitly_convertible(&Ty::double(), &Ty::float()));
    assert!(!table.is_implicitly_convertible(&Ty::int(), &Ty::char()));
}

#[test]
fn enum_and_int_never_convert_implicitly() {
    let (table, color, _, _) = table_with_enum_and_struct();
    let color = Ty::Named(color);
    assert!(!table.is_implicitly_convertible(&color, &Ty::int()));
    assert!(!table.is_implicitly_convertible(&Ty::int(), &color));
    assert!(table.is_explicitly_convertible(&Ty::int(), &color));
    assert!(table.is_implicitly_convertible(&color, &Ty::object()));
}

#[test]
fn value_and_reference_classification() {
    let (table, color, point, base) = table_with_enum_and_struct();
    assert!(table.is_value_type(&Ty::Named(point)));
    assert!(table.is_value_type(&Ty::Named(color)));
    assert!(table.is_value_type(&Ty::int()));
    assert!(!table.is_value_type(&Ty::string()));
    assert!(table.is_reference_type(&Ty::Named(base)));
    assert!(table.is_implicitly_convertible(&Ty::Null, &Ty::Named(base)));
    assert!(!table.is_implicitly_convertible(&Ty::Null, &Ty::Named(point)));
}

#[test]
fn subclass_widens_to_base() {
    let (mut table, _, _, base) = table_with_enum_and_struct();
    let derived = table.declare(TypeInfo::class(None, "Derived").with_base(Ty::Named(base)));
    assert!(table.is_implicitly_convertible(&Ty::Named(derived), &Ty::Named(base)));
    assert!(!table.is_implicitly_convertible(&Ty::Named(base), &Ty::Named(derived)));
    assert!(table.is_explicitly_convertible(&Ty::Named(base), &Ty::Named(derived)));
}

#[test]
fn constructor_lookup_prefers_implicit_overloads() {
    let mut table = TypeTable::new();
    let id = table.declare(
        TypeInfo::class(None, "C")
            .with_constructor(Signature::new(vec![Param::new("f", Ty::float())], Ty::Void))
            .with_constructor(Signature::new(vec![Param::new("l", Ty::long())], Ty::Void)),
    );
    let found = table.find_constructor(id, &[Ty::int()]).map(|sig| sig.params[0].ty.clone());
    assert_eq!(found, Some(Ty::float()));
    let narrowing = table.find_constructor(id, &[Ty::double()]).map(|sig| sig.params[0].ty.clone());
    assert_eq!(narrowing, Some(Ty::float()));
    assert!(table.find_constructor(id, &[]).is_none());
}

#[test]
fn lookup_by_full_and_simple_name() {
    let table = TypeTable::new();
    let hashtable = table.well_known().hashtable;
    assert_eq!(table.lookup("System.Collections.Hashtable"), Some(hashtable));
    assert_eq!(table.lookup("Hashtable"), Some(hashtable));
    assert_eq!(table.lookup("Missing"), None);
}

#[test]
fn type_table_round_trips_through_json() {
    let (table, color, _, _) = table_with_enum_and_struct();
    let json = serde_json::to_string(&table).unwrap();
    let restored: TypeTable = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), table.len());
    assert_eq!(restored.lookup("Color"), Some(color));
    assert_eq!(restored.well_known(), table.well_known());

    let frontend = JsonFrontend::from_type_table_json(&json).unwrap();
    assert_eq!(frontend.type_table().lookup("Color"), Some(color));
}

#[test]
fn delegate_types_display_as_action_and_func() {
    let table = TypeTable::new();
    assert_eq!(table.display(&Ty::delegate(vec![Ty::int()], Ty::Void)), "Action<int>");
    assert_eq!(
        table.display(&Ty::delegate(vec![Ty::int()], Ty::int())),
        "Func<int, int>"
    );
}

#[test]
fn params_signature_exposes_element_type() {
    let signature = Signature::new(
        vec![Param::new("types", Ty::array(Ty::string())).with_modifier(ParamModifier::Params)],
        Ty::Void,
    );
    assert_eq!(signature.param_type_at(0), Some(&Ty::array(Ty::string())));
    assert_eq!(signature.param_type_at(3), Some(&Ty::string()));
    assert_eq!(signature.params_index(), Some(0));
}

#[test]
fn reserved_words_are_escaped() {
    assert!(is_reserved_word("params"));
    assert!(is_reserved_word("lock"));
    assert!(!is_reserved_word("value"));
    assert_eq!(escape_identifier("out"), "@out");
    assert_eq!(escape_identifier("speed"), "speed");
}

#[test]
fn file_stem_strips_directories_and_extension() {
    assert_eq!(file_stem("Assets/Scripts/player.js"), "player");
    assert_eq!(file_stem("noext"), "noext");
    assert_eq!(SourceFile::new("a\\b\\c.js", "").stem(), "c");
}

#[test]
fn implicit_imports_keep_first_use_order() {
    let mut unit = SourceUnit::new("a.js");
    unit.imports.push("System.IO".to_string());
    unit.require_import("System");
    unit.require_import("System.IO");
    unit.require_import("System");
    unit.require_import("System.Text");
    assert_eq!(unit.implicit_imports, vec!["System", "System.Text"]);
}

#[test]
fn json_frontend_reports_syntax_errors_with_location() {
    let frontend = JsonFrontend::new(Arc::new(TypeTable::new()));
    let err = frontend
        .parse_and_resolve(&SourceFile::new("broken.json", "{\n  \"file_name\": "))
        .unwrap_err();
    match err {
        Error::Frontend { file, line, .. } => {
            assert_eq!(file, "broken.json");
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn json_frontend_reads_annotated_tree() {
    let mut unit = SourceUnit::new("");
    unit.globals.push(Stmt::expr(Expr::int(1)));
    let json = serde_json::to_string(&unit).unwrap();
    let frontend = JsonFrontend::new(Arc::new(TypeTable::new()));
    let parsed = frontend
        .parse_and_resolve(&SourceFile::new("script.json", json))
        .unwrap();
    assert_eq!(parsed.file_name, "script.json");
    assert_eq!(parsed.globals, unit.globals);
}

#[test]
fn diagnostics_carry_error_codes() {
    let error = Error::unsupported("with statement", Span::new(7, 3));
    let diagnostic = Diagnostic::from_error("a.js", &error);
    assert_eq!(diagnostic.level, DiagnosticLevel::Error);
    assert_eq!(diagnostic.code.as_deref(), Some("unsupported-construct"));
    assert_eq!(diagnostic.line(), 7);
    assert_eq!(
        diagnostic.to_string(),
        "[ERROR] a.js:7: unsupported construct: with statement [unsupported-construct]"
    );
}

#[test]
fn int_literal_detection_sees_through_negation() {
    let expr = Expr::unary(UnOpKind::Neg, Expr::int(4), Ty::int());
    assert_eq!(expr.as_int_literal(), Some(-4));
    assert!(Expr::cast(Expr::int(1), Ty::float()).is_synthesized_cast_to(&Ty::float()));
}
