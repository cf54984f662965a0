use crate::precedence::Precedence;
use crate::printer::{render_literal, CSharpPrinterConfig, TypeNames};
use crate::serializer::CSharpSerializer;
use pretty_assertions::assert_eq;
use us2cs_core::ast::*;
use us2cs_core::ty::*;
use us2cs_core::UnitSerializer;

struct Fixture {
    types: TypeTable,
    mode: TypeId,
    vector3: TypeId,
    label: TypeId,
}

fn fixture() -> Fixture {
    let mut types = TypeTable::new();
    let vector3 = types.declare(TypeInfo::new(Some("UnityEngine"), "Vector3", TypeKind::Struct));
    let mode = types.declare(TypeInfo::new(None, "Mode", TypeKind::Enum));
    let label = types.declare(TypeInfo::class(Some("Tools"), "LabelAttribute"));
    let mono_behaviour = types.well_known().mono_behaviour;
    types.declare(TypeInfo::class(None, "field").with_base(Ty::Named(mono_behaviour)));
    Fixture {
        types,
        mode,
        vector3,
        label,
    }
}

impl Fixture {
    fn script_decl(&self, members: Vec<MemberDecl>) -> TypeDecl {
        let id = self.types.lookup("field").unwrap();
        let mut decl = TypeDecl::new(id, "field", TypeKind::Class);
        decl.is_script = true;
        decl.base = Some(Ty::Named(self.types.well_known().mono_behaviour));
        decl.members = members;
        decl
    }

    fn emit(&self, decls: Vec<TypeDecl>) -> String {
        let mut unit = SourceUnit::new("field.js");
        unit.decls = decls;
        self.emit_unit(&unit)
    }

    fn emit_unit(&self, unit: &SourceUnit) -> String {
        CSharpSerializer::default()
            .serialize_unit(unit, &self.types)
            .unwrap()
    }

    /// Emits `stmts` as the body of `Update()` and returns the body lines, trimmed.
    fn emit_body(&self, stmts: Vec<Stmt>) -> Vec<String> {
        let method = MethodDecl::new("Update", Vec::new(), Ty::Void, Block::new(stmts));
        let code = self.emit(vec![self.script_decl(vec![method.into()])]);
        let lines: Vec<&str> = code.lines().collect();
        let start = lines
            .iter()
            .position(|line| line.trim() == "public virtual void Update()")
            .unwrap();
        lines[start + 2..lines.len() - 2]
            .iter()
            .map(|line| line.trim().to_string())
            .collect()
    }

    fn expr_line(&self, expr: Expr) -> String {
        self.emit_body(vec![Stmt::expr(expr)]).remove(0)
    }
}

fn local(name: &str) -> Expr {
    Expr::local(name, Ty::int())
}

fn bin(op: BinOpKind, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs, Ty::int())
}

fn paren(expr: Expr) -> Expr {
    let ty = expr.ty.clone();
    Expr::new(ExprKind::Paren(Box::new(expr)), ty)
}

#[test]
fn script_field_and_constructor_layout() {
    let f = fixture();
    let script = f.types.lookup("field").unwrap();
    let this_i = Expr::member(
        Expr::self_ref(Ty::Named(script)),
        "i",
        MemberBinding::field(script),
        Ty::int(),
    );
    let decl = f.script_decl(vec![
        FieldDecl::new("i", Ty::int(), None).into(),
        CtorDecl::new(
            Vec::new(),
            Block::new(vec![Stmt::expr(Expr::assign(this_i, Expr::int(1)))]),
        )
        .into(),
    ]);
    let expected = "\
using UnityEngine;
using System.Collections;

public partial class field : MonoBehaviour
{
    public int i;

    public field()
    {
        this.i = 1;
    }
}";
    assert_eq!(f.emit(vec![decl]), expected);
}

#[test]
fn imports_keep_explicit_then_implicit_then_baseline_order() {
    let mut unit = SourceUnit::new("field.js");
    unit.imports = vec!["System.IO".to_string(), "UnityEngine".to_string()];
    unit.require_import("System");
    unit.require_import("System.IO");
    let serializer = CSharpSerializer::default();
    assert_eq!(
        serializer.imports(&unit),
        vec!["System.IO", "UnityEngine", "System", "System.Collections"]
    );
}

#[test]
fn plain_class_extends_object_and_carries_attributes() {
    let f = fixture();
    let mut decl = TypeDecl::new(TypeId(0), "Holder", TypeKind::Class);
    decl.attrs.push(Attribute {
        ty: Ty::Named(f.types.well_known().serializable),
        args: Vec::new(),
        span: Default::default(),
    });
    decl.attrs.push(Attribute {
        ty: Ty::Named(f.label),
        args: vec![
            AttributeArg {
                name: None,
                value: Expr::string("hp"),
            },
            AttributeArg {
                name: Some(Ident::new("Order")),
                value: Expr::int(2),
            },
        ],
        span: Default::default(),
    });
    let code = f.emit(vec![decl]);
    assert!(code.contains("[System.Serializable]\n[Tools.Label(\"hp\", Order = 2)]\npublic class Holder : object\n{\n}"));
}

#[test]
fn enum_members_are_numbered_explicitly() {
    let f = fixture();
    let mut decl = TypeDecl::new(f.mode, "Mode", TypeKind::Enum);
    decl.enum_members = vec![
        EnumMember {
            name: Ident::new("Idle"),
            value: None,
        },
        EnumMember {
            name: Ident::new("Run"),
            value: Some(5),
        },
        EnumMember {
            name: Ident::new("Jump"),
            value: None,
        },
    ];
    let code = f.emit(vec![decl]);
    assert!(code.contains("public enum Mode\n{\n    Idle = 0,\n    Run = 5,\n    Jump = 6\n}"));
}

#[test]
fn method_modifiers_follow_declaration() {
    let f = fixture();
    let body = || Block::new(Vec::new());
    let mut helper = MethodDecl::new("Helper", Vec::new(), Ty::int(), body());
    helper.modifiers = Modifiers::statik();
    let mut hidden = MethodDecl::new("Hidden", Vec::new(), Ty::Void, body());
    hidden.modifiers = Modifiers::private();
    let mut update = MethodDecl::new("Update", Vec::new(), Ty::Void, body());
    update.modifiers.is_override = true;
    let code = f.emit(vec![f.script_decl(vec![
        helper.into(),
        hidden.into(),
        update.into(),
        MethodDecl::new(
            "Move",
            vec![ParamDecl::new("to", Ty::Named(f.vector3))],
            Ty::Void,
            body(),
        )
        .into(),
    ])]);
    assert!(code.contains("    public static int Helper()\n"));
    assert!(code.contains("    private void Hidden()\n"));
    assert!(code.contains("    public override void Update()\n"));
    assert!(code.contains("    public virtual void Move(Vector3 to)\n"));
}

#[test]
fn interface_members_have_no_modifiers() {
    let f = fixture();
    let mut method = MethodDecl::new("Run", Vec::new(), Ty::Void, Block::empty());
    method.body = None;
    let decl = TypeDecl::new(TypeId(0), "IRunner", TypeKind::Interface).with_member(method);
    let code = f.emit(vec![decl]);
    assert!(code.contains("public interface IRunner\n{\n    void Run();\n}"));
}

#[test]
fn delegating_constructor_and_guard_render() {
    let f = fixture();
    let mut delegating = CtorDecl::new(Vec::new(), Block::empty());
    delegating.chain = Some(CtorChain {
        kind: CtorChainKind::This,
        args: vec![Expr::int(42)],
        signature: None,
    });
    let mut guard = FieldDecl::new("initialized__C", Ty::bool(), None);
    guard.modifiers = Modifiers::private();
    let decl = TypeDecl::new(TypeId(0), "C", TypeKind::Class)
        .with_member(delegating)
        .with_member(guard);
    let code = f.emit(vec![decl]);
    assert!(code.contains("    public C() : this(42)\n    {\n    }\n"));
    assert!(code.contains("    private bool initialized__C;"));
}

#[test]
fn redundant_parentheses_are_dropped() {
    let f = fixture();
    let expr = Expr::assign(
        local("x"),
        paren(bin(BinOpKind::Mul, local("a"), local("b"))),
    );
    assert_eq!(f.expr_line(expr), "x = a * b;");
}

#[test]
fn required_parentheses_are_added() {
    let f = fixture();
    let sum = bin(BinOpKind::Add, local("a"), local("b"));
    let product = bin(BinOpKind::Mul, sum, local("c"));
    assert_eq!(f.expr_line(Expr::assign(local("x"), product)), "x = (a + b) * c;");

    let diff = bin(BinOpKind::Sub, local("b"), local("c"));
    let right = bin(BinOpKind::Sub, local("a"), diff);
    assert_eq!(f.expr_line(Expr::assign(local("x"), right)), "x = a - (b - c);");

    let left = bin(
        BinOpKind::Sub,
        bin(BinOpKind::Sub, local("a"), local("b")),
        local("c"),
    );
    assert_eq!(f.expr_line(Expr::assign(local("x"), left)), "x = a - b - c;");
}

#[test]
fn casts_bind_tighter_than_binary_operators() {
    let f = fixture();
    let sum = Expr::binary(
        BinOpKind::Add,
        Expr::local("a", Ty::float()),
        Expr::float(1.0),
        Ty::float(),
    );
    let cast = Expr::cast(sum, Ty::int());
    assert_eq!(f.expr_line(Expr::assign(local("x"), cast)), "x = (int) (a + 1.0f);");

    let negative = Expr::cast(Expr::literal(Literal::Int(-2), Ty::int()), Ty::Named(f.mode));
    assert_eq!(
        f.expr_line(Expr::assign(Expr::local("m", Ty::Named(f.mode)), negative)),
        "m = (Mode) (-2);"
    );
}

#[test]
fn enum_comparison_cast_renders() {
    let f = fixture();
    let mode = Ty::Named(f.mode);
    let cmp = Expr::binary(
        BinOpKind::Gt,
        Expr::local("e", mode.clone()),
        Expr::cast(Expr::int(2), mode),
        Ty::bool(),
    );
    let lines = f.emit_body(vec![Stmt::var(StmtVar::new("b", Ty::bool(), Some(cmp)))]);
    assert_eq!(lines, vec!["bool b = e > (Mode) 2;"]);
}

#[test]
fn member_access_on_binary_is_parenthesized() {
    let f = fixture();
    let sum = bin(BinOpKind::Add, local("a"), local("b"));
    let call = Expr::invoke(
        Expr::member(sum, "ToString", MemberBinding::method(TypeId(0)), Ty::string()),
        Vec::new(),
        None,
        Ty::string(),
    );
    assert_eq!(f.expr_line(call), "(a + b).ToString();");
}

#[test]
fn ternary_and_unary_nesting() {
    let f = fixture();
    let ternary = Expr::new(
        ExprKind::Ternary(ExprTernary {
            cond: Box::new(Expr::local("flag", Ty::bool())),
            then: Box::new(local("a")),
            otherwise: Box::new(Expr::unary(UnOpKind::Neg, local("b"), Ty::int())),
        }),
        Ty::int(),
    );
    assert_eq!(f.expr_line(Expr::assign(local("x"), ternary)), "x = flag ? a : -b;");

    let double_neg = Expr::unary(
        UnOpKind::Neg,
        Expr::unary(UnOpKind::Neg, local("a"), Ty::int()),
        Ty::int(),
    );
    assert_eq!(f.expr_line(Expr::assign(local("x"), double_neg)), "x = -(-a);");

    let not = Expr::unary(
        UnOpKind::Not,
        Expr::binary(BinOpKind::And, Expr::local("p", Ty::bool()), Expr::local("q", Ty::bool()), Ty::bool()),
        Ty::bool(),
    );
    assert_eq!(f.expr_line(Expr::assign(Expr::local("r", Ty::bool()), not)), "r = !(p && q);");
}

#[test]
fn literals_are_spelled_in_csharp() {
    assert_eq!(render_literal(&Literal::Float(1.5)), "1.5f");
    assert_eq!(render_literal(&Literal::Float(0.0)), "0.0f");
    assert_eq!(render_literal(&Literal::Long(7)), "7L");
    assert_eq!(render_literal(&Literal::Double(2.0)), "2.0");
    assert_eq!(render_literal(&Literal::Char('\0')), "'\\0'");
    assert_eq!(render_literal(&Literal::Char('\'')), "'\\''");
    assert_eq!(
        render_literal(&Literal::String("say \"hi\"\n".to_string())),
        "\"say \\\"hi\\\"\\n\""
    );
}

#[test]
fn type_names_depend_on_imports() {
    let f = fixture();
    let imports = vec!["UnityEngine".to_string()];
    let names = TypeNames::new(&f.types, &imports);
    assert_eq!(names.render(&Ty::Named(f.vector3)).unwrap(), "Vector3");
    assert_eq!(
        names.render(&Ty::Named(f.types.well_known().hashtable)).unwrap(),
        "System.Collections.Hashtable"
    );
    assert_eq!(
        names.render(&Ty::array(Ty::Named(f.vector3))).unwrap(),
        "Vector3[]"
    );
    assert_eq!(
        names.render(&Ty::delegate(vec![Ty::int()], Ty::bool())).unwrap(),
        "System.Func<int, bool>"
    );
    assert_eq!(names.render(&Ty::delegate(Vec::new(), Ty::Void)).unwrap(), "System.Action");
    assert_eq!(names.attribute(&Ty::Named(f.label)).unwrap(), "Tools.Label");

    let imports = vec!["System".to_string()];
    let names = TypeNames::new(&f.types, &imports);
    assert_eq!(
        names.render(&Ty::delegate(vec![Ty::string()], Ty::Void)).unwrap(),
        "Action<string>"
    );
}

#[test]
fn collection_literals_render() {
    let f = fixture();
    let array = Expr::new(
        ExprKind::Array(ExprArray {
            elem: Ty::int(),
            items: vec![Expr::int(1), Expr::int(2)],
        }),
        Ty::array(Ty::int()),
    );
    let map = Expr::new(
        ExprKind::Map(ExprMap {
            entries: vec![MapEntry {
                key: Expr::string("a"),
                value: Expr::int(1),
            }],
        }),
        Ty::Named(f.types.well_known().hashtable),
    );
    let lines = f.emit_body(vec![
        Stmt::var(StmtVar::new("xs", Ty::array(Ty::int()), Some(array))),
        Stmt::var(StmtVar::new(
            "h",
            Ty::Named(f.types.well_known().hashtable),
            Some(map),
        )),
    ]);
    assert_eq!(
        lines,
        vec![
            "int[] xs = new int[] { 1, 2 };",
            "Hashtable h = new Hashtable() { { \"a\", 1 } };",
        ]
    );
}

#[test]
fn out_and_ref_arguments_carry_modifiers() {
    let f = fixture();
    let signature = Signature::new(
        vec![
            Param::new("key", Ty::string()),
            Param::new("value", Ty::int()).with_modifier(ParamModifier::Out),
        ],
        Ty::bool(),
    );
    let call = Expr::invoke(
        Expr::member(local("table"), "TryGet", MemberBinding::method(TypeId(0)), Ty::bool()),
        vec![Expr::string("k"), local("v")],
        Some(signature),
        Ty::bool(),
    );
    assert_eq!(f.expr_line(call), "table.TryGet(\"k\", out v);");
}

#[test]
fn control_flow_is_always_braced() {
    let f = fixture();
    let flag = || Expr::local("flag", Ty::bool());
    let stmts = vec![
        Stmt::If(StmtIf {
            cond: flag(),
            then: Block::new(vec![Stmt::Break]),
            otherwise: Some(Block::new(vec![Stmt::If(StmtIf {
                cond: flag(),
                then: Block::new(vec![Stmt::Continue]),
                otherwise: Some(Block::new(vec![Stmt::ret(None)])),
            })])),
        }),
        Stmt::ForEach(StmtForEach {
            var: Ident::new("item"),
            var_ty: Ty::int(),
            iter: Expr::local("items", Ty::array(Ty::int())),
            body: Block::empty(),
        }),
        Stmt::For(StmtFor {
            init: vec![Stmt::var(StmtVar::new("i", Ty::int(), Some(Expr::int(0))))],
            cond: Some(Expr::binary(BinOpKind::Lt, local("i"), Expr::int(3), Ty::bool())),
            step: vec![Expr::unary(UnOpKind::PostInc, local("i"), Ty::int())],
            body: Block::empty(),
        }),
    ];
    assert_eq!(
        f.emit_body(stmts),
        vec![
            "if (flag)",
            "{",
            "break;",
            "}",
            "else if (flag)",
            "{",
            "continue;",
            "}",
            "else",
            "{",
            "return;",
            "}",
            "foreach (int item in items)",
            "{",
            "}",
            "for (int i = 0; i < 3; i++)",
            "{",
            "}",
        ]
    );
}

#[test]
fn lambda_block_body_is_indented() {
    let f = fixture();
    let lambda = Expr::new(
        ExprKind::Lambda(ExprLambda {
            params: vec![LambdaParam {
                name: Ident::new("x"),
                ty: Some(Ty::int()),
            }],
            ret: Some(Ty::bool()),
            body: LambdaBody::Block(Block::new(vec![Stmt::ret(Some(Expr::binary(
                BinOpKind::Gt,
                local("x"),
                Expr::int(0),
                Ty::bool(),
            )))])),
        }),
        Ty::delegate(vec![Ty::int()], Ty::bool()),
    );
    let mut unit = SourceUnit::new("field.js");
    unit.require_import("System");
    unit.decls.push(f.script_decl(vec![MethodDecl::new(
        "Update",
        Vec::new(),
        Ty::Void,
        Block::new(vec![Stmt::var(StmtVar::new(
            "check",
            Ty::delegate(vec![Ty::int()], Ty::bool()),
            Some(lambda),
        ))]),
    )
    .into()]));
    let code = f.emit_unit(&unit);
    assert!(code.starts_with("using System;\nusing UnityEngine;\n"));
    assert!(code.contains(
        "        Func<int, bool> check = (int x) => {\n            return x > 0;\n        };\n"
    ));
}

#[test]
fn escaped_identifiers_render_verbatim() {
    let f = fixture();
    let mut name = Ident::new("object");
    name.escaped = true;
    let lines = f.emit_body(vec![Stmt::var(StmtVar::new(name, Ty::int(), Some(Expr::int(1))))]);
    assert_eq!(lines, vec!["int @object = 1;"]);
}

#[test]
fn output_name_replaces_extension() {
    let serializer = CSharpSerializer::default();
    assert_eq!(serializer.output_file_name("Scripts/Player.js"), "Scripts/Player.cs");
    assert_eq!(serializer.output_file_name("Player"), "Player.cs");
    assert_eq!(
        CSharpSerializer::new(CSharpPrinterConfig {
            extension: "txt".to_string(),
            ..CSharpPrinterConfig::standard()
        })
        .output_file_name("a.b.js"),
        "a.b.txt"
    );
}

#[test]
fn leftover_globals_are_rejected() {
    let f = fixture();
    let mut unit = SourceUnit::new("field.js");
    unit.globals.push(Stmt::Break);
    let err = CSharpSerializer::default()
        .serialize_unit(&unit, &f.types)
        .unwrap_err();
    assert_eq!(err.code(), "unsupported-construct");
}

#[test]
fn precedence_ordering() {
    assert!(Precedence::Assignment < Precedence::Conditional);
    assert!(Precedence::Multiplicative > Precedence::Additive);
    assert_eq!(Precedence::of_binary(BinOpKind::Shl), Precedence::Shift);
    assert_eq!(Precedence::Shift.tighter(), Precedence::Additive);
    assert_eq!(
        Precedence::of_expr(&Expr::unary(UnOpKind::PostInc, local("i"), Ty::int())),
        Precedence::Primary
    );
}
