//! Annotated fixtures shared by the conversion tests.
#![allow(dead_code)]

use std::sync::Arc;
use us2cs_core::ast::*;
use us2cs_core::frontend::PreparedFrontend;
use us2cs_core::ty::*;
use us2cs_pipeline::{Converter, ConverterOptions};

/// Collapses every whitespace run into one space.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Types of a small Unity project, as the front end would resolve them.
pub struct Project {
    pub types: TypeTable,
    pub foo: TypeId,
    pub holder: TypeId,
    pub value: TypeId,
    pub mode: TypeId,
    pub counter: TypeId,
    pub point: TypeId,
}

impl Project {
    pub fn new() -> Self {
        let mut types = TypeTable::new();
        let foo = types.declare(TypeInfo::class(None, "Foo"));
        let value = types.declare(TypeInfo::new(None, "S", TypeKind::Struct));
        let holder = types.declare(TypeInfo::class(None, "Holder"));
        let mode = types.declare(TypeInfo::new(None, "Mode", TypeKind::Enum));
        let counter = types.declare(
            TypeInfo::class(None, "Counter")
                .with_constructor(Signature::new(Vec::new(), Ty::Void))
                .with_constructor(Signature::new(vec![Param::new("start", Ty::int())], Ty::Void)),
        );
        let point = types.declare(TypeInfo::new(None, "Point", TypeKind::Struct));
        Self {
            types,
            foo,
            holder,
            value,
            mode,
            counter,
            point,
        }
    }

    pub fn mono_behaviour(&self) -> Ty {
        Ty::Named(self.types.well_known().mono_behaviour)
    }

    /// Script class of `file_name` holding `members`.
    pub fn script(&mut self, file_name: &str, members: Vec<MemberDecl>) -> SourceUnit {
        let name = file_stem(file_name).to_string();
        let base = self.mono_behaviour();
        let id = self
            .types
            .declare(TypeInfo::class(None, name.clone()).with_base(base));
        let mut decl = TypeDecl::new(id, name, TypeKind::Class);
        decl.is_script = true;
        decl.base = Some(self.mono_behaviour());
        decl.members = members;
        let mut unit = SourceUnit::new(file_name);
        unit.decls.push(decl);
        unit
    }

    /// `class Foo { var i: int = 10; var s: String = "foo"; }`
    pub fn initialized_fields(&self) -> SourceUnit {
        let decl = TypeDecl::new(self.foo, "Foo", TypeKind::Class)
            .with_member(FieldDecl::new("i", Ty::int(), Some(Expr::int(10))))
            .with_member(FieldDecl::new("s", Ty::string(), Some(Expr::string("foo"))));
        let mut unit = SourceUnit::new("foo.js");
        unit.decls.push(decl);
        unit
    }

    /// `function F(o: Holder) { o.Struct.value = 42; }`
    pub fn value_chain(&mut self) -> SourceUnit {
        let value_ty = Ty::Named(self.value);
        let o = Expr::param("o", Ty::Named(self.holder));
        let property = Expr::member(o, "Struct", MemberBinding::property(self.holder), value_ty);
        let field = Expr::member(property, "value", MemberBinding::field(self.value), Ty::int());
        let body = Block::new(vec![Stmt::expr(Expr::assign(field, Expr::int(42)))]);
        let method = MethodDecl::new(
            "F",
            vec![ParamDecl::new("o", Ty::Named(self.holder))],
            Ty::Void,
            body,
        );
        self.script("vt.js", vec![method.into()])
    }

    /// `function F(e: Mode, i: int) { e = i; i = e; var b: boolean = e > 2; }`
    pub fn enum_conversions(&mut self) -> SourceUnit {
        let mode = Ty::Named(self.mode);
        let e = || Expr::param("e", Ty::Named(self.mode));
        let i = || Expr::param("i", Ty::int());
        let body = Block::new(vec![
            Stmt::expr(Expr::assign(e(), i())),
            Stmt::expr(Expr::assign(i(), e())),
            Stmt::var(
                StmtVar::new(
                    "b",
                    Ty::bool(),
                    Some(Expr::binary(BinOpKind::Gt, e(), Expr::int(2), Ty::bool())),
                )
                .declared(Ty::bool()),
            ),
        ]);
        let method = MethodDecl::new(
            "F",
            vec![ParamDecl::new("e", mode), ParamDecl::new("i", Ty::int())],
            Ty::Void,
            body,
        );
        self.script("en.js", vec![method.into()])
    }

    /// `function F(e: Mode, i: int) { i *= 1.5; e += 1; AddComponent(Rigidbody); }`
    pub fn compound_assignments(&mut self) -> SourceUnit {
        let component = self.types.well_known().component;
        let system_type = self.types.well_known().system_type;
        let rigidbody = self.types.declare(
            TypeInfo::class(Some("UnityEngine"), "Rigidbody").with_base(Ty::Named(component)),
        );
        let compound = |op, target: Expr, value| {
            let ty = target.ty.clone();
            Expr::new(
                ExprKind::Assign(ExprAssign {
                    op: Some(op),
                    target: Box::new(target),
                    value: Box::new(value),
                }),
                ty,
            )
        };
        let add_component = Expr::invoke(
            Expr::member(
                Expr::self_ref(self.mono_behaviour()),
                "AddComponent",
                MemberBinding::method(component),
                Ty::Named(component),
            ),
            vec![Expr::type_of(Ty::Named(rigidbody), system_type)],
            Some(Signature::new(
                vec![Param::new("componentType", Ty::Named(system_type))],
                Ty::Named(component),
            )),
            Ty::Named(rigidbody),
        );
        let body = Block::new(vec![
            Stmt::expr(compound(
                BinOpKind::Mul,
                Expr::param("i", Ty::int()),
                Expr::literal(Literal::Double(1.5), Ty::double()),
            )),
            Stmt::expr(compound(
                BinOpKind::Add,
                Expr::param("e", Ty::Named(self.mode)),
                Expr::int(1),
            )),
            Stmt::expr(add_component),
        ]);
        let method = MethodDecl::new(
            "F",
            vec![
                ParamDecl::new("e", Ty::Named(self.mode)),
                ParamDecl::new("i", Ty::int()),
            ],
            Ty::Void,
            body,
        );
        self.script("ops.js", vec![method.into()])
    }

    /// Two constructors, the parameterless one chaining to the other, and an initialized field.
    pub fn chained_constructors(&self) -> SourceUnit {
        let mut chained = CtorDecl::new(Vec::new(), Block::empty());
        chained.chain = Some(CtorChain {
            kind: CtorChainKind::This,
            args: vec![Expr::int(0)],
            signature: Some(Signature::new(
                vec![Param::new("start", Ty::int())],
                Ty::Void,
            )),
        });
        let primary = CtorDecl::new(
            vec![ParamDecl::new("start", Ty::int())],
            Block::empty(),
        );
        let decl = TypeDecl::new(self.counter, "Counter", TypeKind::Class)
            .with_member(FieldDecl::new("count", Ty::int(), Some(Expr::int(5))))
            .with_member(chained)
            .with_member(primary);
        let mut unit = SourceUnit::new("counter.js");
        unit.decls.push(decl);
        unit
    }

    /// `struct Point { var x: int = 1; }`, which C# cannot express.
    pub fn struct_with_initializer(&self) -> SourceUnit {
        let decl = TypeDecl::new(self.point, "Point", TypeKind::Struct)
            .with_member(FieldDecl::new("x", Ty::int(), Some(Expr::int(1))));
        let mut unit = SourceUnit::new("point.js");
        unit.decls.push(decl);
        unit
    }

    pub fn converter(self, units: Vec<SourceUnit>, options: ConverterOptions) -> Converter {
        let frontend = units
            .into_iter()
            .fold(PreparedFrontend::new(Arc::new(self.types)), PreparedFrontend::with_unit);
        Converter::new(Arc::new(frontend), options)
    }
}

/// Input file for an already annotated unit.
pub fn source(unit: &SourceUnit) -> SourceFile {
    SourceFile::new(unit.file_name.clone(), "")
}
