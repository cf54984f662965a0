use crate::ast::{Block, Ident};
use crate::span::Span;
use crate::ty::{Signature, Ty, TypeId};

common_enum! {
    pub enum Literal {
        Null,
        Bool(bool),
        Int(i64),
        Long(i64),
        Float(f64),
        Double(f64),
        Char(char),
        String(String),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    EnumMember,
}

common_struct! {
    /// Declaration a member reference was bound to by the front end.
    pub struct MemberBinding {
        pub declaring: TypeId,
        pub kind: MemberKind,
        #[serde(default)]
        pub is_static: bool,
        /// C# spelling when it differs from the source name (`length` -> `Length`).
        #[serde(default)]
        pub target_name: Option<String>,
    }
}

impl MemberBinding {
    pub fn new(declaring: TypeId, kind: MemberKind) -> Self {
        Self {
            declaring,
            kind,
            is_static: false,
            target_name: None,
        }
    }

    pub fn field(declaring: TypeId) -> Self {
        Self::new(declaring, MemberKind::Field)
    }

    pub fn property(declaring: TypeId) -> Self {
        Self::new(declaring, MemberKind::Property)
    }

    pub fn method(declaring: TypeId) -> Self {
        Self::new(declaring, MemberKind::Method)
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn renamed(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = Some(target_name.into());
        self
    }
}

common_enum! {
    pub enum Binding {
        Local,
        Parameter,
        Member(MemberBinding),
        Unresolved,
    }
}

common_struct! {
    pub struct ExprIdent {
        pub name: Ident,
        pub binding: Binding,
    }
}

common_struct! {
    pub struct ExprMember {
        pub target: Box<Expr>,
        pub name: Ident,
        pub binding: MemberBinding,
    }
}

common_struct! {
    pub struct ExprInvoke {
        pub target: Box<Expr>,
        #[serde(default)]
        pub generic_args: Vec<Ty>,
        pub args: Vec<Expr>,
        /// Overload chosen by the front end; `None` for delegate calls and construction sugar.
        #[serde(default)]
        pub signature: Option<Signature>,
    }
}

common_struct! {
    pub struct ExprIndex {
        pub target: Box<Expr>,
        pub index: Vec<Expr>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Shl => "<<",
            BinOpKind::Shr => ">>",
            BinOpKind::BitAnd => "&",
            BinOpKind::BitOr => "|",
            BinOpKind::BitXor => "^",
            BinOpKind::And => "&&",
            BinOpKind::Or => "||",
            BinOpKind::Eq => "==",
            BinOpKind::Ne => "!=",
            BinOpKind::Lt => "<",
            BinOpKind::Le => "<=",
            BinOpKind::Gt => ">",
            BinOpKind::Ge => ">=",
        }
    }

    /// Relational and equality operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOpKind::Eq
                | BinOpKind::Ne
                | BinOpKind::Lt
                | BinOpKind::Le
                | BinOpKind::Gt
                | BinOpKind::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum UnOpKind {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOpKind::Neg => "-",
            UnOpKind::Not => "!",
            UnOpKind::BitNot => "~",
            UnOpKind::PreInc | UnOpKind::PostInc => "++",
            UnOpKind::PreDec | UnOpKind::PostDec => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnOpKind::PostInc | UnOpKind::PostDec)
    }
}

common_struct! {
    pub struct ExprBinary {
        pub op: BinOpKind,
        pub lhs: Box<Expr>,
        pub rhs: Box<Expr>,
    }
}

common_struct! {
    pub struct ExprUnary {
        pub op: UnOpKind,
        pub expr: Box<Expr>,
    }
}

common_struct! {
    pub struct ExprTernary {
        pub cond: Box<Expr>,
        pub then: Box<Expr>,
        pub otherwise: Box<Expr>,
    }
}

common_struct! {
    pub struct ExprCast {
        pub expr: Box<Expr>,
        pub to: Ty,
        /// Inserted by a rewrite rather than written in source.
        #[serde(default)]
        pub synthesized: bool,
    }
}

common_struct! {
    pub struct ExprTryCast {
        pub expr: Box<Expr>,
        pub to: Ty,
    }
}

common_struct! {
    pub struct ExprNew {
        pub ty: Ty,
        pub args: Vec<Expr>,
        #[serde(default)]
        pub signature: Option<Signature>,
    }
}

common_struct! {
    pub struct ExprNewArray {
        pub elem: Ty,
        pub size: Box<Expr>,
    }
}

common_struct! {
    pub struct LambdaParam {
        pub name: Ident,
        /// Annotated in source, or filled in by lambda inference.
        #[serde(default)]
        pub ty: Option<Ty>,
    }
}

common_enum! {
    pub enum LambdaBody {
        Expr(Box<Expr>),
        Block(Block),
    }
}

common_struct! {
    pub struct ExprLambda {
        pub params: Vec<LambdaParam>,
        #[serde(default)]
        pub ret: Option<Ty>,
        pub body: LambdaBody,
    }
}

common_struct! {
    pub struct ExprArray {
        pub elem: Ty,
        pub items: Vec<Expr>,
    }
}

common_struct! {
    pub struct MapEntry {
        pub key: Expr,
        pub value: Expr,
    }
}

common_struct! {
    pub struct ExprMap {
        pub entries: Vec<MapEntry>,
    }
}

common_struct! {
    pub struct ExprAssign {
        /// Compound operator, `None` for plain `=`.
        #[serde(default)]
        pub op: Option<BinOpKind>,
        pub target: Box<Expr>,
        pub value: Box<Expr>,
    }
}

common_enum! {
    pub enum ExprKind {
        Literal(Literal),
        Ident(ExprIdent),
        SelfRef,
        SuperRef,
        /// A type named in expression position: receiver of a static access or a callee.
        TypeRef(Ty),
        Member(ExprMember),
        Invoke(ExprInvoke),
        Index(ExprIndex),
        Binary(ExprBinary),
        Unary(ExprUnary),
        Ternary(ExprTernary),
        Cast(ExprCast),
        TryCast(ExprTryCast),
        TypeOf(Ty),
        Default(Ty),
        New(ExprNew),
        NewArray(ExprNewArray),
        Lambda(ExprLambda),
        Array(ExprArray),
        Map(ExprMap),
        Assign(ExprAssign),
        Paren(Box<Expr>),
    }
}

common_struct! {
    pub struct Expr {
        pub ty: Ty,
        #[serde(default)]
        pub span: Span,
        pub kind: ExprKind,
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Ty) -> Self {
        Self {
            ty,
            span: Span::null(),
            kind,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ExprKind {
        &mut self.kind
    }

    pub fn literal(literal: Literal, ty: Ty) -> Self {
        Self::new(ExprKind::Literal(literal), ty)
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null, Ty::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Literal::Bool(value), Ty::bool())
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Int(value), Ty::int())
    }

    pub fn float(value: f64) -> Self {
        Self::literal(Literal::Float(value), Ty::float())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()), Ty::string())
    }

    pub fn ident(name: impl Into<Ident>, binding: Binding, ty: Ty) -> Self {
        Self::new(
            ExprKind::Ident(ExprIdent {
                name: name.into(),
                binding,
            }),
            ty,
        )
    }

    pub fn local(name: impl Into<Ident>, ty: Ty) -> Self {
        Self::ident(name, Binding::Local, ty)
    }

    pub fn param(name: impl Into<Ident>, ty: Ty) -> Self {
        Self::ident(name, Binding::Parameter, ty)
    }

    pub fn self_ref(ty: Ty) -> Self {
        Self::new(ExprKind::SelfRef, ty)
    }

    pub fn type_ref(ty: Ty) -> Self {
        Self::new(ExprKind::TypeRef(ty.clone()), ty)
    }

    pub fn member(target: Expr, name: impl Into<Ident>, binding: MemberBinding, ty: Ty) -> Self {
        Self::new(
            ExprKind::Member(ExprMember {
                target: Box::new(target),
                name: name.into(),
                binding,
            }),
            ty,
        )
    }

    pub fn invoke(target: Expr, args: Vec<Expr>, signature: Option<Signature>, ty: Ty) -> Self {
        Self::new(
            ExprKind::Invoke(ExprInvoke {
                target: Box::new(target),
                generic_args: Vec::new(),
                args,
                signature,
            }),
            ty,
        )
    }

    pub fn binary(op: BinOpKind, lhs: Expr, rhs: Expr, ty: Ty) -> Self {
        Self::new(
            ExprKind::Binary(ExprBinary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            ty,
        )
    }

    pub fn unary(op: UnOpKind, expr: Expr, ty: Ty) -> Self {
        Self::new(
            ExprKind::Unary(ExprUnary {
                op,
                expr: Box::new(expr),
            }),
            ty,
        )
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        let ty = target.ty.clone();
        Self::new(
            ExprKind::Assign(ExprAssign {
                op: None,
                target: Box::new(target),
                value: Box::new(value),
            }),
            ty,
        )
    }

    /// Explicit cast inserted by a rewrite.
    pub fn cast(expr: Expr, to: Ty) -> Self {
        let span = expr.span;
        Self::new(
            ExprKind::Cast(ExprCast {
                expr: Box::new(expr),
                to: to.clone(),
                synthesized: true,
            }),
            to,
        )
        .with_span(span)
    }

    pub fn new_object(ty: Ty, args: Vec<Expr>, signature: Option<Signature>) -> Self {
        Self::new(
            ExprKind::New(ExprNew {
                ty: ty.clone(),
                args,
                signature,
            }),
            ty,
        )
    }

    pub fn type_of(ty: Ty, system_type: TypeId) -> Self {
        Self::new(ExprKind::TypeOf(ty), Ty::Named(system_type))
    }

    pub fn default_of(ty: Ty) -> Self {
        Self::new(ExprKind::Default(ty.clone()), ty)
    }

    /// Innermost expression under redundant source parentheses.
    pub fn strip_parens(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.strip_parens(),
            _ => self,
        }
    }

    pub fn into_stripped(self) -> Expr {
        match self.kind {
            ExprKind::Paren(inner) => inner.into_stripped(),
            _ => self,
        }
    }

    pub fn is_type_ref(&self) -> bool {
        matches!(self.strip_parens().kind, ExprKind::TypeRef(_))
    }

    /// True for a synthesized cast to exactly `to`.
    pub fn is_synthesized_cast_to(&self, to: &Ty) -> bool {
        matches!(&self.strip_parens().kind, ExprKind::Cast(cast) if cast.synthesized && &cast.to == to)
    }

    pub fn as_int_literal(&self) -> Option<i64> {
        match &self.strip_parens().kind {
            ExprKind::Literal(Literal::Int(value) | Literal::Long(value)) => Some(*value),
            ExprKind::Unary(unary) if unary.op == UnOpKind::Neg => {
                unary.expr.as_int_literal().map(|value| -value)
            }
            _ => None,
        }
    }

    /// Whether the expression is a lambda literal, possibly parenthesized.
    pub fn is_lambda(&self) -> bool {
        matches!(self.strip_parens().kind, ExprKind::Lambda(_))
    }
}
