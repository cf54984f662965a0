use crate::ast::{Expr, Ident};
use crate::span::Span;
use crate::ty::Ty;

common_struct! {
    pub struct Block {
        pub stmts: Vec<Stmt>,
    }
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn empty() -> Self {
        Self { stmts: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

impl From<Vec<Stmt>> for Block {
    fn from(stmts: Vec<Stmt>) -> Self {
        Block::new(stmts)
    }
}

common_struct! {
    pub struct StmtVar {
        pub name: Ident,
        /// Type written in source, if any.
        #[serde(default)]
        pub declared: Option<Ty>,
        /// Resolved type of the local.
        pub ty: Ty,
        #[serde(default)]
        pub init: Option<Expr>,
        #[serde(default)]
        pub span: Span,
    }
}

impl StmtVar {
    pub fn new(name: impl Into<Ident>, ty: Ty, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            ty,
            init,
            span: Span::null(),
        }
    }

    pub fn declared(mut self, ty: Ty) -> Self {
        self.declared = Some(ty);
        self
    }
}

common_struct! {
    pub struct StmtIf {
        pub cond: Expr,
        pub then: Block,
        #[serde(default)]
        pub otherwise: Option<Block>,
    }
}

common_struct! {
    pub struct StmtWhile {
        pub cond: Expr,
        pub body: Block,
    }
}

common_struct! {
    pub struct StmtFor {
        #[serde(default)]
        pub init: Vec<Stmt>,
        #[serde(default)]
        pub cond: Option<Expr>,
        #[serde(default)]
        pub step: Vec<Expr>,
        pub body: Block,
    }
}

common_struct! {
    pub struct StmtForEach {
        pub var: Ident,
        pub var_ty: Ty,
        pub iter: Expr,
        pub body: Block,
    }
}

common_struct! {
    pub struct StmtReturn {
        #[serde(default)]
        pub value: Option<Expr>,
        #[serde(default)]
        pub span: Span,
    }
}

common_enum! {
    pub enum Stmt {
        Expr(Expr),
        Var(StmtVar),
        If(StmtIf),
        While(StmtWhile),
        For(StmtFor),
        ForEach(StmtForEach),
        Return(StmtReturn),
        Throw(Expr),
        Break,
        Continue,
        Block(Block),
    }
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::Return(StmtReturn {
            value,
            span: Span::null(),
        })
    }

    pub fn var(var: StmtVar) -> Self {
        Stmt::Var(var)
    }
}
