//! Identifier escaping.
//!
//! Marks every declared and referenced name that collides with a C# reserved word so the
//! emitter renders it verbatim (`@name`). Type names inside resolved types are escaped when
//! rendered.

use crate::context::PassContext;
use crate::fold::*;
use crate::passes::RewritePass;
use us2cs_core::ast::*;
use us2cs_core::keywords::is_reserved_word;
use us2cs_core::Result;

pub struct EscapingPass;

impl RewritePass for EscapingPass {
    fn name(&self) -> &'static str {
        "identifier-escaping"
    }

    fn rewrite_unit(&self, unit: SourceUnit, _ctx: &PassContext) -> Result<SourceUnit> {
        Escaper.fold_unit(unit)
    }
}

struct Escaper;

fn escape(ident: &mut Ident) {
    ident.escaped = is_reserved_word(&ident.name);
}

fn escape_params(params: &mut [ParamDecl]) {
    params.iter_mut().for_each(|param| escape(&mut param.name));
}

impl Fold for Escaper {
    fn fold_type_decl(&mut self, decl: TypeDecl) -> Result<TypeDecl> {
        let mut decl = walk_type_decl(self, decl)?;
        escape(&mut decl.name);
        decl.enum_members
            .iter_mut()
            .for_each(|member| escape(&mut member.name));
        Ok(decl)
    }

    fn fold_field(&mut self, field: FieldDecl) -> Result<FieldDecl> {
        let mut field = walk_field(self, field)?;
        escape(&mut field.name);
        Ok(field)
    }

    fn fold_method(&mut self, method: MethodDecl) -> Result<MethodDecl> {
        let mut method = walk_method(self, method)?;
        escape(&mut method.name);
        escape_params(&mut method.params);
        Ok(method)
    }

    fn fold_ctor(&mut self, ctor: CtorDecl) -> Result<CtorDecl> {
        let mut ctor = walk_ctor(self, ctor)?;
        escape_params(&mut ctor.params);
        Ok(ctor)
    }

    fn fold_attribute(&mut self, attr: Attribute) -> Result<Attribute> {
        let mut attr = walk_attribute(self, attr)?;
        attr.args
            .iter_mut()
            .filter_map(|arg| arg.name.as_mut())
            .for_each(escape);
        Ok(attr)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        let mut stmt = walk_stmt(self, stmt)?;
        match &mut stmt {
            Stmt::Var(var) => escape(&mut var.name),
            Stmt::ForEach(stmt_foreach) => escape(&mut stmt_foreach.var),
            _ => {}
        }
        Ok(stmt)
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        let mut expr = walk_expr(self, expr)?;
        match &mut expr.kind {
            ExprKind::Ident(ident) => escape(&mut ident.name),
            ExprKind::Member(member) => escape(&mut member.name),
            ExprKind::Lambda(lambda) => lambda
                .params
                .iter_mut()
                .for_each(|param| escape(&mut param.name)),
            _ => {}
        }
        Ok(expr)
    }
}
