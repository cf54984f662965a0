//! Known-API normalization.
//!
//! Calls registered in the [`KnownApiTable`](crate::known_api::KnownApiTable) return a
//! general type while the call site expects the type named by an argument. Such calls are
//! wrapped in a cast to that type; calls given an explicit generic argument stay untouched,
//! as do calls whose result is discarded by an expression statement.

use crate::context::PassContext;
use crate::fold::*;
use crate::passes::RewritePass;
use tracing::debug;
use us2cs_core::ast::*;
use us2cs_core::ty::Ty;
use us2cs_core::Result;

pub struct KnownApiPass;

impl RewritePass for KnownApiPass {
    fn name(&self) -> &'static str {
        "known-api"
    }

    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit> {
        KnownApis { ctx }.fold_unit(unit)
    }
}

struct KnownApis<'a> {
    ctx: &'a PassContext,
}

impl KnownApis<'_> {
    /// Type named by a type token or a string literal argument.
    fn type_from_argument(&self, arg: &Expr) -> Option<Ty> {
        match &arg.strip_parens().kind {
            ExprKind::TypeOf(ty) | ExprKind::TypeRef(ty) => Some(ty.clone()),
            ExprKind::Literal(Literal::String(name)) => self.ctx.types.lookup(name).map(Ty::Named),
            _ => None,
        }
    }

    /// Type the call result must be cast to, if `expr` is a registered call needing one.
    fn cast_target(&self, expr: &Expr) -> Option<Ty> {
        let ExprKind::Invoke(invoke) = &expr.kind else {
            return None;
        };
        let (binding, name) = match &invoke.target.strip_parens().kind {
            ExprKind::Member(member) => (&member.binding, member.name.as_str()),
            ExprKind::Ident(ExprIdent {
                name,
                binding: Binding::Member(binding),
            }) => (binding, name.as_str()),
            _ => return None,
        };
        if binding.kind != MemberKind::Method || !invoke.generic_args.is_empty() {
            return None;
        }
        let api = self
            .ctx
            .known_apis
            .lookup(&self.ctx.types, binding.declaring, name)?;
        let declared = invoke.signature.as_ref().map(|signature| &signature.ret);
        let required = invoke
            .args
            .get(api.type_argument)
            .and_then(|arg| self.type_from_argument(arg))
            .or_else(|| (declared != Some(&expr.ty)).then(|| expr.ty.clone()))?;
        if declared == Some(&required) || required.is_object() || required.is_void() {
            return None;
        }
        Some(required)
    }
}

impl Fold for KnownApis<'_> {
    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        match stmt {
            Stmt::Expr(expr) if matches!(expr.strip_parens().kind, ExprKind::Invoke(_)) => {
                Ok(Stmt::Expr(walk_expr(self, expr.into_stripped())?))
            }
            stmt => walk_stmt(self, stmt),
        }
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        // a cast written in source, or inserted by coercion, already narrows the result
        if let ExprKind::Cast(cast) = &expr.kind {
            if self.cast_target(cast.expr.strip_parens()).as_ref() == Some(&cast.to) {
                let Expr { ty, span, kind } = expr;
                let mut cast = match kind {
                    ExprKind::Cast(cast) => cast,
                    kind => return Ok(Expr { ty, span, kind }),
                };
                cast.expr = Box::new(walk_expr(self, cast.expr.into_stripped())?);
                return Ok(Expr::new(ExprKind::Cast(cast), ty).with_span(span));
            }
        }

        let mut expr = walk_expr(self, expr)?;
        match self.cast_target(&expr) {
            Some(required) => {
                debug!(to = %self.ctx.types.display(&required), "casting known API result");
                if let ExprKind::Invoke(invoke) = &expr.kind {
                    if let Some(signature) = &invoke.signature {
                        expr.ty = signature.ret.clone();
                    }
                }
                Ok(Expr::cast(expr, required))
            }
            None => Ok(expr),
        }
    }
}
