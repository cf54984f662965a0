//! Value-type property chain rewrite.
//!
//! `root.p1.p2.field = rhs` where `p1`/`p2` are properties returning structs assigns to a
//! detached copy in C#. The assignment is decomposed into a braced block:
//!
//! ```text
//! { int _1 = rhs; P1 _2 = root.p1; P2 _3 = _2.p2; _3.field = _1; _2.p2 = _3; root.p1 = _2; }
//! ```

use crate::context::PassContext;
use crate::fold::*;
use crate::pass_bail;
use crate::passes::RewritePass;
use tracing::debug;
use us2cs_core::ast::*;
use us2cs_core::span::Span;
use us2cs_core::ty::Ty;
use us2cs_core::Result;

pub struct ValueChainPass;

impl RewritePass for ValueChainPass {
    fn name(&self) -> &'static str {
        "value-type-property-chain"
    }

    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit> {
        ValueChain { ctx }.fold_unit(unit)
    }
}

struct ValueChain<'a> {
    ctx: &'a PassContext,
}

/// One member access of the contiguous value-typed run, outermost first.
struct Segment {
    name: Ident,
    binding: MemberBinding,
    ty: Ty,
    span: Span,
}

impl ValueChain<'_> {
    /// Splits the receiver of the assigned member into its root and the value-typed run
    /// leading to it. Returns `None` when no property in the run yields a copy.
    fn split_chain(&self, receiver: &Expr) -> Option<(Expr, Vec<Segment>)> {
        let mut segments = Vec::new();
        let mut current = receiver.strip_parens();
        while let ExprKind::Member(member) = &current.kind {
            if !self.ctx.types.is_value_type(&current.ty) {
                break;
            }
            segments.push(Segment {
                name: member.name.clone(),
                binding: member.binding.clone(),
                ty: current.ty.clone(),
                span: current.span,
            });
            current = member.target.strip_parens();
        }
        if !segments
            .iter()
            .any(|segment| segment.binding.kind == MemberKind::Property)
        {
            return None;
        }
        segments.reverse();
        Some((current.clone(), segments))
    }

    fn needs_rewrite(&self, target: &Expr) -> bool {
        match &target.strip_parens().kind {
            ExprKind::Member(member) => self.split_chain(&member.target).is_some(),
            _ => false,
        }
    }

    /// Builds the read/mutate/write-back block for an assignment or increment whose target
    /// is `member`. `mutate` receives the rewritten target and the optional `_1` temporary.
    fn rewrite(
        &self,
        target: Expr,
        value: Option<Expr>,
        mutate: impl FnOnce(Expr, Option<Expr>) -> Expr,
    ) -> Result<Stmt> {
        let span = target.span;
        let target = target.into_stripped();
        let ExprKind::Member(member) = target.kind else {
            pass_bail!(unsupported, span, "value-type chain rewrite on a non-member target")
        };
        let Some((root, segments)) = self.split_chain(&member.target) else {
            pass_bail!(unsupported, span, "value-type chain rewrite without a property segment")
        };
        if self.ctx.types.is_value_type(&root.ty)
            && !matches!(root.kind, ExprKind::Ident(_) | ExprKind::Index(_) | ExprKind::TypeRef(_))
        {
            pass_bail!(
                unsupported,
                span,
                "value-type property chain rooted in a temporary value cannot be written back"
            );
        }

        let mut stmts = Vec::new();
        let mut next_temp = 1;
        let mut fresh = |ty: &Ty| {
            let name = format!("_{}", next_temp);
            next_temp += 1;
            (Ident::new(name.clone()), Expr::local(name, ty.clone()))
        };

        let value = value.map(|value| {
            let (name, temp) = fresh(&target.ty);
            stmts.push(Stmt::Var(StmtVar::new(name, target.ty.clone(), Some(value))));
            temp
        });

        let mut current = root;
        let mut write_backs = Vec::new();
        for segment in segments {
            let access = Expr::member(current, segment.name, segment.binding, segment.ty.clone())
                .with_span(segment.span);
            if access_is_property(&access) {
                let (name, temp) = fresh(&segment.ty);
                stmts.push(Stmt::Var(StmtVar::new(
                    name,
                    segment.ty.clone(),
                    Some(access.clone()),
                )));
                write_backs.push(Stmt::Expr(Expr::assign(access, temp.clone())));
                current = temp;
            } else {
                current = access;
            }
        }

        let assigned = Expr::member(current, member.name, member.binding, target.ty).with_span(span);
        stmts.push(Stmt::Expr(mutate(assigned, value)));
        stmts.extend(write_backs.into_iter().rev());
        debug!(temporaries = next_temp - 1, "rewrote value-type property chain");
        Ok(Stmt::Block(Block::new(stmts)))
    }
}

fn access_is_property(access: &Expr) -> bool {
    matches!(&access.kind, ExprKind::Member(member) if member.binding.kind == MemberKind::Property)
}

impl Fold for ValueChain<'_> {
    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        let expr = match stmt {
            Stmt::Expr(expr) => expr,
            stmt => return walk_stmt(self, stmt),
        };
        let Expr { ty, span, kind } = expr;
        match kind {
            ExprKind::Assign(assign) if self.needs_rewrite(&assign.target) => {
                let value = self.fold_expr(*assign.value)?;
                let op = assign.op;
                self.rewrite(*assign.target, Some(value), move |target, temp| {
                    let temp = temp.unwrap_or_else(Expr::null);
                    let mut assign = Expr::assign(target, temp);
                    if let ExprKind::Assign(inner) = &mut assign.kind {
                        inner.op = op;
                    }
                    assign.with_span(span)
                })
            }
            ExprKind::Unary(unary)
                if matches!(
                    unary.op,
                    UnOpKind::PreInc | UnOpKind::PreDec | UnOpKind::PostInc | UnOpKind::PostDec
                ) && self.needs_rewrite(&unary.expr) =>
            {
                let op = unary.op;
                self.rewrite(*unary.expr, None, move |target, _| {
                    let ty = target.ty.clone();
                    Expr::unary(op, target, ty).with_span(span)
                })
            }
            kind => Ok(Stmt::Expr(self.fold_expr(Expr { ty, span, kind })?)),
        }
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        if let ExprKind::Assign(assign) = &expr.kind {
            if self.needs_rewrite(&assign.target) {
                pass_bail!(
                    unsupported,
                    expr.span,
                    "assignment through a value-type property chain used as a value"
                );
            }
        }
        walk_expr(self, expr)
    }
}
