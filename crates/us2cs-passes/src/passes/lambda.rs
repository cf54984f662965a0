//! Lambda target inference.
//!
//! Each function literal receives a concrete delegate shape: parameter types come from the
//! literal's annotations, then from the consuming position, then default to `object`; the
//! return type likewise, falling back to the body's return statements. Expression bodies
//! become blocks with an explicit `return`. Members containing lambdas are coerced again so
//! uses of `object`-typed results pick up the casts their context requires.

use crate::context::PassContext;
use crate::fold::*;
use crate::passes::coercion::Coercer;
use crate::passes::RewritePass;
use std::collections::HashMap;
use std::mem;
use tracing::debug;
use us2cs_core::ast::*;
use us2cs_core::ty::{Signature, Ty, TypeDelegate};
use us2cs_core::Result;

pub struct LambdaPass;

impl RewritePass for LambdaPass {
    fn name(&self) -> &'static str {
        "lambda-target-inference"
    }

    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit> {
        let mut inference = LambdaInference {
            ctx,
            locals: HashMap::new(),
            params: HashMap::new(),
        };
        let mut unit = inference.fold_unit(unit)?;
        if unit_mentions_delegate(&unit) {
            unit.require_import("System");
        }
        Ok(unit)
    }
}

struct LambdaInference<'a> {
    ctx: &'a PassContext,
    /// Delegate-typed locals of the member being folded.
    locals: HashMap<String, Ty>,
    /// Parameters of the enclosing lambdas.
    params: HashMap<String, Ty>,
}

impl LambdaInference<'_> {
    fn fold_expected(&mut self, expr: Expr, expected: Option<&Ty>) -> Result<Expr> {
        if expr.is_lambda() {
            self.infer(expr, expected)
        } else {
            self.fold_expr(expr)
        }
    }

    fn fold_args(&mut self, args: Vec<Expr>, expected: impl Fn(usize) -> Option<Ty>) -> Result<Vec<Expr>> {
        args.into_iter()
            .enumerate()
            .map(|(index, arg)| self.fold_expected(arg, expected(index).as_ref()))
            .collect()
    }

    fn infer(&mut self, expr: Expr, expected: Option<&Ty>) -> Result<Expr> {
        let Expr { ty, span, kind } = expr.into_stripped();
        let mut lambda = match kind {
            ExprKind::Lambda(lambda) => lambda,
            kind => return self.fold_expr(Expr { ty, span, kind }),
        };
        let shape: Option<&TypeDelegate> = expected.and_then(Ty::as_delegate);

        for (index, param) in lambda.params.iter_mut().enumerate() {
            if param.ty.is_none() {
                let inferred = shape
                    .and_then(|shape| shape.params.get(index).cloned())
                    .unwrap_or_else(Ty::object);
                param.ty = Some(inferred);
            }
        }
        let param_tys: Vec<Ty> = lambda
            .params
            .iter()
            .map(|param| param.ty.clone().unwrap_or_else(Ty::object))
            .collect();

        let body = match lambda.body {
            LambdaBody::Expr(body) => {
                let span = body.span;
                let mut ret = Stmt::ret(Some(*body));
                if let Stmt::Return(stmt) = &mut ret {
                    stmt.span = span;
                }
                Block::new(vec![ret])
            }
            LambdaBody::Block(block) => block,
        };

        let mut scope = self.params.clone();
        for (param, ty) in lambda.params.iter().zip(&param_tys) {
            scope.insert(param.name.name.clone(), ty.clone());
        }
        let outer = mem::replace(&mut self.params, scope);
        let body = self.fold_block(body);
        self.params = outer;
        let body = body?;

        let ret = lambda
            .ret
            .clone()
            .or_else(|| shape.map(|shape| (*shape.ret).clone()))
            .unwrap_or_else(|| infer_return(&body));
        lambda.ret = Some(ret.clone());
        lambda.body = LambdaBody::Block(body);
        let delegate = Ty::delegate(param_tys, ret);
        debug!(shape = %self.ctx.types.display(&delegate), "inferred lambda shape");
        Ok(Expr::new(ExprKind::Lambda(lambda), delegate).with_span(span))
    }

    /// Propagates inferred delegate types to references and delegate calls.
    fn retype(&self, mut expr: Expr) -> Expr {
        match &expr.kind {
            ExprKind::Ident(ident) => {
                let known = match ident.binding {
                    Binding::Local => self.locals.get(&ident.name.name),
                    Binding::Parameter => self.params.get(&ident.name.name),
                    _ => None,
                };
                if let Some(ty) = known {
                    expr.ty = ty.clone();
                }
            }
            ExprKind::Invoke(invoke) if invoke.signature.is_none() => {
                if let Ty::Delegate(delegate) = &invoke.target.ty {
                    expr.ty = (*delegate.ret).clone();
                }
            }
            _ => {}
        }
        expr
    }

    fn coerce_member(&self, member: MemberDecl) -> Result<MemberDecl> {
        Coercer::new(self.ctx).fold_member(member)
    }
}

impl Fold for LambdaInference<'_> {
    fn fold_member(&mut self, member: MemberDecl) -> Result<MemberDecl> {
        self.locals.clear();
        let had_lambda = member_contains_lambda(&member);
        let member = walk_member(self, member)?;
        if had_lambda {
            self.coerce_member(member)
        } else {
            Ok(member)
        }
    }

    fn fold_field(&mut self, mut field: FieldDecl) -> Result<FieldDecl> {
        field.init = match field.init.take() {
            Some(init) => Some(self.fold_expected(init, Some(&field.ty))?),
            None => None,
        };
        Ok(field)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        let mut var = match stmt {
            Stmt::Var(var) => var,
            stmt => return walk_stmt(self, stmt),
        };
        let expected = var.declared.clone().unwrap_or_else(|| var.ty.clone());
        if let Some(init) = var.init.take() {
            let init = self.fold_expected(init, Some(&expected))?;
            if var.declared.is_none() && init.is_lambda() {
                var.ty = init.ty.clone();
            }
            var.init = Some(init);
        }
        if matches!(var.ty, Ty::Delegate(_)) {
            self.locals.insert(var.name.name.clone(), var.ty.clone());
        }
        Ok(Stmt::Var(var))
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        let Expr { ty, span, kind } = expr;
        let kind = match kind {
            ExprKind::Lambda(_) => return self.infer(Expr { ty, span, kind }, None),
            ExprKind::Assign(mut assign) => {
                assign.target = fold_box(self, assign.target)?;
                let expected = assign.target.ty.clone();
                assign.value = Box::new(self.fold_expected(*assign.value, Some(&expected))?);
                ExprKind::Assign(assign)
            }
            ExprKind::Invoke(mut invoke) => {
                invoke.target = fold_box(self, invoke.target)?;
                let signature = invoke.signature.clone();
                let target_shape = invoke.target.ty.as_delegate().cloned();
                invoke.args = self.fold_args(mem::take(&mut invoke.args), |index| {
                    expected_param(signature.as_ref(), target_shape.as_ref(), index)
                })?;
                ExprKind::Invoke(invoke)
            }
            ExprKind::New(mut new) => {
                let signature = new.signature.clone();
                new.args = self.fold_args(mem::take(&mut new.args), |index| {
                    expected_param(signature.as_ref(), None, index)
                })?;
                ExprKind::New(new)
            }
            kind => {
                let expr = walk_expr(self, Expr { ty, span, kind })?;
                return Ok(self.retype(expr));
            }
        };
        Ok(self.retype(Expr { ty, span, kind }))
    }
}

fn expected_param(signature: Option<&Signature>, shape: Option<&TypeDelegate>, index: usize) -> Option<Ty> {
    match signature {
        Some(signature) => signature.param_type_at(index).cloned(),
        None => shape.and_then(|shape| shape.params.get(index).cloned()),
    }
}

/// Common type of the body's `return` values: `void` without any, `object` when they disagree.
fn infer_return(body: &Block) -> Ty {
    let mut found: Option<Ty> = None;
    let mut conflicting = false;
    collect_returns(body, &mut |ty: &Ty| {
        if let Some(existing) = &found {
            conflicting |= existing != ty;
        } else {
            found = Some(ty.clone());
        }
    });
    match found {
        None => Ty::Void,
        Some(_) if conflicting => Ty::object(),
        Some(Ty::Null) => Ty::object(),
        Some(ty) => ty,
    }
}

fn collect_returns(block: &Block, visit: &mut dyn FnMut(&Ty)) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Return(StmtReturn { value: Some(value), .. }) => visit(&value.ty),
            Stmt::If(stmt_if) => {
                collect_returns(&stmt_if.then, visit);
                if let Some(otherwise) = &stmt_if.otherwise {
                    collect_returns(otherwise, visit);
                }
            }
            Stmt::While(stmt_while) => collect_returns(&stmt_while.body, visit),
            Stmt::For(stmt_for) => collect_returns(&stmt_for.body, visit),
            Stmt::ForEach(stmt_foreach) => collect_returns(&stmt_foreach.body, visit),
            Stmt::Block(inner) => collect_returns(inner, visit),
            _ => {}
        }
    }
}

fn member_contains_lambda(member: &MemberDecl) -> bool {
    let mut is_lambda = |expr: &Expr| matches!(expr.kind, ExprKind::Lambda(_));
    match member {
        MemberDecl::Field(field) => field
            .init
            .as_ref()
            .map_or(false, |init| any_expr(init, &mut is_lambda)),
        MemberDecl::Method(method) => method
            .body
            .as_ref()
            .map_or(false, |body| any_expr_in_block(body, &mut is_lambda)),
        MemberDecl::Ctor(ctor) => {
            ctor.chain
                .as_ref()
                .map_or(false, |chain| chain.args.iter().any(|arg| any_expr(arg, &mut is_lambda)))
                || any_expr_in_block(&ctor.body, &mut is_lambda)
        }
    }
}

fn unit_mentions_delegate(unit: &SourceUnit) -> bool {
    unit.decls.iter().any(|decl| {
        decl.members.iter().any(|member| match member {
            MemberDecl::Field(field) => {
                field.ty.mentions_delegate()
                    || field.init.as_ref().map_or(false, expr_mentions_delegate)
            }
            MemberDecl::Method(method) => {
                method.ret.mentions_delegate()
                    || method.params.iter().any(|param| param.ty.mentions_delegate())
                    || method.body.as_ref().map_or(false, block_mentions_delegate)
            }
            MemberDecl::Ctor(ctor) => {
                ctor.params.iter().any(|param| param.ty.mentions_delegate())
                    || block_mentions_delegate(&ctor.body)
            }
        })
    })
}

fn expr_mentions_delegate(expr: &Expr) -> bool {
    any_expr(expr, &mut |expr: &Expr| expr.ty.mentions_delegate())
}

fn block_mentions_delegate(block: &Block) -> bool {
    block.stmts.iter().any(|stmt| match stmt {
        Stmt::Var(var) => {
            var.ty.mentions_delegate() || var.init.as_ref().map_or(false, expr_mentions_delegate)
        }
        Stmt::If(stmt_if) => {
            expr_mentions_delegate(&stmt_if.cond)
                || block_mentions_delegate(&stmt_if.then)
                || stmt_if.otherwise.as_ref().map_or(false, block_mentions_delegate)
        }
        Stmt::While(stmt_while) => {
            expr_mentions_delegate(&stmt_while.cond) || block_mentions_delegate(&stmt_while.body)
        }
        Stmt::For(stmt_for) => {
            block_mentions_delegate(&Block::new(stmt_for.init.clone()))
                || stmt_for.cond.as_ref().map_or(false, expr_mentions_delegate)
                || stmt_for.step.iter().any(expr_mentions_delegate)
                || block_mentions_delegate(&stmt_for.body)
        }
        Stmt::ForEach(stmt_foreach) => {
            stmt_foreach.var_ty.mentions_delegate()
                || expr_mentions_delegate(&stmt_foreach.iter)
                || block_mentions_delegate(&stmt_foreach.body)
        }
        Stmt::Block(inner) => block_mentions_delegate(inner),
        stmt => any_expr_in_stmt(stmt, &mut |expr: &Expr| expr.ty.mentions_delegate()),
    })
}
