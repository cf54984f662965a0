//! Type coercion.
//!
//! At every type-constrained position the required type is computed from context and the
//! expression is wrapped in an explicit cast unless C# converts it implicitly. Casts are
//! inserted once: a cast already producing the required type satisfies the position.
//! A narrowing compound assignment casts its result, `x = (T) (x op v)`.

use crate::context::PassContext;
use crate::fold::*;
use crate::passes::RewritePass;
use crate::pass_ensure;
use std::mem;
use tracing::trace;
use us2cs_core::ast::*;
use us2cs_core::ty::{ParamModifier, Signature, Ty};
use us2cs_core::Result;

pub struct CoercionPass;

impl RewritePass for CoercionPass {
    fn name(&self) -> &'static str {
        "type-coercion"
    }

    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit> {
        Coercer::new(ctx).fold_unit(unit)
    }
}

pub(crate) struct Coercer<'a> {
    ctx: &'a PassContext,
    /// Return type of each enclosing method or lambda, `None` while still unknown.
    returns: Vec<Option<Ty>>,
}

impl<'a> Coercer<'a> {
    pub(crate) fn new(ctx: &'a PassContext) -> Self {
        Self {
            ctx,
            returns: Vec::new(),
        }
    }

    fn needs_cast(&self, expr: &Expr, required: &Ty) -> bool {
        if required.is_void() || &expr.ty == required {
            return false;
        }
        // delegate shapes are settled by lambda inference
        if expr.is_lambda() || matches!(required, Ty::Delegate(_)) || matches!(expr.ty, Ty::Delegate(_)) {
            return false;
        }
        if matches!(expr.ty, Ty::Null | Ty::Void) {
            return false;
        }
        !self.ctx.types.is_implicitly_convertible(&expr.ty, required)
    }

    /// Wraps `expr` in a cast to `required` unless C# accepts it as is.
    pub(crate) fn coerce(&self, expr: Expr, required: &Ty) -> Expr {
        if !self.needs_cast(&expr, required) {
            return expr;
        }
        trace!(
            from = %self.ctx.types.display(&expr.ty),
            to = %self.ctx.types.display(required),
            "inserting cast"
        );
        Expr::cast(expr, required.clone())
    }

    fn coerce_args(&self, args: Vec<Expr>, signature: &Signature) -> Vec<Expr> {
        args.into_iter()
            .enumerate()
            .map(|(index, arg)| {
                let by_reference = signature
                    .params
                    .get(index)
                    .map_or(false, |param| matches!(param.modifier, ParamModifier::Out | ParamModifier::Ref));
                match signature.param_type_at(index) {
                    Some(required) if !by_reference => self.coerce(arg, required),
                    _ => arg,
                }
            })
            .collect()
    }

    fn coerce_delegate_args(&self, args: Vec<Expr>, params: &[Ty]) -> Vec<Expr> {
        args.into_iter()
            .enumerate()
            .map(|(index, arg)| match params.get(index) {
                Some(required) => self.coerce(arg, required),
                None => arg,
            })
            .collect()
    }

    /// Compares an enum with an integer in the enum's domain.
    fn coerce_comparison(&self, binary: &mut ExprBinary) {
        if !binary.op.is_comparison() {
            return;
        }
        let types = &self.ctx.types;
        if types.is_enum(&binary.lhs.ty) && binary.rhs.ty.is_integral() {
            let enum_ty = binary.lhs.ty.clone();
            let rhs = mem::replace(binary.rhs.as_mut(), Expr::null());
            *binary.rhs = Expr::cast(rhs, enum_ty);
        } else if types.is_enum(&binary.rhs.ty) && binary.lhs.ty.is_integral() {
            let enum_ty = binary.rhs.ty.clone();
            let lhs = mem::replace(binary.lhs.as_mut(), Expr::null());
            *binary.lhs = Expr::cast(lhs, enum_ty);
        }
    }

    fn coerce_assign(&self, assign: &mut ExprAssign) -> Result<()> {
        let target_ty = assign.target.ty.clone();
        let Some(op) = assign.op else {
            let value = mem::replace(assign.value.as_mut(), Expr::null());
            *assign.value = self.coerce(value, &target_ty);
            return Ok(());
        };
        let types = &self.ctx.types;
        let keep = match op {
            // shift counts are always int and string += appends any value
            BinOpKind::Shl | BinOpKind::Shr => true,
            BinOpKind::Add if target_ty == Ty::string() => true,
            // C# defines `E + int` and `E - int`
            BinOpKind::Add | BinOpKind::Sub => types.is_enum(&target_ty) && assign.value.ty.is_integral(),
            _ => false,
        };
        if keep || !self.needs_cast(&assign.value, &target_ty) {
            return Ok(());
        }
        if target_ty.is_numeric() && assign.value.ty.is_numeric() {
            // `x op= v` narrows the result, not the operand: `x = (T) (x op v)`
            pass_ensure!(
                is_repeatable(&assign.target),
                unsupported,
                assign.target.span,
                "narrowing compound assignment to a target with side effects"
            );
            let value = mem::replace(assign.value.as_mut(), Expr::null());
            let result_ty = promoted(&target_ty, &value.ty);
            let span = value.span;
            let combined = Expr::binary(op, (*assign.target).clone(), value, result_ty).with_span(span);
            *assign.value = Expr::cast(combined, target_ty);
            assign.op = None;
            return Ok(());
        }
        let value = mem::replace(assign.value.as_mut(), Expr::null());
        *assign.value = self.coerce(value, &target_ty);
        Ok(())
    }
}

/// Type of a binary numeric operation after C# operand promotion.
fn promoted(lhs: &Ty, rhs: &Ty) -> Ty {
    let rank = |ty: &Ty| ty.as_primitive().and_then(|p| p.numeric_rank()).unwrap_or(0);
    let wider = if rank(rhs) > rank(lhs) { rhs } else { lhs };
    if rank(wider) < rank(&Ty::int()) {
        Ty::int()
    } else {
        wider.clone()
    }
}

/// Whether evaluating `expr` twice reads the same location without side effects.
fn is_repeatable(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) | ExprKind::SelfRef | ExprKind::SuperRef | ExprKind::TypeRef(_) => true,
        ExprKind::Literal(_) => true,
        ExprKind::Paren(inner) => is_repeatable(inner),
        ExprKind::Member(member) => is_repeatable(&member.target),
        ExprKind::Index(index) => is_repeatable(&index.target) && index.index.iter().all(is_repeatable),
        _ => false,
    }
}

impl Fold for Coercer<'_> {
    fn fold_field(&mut self, field: FieldDecl) -> Result<FieldDecl> {
        let mut field = walk_field(self, field)?;
        field.init = field.init.map(|init| self.coerce(init, &field.ty));
        Ok(field)
    }

    fn fold_method(&mut self, method: MethodDecl) -> Result<MethodDecl> {
        self.returns.push(Some(method.ret.clone()));
        let method = walk_method(self, method);
        self.returns.pop();
        method
    }

    fn fold_ctor(&mut self, ctor: CtorDecl) -> Result<CtorDecl> {
        self.returns.push(Some(Ty::Void));
        let ctor = walk_ctor(self, ctor);
        self.returns.pop();
        let mut ctor = ctor?;
        if let Some(chain) = ctor.chain.as_mut() {
            if let Some(signature) = &chain.signature {
                chain.args = self.coerce_args(mem::take(&mut chain.args), signature);
            }
        }
        Ok(ctor)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        Ok(match walk_stmt(self, stmt)? {
            Stmt::Var(mut var) => {
                let required = var.declared.clone().unwrap_or_else(|| var.ty.clone());
                var.init = var.init.map(|init| self.coerce(init, &required));
                Stmt::Var(var)
            }
            Stmt::Return(mut ret) => {
                if let Some(Some(required)) = self.returns.last() {
                    let required = required.clone();
                    ret.value = ret.value.map(|value| self.coerce(value, &required));
                }
                Stmt::Return(ret)
            }
            stmt => stmt,
        })
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        let lambda_ret = match &expr.kind {
            ExprKind::Lambda(lambda) => Some(
                lambda
                    .ret
                    .clone()
                    .or_else(|| expr.ty.as_delegate().map(|delegate| (*delegate.ret).clone())),
            ),
            _ => None,
        };
        let is_lambda = lambda_ret.is_some();
        if let Some(ret) = lambda_ret {
            self.returns.push(ret);
        }
        let walked = walk_expr(self, expr);
        if is_lambda {
            self.returns.pop();
        }
        let mut expr = walked?;

        match &mut expr.kind {
            ExprKind::Assign(assign) => self.coerce_assign(assign)?,
            ExprKind::Binary(binary) => self.coerce_comparison(binary),
            ExprKind::Invoke(invoke) => {
                let args = mem::take(&mut invoke.args);
                invoke.args = match (&invoke.signature, &invoke.target.ty) {
                    (Some(signature), _) => self.coerce_args(args, signature),
                    (None, Ty::Delegate(delegate)) => self.coerce_delegate_args(args, &delegate.params),
                    (None, _) => args,
                };
            }
            ExprKind::New(new) => {
                if let Some(signature) = &new.signature {
                    new.args = self.coerce_args(mem::take(&mut new.args), signature);
                }
            }
            ExprKind::Array(array) => {
                let elem = array.elem.clone();
                array.items = mem::take(&mut array.items)
                    .into_iter()
                    .map(|item| self.coerce(item, &elem))
                    .collect();
            }
            _ => {}
        }
        Ok(expr)
    }
}
