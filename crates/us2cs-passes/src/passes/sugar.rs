//! Sugar desugaring.
//!
//! Rewrites source conveniences into explicit C# forms: construction calls on type names,
//! implicit `this`, type names used as values, `params` arguments, uninitialized locals,
//! leading constructor calls, top level statements and serializable classes.

use crate::context::PassContext;
use crate::fold::*;
use crate::passes::RewritePass;
use crate::{pass_bail, pass_ensure};
use std::mem;
use us2cs_core::ast::*;
use us2cs_core::span::Span;
use us2cs_core::ty::{Signature, Ty, TypeId, TypeKind, TypePrimitive};
use us2cs_core::Result;

pub struct SugarPass;

impl RewritePass for SugarPass {
    fn name(&self) -> &'static str {
        "sugar-desugaring"
    }

    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit> {
        let mut desugar = Desugar {
            ctx,
            current: None,
            current_base: None,
        };
        desugar.fold_unit(unit)
    }
}

struct Desugar<'a> {
    ctx: &'a PassContext,
    current: Option<TypeId>,
    current_base: Option<TypeId>,
}

impl Desugar<'_> {
    /// A type name in value position becomes `typeof(T)`.
    fn valueize(&self, expr: Expr) -> Expr {
        match &expr.strip_parens().kind {
            ExprKind::TypeRef(ty) => {
                Expr::type_of(ty.clone(), self.ctx.types.well_known().system_type)
                    .with_span(expr.span)
            }
            _ => expr,
        }
    }

    fn valueize_all(&self, exprs: Vec<Expr>) -> Vec<Expr> {
        exprs.into_iter().map(|expr| self.valueize(expr)).collect()
    }

    /// Packs trailing arguments bound to a `params T[]` parameter into an array literal.
    fn expand_params(&self, mut args: Vec<Expr>, signature: Option<&Signature>) -> Vec<Expr> {
        let Some(signature) = signature else {
            return args;
        };
        let Some(index) = signature.params_index() else {
            return args;
        };
        if index + 1 != signature.params.len() || args.len() <= index {
            return args;
        }
        let param_ty = &signature.params[index].ty;
        if args.len() == index + 1 {
            let last = &args[index].ty;
            if matches!(last, Ty::Null) || self.ctx.types.is_implicitly_convertible(last, param_ty)
            {
                return args;
            }
        }
        let Some(elem) = param_ty.element_type() else {
            return args;
        };
        let items = args.split_off(index);
        args.push(Expr::new(
            ExprKind::Array(ExprArray {
                elem: elem.clone(),
                items,
            }),
            param_ty.clone(),
        ));
        args
    }

    fn default_value(&self, ty: &Ty) -> Expr {
        match ty {
            Ty::Primitive(TypePrimitive::Bool) => Expr::bool(false),
            Ty::Primitive(TypePrimitive::Char) => Expr::literal(Literal::Char('\0'), ty.clone()),
            Ty::Primitive(TypePrimitive::Byte | TypePrimitive::Int | TypePrimitive::Long) => {
                Expr::literal(Literal::Int(0), ty.clone())
            }
            Ty::Primitive(TypePrimitive::Float) => Expr::float(0.0),
            Ty::Primitive(TypePrimitive::Double) => Expr::literal(Literal::Double(0.0), Ty::double()),
            _ if self.ctx.types.is_value_type(ty) => Expr::default_of(ty.clone()),
            _ => Expr::null(),
        }
    }

    fn rewrite_ident(&self, ident: ExprIdent, ty: Ty, span: Span) -> Result<Expr> {
        match ident.binding {
            Binding::Unresolved => {
                pass_bail!(unresolved, span, "identifier `{}` has no binding", ident.name)
            }
            Binding::Member(binding)
                if !binding.is_static && binding.kind != MemberKind::EnumMember =>
            {
                let owner = self.current.unwrap_or(binding.declaring);
                let name = renamed(ident.name, &binding);
                Ok(Expr::member(Expr::self_ref(Ty::Named(owner)), name, binding, ty).with_span(span))
            }
            Binding::Member(binding) => {
                let name = renamed(ident.name, &binding);
                Ok(Expr::ident(name, Binding::Member(binding), ty).with_span(span))
            }
            binding => Ok(Expr::ident(ident.name, binding, ty).with_span(span)),
        }
    }

    fn rewrite_invoke(&self, mut invoke: ExprInvoke, ty: Ty, span: Span) -> Result<Expr> {
        invoke.args = self.valueize_all(invoke.args);
        match &invoke.target.strip_parens().kind {
            ExprKind::TypeRef(target) => {
                let target = target.clone();
                self.construct(target, invoke.args, span)
            }
            ExprKind::SuperRef => {
                pass_bail!(unsupported, span, "base constructor call outside a constructor prologue")
            }
            _ => {
                invoke.args = self.expand_params(invoke.args, invoke.signature.as_ref());
                Ok(Expr::new(ExprKind::Invoke(invoke), ty).with_span(span))
            }
        }
    }

    /// `T(args)` becomes `new T(args)`, or `default(T)` for a value type without a matching constructor.
    fn construct(&self, target: Ty, args: Vec<Expr>, span: Span) -> Result<Expr> {
        let types = &self.ctx.types;
        let Some(id) = target.type_id() else {
            pass_bail!(unsupported, span, "construction call on `{}`", types.display(&target))
        };
        let arg_tys: Vec<Ty> = args.iter().map(|arg| arg.ty.clone()).collect();
        if let Some(signature) = types.find_constructor(id, &arg_tys) {
            let args = self.expand_params(args, Some(signature));
            return Ok(Expr::new_object(target, args, Some(signature.clone())).with_span(span));
        }
        if types.is_value_type(&target) {
            pass_ensure!(
                args.is_empty(),
                unsupported,
                span,
                "no constructor of `{}` accepts {} argument(s)",
                types.display(&target),
                args.len()
            );
            return Ok(Expr::default_of(target).with_span(span));
        }
        let declares_constructors = types
            .get(id)
            .map_or(false, |info| !info.constructors.is_empty());
        pass_ensure!(
            args.is_empty() && !declares_constructors,
            unresolved,
            span,
            "no constructor of `{}` matches the call",
            types.display(&target)
        );
        Ok(Expr::new_object(target, args, None).with_span(span))
    }

    fn rewrite_new(&self, mut new: ExprNew, ty: Ty, span: Span) -> Expr {
        new.args = self.valueize_all(new.args);
        if new.signature.is_none() {
            if let Some(id) = new.ty.type_id() {
                let arg_tys: Vec<Ty> = new.args.iter().map(|arg| arg.ty.clone()).collect();
                new.signature = self.ctx.types.find_constructor(id, &arg_tys).cloned();
            }
        }
        new.args = self.expand_params(new.args, new.signature.as_ref());
        Expr::new(ExprKind::New(new), ty).with_span(span)
    }

    /// Kind of constructor chaining a leading `C(...)` or `super(...)` statement expresses.
    fn chain_kind(&self, stmt: &Stmt) -> Option<CtorChainKind> {
        let Stmt::Expr(expr) = stmt else {
            return None;
        };
        let ExprKind::Invoke(invoke) = &expr.kind else {
            return None;
        };
        match &invoke.target.strip_parens().kind {
            ExprKind::SuperRef => Some(CtorChainKind::Base),
            ExprKind::TypeRef(ty) if ty.type_id().is_some() && ty.type_id() == self.current => {
                Some(CtorChainKind::This)
            }
            _ => None,
        }
    }

    fn resolve_chain(&self, chain: &mut CtorChain) {
        let owner = match chain.kind {
            CtorChainKind::This => self.current,
            CtorChainKind::Base => self.current_base,
        };
        if chain.signature.is_none() {
            if let Some(owner) = owner {
                let arg_tys: Vec<Ty> = chain.args.iter().map(|arg| arg.ty.clone()).collect();
                chain.signature = self.ctx.types.find_constructor(owner, &arg_tys).cloned();
            }
        }
        let args = self.valueize_all(mem::take(&mut chain.args));
        chain.args = self.expand_params(args, chain.signature.as_ref());
    }

    fn check_attribute(&self, attr: &Attribute) -> Result<()> {
        let mut named: Vec<&str> = Vec::new();
        for arg in &attr.args {
            match &arg.name {
                Some(name) => {
                    pass_ensure!(
                        !named.contains(&name.as_str()),
                        attribute,
                        attr.span,
                        "named argument `{}` given twice",
                        name
                    );
                    named.push(name.as_str());
                }
                None => pass_ensure!(
                    named.is_empty(),
                    attribute,
                    attr.span,
                    "positional argument follows named argument `{}`",
                    named.last().copied().unwrap_or_default()
                ),
            }
            pass_ensure!(
                is_constant_shaped(&arg.value),
                attribute,
                arg.value.span.or(attr.span),
                "attribute argument is not a constant expression"
            );
        }
        Ok(())
    }
}

impl Fold for Desugar<'_> {
    fn fold_unit(&mut self, mut unit: SourceUnit) -> Result<SourceUnit> {
        let globals = mem::take(&mut unit.globals);
        let mut unit = walk_unit(self, unit)?;
        if globals.is_empty() {
            return Ok(unit);
        }
        let Some(script) = unit.decls.iter_mut().find(|decl| decl.is_script) else {
            pass_bail!(
                unsupported,
                Span::null(),
                "top level statements in `{}` without a script class",
                unit.file_name
            )
        };
        self.current = Some(script.id);
        self.current_base = script.base.as_ref().and_then(Ty::type_id);
        let globals = fold_stmts(self, globals)?;
        self.current = None;
        self.current_base = None;
        prepend_to_start(script, globals);
        Ok(unit)
    }

    fn fold_type_decl(&mut self, decl: TypeDecl) -> Result<TypeDecl> {
        let previous = (self.current, self.current_base);
        self.current = Some(decl.id);
        self.current_base = decl.base.as_ref().and_then(Ty::type_id);
        let mut decl = walk_type_decl(self, decl)?;
        (self.current, self.current_base) = previous;

        if self.ctx.serializable_classes && decl.kind == TypeKind::Class && !decl.is_script {
            let serializable = Ty::Named(self.ctx.types.well_known().serializable);
            if !decl.attrs.iter().any(|attr| attr.ty == serializable) {
                decl.attrs.push(Attribute {
                    ty: serializable,
                    args: Vec::new(),
                    span: decl.span,
                });
            }
        }
        Ok(decl)
    }

    fn fold_ctor(&mut self, mut ctor: CtorDecl) -> Result<CtorDecl> {
        if !ctor.modifiers.is_static && ctor.chain.is_none() {
            if let Some(kind) = ctor.body.stmts.first().and_then(|stmt| self.chain_kind(stmt)) {
                if let Stmt::Expr(Expr {
                    kind: ExprKind::Invoke(invoke),
                    ..
                }) = ctor.body.stmts.remove(0)
                {
                    ctor.chain = Some(CtorChain {
                        kind,
                        args: invoke.args,
                        signature: invoke.signature,
                    });
                }
            }
        }
        let mut ctor = walk_ctor(self, ctor)?;
        if let Some(chain) = ctor.chain.as_mut() {
            self.resolve_chain(chain);
        }
        Ok(ctor)
    }

    fn fold_attribute(&mut self, attr: Attribute) -> Result<Attribute> {
        let mut attr = walk_attribute(self, attr)?;
        for arg in &mut attr.args {
            let value = mem::replace(&mut arg.value, Expr::null());
            arg.value = self.valueize(value);
        }
        self.check_attribute(&attr)?;
        Ok(attr)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        Ok(match walk_stmt(self, stmt)? {
            Stmt::Var(mut var) => {
                var.init = Some(match var.init.take() {
                    Some(init) => self.valueize(init),
                    None => self.default_value(&var.ty),
                });
                Stmt::Var(var)
            }
            Stmt::Return(mut ret) => {
                ret.value = ret.value.map(|value| self.valueize(value));
                Stmt::Return(ret)
            }
            stmt => stmt,
        })
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        let Expr { ty, span, kind } = walk_expr(self, expr)?;
        Ok(match kind {
            ExprKind::Ident(ident) => return self.rewrite_ident(ident, ty, span),
            ExprKind::Invoke(invoke) => return self.rewrite_invoke(invoke, ty, span),
            ExprKind::New(new) => self.rewrite_new(new, ty, span),
            ExprKind::Member(mut member) => {
                member.name = renamed(member.name, &member.binding);
                Expr::new(ExprKind::Member(member), ty).with_span(span)
            }
            ExprKind::Assign(mut assign) => {
                assign.value = Box::new(self.valueize(*assign.value));
                Expr::new(ExprKind::Assign(assign), ty).with_span(span)
            }
            ExprKind::Binary(mut binary) => {
                binary.lhs = Box::new(self.valueize(*binary.lhs));
                binary.rhs = Box::new(self.valueize(*binary.rhs));
                Expr::new(ExprKind::Binary(binary), ty).with_span(span)
            }
            ExprKind::Ternary(mut ternary) => {
                ternary.then = Box::new(self.valueize(*ternary.then));
                ternary.otherwise = Box::new(self.valueize(*ternary.otherwise));
                Expr::new(ExprKind::Ternary(ternary), ty).with_span(span)
            }
            ExprKind::Array(mut array) => {
                array.items = self.valueize_all(array.items);
                Expr::new(ExprKind::Array(array), ty).with_span(span)
            }
            ExprKind::Map(map) => {
                let entries = map
                    .entries
                    .into_iter()
                    .map(|entry| MapEntry {
                        key: self.valueize(entry.key),
                        value: self.valueize(entry.value),
                    })
                    .collect();
                Expr::new(ExprKind::Map(ExprMap { entries }), ty).with_span(span)
            }
            kind => Expr::new(kind, ty).with_span(span),
        })
    }
}

fn renamed(name: Ident, binding: &MemberBinding) -> Ident {
    match &binding.target_name {
        Some(target) if *target != name.name => Ident::new(target.clone()),
        _ => name,
    }
}

/// Prepends `globals` to the script's `Start()`, declaring it when absent.
fn prepend_to_start(script: &mut TypeDecl, globals: Vec<Stmt>) {
    let start = script.members.iter_mut().find_map(|member| match member {
        MemberDecl::Method(method)
            if method.name == "Start" && method.params.is_empty() && !method.modifiers.is_static =>
        {
            Some(method)
        }
        _ => None,
    });
    match start {
        Some(method) => {
            let body = method.body.get_or_insert_with(Block::empty);
            let rest = mem::take(&mut body.stmts);
            body.stmts = globals.into_iter().chain(rest).collect();
        }
        None => script
            .members
            .push(MethodDecl::new("Start", Vec::new(), Ty::Void, Block::new(globals)).into()),
    }
}

/// Shapes C# accepts as attribute arguments.
fn is_constant_shaped(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::TypeOf(_) | ExprKind::Default(_) => true,
        ExprKind::Unary(unary) => {
            matches!(unary.op, UnOpKind::Neg | UnOpKind::Not | UnOpKind::BitNot)
                && is_constant_shaped(&unary.expr)
        }
        ExprKind::Binary(binary) => is_constant_shaped(&binary.lhs) && is_constant_shaped(&binary.rhs),
        ExprKind::Member(member) => member.binding.kind == MemberKind::EnumMember,
        ExprKind::Ident(ident) => {
            matches!(&ident.binding, Binding::Member(binding) if binding.kind == MemberKind::EnumMember)
        }
        ExprKind::Array(array) => array.items.iter().all(is_constant_shaped),
        ExprKind::Cast(cast) => is_constant_shaped(&cast.expr),
        ExprKind::Paren(inner) => is_constant_shaped(inner),
        _ => false,
    }
}
