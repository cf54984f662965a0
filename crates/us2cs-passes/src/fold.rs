//! By-value tree folding.
//!
//! Each `fold_*` method consumes a node and returns its replacement. The default
//! implementations rebuild the node from its folded children through the matching
//! `walk_*` function, so a pass overrides only the node kinds it rewrites.

use us2cs_core::ast::*;
use us2cs_core::Result;

pub trait Fold {
    fn fold_unit(&mut self, unit: SourceUnit) -> Result<SourceUnit> {
        walk_unit(self, unit)
    }

    fn fold_type_decl(&mut self, decl: TypeDecl) -> Result<TypeDecl> {
        walk_type_decl(self, decl)
    }

    fn fold_member(&mut self, member: MemberDecl) -> Result<MemberDecl> {
        walk_member(self, member)
    }

    fn fold_field(&mut self, field: FieldDecl) -> Result<FieldDecl> {
        walk_field(self, field)
    }

    fn fold_method(&mut self, method: MethodDecl) -> Result<MethodDecl> {
        walk_method(self, method)
    }

    fn fold_ctor(&mut self, ctor: CtorDecl) -> Result<CtorDecl> {
        walk_ctor(self, ctor)
    }

    fn fold_attribute(&mut self, attr: Attribute) -> Result<Attribute> {
        walk_attribute(self, attr)
    }

    fn fold_block(&mut self, block: Block) -> Result<Block> {
        walk_block(self, block)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        walk_stmt(self, stmt)
    }

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        walk_expr(self, expr)
    }
}

pub fn walk_unit<F: Fold + ?Sized>(folder: &mut F, mut unit: SourceUnit) -> Result<SourceUnit> {
    unit.decls = unit
        .decls
        .into_iter()
        .map(|decl| folder.fold_type_decl(decl))
        .collect::<Result<_>>()?;
    unit.globals = fold_stmts(folder, unit.globals)?;
    Ok(unit)
}

pub fn walk_type_decl<F: Fold + ?Sized>(folder: &mut F, mut decl: TypeDecl) -> Result<TypeDecl> {
    decl.attrs = fold_attributes(folder, decl.attrs)?;
    decl.members = decl
        .members
        .into_iter()
        .map(|member| folder.fold_member(member))
        .collect::<Result<_>>()?;
    Ok(decl)
}

pub fn walk_member<F: Fold + ?Sized>(folder: &mut F, member: MemberDecl) -> Result<MemberDecl> {
    Ok(match member {
        MemberDecl::Field(field) => folder.fold_field(field)?.into(),
        MemberDecl::Method(method) => folder.fold_method(method)?.into(),
        MemberDecl::Ctor(ctor) => folder.fold_ctor(ctor)?.into(),
    })
}

pub fn walk_field<F: Fold + ?Sized>(folder: &mut F, mut field: FieldDecl) -> Result<FieldDecl> {
    field.attrs = fold_attributes(folder, field.attrs)?;
    field.init = fold_opt_expr(folder, field.init)?;
    Ok(field)
}

pub fn walk_method<F: Fold + ?Sized>(folder: &mut F, mut method: MethodDecl) -> Result<MethodDecl> {
    method.attrs = fold_attributes(folder, method.attrs)?;
    method.body = match method.body {
        Some(body) => Some(folder.fold_block(body)?),
        None => None,
    };
    Ok(method)
}

pub fn walk_ctor<F: Fold + ?Sized>(folder: &mut F, mut ctor: CtorDecl) -> Result<CtorDecl> {
    if let Some(mut chain) = ctor.chain.take() {
        chain.args = fold_exprs(folder, chain.args)?;
        ctor.chain = Some(chain);
    }
    ctor.body = folder.fold_block(ctor.body)?;
    Ok(ctor)
}

pub fn walk_attribute<F: Fold + ?Sized>(folder: &mut F, mut attr: Attribute) -> Result<Attribute> {
    for arg in &mut attr.args {
        let value = std::mem::replace(&mut arg.value, Expr::null());
        arg.value = folder.fold_expr(value)?;
    }
    Ok(attr)
}

pub fn walk_block<F: Fold + ?Sized>(folder: &mut F, block: Block) -> Result<Block> {
    Ok(Block::new(fold_stmts(folder, block.stmts)?))
}

pub fn walk_stmt<F: Fold + ?Sized>(folder: &mut F, stmt: Stmt) -> Result<Stmt> {
    Ok(match stmt {
        Stmt::Expr(expr) => Stmt::Expr(folder.fold_expr(expr)?),
        Stmt::Var(mut var) => {
            var.init = fold_opt_expr(folder, var.init)?;
            Stmt::Var(var)
        }
        Stmt::If(stmt_if) => Stmt::If(StmtIf {
            cond: folder.fold_expr(stmt_if.cond)?,
            then: folder.fold_block(stmt_if.then)?,
            otherwise: match stmt_if.otherwise {
                Some(block) => Some(folder.fold_block(block)?),
                None => None,
            },
        }),
        Stmt::While(stmt_while) => Stmt::While(StmtWhile {
            cond: folder.fold_expr(stmt_while.cond)?,
            body: folder.fold_block(stmt_while.body)?,
        }),
        Stmt::For(stmt_for) => Stmt::For(StmtFor {
            init: fold_stmts(folder, stmt_for.init)?,
            cond: fold_opt_expr(folder, stmt_for.cond)?,
            step: fold_exprs(folder, stmt_for.step)?,
            body: folder.fold_block(stmt_for.body)?,
        }),
        Stmt::ForEach(mut stmt_foreach) => {
            stmt_foreach.iter = folder.fold_expr(stmt_foreach.iter)?;
            stmt_foreach.body = folder.fold_block(stmt_foreach.body)?;
            Stmt::ForEach(stmt_foreach)
        }
        Stmt::Return(mut ret) => {
            ret.value = fold_opt_expr(folder, ret.value)?;
            Stmt::Return(ret)
        }
        Stmt::Throw(expr) => Stmt::Throw(folder.fold_expr(expr)?),
        Stmt::Block(block) => Stmt::Block(folder.fold_block(block)?),
        Stmt::Break => Stmt::Break,
        Stmt::Continue => Stmt::Continue,
    })
}

pub fn walk_expr<F: Fold + ?Sized>(folder: &mut F, expr: Expr) -> Result<Expr> {
    let Expr { ty, span, kind } = expr;
    let kind = match kind {
        ExprKind::Literal(_)
        | ExprKind::Ident(_)
        | ExprKind::SelfRef
        | ExprKind::SuperRef
        | ExprKind::TypeRef(_)
        | ExprKind::TypeOf(_)
        | ExprKind::Default(_) => kind,
        ExprKind::Member(mut member) => {
            member.target = fold_box(folder, member.target)?;
            ExprKind::Member(member)
        }
        ExprKind::Invoke(mut invoke) => {
            invoke.target = fold_box(folder, invoke.target)?;
            invoke.args = fold_exprs(folder, invoke.args)?;
            ExprKind::Invoke(invoke)
        }
        ExprKind::Index(mut index) => {
            index.target = fold_box(folder, index.target)?;
            index.index = fold_exprs(folder, index.index)?;
            ExprKind::Index(index)
        }
        ExprKind::Binary(mut binary) => {
            binary.lhs = fold_box(folder, binary.lhs)?;
            binary.rhs = fold_box(folder, binary.rhs)?;
            ExprKind::Binary(binary)
        }
        ExprKind::Unary(mut unary) => {
            unary.expr = fold_box(folder, unary.expr)?;
            ExprKind::Unary(unary)
        }
        ExprKind::Ternary(mut ternary) => {
            ternary.cond = fold_box(folder, ternary.cond)?;
            ternary.then = fold_box(folder, ternary.then)?;
            ternary.otherwise = fold_box(folder, ternary.otherwise)?;
            ExprKind::Ternary(ternary)
        }
        ExprKind::Cast(mut cast) => {
            cast.expr = fold_box(folder, cast.expr)?;
            ExprKind::Cast(cast)
        }
        ExprKind::TryCast(mut cast) => {
            cast.expr = fold_box(folder, cast.expr)?;
            ExprKind::TryCast(cast)
        }
        ExprKind::New(mut new) => {
            new.args = fold_exprs(folder, new.args)?;
            ExprKind::New(new)
        }
        ExprKind::NewArray(mut new_array) => {
            new_array.size = fold_box(folder, new_array.size)?;
            ExprKind::NewArray(new_array)
        }
        ExprKind::Lambda(mut lambda) => {
            lambda.body = match lambda.body {
                LambdaBody::Expr(body) => LambdaBody::Expr(fold_box(folder, body)?),
                LambdaBody::Block(block) => LambdaBody::Block(folder.fold_block(block)?),
            };
            ExprKind::Lambda(lambda)
        }
        ExprKind::Array(mut array) => {
            array.items = fold_exprs(folder, array.items)?;
            ExprKind::Array(array)
        }
        ExprKind::Map(map) => ExprKind::Map(ExprMap {
            entries: map
                .entries
                .into_iter()
                .map(|entry| {
                    Ok(MapEntry {
                        key: folder.fold_expr(entry.key)?,
                        value: folder.fold_expr(entry.value)?,
                    })
                })
                .collect::<Result<_>>()?,
        }),
        ExprKind::Assign(mut assign) => {
            assign.target = fold_box(folder, assign.target)?;
            assign.value = fold_box(folder, assign.value)?;
            ExprKind::Assign(assign)
        }
        ExprKind::Paren(inner) => ExprKind::Paren(fold_box(folder, inner)?),
    };
    Ok(Expr { ty, span, kind })
}

pub fn fold_box<F: Fold + ?Sized>(folder: &mut F, expr: Box<Expr>) -> Result<Box<Expr>> {
    Ok(Box::new(folder.fold_expr(*expr)?))
}

pub fn fold_exprs<F: Fold + ?Sized>(folder: &mut F, exprs: Vec<Expr>) -> Result<Vec<Expr>> {
    exprs
        .into_iter()
        .map(|expr| folder.fold_expr(expr))
        .collect()
}

pub fn fold_opt_expr<F: Fold + ?Sized>(folder: &mut F, expr: Option<Expr>) -> Result<Option<Expr>> {
    expr.map(|expr| folder.fold_expr(expr)).transpose()
}

pub fn fold_stmts<F: Fold + ?Sized>(folder: &mut F, stmts: Vec<Stmt>) -> Result<Vec<Stmt>> {
    stmts
        .into_iter()
        .map(|stmt| folder.fold_stmt(stmt))
        .collect()
}

fn fold_attributes<F: Fold + ?Sized>(folder: &mut F, attrs: Vec<Attribute>) -> Result<Vec<Attribute>> {
    attrs
        .into_iter()
        .map(|attr| folder.fold_attribute(attr))
        .collect()
}

/// Read-only traversal helper: true when `pred` holds for `expr` or any expression below it.
pub fn any_expr(expr: &Expr, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
    if pred(expr) {
        return true;
    }
    match &expr.kind {
        ExprKind::Literal(_)
        | ExprKind::Ident(_)
        | ExprKind::SelfRef
        | ExprKind::SuperRef
        | ExprKind::TypeRef(_)
        | ExprKind::TypeOf(_)
        | ExprKind::Default(_) => false,
        ExprKind::Member(member) => any_expr(&member.target, pred),
        ExprKind::Invoke(invoke) => {
            any_expr(&invoke.target, pred) || invoke.args.iter().any(|arg| any_expr(arg, pred))
        }
        ExprKind::Index(index) => {
            any_expr(&index.target, pred) || index.index.iter().any(|arg| any_expr(arg, pred))
        }
        ExprKind::Binary(binary) => any_expr(&binary.lhs, pred) || any_expr(&binary.rhs, pred),
        ExprKind::Unary(unary) => any_expr(&unary.expr, pred),
        ExprKind::Ternary(ternary) => {
            any_expr(&ternary.cond, pred)
                || any_expr(&ternary.then, pred)
                || any_expr(&ternary.otherwise, pred)
        }
        ExprKind::Cast(cast) => any_expr(&cast.expr, pred),
        ExprKind::TryCast(cast) => any_expr(&cast.expr, pred),
        ExprKind::New(new) => new.args.iter().any(|arg| any_expr(arg, pred)),
        ExprKind::NewArray(new_array) => any_expr(&new_array.size, pred),
        ExprKind::Lambda(lambda) => match &lambda.body {
            LambdaBody::Expr(body) => any_expr(body, pred),
            LambdaBody::Block(block) => any_expr_in_block(block, pred),
        },
        ExprKind::Array(array) => array.items.iter().any(|item| any_expr(item, pred)),
        ExprKind::Map(map) => map
            .entries
            .iter()
            .any(|entry| any_expr(&entry.key, pred) || any_expr(&entry.value, pred)),
        ExprKind::Assign(assign) => any_expr(&assign.target, pred) || any_expr(&assign.value, pred),
        ExprKind::Paren(inner) => any_expr(inner, pred),
    }
}

pub fn any_expr_in_block(block: &Block, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
    block.stmts.iter().any(|stmt| any_expr_in_stmt(stmt, pred))
}

pub fn any_expr_in_stmt(stmt: &Stmt, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
    match stmt {
        Stmt::Expr(expr) | Stmt::Throw(expr) => any_expr(expr, pred),
        Stmt::Var(var) => var.init.as_ref().map_or(false, |init| any_expr(init, pred)),
        Stmt::If(stmt_if) => {
            any_expr(&stmt_if.cond, pred)
                || any_expr_in_block(&stmt_if.then, pred)
                || stmt_if
                    .otherwise
                    .as_ref()
                    .map_or(false, |block| any_expr_in_block(block, pred))
        }
        Stmt::While(stmt_while) => {
            any_expr(&stmt_while.cond, pred) || any_expr_in_block(&stmt_while.body, pred)
        }
        Stmt::For(stmt_for) => {
            stmt_for.init.iter().any(|stmt| any_expr_in_stmt(stmt, pred))
                || stmt_for.cond.as_ref().map_or(false, |cond| any_expr(cond, pred))
                || stmt_for.step.iter().any(|step| any_expr(step, pred))
                || any_expr_in_block(&stmt_for.body, pred)
        }
        Stmt::ForEach(stmt_foreach) => {
            any_expr(&stmt_foreach.iter, pred) || any_expr_in_block(&stmt_foreach.body, pred)
        }
        Stmt::Return(ret) => ret.value.as_ref().map_or(false, |value| any_expr(value, pred)),
        Stmt::Block(block) => any_expr_in_block(block, pred),
        Stmt::Break | Stmt::Continue => false,
    }
}
