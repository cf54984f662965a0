//! Constructor synthesis.
//!
//! Field initializers move into constructors. Without an explicit constructor a public
//! parameterless one is appended; otherwise a private guard field makes the initializers
//! run once per object in every constructor that does not chain to `this(...)`. Static
//! initializers move into the static constructor, assigning through the type name.

use crate::context::PassContext;
use crate::passes::RewritePass;
use crate::pass_bail;
use tracing::debug;
use us2cs_core::ast::*;
use us2cs_core::ty::{Ty, TypeKind};
use us2cs_core::Result;

pub struct ConstructorPass;

impl RewritePass for ConstructorPass {
    fn name(&self) -> &'static str {
        "constructor-synthesis"
    }

    fn rewrite_unit(&self, mut unit: SourceUnit, _ctx: &PassContext) -> Result<SourceUnit> {
        unit.decls = unit
            .decls
            .into_iter()
            .map(synthesize_constructors)
            .collect::<Result<_>>()?;
        Ok(unit)
    }
}

/// Name of the guard field of `type_name`.
pub fn guard_field_name(type_name: &str) -> String {
    format!("initialized__{}", type_name)
}

fn synthesize_constructors(mut decl: TypeDecl) -> Result<TypeDecl> {
    if !matches!(decl.kind, TypeKind::Class | TypeKind::Struct) {
        return Ok(decl);
    }
    let self_ty = decl.self_ty();
    let mut instance_inits = Vec::new();
    let mut static_inits = Vec::new();
    for member in &mut decl.members {
        let MemberDecl::Field(field) = member else {
            continue;
        };
        let Some(init) = field.init.take() else {
            continue;
        };
        let binding = MemberBinding::field(decl.id);
        if field.modifiers.is_static {
            let target = Expr::member(
                Expr::type_ref(self_ty.clone()),
                field.name.clone(),
                binding.into_static(),
                field.ty.clone(),
            );
            static_inits.push(Stmt::Expr(Expr::assign(target, init).with_span(field.span)));
        } else {
            let target = Expr::member(
                Expr::self_ref(self_ty.clone()),
                field.name.clone(),
                binding,
                field.ty.clone(),
            );
            instance_inits.push(Stmt::Expr(Expr::assign(target, init).with_span(field.span)));
        }
    }

    if !static_inits.is_empty() {
        hoist_static_initializers(&mut decl, static_inits);
    }
    if !instance_inits.is_empty() {
        if decl.kind == TypeKind::Struct {
            pass_bail!(
                unsupported,
                decl.span,
                "instance field initializers in struct `{}`",
                decl.name
            );
        }
        hoist_instance_initializers(&mut decl, instance_inits);
    }
    Ok(decl)
}

fn hoist_static_initializers(decl: &mut TypeDecl, inits: Vec<Stmt>) {
    let existing = decl.members.iter_mut().find_map(|member| match member {
        MemberDecl::Ctor(ctor) if ctor.modifiers.is_static => Some(ctor),
        _ => None,
    });
    match existing {
        Some(ctor) => {
            let body = std::mem::take(&mut ctor.body.stmts);
            ctor.body.stmts = inits.into_iter().chain(body).collect();
        }
        None => {
            let mut ctor = CtorDecl::new(Vec::new(), Block::new(inits));
            ctor.modifiers = Modifiers::statik();
            decl.members.push(ctor.into());
        }
    }
}

fn hoist_instance_initializers(decl: &mut TypeDecl, inits: Vec<Stmt>) {
    let explicit = decl
        .ctors()
        .filter(|ctor| !ctor.modifiers.is_static)
        .count();
    if explicit == 0 {
        debug!(type_name = %decl.name, "synthesizing parameterless constructor");
        decl.members
            .push(CtorDecl::new(Vec::new(), Block::new(inits)).into());
        return;
    }

    let guard_name = guard_field_name(&decl.name.name);
    let guard = Expr::member(
        Expr::self_ref(decl.self_ty()),
        guard_name.clone(),
        MemberBinding::field(decl.id),
        Ty::bool(),
    );
    let mut guarded = inits;
    guarded.push(Stmt::Expr(Expr::assign(guard.clone(), Expr::bool(true))));
    let check = Stmt::If(StmtIf {
        cond: Expr::unary(UnOpKind::Not, guard, Ty::bool()),
        then: Block::new(guarded),
        otherwise: None,
    });

    let mut guarded_ctors = 0;
    for member in &mut decl.members {
        let MemberDecl::Ctor(ctor) = member else {
            continue;
        };
        if ctor.modifiers.is_static || ctor.delegates_to_this() {
            continue;
        }
        ctor.body.stmts.insert(0, check.clone());
        guarded_ctors += 1;
    }
    debug!(type_name = %decl.name, guarded_ctors, "guarding field initializers");

    let mut field = FieldDecl::new(guard_name, Ty::bool(), None);
    field.modifiers = Modifiers::private();
    field.span = decl.span;
    decl.members.push(field.into());
}
