//! Static-through-instance normalization.
//!
//! A member statically bound to a static declaration is always accessed through the simple
//! name of its declaring type. The instance receiver is dropped without being evaluated.

use crate::context::PassContext;
use crate::fold::*;
use crate::passes::RewritePass;
use tracing::trace;
use us2cs_core::ast::*;
use us2cs_core::ty::Ty;
use us2cs_core::Result;

pub struct StaticAccessPass;

impl RewritePass for StaticAccessPass {
    fn name(&self) -> &'static str {
        "static-through-instance"
    }

    fn rewrite_unit(&self, unit: SourceUnit, ctx: &PassContext) -> Result<SourceUnit> {
        StaticAccess { ctx }.fold_unit(unit)
    }
}

struct StaticAccess<'a> {
    ctx: &'a PassContext,
}

impl StaticAccess<'_> {
    fn needs_type_receiver(&self, member: &ExprMember) -> bool {
        if !member.binding.is_static {
            return false;
        }
        match &member.target.strip_parens().kind {
            // `EnumType.GetValues` names a member inherited from System.Enum
            ExprKind::TypeRef(receiver) => {
                self.ctx.types.is_enum(receiver)
                    && receiver.type_id() != Some(member.binding.declaring)
                    && member.binding.kind != MemberKind::EnumMember
            }
            _ => true,
        }
    }
}

impl Fold for StaticAccess<'_> {
    fn fold_expr(&mut self, expr: Expr) -> Result<Expr> {
        let mut expr = walk_expr(self, expr)?;
        if let ExprKind::Member(member) = &mut expr.kind {
            if self.needs_type_receiver(member) {
                trace!(member = %member.name, "dropping instance receiver of static member");
                let declaring = Ty::Named(member.binding.declaring);
                member.target = Box::new(Expr::type_ref(declaring).with_span(member.target.span));
            }
        }
        Ok(expr)
    }
}
