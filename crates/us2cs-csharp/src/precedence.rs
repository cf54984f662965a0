//! C# operator precedence, lowest first.

use us2cs_core::ast::{BinOpKind, Expr, ExprKind, Literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Assignment,
    Conditional,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Primary,
}

impl Precedence {
    pub fn of_binary(op: BinOpKind) -> Self {
        match op {
            BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => Precedence::Multiplicative,
            BinOpKind::Add | BinOpKind::Sub => Precedence::Additive,
            BinOpKind::Shl | BinOpKind::Shr => Precedence::Shift,
            BinOpKind::Lt | BinOpKind::Le | BinOpKind::Gt | BinOpKind::Ge => Precedence::Relational,
            BinOpKind::Eq | BinOpKind::Ne => Precedence::Equality,
            BinOpKind::BitAnd => Precedence::BitAnd,
            BinOpKind::BitXor => Precedence::BitXor,
            BinOpKind::BitOr => Precedence::BitOr,
            BinOpKind::And => Precedence::And,
            BinOpKind::Or => Precedence::Or,
        }
    }

    /// Binding strength of `expr` once rendered. Source parentheses are transparent.
    pub fn of_expr(expr: &Expr) -> Self {
        match &expr.kind {
            ExprKind::Paren(inner) => Precedence::of_expr(inner),
            ExprKind::Literal(Literal::Int(value) | Literal::Long(value)) if *value < 0 => {
                Precedence::Unary
            }
            ExprKind::Literal(Literal::Float(value) | Literal::Double(value))
                if value.is_sign_negative() =>
            {
                Precedence::Unary
            }
            ExprKind::Unary(unary) if unary.op.is_postfix() => Precedence::Primary,
            ExprKind::Unary(_) | ExprKind::Cast(_) => Precedence::Unary,
            ExprKind::Binary(binary) => Precedence::of_binary(binary.op),
            ExprKind::TryCast(_) => Precedence::Relational,
            ExprKind::Ternary(_) => Precedence::Conditional,
            ExprKind::Assign(_) | ExprKind::Lambda(_) => Precedence::Assignment,
            _ => Precedence::Primary,
        }
    }

    /// Next tighter level; operands on the non-associative side must bind at least this tightly.
    pub fn tighter(self) -> Self {
        match self {
            Precedence::Assignment => Precedence::Conditional,
            Precedence::Conditional => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::BitOr,
            Precedence::BitOr => Precedence::BitXor,
            Precedence::BitXor => Precedence::BitAnd,
            Precedence::BitAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Shift,
            Precedence::Shift => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Unary,
            Precedence::Unary | Precedence::Primary => Precedence::Primary,
        }
    }
}
