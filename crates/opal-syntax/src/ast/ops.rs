//! Operator enums for the expression AST.

use std::fmt;

/// Binary operators (non-assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    /// `>>>` — logical (unsigned) right shift.
    Ushr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `&&` — short-circuit and.
    LogicalAnd,
    /// `||` — short-circuit or.
    LogicalOr,
    /// `??` — null coalescing.
    Coalesce,
}

impl BinaryOp {
    /// Source-level spelling, used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Ushr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Coalesce => "??",
        }
    }

    /// Whether this operator short-circuits (`&&`, `||`).
    pub const fn is_conditional_logical(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    /// Whether this is a comparison operator (result type bool).
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Whether this is a shift operator.
    pub const fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `~`
    Complement,
}

impl UnaryOp {
    /// Source-level spelling, used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Complement => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Increment/decrement operators, prefix and postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncDecOp {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl IncDecOp {
    /// Source-level spelling, used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            IncDecOp::PreIncrement | IncDecOp::PostIncrement => "++",
            IncDecOp::PreDecrement | IncDecOp::PostDecrement => "--",
        }
    }

    /// Whether this is one of the increment forms.
    pub const fn is_increment(self) -> bool {
        matches!(self, IncDecOp::PreIncrement | IncDecOp::PostIncrement)
    }

    /// Whether this is a postfix form.
    pub const fn is_postfix(self) -> bool {
        matches!(self, IncDecOp::PostIncrement | IncDecOp::PostDecrement)
    }
}

impl fmt::Display for IncDecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Assignment operators: plain `=`, compound `op=`, and `??=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `op=` for the given binary operator (includes `??=` via
    /// [`BinaryOp::Coalesce`]).
    Compound(BinaryOp),
}

impl AssignOp {
    /// Source-level spelling, used in diagnostics.
    pub fn symbol(self) -> String {
        match self {
            AssignOp::Assign => "=".to_string(),
            AssignOp::Compound(op) => format!("{}=", op.symbol()),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
