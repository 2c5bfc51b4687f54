//! # Operator Precedence Table
//!
//! C++-style binding strengths used to decide parenthesization. Lower
//! ordinals bind tighter; [`Order::None`] is the unconstrained context
//! (function-call arguments, condition slots) where a sub-expression is
//! always safe to leave bare.

/// Binding strength of an emitted expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Order {
    Atomic = 0,         // literals, identifiers
    UnaryPostfix = 1,   // calls, ++ --
    UnaryPrefix = 2,    // ! ~ unary -
    Multiplicative = 3, // * / %
    Additive = 4,       // + -
    Shift = 5,          // << >>
    Relational = 6,     // < > <= >=
    Equality = 7,       // == !=
    BitwiseAnd = 8,     // &
    BitwiseXor = 9,     // ^
    BitwiseOr = 10,     // |
    LogicalAnd = 11,    // &&
    LogicalOr = 12,     // ||
    Conditional = 13,   // ? :
    Assignment = 14,    // = += -=
    None = 99,          // unconstrained
}

impl Order {
    /// Whether an expression at this level needs parentheses when placed in
    /// a context requiring `required`.
    ///
    /// Equal levels never parenthesize (left-associative chains); callers
    /// that need a right operand protected request one level
    /// [tighter](Order::tighter) instead.
    pub fn needs_parens(self, required: Order) -> bool {
        if required == Order::None || self == Order::None {
            return false;
        }
        (self as u8) > (required as u8)
    }

    /// The next tighter level. Used for the right operand of
    /// non-commutative operators (`-`, `/`, `%`) so that an equal-level
    /// child still gets wrapped: `a - (b + c)`, not `a - b + c`.
    pub fn tighter(self) -> Order {
        match self {
            Order::Atomic | Order::UnaryPostfix => Order::Atomic,
            Order::UnaryPrefix => Order::UnaryPostfix,
            Order::Multiplicative => Order::UnaryPrefix,
            Order::Additive => Order::Multiplicative,
            Order::Shift => Order::Additive,
            Order::Relational => Order::Shift,
            Order::Equality => Order::Relational,
            Order::BitwiseAnd => Order::Equality,
            Order::BitwiseXor => Order::BitwiseAnd,
            Order::BitwiseOr => Order::BitwiseXor,
            Order::LogicalAnd => Order::BitwiseOr,
            Order::LogicalOr => Order::LogicalAnd,
            Order::Conditional => Order::LogicalOr,
            Order::Assignment => Order::Conditional,
            Order::None => Order::Assignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looser_child_is_wrapped() {
        assert!(Order::Additive.needs_parens(Order::Multiplicative));
        assert!(Order::LogicalAnd.needs_parens(Order::UnaryPrefix));
    }

    #[test]
    fn tighter_or_equal_child_is_bare() {
        assert!(!Order::Multiplicative.needs_parens(Order::Additive));
        assert!(!Order::Additive.needs_parens(Order::Additive));
        assert!(!Order::Atomic.needs_parens(Order::UnaryPrefix));
    }

    #[test]
    fn unconstrained_context_never_wraps() {
        assert!(!Order::Assignment.needs_parens(Order::None));
        assert!(!Order::Conditional.needs_parens(Order::None));
    }

    #[test]
    fn tighter_protects_equal_level_rhs() {
        // rhs of `-` requested at Multiplicative wraps an Additive child
        assert!(Order::Additive.needs_parens(Order::Additive.tighter()));
        assert!(!Order::Multiplicative.needs_parens(Order::Additive.tighter()));
    }
}
