//! Well-known metadata names for user-defined operators.
//!
//! User-defined operators are discovered by these names; checked operators
//! have distinct names so an unchecked twin can coexist. Instance compound
//! operators (the in-place forms) use the `*Assignment` names, which never
//! collide with the static operator names.

/// `+`
pub const ADDITION: &str = "op_Addition";
/// `+` in a checked context.
pub const CHECKED_ADDITION: &str = "op_CheckedAddition";
/// `-`
pub const SUBTRACTION: &str = "op_Subtraction";
/// `-` in a checked context.
pub const CHECKED_SUBTRACTION: &str = "op_CheckedSubtraction";
/// `*`
pub const MULTIPLY: &str = "op_Multiply";
/// `*` in a checked context.
pub const CHECKED_MULTIPLY: &str = "op_CheckedMultiply";
/// `/`
pub const DIVISION: &str = "op_Division";
/// `/` in a checked context.
pub const CHECKED_DIVISION: &str = "op_CheckedDivision";
/// `%`
pub const MODULUS: &str = "op_Modulus";
/// `<<`
pub const LEFT_SHIFT: &str = "op_LeftShift";
/// `>>`
pub const RIGHT_SHIFT: &str = "op_RightShift";
/// `>>>`
pub const UNSIGNED_RIGHT_SHIFT: &str = "op_UnsignedRightShift";
/// `&`
pub const BITWISE_AND: &str = "op_BitwiseAnd";
/// `|`
pub const BITWISE_OR: &str = "op_BitwiseOr";
/// `^`
pub const EXCLUSIVE_OR: &str = "op_ExclusiveOr";
/// `==`
pub const EQUALITY: &str = "op_Equality";
/// `!=`
pub const INEQUALITY: &str = "op_Inequality";
/// `<`
pub const LESS_THAN: &str = "op_LessThan";
/// `<=`
pub const LESS_THAN_OR_EQUAL: &str = "op_LessThanOrEqual";
/// `>`
pub const GREATER_THAN: &str = "op_GreaterThan";
/// `>=`
pub const GREATER_THAN_OR_EQUAL: &str = "op_GreaterThanOrEqual";

/// Unary `-`
pub const UNARY_NEGATION: &str = "op_UnaryNegation";
/// Unary `-` in a checked context.
pub const CHECKED_UNARY_NEGATION: &str = "op_CheckedUnaryNegation";
/// Unary `+`
pub const UNARY_PLUS: &str = "op_UnaryPlus";
/// `!`
pub const LOGICAL_NOT: &str = "op_LogicalNot";
/// `~`
pub const ONES_COMPLEMENT: &str = "op_OnesComplement";
/// `operator true`
pub const TRUE: &str = "op_True";
/// `operator false`
pub const FALSE: &str = "op_False";

/// `++` (static form).
pub const INCREMENT: &str = "op_Increment";
/// `++` (static form) in a checked context.
pub const CHECKED_INCREMENT: &str = "op_CheckedIncrement";
/// `--` (static form).
pub const DECREMENT: &str = "op_Decrement";
/// `--` (static form) in a checked context.
pub const CHECKED_DECREMENT: &str = "op_CheckedDecrement";

/// `++` (instance compound form).
pub const INCREMENT_ASSIGNMENT: &str = "op_IncrementAssignment";
/// `++` (instance compound form) in a checked context.
pub const CHECKED_INCREMENT_ASSIGNMENT: &str = "op_CheckedIncrementAssignment";
/// `--` (instance compound form).
pub const DECREMENT_ASSIGNMENT: &str = "op_DecrementAssignment";
/// `--` (instance compound form) in a checked context.
pub const CHECKED_DECREMENT_ASSIGNMENT: &str = "op_CheckedDecrementAssignment";

/// Implicit user-defined conversion.
pub const IMPLICIT_CONVERSION: &str = "op_Implicit";
/// Explicit user-defined conversion.
pub const EXPLICIT_CONVERSION: &str = "op_Explicit";

/// The instance compound-assignment name for a binary operator metadata name.
///
/// `op_Addition` -> `op_AdditionAssignment`, and likewise for the checked
/// names. Returns `None` for operators with no compound form (comparisons).
pub fn compound_assignment_name(static_name: &str) -> Option<&'static str> {
    Some(match static_name {
        ADDITION => "op_AdditionAssignment",
        CHECKED_ADDITION => "op_CheckedAdditionAssignment",
        SUBTRACTION => "op_SubtractionAssignment",
        CHECKED_SUBTRACTION => "op_CheckedSubtractionAssignment",
        MULTIPLY => "op_MultiplicationAssignment",
        CHECKED_MULTIPLY => "op_CheckedMultiplicationAssignment",
        DIVISION => "op_DivisionAssignment",
        CHECKED_DIVISION => "op_CheckedDivisionAssignment",
        MODULUS => "op_ModulusAssignment",
        LEFT_SHIFT => "op_LeftShiftAssignment",
        RIGHT_SHIFT => "op_RightShiftAssignment",
        UNSIGNED_RIGHT_SHIFT => "op_UnsignedRightShiftAssignment",
        BITWISE_AND => "op_BitwiseAndAssignment",
        BITWISE_OR => "op_BitwiseOrAssignment",
        EXCLUSIVE_OR => "op_ExclusiveOrAssignment",
        _ => return None,
    })
}
