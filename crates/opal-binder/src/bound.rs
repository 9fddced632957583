//! The bound tree.
//!
//! A [`BoundExpr`] is a typed expression node: its kind, its static type
//! (`None` for untyped expressions like the `null` literal), an optional
//! constant value and an error flag. Erroneous nodes never participate in
//! further overload resolution.

use opal_core::{ConstantValue, Span, Ty, TypeHash, well_known};
use opal_syntax::{BinaryOp, IncDecOp, UnaryOp};

use crate::conversion::{Conversion, ConversionKind};
use crate::overload::{BinaryOperatorKind, UnaryOperatorKind};

/// A bound expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr {
    pub kind: BoundExprKind,
    /// The static type; `None` for untyped expressions (`null`, target-typed
    /// `default`, tuple literals).
    pub ty: Option<Ty>,
    /// Compile-time constant value, when known.
    pub constant: Option<ConstantValue>,
    /// Whether this node or a child failed to bind.
    pub has_errors: bool,
    pub span: Span,
}

/// The kinds of bound expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExprKind {
    /// A literal value.
    Literal,
    /// The target-typed `default` literal.
    DefaultValue,
    /// A local variable or constant reference.
    Local { name: String, assignable: bool },
    /// An event reference (only valid on the left of `+=`/`-=`).
    EventAccess { owner: TypeHash, event: String },
    /// A tuple literal (participates only in tuple equality).
    Tuple { elements: Vec<BoundExpr> },
    /// An interpolated string.
    InterpolatedString,
    /// An applied conversion.
    Conversion {
        operand: Box<BoundExpr>,
        conversion: Conversion,
    },

    /// A resolved binary operator.
    BinaryOperator {
        kind: BinaryOperatorKind,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
        /// Backing method for user-defined operators; `None` for built-ins.
        method: Option<TypeHash>,
    },
    /// A binary operator deferred to runtime dispatch.
    DynamicBinaryOperator {
        op: BinaryOp,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    /// Element-wise tuple equality.
    TupleEquality {
        negated: bool,
        comparisons: Vec<BoundExpr>,
    },
    /// A string concatenation kept unconverted for the interpolated-string
    /// rewrite pass.
    DeferredInterpolatedConcat {
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    /// `x == null` over a nullable operand, rewritten to a HasValue check.
    NullCheck {
        operand: Box<BoundExpr>,
        negated: bool,
    },

    /// A resolved unary operator.
    UnaryOperator {
        kind: UnaryOperatorKind,
        operand: Box<BoundExpr>,
        method: Option<TypeHash>,
    },
    /// A unary operator deferred to runtime dispatch.
    DynamicUnaryOperator {
        op: UnaryOp,
        operand: Box<BoundExpr>,
    },

    /// Plain assignment.
    Assignment {
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },
    /// Compound assignment through a static or built-in operator, with the
    /// final conversion from the operator result back to the target type.
    CompoundAssignment {
        kind: BinaryOperatorKind,
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
        method: Option<TypeHash>,
        final_conversion: Conversion,
    },
    /// Compound assignment through an in-place instance operator; replaces
    /// the operator+assignment composition entirely.
    InstanceCompoundAssignment {
        method: TypeHash,
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },
    /// `event += handler` / `event -= handler`.
    EventAssignment {
        event: String,
        is_add: bool,
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },
    /// Compound assignment deferred to runtime dispatch.
    DynamicCompoundAssignment {
        op: BinaryOp,
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },

    /// Increment/decrement through a static or built-in operator.
    Increment {
        op: IncDecOp,
        operand: Box<BoundExpr>,
        method: Option<TypeHash>,
        final_conversion: Conversion,
    },
    /// Increment/decrement through an instance compound operator.
    InstanceIncrement {
        op: IncDecOp,
        method: TypeHash,
        operand: Box<BoundExpr>,
        result_used: bool,
    },
    /// Increment/decrement deferred to runtime dispatch.
    DynamicIncrement {
        op: IncDecOp,
        operand: Box<BoundExpr>,
    },

    /// Short-circuit `&&`/`||` over bool operands.
    LogicalOperator {
        op: BinaryOp,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    /// Short-circuit `&&`/`||` through the user-defined operator pattern.
    UserDefinedConditionalLogical {
        op: BinaryOp,
        method: TypeHash,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    /// `a ?? b`.
    NullCoalescing {
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    /// `a ??= b`.
    NullCoalescingAssignment {
        target: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },
    /// `c ? a : b`.
    Conditional {
        cond: Box<BoundExpr>,
        when_true: Box<BoundExpr>,
        when_false: Box<BoundExpr>,
    },

    /// `x is T`. Retains the conversion kind for runtime type-test codegen.
    IsOperator {
        operand: Box<BoundExpr>,
        target: Ty,
        conversion: ConversionKind,
    },
    /// `x is <constant>` (the fallback when the target is not a type).
    IsConstantPattern {
        operand: Box<BoundExpr>,
        pattern: Box<BoundExpr>,
    },
    /// `x as T`.
    AsOperator {
        operand: Box<BoundExpr>,
        target: Ty,
        conversion: ConversionKind,
    },

    /// A recovery node.
    Error,
}

impl BoundExpr {
    /// An error-typed recovery node.
    pub fn error(span: Span) -> BoundExpr {
        BoundExpr {
            kind: BoundExprKind::Error,
            ty: Some(Ty::simple(well_known::ERROR)),
            constant: None,
            has_errors: true,
            span,
        }
    }

    /// The untyped `null` literal.
    pub fn null_literal(span: Span) -> BoundExpr {
        BoundExpr {
            kind: BoundExprKind::Literal,
            ty: None,
            constant: Some(ConstantValue::Null),
            has_errors: false,
            span,
        }
    }

    /// The target-typed `default` literal.
    pub fn default_literal(span: Span) -> BoundExpr {
        BoundExpr {
            kind: BoundExprKind::DefaultValue,
            ty: None,
            constant: None,
            has_errors: false,
            span,
        }
    }

    /// A typed constant literal.
    pub fn constant_literal(value: ConstantValue, ty: Ty, span: Span) -> BoundExpr {
        BoundExpr {
            kind: BoundExprKind::Literal,
            ty: Some(ty),
            constant: Some(value),
            has_errors: false,
            span,
        }
    }

    /// A typed node with no constant.
    pub fn typed(kind: BoundExprKind, ty: Ty, span: Span) -> BoundExpr {
        BoundExpr {
            kind,
            ty: Some(ty),
            constant: None,
            has_errors: false,
            span,
        }
    }

    /// Whether this is the target-typed `default` literal.
    pub fn is_default_literal(&self) -> bool {
        matches!(self.kind, BoundExprKind::DefaultValue) && self.ty.is_none()
    }

    /// Whether this is the untyped `null` literal (or folded to it).
    pub fn is_null_literal(&self) -> bool {
        self.ty.is_none() && matches!(self.constant, Some(ConstantValue::Null))
    }

    /// Whether this node is an assignable storage location.
    pub fn is_assignable_location(&self) -> bool {
        matches!(self.kind, BoundExprKind::Local { assignable: true, .. })
    }

    /// The event behind this node, if it is an event access.
    pub fn as_event(&self) -> Option<(TypeHash, &str)> {
        match &self.kind {
            BoundExprKind::EventAccess { owner, event } => Some((*owner, event.as_str())),
            _ => None,
        }
    }

    /// Whether the static type is `dynamic`.
    pub fn is_dynamic(&self) -> bool {
        self.ty.map(Ty::is_dynamic).unwrap_or(false)
    }

    /// Wrap this node in a conversion to `ty`. Identity conversions are not
    /// materialized.
    pub fn converted(self, conversion: Conversion, ty: Ty) -> BoundExpr {
        if conversion.is_identity() && self.ty == Some(ty) {
            return self;
        }
        let span = self.span;
        let constant = self.constant.clone();
        let has_errors = self.has_errors;
        BoundExpr {
            kind: BoundExprKind::Conversion {
                operand: Box::new(self),
                conversion,
            },
            ty: Some(ty),
            // Constants survive implicit conversions unchanged; the folder
            // has already produced a value of the right shape for built-ins.
            constant,
            has_errors,
            span,
        }
    }
}
