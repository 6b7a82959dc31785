//! Operator overloading for linear expressions
//!
//! Variables and expressions combine with natural arithmetic:
//!
//! ```ignore
//! let expr1 = x + y;             // Addition
//! let expr2 = x - y;             // Subtraction
//! let expr3 = 2.0 * x;           // Scalar multiplication (left)
//! let expr4 = x * 2.0;           // Scalar multiplication (right)
//! let expr5 = x + 2.0 * y + 5.0; // Constants accumulate
//! let expr6 = -(x + y) * 3.0;    // Negation and parentheses
//! ```
//!
//! Terms are appended in order and never merged, so the written order of an
//! expression is preserved when it is serialised.

use super::{LinearExpression, VariableId};
use std::ops::{Add, Mul, Neg, Sub};

impl Add<LinearExpression> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, other: LinearExpression) -> Self::Output {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }
}

impl Add<VariableId> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, other: VariableId) -> Self::Output {
        self.add_term(1.0, other);
        self
    }
}

impl Add<f64> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, other: f64) -> Self::Output {
        self.constant += other;
        self
    }
}

impl Mul<f64> for LinearExpression {
    type Output = LinearExpression;

    fn mul(mut self, factor: f64) -> Self::Output {
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl<R> Sub<R> for LinearExpression
where
    R: Into<LinearExpression>,
{
    type Output = LinearExpression;

    fn sub(self, other: R) -> Self::Output {
        let other: LinearExpression = other.into();
        self + -other
    }
}

impl Neg for VariableId {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        -LinearExpression::from(self)
    }
}

impl Mul<f64> for VariableId {
    type Output = LinearExpression;

    fn mul(self, factor: f64) -> Self::Output {
        LinearExpression::from(self) * factor
    }
}

/// `VariableId` and `f64` left operands lift into an expression first.
macro_rules! lift_left_operand {
    ($lhs:ty => $($rhs:ty),+) => {
        $(
            impl Add<$rhs> for $lhs {
                type Output = LinearExpression;

                fn add(self, other: $rhs) -> Self::Output {
                    LinearExpression::from(self) + other
                }
            }

            impl Sub<$rhs> for $lhs {
                type Output = LinearExpression;

                fn sub(self, other: $rhs) -> Self::Output {
                    LinearExpression::from(self) - other
                }
            }
        )+
    };
}

lift_left_operand!(VariableId => VariableId, LinearExpression, f64);
lift_left_operand!(f64 => VariableId, LinearExpression);

impl Mul<VariableId> for f64 {
    type Output = LinearExpression;

    fn mul(self, other: VariableId) -> Self::Output {
        other * self
    }
}

impl Mul<LinearExpression> for f64 {
    type Output = LinearExpression;

    fn mul(self, other: LinearExpression) -> Self::Output {
        other * self
    }
}
