//! Macros for building models

/// Create labelled constraints using natural comparison syntax
///
/// The left-hand side must be in parentheses. `==`, `<=` and `>=` map to the
/// three relations of the dialect.
///
/// # Examples
///
/// ```rust
/// use lpparse::constraint;
/// use lpparse::model::{ModelBuilder, Relation};
///
/// let mut builder = ModelBuilder::new();
/// let x = builder.add_variable("x").unwrap();
/// let y = builder.add_variable("y").unwrap();
///
/// let c1 = constraint!("total", (x + y) == 10.0);
/// let c2 = constraint!("cap", (2.0 * x) <= 5.0);
/// let c3 = constraint!("order", (x - y) >= 0);
///
/// assert_eq!(c1.relation, Relation::Equal);
/// assert_eq!(c2.rhs, 5.0);
/// assert_eq!(c3.rhs, 0.0);
/// builder.add_constraint(c1).unwrap();
/// ```
#[macro_export]
macro_rules! constraint {
    ($label:expr, ($lhs:expr) == $rhs:expr) => {
        $crate::model::Constraint::new(
            $label,
            $lhs,
            $crate::model::Relation::Equal,
            $rhs as f64,
        )
    };
    ($label:expr, ($lhs:expr) <= $rhs:expr) => {
        $crate::model::Constraint::new(
            $label,
            $lhs,
            $crate::model::Relation::LessEqual,
            $rhs as f64,
        )
    };
    ($label:expr, ($lhs:expr) >= $rhs:expr) => {
        $crate::model::Constraint::new(
            $label,
            $lhs,
            $crate::model::Relation::GreaterEqual,
            $rhs as f64,
        )
    };
}
