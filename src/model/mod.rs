//! In-memory linear program
//!
//! A [`Model`] owns its variables, exactly one [`Objective`] and an ordered list of
//! [`Constraint`]s. Models are produced by the parser or assembled by hand with a
//! [`ModelBuilder`]; once built they are immutable and can be shared freely with
//! solver front-ends.
//!
//! # Building Models
//!
//! Variables are registered by name and referenced through [`VariableId`]s, which
//! index the model's variable list in first-appearance order. Expressions support
//! natural operator overloading, and the [`constraint!`](crate::constraint) macro
//! accepts comparison syntax:
//!
//! ```rust
//! use lpparse::constraint;
//! use lpparse::model::{ModelBuilder, OptimizationSense};
//!
//! let mut builder = ModelBuilder::new();
//! let x = builder.add_variable("x").unwrap();
//! let y = builder.add_variable("y").unwrap();
//!
//! builder
//!     .set_objective("cost", OptimizationSense::Minimize, 2.0 * x + 3.0 * y)
//!     .unwrap();
//! builder.add_constraint(constraint!("demand", (x + y) >= 10.0)).unwrap();
//! builder.add_constraint(constraint!("ratio", (x - 0.5 * y) <= 0.0)).unwrap();
//!
//! let model = builder.build().unwrap();
//! assert_eq!(model.variables().len(), 2);
//! assert_eq!(model.constraints().len(), 2);
//! ```
//!
//! # Names
//!
//! Variable names and labels must be valid identifiers of the LP dialect
//! (`[A-Za-z_][A-Za-z0-9_]*`, not a keyword), so every model can be written
//! back out with [`serialisation::serialize_model`] and parsed again.

use itertools::Itertools;
use lazy_static::lazy_static;
use ordered_float::OrderedFloat;
use regex::Regex;
use std::{
    collections::{HashMap, HashSet},
    error::Error,
    fmt,
};
use string_cache::DefaultAtom;

use crate::lexer::Keyword;

pub mod macros;
pub mod ops;
pub mod pretty;
pub mod serialisation;
pub mod standard_form;

pub type Symbol = DefaultAtom;

/// Lower bound every variable receives
pub const DEFAULT_LOWER_BOUND: f64 = 0.0;
/// Upper bound every variable receives
pub const DEFAULT_UPPER_BOUND: f64 = f64::INFINITY;

/// Returns whether `name` can be used as a variable name or label.
pub fn is_valid_name(name: &str) -> bool {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    }

    NAME_RE.is_match(name) && Keyword::from_word(name).is_none()
}

/// Index of a variable inside its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a constraint inside its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(usize);

impl ConstraintId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A decision variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: Symbol,
    lower_bound: f64,
    upper_bound: f64,
}

impl Variable {
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// `f64::INFINITY` when unbounded above
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }
}

/// A linear expression term: coefficient * variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTerm {
    pub coefficient: f64,
    pub variable: VariableId,
}

/// A linear expression: sum of terms plus constant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpression {
    pub terms: Vec<LinearTerm>,
    pub constant: f64,
}

impl LinearExpression {
    /// Create a new linear expression with a constant term
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Add a term to the expression
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId) {
        self.terms.push(LinearTerm {
            coefficient,
            variable,
        });
    }

    /// Create a linear expression from a single variable
    pub fn from_variable(variable: VariableId) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms with repeated variables merged and zero coefficients dropped,
    /// ordered by variable id.
    pub fn canonical_terms(&self) -> Vec<(VariableId, OrderedFloat<f64>)> {
        self.terms
            .iter()
            .map(|t| (t.variable, t.coefficient))
            .sorted_by_key(|(variable, _)| *variable)
            .coalesce(|a, b| {
                if a.0 == b.0 {
                    Ok((a.0, a.1 + b.1))
                } else {
                    Err((a, b))
                }
            })
            .filter(|(_, coefficient)| *coefficient != 0.0)
            .map(|(variable, coefficient)| (variable, OrderedFloat(coefficient)))
            .collect()
    }

    fn is_finite(&self) -> bool {
        self.constant.is_finite() && self.terms.iter().all(|t| t.coefficient.is_finite())
    }
}

impl From<VariableId> for LinearExpression {
    fn from(variable: VariableId) -> Self {
        Self::from_variable(variable)
    }
}

impl From<f64> for LinearExpression {
    fn from(constant: f64) -> Self {
        Self::new(constant)
    }
}

/// Relation between a constraint's expression and its right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
}

impl Relation {
    /// Maps a relation operator of the dialect; `=` and `==` both mean equality.
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "<=" => Some(Relation::LessEqual),
            "==" | "=" => Some(Relation::Equal),
            ">=" => Some(Relation::GreaterEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::LessEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimization direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationSense {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

impl fmt::Display for OptimizationSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationSense::Minimize => write!(f, "minimize"),
            OptimizationSense::Maximize => write!(f, "maximize"),
        }
    }
}

/// The function to optimize
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub label: Symbol,
    pub sense: OptimizationSense,
    pub expression: LinearExpression,
}

/// A labelled linear constraint `expression relation rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub label: Symbol,
    pub expression: LinearExpression,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Create a new constraint
    pub fn new(
        label: impl Into<Symbol>,
        expression: impl Into<LinearExpression>,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        Self {
            label: label.into(),
            expression: expression.into(),
            relation,
            rhs,
        }
    }

    /// Create an equality constraint: expression == rhs
    pub fn eq(label: impl Into<Symbol>, expression: impl Into<LinearExpression>, rhs: f64) -> Self {
        Self::new(label, expression, Relation::Equal, rhs)
    }

    /// Create a less-than-or-equal constraint: expression <= rhs
    pub fn le(label: impl Into<Symbol>, expression: impl Into<LinearExpression>, rhs: f64) -> Self {
        Self::new(label, expression, Relation::LessEqual, rhs)
    }

    /// Create a greater-than-or-equal constraint: expression >= rhs
    pub fn ge(label: impl Into<Symbol>, expression: impl Into<LinearExpression>, rhs: f64) -> Self {
        Self::new(label, expression, Relation::GreaterEqual, rhs)
    }
}

/// Errors raised while assembling a model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// An objective was already set
    DuplicateObjective,
    /// `build` was called without an objective
    MissingObjective,
    /// Name or label is not a valid identifier
    InvalidName(String),
    /// Coefficient, constant or right-hand side is NaN or infinite
    NonFiniteCoefficient(f64),
    /// Label already used while unique labels are enforced
    DuplicateLabel(Symbol),
    /// Variable id does not belong to this builder
    UnknownVariable(VariableId),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::DuplicateObjective => write!(f, "model already has an objective"),
            ModelError::MissingObjective => write!(f, "model has no objective"),
            ModelError::InvalidName(name) => write!(f, "invalid name {:?}", name),
            ModelError::NonFiniteCoefficient(value) => {
                write!(f, "non-finite coefficient {}", value)
            }
            ModelError::DuplicateLabel(label) => write!(f, "duplicate label {}", label),
            ModelError::UnknownVariable(id) => {
                write!(f, "variable #{} does not exist in this model", id.index())
            }
        }
    }
}

impl Error for ModelError {}

/// Incrementally assembles a [`Model`]
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    variables: Vec<Variable>,
    index: HashMap<Symbol, VariableId>,
    objective: Option<Objective>,
    constraints: Vec<Constraint>,
    unique_labels: bool,
    labels: HashSet<Symbol>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject labels that repeat a constraint or objective label.
    pub fn with_unique_labels(mut self) -> Self {
        self.unique_labels = true;
        self
    }

    /// Register a variable with default bounds. Registering the same name
    /// again returns the existing id.
    pub fn add_variable(&mut self, name: &str) -> Result<VariableId, ModelError> {
        let symbol = Symbol::from(name);
        if let Some(id) = self.index.get(&symbol) {
            return Ok(*id);
        }
        if !is_valid_name(name) {
            return Err(ModelError::InvalidName(name.to_string()));
        }

        let id = VariableId(self.variables.len());
        let name = symbol;
        self.variables.push(Variable {
            name: name.clone(),
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
        });
        self.index.insert(name, id);
        Ok(id)
    }

    /// Look up an already registered variable
    pub fn variable(&self, name: &str) -> Option<VariableId> {
        self.index.get(&Symbol::from(name)).copied()
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    /// Set the objective function. Fails if one is already set.
    pub fn set_objective(
        &mut self,
        label: &str,
        sense: OptimizationSense,
        expression: impl Into<LinearExpression>,
    ) -> Result<(), ModelError> {
        if self.objective.is_some() {
            return Err(ModelError::DuplicateObjective);
        }
        let expression = expression.into();
        self.check_expression(&expression)?;
        let label = self.check_label(label)?;

        tracing::debug!(
            component = "model",
            operation = "set_objective",
            label = %label,
            sense = %sense,
            terms = expression.terms.len(),
            "Set objective function"
        );
        self.objective = Some(Objective {
            label,
            sense,
            expression,
        });
        Ok(())
    }

    /// Append a constraint
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, ModelError> {
        self.check_expression(&constraint.expression)?;
        if !constraint.rhs.is_finite() {
            return Err(ModelError::NonFiniteCoefficient(constraint.rhs));
        }
        self.check_label(&constraint.label)?;

        let id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        Ok(id)
    }

    pub fn build(self) -> Result<Model, ModelError> {
        let objective = self.objective.ok_or(ModelError::MissingObjective)?;

        tracing::debug!(
            component = "model",
            operation = "build",
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "Built model"
        );
        Ok(Model {
            variables: self.variables,
            index: self.index,
            objective,
            constraints: self.constraints,
        })
    }

    fn check_label(&mut self, label: &str) -> Result<Symbol, ModelError> {
        if !is_valid_name(label) {
            return Err(ModelError::InvalidName(label.to_string()));
        }
        let label = Symbol::from(label);
        if self.unique_labels && !self.labels.insert(label.clone()) {
            return Err(ModelError::DuplicateLabel(label));
        }
        Ok(label)
    }

    fn check_expression(&self, expression: &LinearExpression) -> Result<(), ModelError> {
        if let Some(term) = expression
            .terms
            .iter()
            .find(|t| t.variable.0 >= self.variables.len())
        {
            return Err(ModelError::UnknownVariable(term.variable));
        }
        if !expression.is_finite() {
            let bad = expression
                .terms
                .iter()
                .map(|t| t.coefficient)
                .chain(std::iter::once(expression.constant))
                .find(|c| !c.is_finite())
                .unwrap_or(f64::NAN);
            return Err(ModelError::NonFiniteCoefficient(bad));
        }
        Ok(())
    }
}

/// A complete linear program
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    variables: Vec<Variable>,
    index: HashMap<Symbol, VariableId>,
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl Model {
    /// Variables in id order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    pub fn variable_id(&self, name: &str) -> Option<VariableId> {
        self.index.get(&Symbol::from(name)).copied()
    }

    /// Iterate over `(id, variable)` pairs in id order
    pub fn variable_ids(&self) -> impl Iterator<Item = (VariableId, &Variable)> + '_ {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VariableId(i), v))
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.0)
    }

    /// Constraints carrying `label`, in model order
    pub fn constraints_labelled<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| &*c.label == label)
    }

    /// Name-keyed terms of `expression`, merged and sorted by name.
    ///
    /// Fails with [`ModelError::UnknownVariable`] when `expression` refers to a
    /// variable this model does not have.
    pub fn named_terms(
        &self,
        expression: &LinearExpression,
    ) -> Result<Vec<(Symbol, OrderedFloat<f64>)>, ModelError> {
        let mut terms = expression
            .canonical_terms()
            .into_iter()
            .map(|(id, coefficient)| {
                self.variable(id)
                    .map(|v| (v.name.clone(), coefficient))
                    .ok_or(ModelError::UnknownVariable(id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        terms.sort_by(|a, b| (*a.0).cmp(&*b.0));
        Ok(terms)
    }

    /// Structural equality up to variable numbering and term order.
    ///
    /// Both models must declare the same variable names, the same objective and the
    /// same constraints in the same order; terms are compared by variable name with
    /// repeated variables merged.
    pub fn equivalent(&self, other: &Model) -> bool {
        let names = |m: &Model| -> HashSet<Symbol> {
            m.variables.iter().map(|v| v.name.clone()).collect()
        };
        let same_expression = |a: &LinearExpression, b: &LinearExpression| {
            a.constant == b.constant
                && matches!(
                    (self.named_terms(a), other.named_terms(b)),
                    (Ok(left), Ok(right)) if left == right
                )
        };

        names(self) == names(other)
            && self.objective.label == other.objective.label
            && self.objective.sense == other.objective.sense
            && same_expression(&self.objective.expression, &other.objective.expression)
            && self.constraints.len() == other.constraints.len()
            && self
                .constraints
                .iter()
                .zip(other.constraints.iter())
                .all(|(a, b)| {
                    a.label == b.label
                        && a.relation == b.relation
                        && a.rhs == b.rhs
                        && same_expression(&a.expression, &b.expression)
                })
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        serialisation::serialize_model_to(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint;

    #[test]
    fn add_variable_is_idempotent() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x").unwrap();
        let y = builder.add_variable("y").unwrap();
        assert_eq!(builder.add_variable("x").unwrap(), x);
        assert_ne!(x, y);
        assert_eq!(builder.variable("y"), Some(y));
        assert_eq!(builder.variable("z"), None);
    }

    #[test]
    fn rejects_invalid_names() {
        let mut builder = ModelBuilder::new();
        assert_eq!(
            builder.add_variable("1x"),
            Err(ModelError::InvalidName("1x".to_string()))
        );
        assert_eq!(
            builder.add_variable("var"),
            Err(ModelError::InvalidName("var".to_string()))
        );
        assert!(builder.add_variable("subject").is_ok());
    }

    #[test]
    fn default_bounds_are_non_negative() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x").unwrap();
        builder
            .set_objective("obj", OptimizationSense::Minimize, x)
            .unwrap();
        let model = builder.build().unwrap();
        let var = model.variable(x).unwrap();
        assert_eq!(var.lower_bound(), 0.0);
        assert_eq!(var.upper_bound(), f64::INFINITY);
    }

    #[test]
    fn second_objective_is_rejected() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x").unwrap();
        builder
            .set_objective("a", OptimizationSense::Minimize, x)
            .unwrap();
        assert_eq!(
            builder.set_objective("b", OptimizationSense::Maximize, x),
            Err(ModelError::DuplicateObjective)
        );
    }

    #[test]
    fn build_requires_objective() {
        let builder = ModelBuilder::new();
        assert_eq!(builder.build(), Err(ModelError::MissingObjective));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x").unwrap();
        assert_eq!(
            builder.add_constraint(constraint!("c", (f64::INFINITY * x) <= 1.0)),
            Err(ModelError::NonFiniteCoefficient(f64::INFINITY))
        );
        assert!(matches!(
            builder.add_constraint(constraint!("c", (x) <= f64::NAN)),
            Err(ModelError::NonFiniteCoefficient(v)) if v.is_nan()
        ));
    }

    #[test]
    fn labels_repeat_unless_unique_is_requested() {
        let mut permissive = ModelBuilder::new();
        let x = permissive.add_variable("x").unwrap();
        permissive.add_constraint(constraint!("c", (x) <= 1.0)).unwrap();
        permissive.add_constraint(constraint!("c", (x) >= 0.0)).unwrap();

        let mut strict = ModelBuilder::new().with_unique_labels();
        let x = strict.add_variable("x").unwrap();
        strict
            .set_objective("c", OptimizationSense::Minimize, x)
            .unwrap();
        assert_eq!(
            strict.add_constraint(constraint!("c", (x) <= 1.0)),
            Err(ModelError::DuplicateLabel(Symbol::from("c")))
        );
    }

    #[test]
    fn foreign_variable_ids_are_rejected() {
        let mut other = ModelBuilder::new();
        other.add_variable("a").unwrap();
        let foreign = other.add_variable("b").unwrap();

        let mut builder = ModelBuilder::new();
        builder.add_variable("x").unwrap();
        assert_eq!(
            builder.add_constraint(Constraint::le("c", foreign, 1.0)),
            Err(ModelError::UnknownVariable(foreign))
        );
    }

    #[test]
    fn canonical_terms_merge_repeated_variables() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x").unwrap();
        let y = builder.add_variable("y").unwrap();

        let expr = 2.0 * x + y + 3.0 * x - y;
        assert_eq!(expr.terms.len(), 4);
        assert_eq!(expr.canonical_terms(), vec![(x, OrderedFloat(5.0))]);
    }

    #[test]
    fn equivalence_ignores_term_order_and_numbering() {
        let mut a = ModelBuilder::new();
        let ax = a.add_variable("x").unwrap();
        let ay = a.add_variable("y").unwrap();
        a.set_objective("o", OptimizationSense::Maximize, ax + 2.0 * ay)
            .unwrap();
        a.add_constraint(constraint!("c", (ax + ay) <= 4.0)).unwrap();

        let mut b = ModelBuilder::new();
        let by = b.add_variable("y").unwrap();
        let bx = b.add_variable("x").unwrap();
        b.set_objective("o", OptimizationSense::Maximize, 2.0 * by + bx)
            .unwrap();
        b.add_constraint(constraint!("c", (by + bx) <= 4.0)).unwrap();

        let (a, b) = (a.build().unwrap(), b.build().unwrap());
        assert_ne!(a, b);
        assert!(a.equivalent(&b));
    }

    #[test]
    fn equivalence_detects_changed_rhs() {
        let build = |rhs: f64| {
            let mut builder = ModelBuilder::new();
            let x = builder.add_variable("x").unwrap();
            builder
                .set_objective("o", OptimizationSense::Minimize, x)
                .unwrap();
            builder.add_constraint(Constraint::ge("c", x, rhs)).unwrap();
            builder.build().unwrap()
        };
        assert!(!build(1.0).equivalent(&build(2.0)));
    }

    #[test]
    fn named_terms_rejects_foreign_variables() {
        let mut small = ModelBuilder::new();
        let x = small.add_variable("x").unwrap();
        small
            .set_objective("o", OptimizationSense::Minimize, x)
            .unwrap();
        let small = small.build().unwrap();

        let mut large = ModelBuilder::new();
        let a = large.add_variable("a").unwrap();
        let b = large.add_variable("b").unwrap();
        large
            .set_objective("o", OptimizationSense::Minimize, 3.0 * b + a + b)
            .unwrap();
        let large = large.build().unwrap();

        assert_eq!(
            large.named_terms(&large.objective().expression).unwrap(),
            vec![
                (Symbol::from("a"), OrderedFloat(1.0)),
                (Symbol::from("b"), OrderedFloat(4.0)),
            ]
        );
        assert_eq!(
            small.named_terms(&large.objective().expression),
            Err(ModelError::UnknownVariable(b))
        );
        assert!(!small.equivalent(&large));
    }
}
