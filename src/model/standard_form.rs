//! Lowering of a [`Model`] into dense standard form.
//!
//! Every constraint becomes an equality row of `A x = b` over the structural
//! variables followed by one slack column per inequality: `+1` for `<=` rows,
//! `-1` (surplus) for `>=` rows, none for `==` rows. Variables keep their
//! default non-negative bounds, so the result is ready for a primal simplex.
//!
//! ```
//! use lpparse::model::standard_form::StandardForm;
//!
//! let model = lpparse::parse(
//!     "maximize obj: 3*a + 2*b;
//!      subject to c1: a + b <= 4;
//!      subject to c2: a - b == 1;",
//! )
//! .unwrap();
//! let sf = StandardForm::from_model(&model);
//!
//! assert_eq!(sf.a, vec![vec![1.0, 1.0, 1.0], vec![1.0, -1.0, 0.0]]);
//! assert_eq!(sf.b, vec![4.0, 1.0]);
//! assert_eq!(sf.c, vec![3.0, 2.0, 0.0]);
//! ```

use super::{Model, OptimizationSense, Relation};

#[derive(Debug, Clone, PartialEq)]
pub struct StandardForm {
    /// Row-major constraint matrix, `constraints × (structural + slacks)`
    pub a: Vec<Vec<f64>>,
    /// Right-hand sides with expression constants moved across
    pub b: Vec<f64>,
    /// Objective coefficients, zero for slack columns
    pub c: Vec<f64>,
    pub sense: OptimizationSense,
    /// Constant term of the objective
    pub objective_offset: f64,
    /// Number of structural (model) variables; slack columns follow them
    pub structural: usize,
    /// Slack column of each constraint row, `None` for equalities
    pub slack_columns: Vec<Option<usize>>,
}

impl StandardForm {
    pub fn from_model(model: &Model) -> Self {
        let structural = model.variables().len();

        let mut next_slack = structural;
        let slack_columns: Vec<Option<usize>> = model
            .constraints()
            .iter()
            .map(|constraint| match constraint.relation {
                Relation::Equal => None,
                Relation::LessEqual | Relation::GreaterEqual => {
                    next_slack += 1;
                    Some(next_slack - 1)
                }
            })
            .collect();
        let columns = next_slack;

        let a = model
            .constraints()
            .iter()
            .zip(slack_columns.iter())
            .map(|(constraint, slack)| {
                let mut row = vec![0.0; columns];
                for term in &constraint.expression.terms {
                    row[term.variable.index()] += term.coefficient;
                }
                if let Some(column) = slack {
                    row[*column] = match constraint.relation {
                        Relation::GreaterEqual => -1.0,
                        _ => 1.0,
                    };
                }
                row
            })
            .collect();

        let b = model
            .constraints()
            .iter()
            .map(|constraint| constraint.rhs - constraint.expression.constant)
            .collect();

        let objective = model.objective();
        let mut c = vec![0.0; columns];
        for term in &objective.expression.terms {
            c[term.variable.index()] += term.coefficient;
        }

        Self {
            a,
            b,
            c,
            sense: objective.sense,
            objective_offset: objective.expression.constant,
            structural,
            slack_columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.a.len()
    }

    pub fn columns(&self) -> usize {
        self.c.len()
    }
}
