//! Tabular model summaries for diagnostics.

use prettytable::*;

use super::{Model, serialisation::write_expression};

fn bound(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{}", value)
    }
}

/// One row per variable: id, name and bounds.
pub fn variable_table(model: &Model) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["#", "Variable", "Lower", "Upper"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    for (id, variable) in model.variable_ids() {
        table.add_row(row![
            id.index(),
            variable.name(),
            bound(variable.lower_bound()),
            bound(variable.upper_bound()),
        ]);
    }
    table
}

/// One row for the objective followed by one row per constraint.
pub fn constraint_table(model: &Model) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Label", "Expression", "Relation", "RHS"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let objective = model.objective();
    let mut expression = String::new();
    // Infallible for String
    let _ = write_expression(model, &objective.expression, &mut expression);
    table.add_row(row![objective.label, expression, objective.sense, ""]);

    for constraint in model.constraints() {
        let mut expression = String::new();
        let _ = write_expression(model, &constraint.expression, &mut expression);
        table.add_row(row![
            constraint.label,
            expression,
            constraint.relation,
            format!("{}", constraint.rhs),
        ]);
    }
    table
}
