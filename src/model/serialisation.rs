//! Serialization of models back to the LP dialect.
//!
//! The output declares every variable in id order, then the objective, then the
//! constraints in model order:
//!
//! ```text
//! var x_1;
//! var x_2;
//!
//! minimize cost: 0.4*x_1 + 0.5*x_2;
//!
//! subject to limit: 0.3*x_1 - x_2 <= 2.7;
//! ```
//!
//! Numbers use the shortest representation that parses back to the same `f64`,
//! so parsing the output yields a model equal to the one serialised.

use std::fmt;

use super::{LinearExpression, Model};

/// Serialize a model into the provided writer.
///
/// See [`serialize_model`] for format details.
pub fn serialize_model_to<W>(model: &Model, writer: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    for variable in model.variables() {
        writeln!(writer, "var {};", variable.name())?;
    }
    if !model.variables().is_empty() {
        writeln!(writer)?;
    }

    let objective = model.objective();
    write!(writer, "{} {}: ", objective.sense, objective.label)?;
    write_expression(model, &objective.expression, writer)?;
    writeln!(writer, ";")?;

    if !model.constraints().is_empty() {
        writeln!(writer)?;
    }
    for constraint in model.constraints() {
        write!(writer, "subject to {}: ", constraint.label)?;
        write_expression(model, &constraint.expression, writer)?;
        writeln!(writer, " {} {};", constraint.relation, constraint.rhs)?;
    }

    Ok(())
}

/// Serialize a model to LP-dialect text.
///
/// # Example
///
/// ```
/// use lpparse::model::serialisation::serialize_model;
///
/// let model = lpparse::parse("maximize profit: 3*a - b + 2; subject to cap: a <= 4;").unwrap();
///
/// assert_eq!(
///     serialize_model(&model),
///     "var a;\nvar b;\n\nmaximize profit: 3*a - b + 2;\n\nsubject to cap: a <= 4;\n"
/// );
/// ```
pub fn serialize_model(model: &Model) -> String {
    let mut out = String::new();
    // Infallible for String
    let _ = serialize_model_to(model, &mut out);
    out
}

/// Write `expression` with variable names resolved through `model`.
pub fn write_expression<W>(model: &Model, expression: &LinearExpression, writer: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    let mut first = true;
    let mut write_sign = |writer: &mut W, value: f64| -> fmt::Result {
        let negative = value < 0.0;
        match (first, negative) {
            (true, true) => write!(writer, "-")?,
            (true, false) => {}
            (false, true) => write!(writer, " - ")?,
            (false, false) => write!(writer, " + ")?,
        }
        first = false;
        Ok(())
    };

    for term in &expression.terms {
        write_sign(writer, term.coefficient)?;
        let name = model
            .variable(term.variable)
            .map(|v| &**v.name())
            .unwrap_or("?");
        let magnitude = term.coefficient.abs();
        if magnitude == 1.0 {
            write!(writer, "{}", name)?;
        } else {
            write!(writer, "{}*{}", magnitude, name)?;
        }
    }

    if expression.constant != 0.0 || expression.terms.is_empty() {
        write_sign(writer, expression.constant)?;
        write!(writer, "{}", expression.constant.abs())?;
    }

    Ok(())
}
