use super::*;
use crate::{parse, parse_with};
use ordered_float::OrderedFloat;

const FIXTURE: &str = include_str!("../../tests/fixtures/radiation_therapy.lp");

fn parse_error(input: &str) -> ParseError {
    match parse(input) {
        Err(Error::Parse(err)) => err,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

fn terms(model: &Model, expression: &LinearExpression) -> Vec<(String, f64)> {
    expression
        .terms
        .iter()
        .map(|t| {
            (
                model.variable(t.variable).unwrap().name().to_string(),
                t.coefficient,
            )
        })
        .collect()
}

#[test]
fn parses_radiation_therapy_fixture() {
    let model = parse(FIXTURE).expect("fixture should parse");

    let names: Vec<_> = model.variables().iter().map(|v| v.name().to_string()).collect();
    assert_eq!(names, vec!["x_1", "x_2"]);

    let objective = model.objective();
    assert_eq!(objective.sense, OptimizationSense::Minimize);
    assert_eq!(&*objective.label, "healthy_anatomy_exposure");
    assert_eq!(
        terms(&model, &objective.expression),
        vec![("x_1".to_string(), 0.4), ("x_2".to_string(), 0.5)]
    );

    let constraints: Vec<_> = model
        .constraints()
        .iter()
        .map(|c| (c.label.to_string(), c.relation, c.rhs))
        .collect();
    assert_eq!(
        constraints,
        vec![
            ("critical_tissues".to_string(), Relation::LessEqual, 2.7),
            ("tumor_region".to_string(), Relation::Equal, 6.0),
            ("tumor_center".to_string(), Relation::GreaterEqual, 6.0),
        ]
    );
    assert_eq!(
        terms(&model, &model.constraints()[0].expression),
        vec![("x_1".to_string(), 0.3), ("x_2".to_string(), 0.1)]
    );
}

#[test]
fn comment_line_is_ignored() {
    let with_comment = parse("# comment\nvar x_1;\nminimize o: x_1;").unwrap();
    let without = parse("var x_1;\nminimize o: x_1;").unwrap();
    assert_eq!(with_comment, without);
}

#[test]
fn missing_rhs_points_at_semicolon() {
    let err = parse_error("subject to c1: 0.3*x_1 <= ;");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: "`;`".to_string(),
            expected: "right-hand side number",
        }
    );
    assert_eq!(err.position, Position::new(1, 27));
}

#[test]
fn objective_only_model() {
    let model = parse("minimize cost: 2*x + 3*y;").unwrap();
    assert!(model.constraints().is_empty());
    assert_eq!(model.variables().len(), 2);
}

#[test]
fn constant_only_objective_is_degenerate_but_valid() {
    let model = parse("maximize nothing: 42;").unwrap();
    assert!(model.variables().is_empty());
    assert!(model.objective().expression.is_constant());
    assert_eq!(model.objective().expression.constant, 42.0);
}

#[test]
fn duplicate_objective() {
    let err = parse_error("minimize a: x;\nmaximize b: x;");
    assert_eq!(err.kind, ParseErrorKind::DuplicateObjective);
    assert_eq!(err.position, Position::new(2, 1));
}

#[test]
fn missing_objective_reported_at_end_of_input() {
    let err = parse_error("var x;\nsubject to c: x <= 1;\n");
    assert_eq!(err.kind, ParseErrorKind::MissingObjective);
    assert_eq!(err.position, Position::new(3, 1));

    assert_eq!(parse_error("").kind, ParseErrorKind::MissingObjective);
}

#[test]
fn overflowing_number_is_invalid() {
    let err = parse_error("minimize o: 1e400*x;");
    assert_eq!(err.kind, ParseErrorKind::InvalidNumber("1e400".to_string()));
    assert_eq!(err.position, Position::new(1, 13));
}

#[test]
fn overflowing_constant_sum_is_invalid() {
    let err = parse_error("minimize o: x + 1e308 + 1e308;");
    assert_eq!(err.kind, ParseErrorKind::InvalidNumber("1e308".to_string()));
    assert_eq!(err.position, Position::new(1, 25));

    let err = parse_error("minimize o: x; subject to c: x - 1e308 - 1e308 <= 0;");
    assert_eq!(err.kind, ParseErrorKind::InvalidNumber("1e308".to_string()));
    assert_eq!(err.position, Position::new(1, 42));
}

#[test]
fn unknown_operators() {
    for op in ["<", ">", "=<", "!=", "=>", "<<="] {
        let err = parse_error(&format!("subject to c: x {} 1;", op));
        assert_eq!(err.kind, ParseErrorKind::UnknownOperator(op.to_string()));
        assert_eq!(err.position, Position::new(1, 17));
    }
}

#[test]
fn equality_spellings() {
    let double = parse("minimize o: x; subject to c: x == 2;").unwrap();
    let single = parse("minimize o: x; subject to c: x = 2;").unwrap();
    assert_eq!(double, single);
    assert_eq!(single.constraints()[0].relation, Relation::Equal);
}

#[test]
fn relation_inside_objective_is_unexpected() {
    let err = parse_error("minimize o: x <= 3;");
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnexpectedToken { ref found, .. } if found == "`<=`"
    ));
}

#[test]
fn signed_terms_and_constants() {
    let model = parse("minimize o: -x + -1.*y - -2*z + 3 - 1.5;").unwrap();
    let expression = &model.objective().expression;
    assert_eq!(
        terms(&model, expression),
        vec![
            ("x".to_string(), -1.0),
            ("y".to_string(), -1.0),
            ("z".to_string(), 2.0),
        ]
    );
    assert_eq!(expression.constant, 1.5);
}

#[test]
fn negative_right_hand_side() {
    let model = parse("minimize o: x; subject to c: x - y >= -3.5;").unwrap();
    assert_eq!(model.constraints()[0].rhs, -3.5);
}

#[test]
fn implicit_variables_follow_first_appearance() {
    let model = parse("minimize o: b + a; var c; subject to k: c + a <= 1;").unwrap();
    let names: Vec<_> = model.variables().iter().map(|v| v.name().to_string()).collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn redeclaration_is_harmless() {
    let model = parse("var x; var x; minimize o: x;").unwrap();
    assert_eq!(model.variables().len(), 1);
}

#[test]
fn explicit_policy_rejects_undeclared_use() {
    let options = ParserOptions::default().with_declarations(DeclarationPolicy::Explicit);

    assert!(parse_with("var x; minimize o: x;", options).is_ok());

    let err = parse_with("var x;\nminimize o: x + 2*y;", options).unwrap_err();
    assert_eq!(
        err,
        Error::Parse(ParseError::new(
            ParseErrorKind::UndeclaredVariableUse(Symbol::from("y")),
            Position::new(2, 19),
        ))
    );
}

#[test]
fn labels_may_repeat_by_default() {
    let input = "minimize o: x; subject to c: x <= 1; subject to c: x >= 0;";
    let model = parse(input).unwrap();
    assert_eq!(model.constraints_labelled("c").count(), 2);

    let options = ParserOptions::default().with_unique_labels(true);
    let err = parse_with(input, options).unwrap_err();
    assert_eq!(
        err.parse_kind(),
        Some(&ParseErrorKind::DuplicateLabel(Symbol::from("c")))
    );
    assert_eq!(err.position(), Position::new(1, 49));
}

#[test]
fn keywords_are_not_names() {
    let err = parse_error("var minimize;");
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnexpectedToken { expected: "variable name", .. }
    ));
    assert!(parse_error("minimize o: 2*var;").position == Position::new(1, 15));
}

#[test]
fn subject_is_a_valid_name() {
    let model = parse("minimize subject: subject;").unwrap();
    assert_eq!(&*model.objective().label, "subject");
    assert!(model.variable_id("subject").is_some());
}

#[test]
fn truncated_statement_reports_end_of_input() {
    let err = parse_error("minimize o: x");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: "end of input".to_string(),
            expected: "`;` or `+`/`-`",
        }
    );
    assert_eq!(err.position, Position::new(1, 14));
}

#[test]
fn statement_must_start_with_keyword() {
    let err = parse_error("x <= 3;");
    assert_eq!(err.position, Position::new(1, 1));
}

#[test]
fn number_followed_by_name_needs_times() {
    let err = parse_error("minimize o: 3x;");
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnexpectedToken { ref found, .. } if found == "identifier `x`"
    ));
}

#[test]
fn lex_errors_surface_with_position() {
    match parse("var x;\nminimize o: x @ 2;") {
        Err(Error::Lex(err)) => {
            assert_eq!(err.character, '@');
            assert_eq!(err.position, Position::new(2, 15));
        }
        other => panic!("expected a lex error, got {:?}", other),
    }
}

#[test]
fn statements_may_span_lines() {
    let model = parse(
        "subject
         to wrapped:
            x
            + 2 * y
            <= 4;
         minimize o: x;",
    )
    .unwrap();
    let constraint = &model.constraints()[0];
    assert_eq!(&*constraint.label, "wrapped");
    assert_eq!(
        constraint.expression.canonical_terms(),
        vec![
            (model.variable_id("x").unwrap(), OrderedFloat(1.0)),
            (model.variable_id("y").unwrap(), OrderedFloat(2.0)),
        ]
    );
}

#[test]
fn parsing_twice_gives_equal_independent_models() {
    let first = parse(FIXTURE).unwrap();
    let mut second = parse(FIXTURE).unwrap();
    assert_eq!(first, second);

    second = parse("minimize other: y;").unwrap();
    assert_ne!(first, second);
    assert_eq!(first.variables().len(), 2);
}

#[test]
fn error_display_includes_position() {
    let err = parse("subject to c1: 0.3*x_1 <= ;").unwrap_err();
    assert_eq!(
        err.to_string(),
        "1:27: unexpected `;`, expected right-hand side number"
    );
}

#[test]
fn comment_between_subject_and_to() {
    let model = parse("minimize o: x;\nsubject # note\nto c: x <= 1;").unwrap();
    assert_eq!(&*model.constraints()[0].label, "c");
    assert_eq!(model.constraints()[0].rhs, 1.0);
}
