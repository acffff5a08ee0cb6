//! One-call entry points.
//!
//! These wrap [`Parser`] for callers that want a single result: a list of
//! statements, or one body, expression, term or ref. Any parse error turns
//! the whole call into `Err`.

use rego_ir::{Body, Comment, Expr, ExprTerms, Ref, Statement, Term, Value};

use crate::{ParseError, ParseErrors, Parser, ParserOptions};

/// Parse `source` into statements and the comments found along the way.
pub fn parse_statements(
    filename: &str,
    source: &str,
    options: ParserOptions,
) -> Result<(Vec<Statement>, Vec<Comment>), ParseErrors> {
    let output = Parser::new(source)
        .with_filename(filename)
        .with_options(options)
        .parse();

    if output.has_errors() {
        return Err(output.errors.into());
    }
    Ok((output.statements, output.comments))
}

/// Parse `source` as a query.
///
/// Rules are not recognised, so `p = 1` is an expression here.
pub fn parse_body(source: &str) -> Result<Body, ParseErrors> {
    let options = ParserOptions::default().with_skip_rules(true);
    let (statements, _) = parse_statements("", source, options)?;

    let mut body = Body::new();
    for statement in statements {
        match statement {
            Statement::Body(b) => {
                for expr in b.0 {
                    body.push(expr);
                }
            }
            other => return Err(single(format!("expected body but got {other}"))),
        }
    }

    if body.is_empty() {
        return Err(single("empty body"));
    }
    Ok(body)
}

/// Parse `source` as exactly one expression.
pub fn parse_expr(source: &str) -> Result<Expr, ParseErrors> {
    let body = parse_body(source)?;
    match <[Expr; 1]>::try_from(body.0) {
        Ok([expr]) => Ok(expr),
        Err(exprs) => Err(single(format!(
            "expected exactly one expression but got: {}",
            Body(exprs)
        ))),
    }
}

/// Parse `source` as exactly one term.
pub fn parse_term(source: &str) -> Result<Term, ParseErrors> {
    let expr = parse_expr(source)?;
    match expr.terms {
        ExprTerms::Term(term) => Ok(*term),
        _ => Err(single(format!("expected term but got {expr}"))),
    }
}

/// Parse `source` as a ref. `data` and `input` on their own are refs; other
/// bare variables are not.
pub fn parse_ref(source: &str) -> Result<Ref, ParseErrors> {
    let term = parse_term(source)?;
    match term.value {
        Value::Ref(r) => Ok(r),
        other => Err(single(format!("expected ref but got {other}"))),
    }
}

fn single(message: impl Into<String>) -> ParseErrors {
    ParseErrors(vec![ParseError::new(message)])
}
