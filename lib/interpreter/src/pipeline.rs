use std::io::Write;

use errors::Diagnostics;
use log::debug;
use parser::{Expr, Parser};
use scanner::{scan, Scanned};

use crate::{Interpreter, RuntimeError, Value};

#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("{0}")]
    CompileError(#[from] Diagnostics),
    #[error("{0}")]
    RuntimeError(#[from] RuntimeError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Scans and parses a `;` separated list of expressions. Lexical and syntax errors are
/// collected together, lexical ones first.
pub fn parse_source(source: &str) -> Result<Vec<Expr<'_>>, Diagnostics> {
    let Scanned { tokens, errors } = scan(source);
    let mut diagnostics: Diagnostics = errors.into_iter().collect();

    match Parser::new(tokens).parse_all() {
        Ok(exprs) if diagnostics.is_empty() => Ok(exprs),
        Ok(_) => Err(diagnostics),
        Err(errors) => {
            diagnostics.extend(errors);
            Err(diagnostics)
        }
    }
}

/// Evaluates a source consisting of exactly one expression.
pub fn evaluate_source(source: &str) -> Result<Value, InterpretError> {
    let Scanned { tokens, errors } = scan(source);
    let mut diagnostics: Diagnostics = errors.into_iter().collect();

    match Parser::new(tokens).parse() {
        Ok(expr) if diagnostics.is_empty() => Ok(Interpreter::new().evaluate(&expr)?),
        Ok(_) => Err(diagnostics.into()),
        Err(e) => {
            diagnostics.push(e.into());
            Err(diagnostics.into())
        }
    }
}

/// Evaluates every expression in `source` and writes each result on its own line.
/// Nothing is evaluated if the source doesn't compile; evaluation stops at the first
/// runtime error.
pub fn run_source(source: &str, output: &mut impl Write) -> Result<(), InterpretError> {
    let exprs = parse_source(source).map_err(|e| {
        debug!("Compilation failed with {} error(s)", e.len());
        e
    })?;

    let interpreter = Interpreter::new();
    for expr in &exprs {
        let value = interpreter.evaluate(expr)?;
        writeln!(output, "{value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cursor::Line;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::RuntimeErrorType;

    fn run(source: &str) -> (Result<(), InterpretError>, String) {
        let mut output = Vec::new();
        let result = run_source(source, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn every_expression_is_printed() {
        let (result, output) = run("3 * (4 + 2);\n\"text\"; nil; 1 < 2;");
        assert!(result.is_ok());
        assert_eq!(output, "18.0\ntext\nnil\ntrue\n");
    }

    #[test]
    fn compile_errors_prevent_evaluation() {
        let (result, output) = run("1 + 2; \"open");
        assert_eq!(output, "");
        let diagnostics = match result {
            Err(InterpretError::CompileError(diagnostics)) => diagnostics,
            other => panic!("expected a compile error, got {other:?}"),
        };
        assert_eq!(diagnostics.to_string(), "[line 1] Error: Unterminated string.");
    }

    #[test]
    fn lexical_and_syntax_errors_are_reported_together() {
        let (result, _) = run("1 # 2;\n(3");
        let diagnostics = match result {
            Err(InterpretError::CompileError(diagnostics)) => diagnostics,
            other => panic!("expected a compile error, got {other:?}"),
        };
        assert_eq!(
            diagnostics.to_string(),
            "[line 1] Error: Unexpected character '#'.\n\
             [line 1] Error at '2': Expect ';' after expression.\n\
             [line 2] Error at end: Expect ')' after expression."
        );
    }

    #[test]
    fn runtime_error_stops_evaluation() {
        let (result, output) = run("1; -nil; 3");
        assert_eq!(output, "1.0\n");
        let e = match result {
            Err(InterpretError::RuntimeError(e)) => e,
            other => panic!("expected a runtime error, got {other:?}"),
        };
        assert_eq!(e.error, RuntimeErrorType::OperandMustBeNumber(Value::Nil));
        assert_eq!(e.line, Line(1));
    }

    #[test]
    fn evaluate_single_expression() {
        assert_eq!(evaluate_source("3 * (4 + 2)").unwrap(), Value::Number(18.0));
        assert!(matches!(
            evaluate_source("3 * (4 5 + 2)"),
            Err(InterpretError::CompileError(d)) if d.len() == 1
        ));
        assert!(matches!(evaluate_source("1; 2"), Err(InterpretError::CompileError(_))));
        assert!(matches!(evaluate_source("1 / 0"), Err(InterpretError::RuntimeError(_))));
    }

    #[test]
    fn long_chains_are_rejected_before_evaluation() {
        let source = format!("1{}", " + 1".repeat(30_000));

        let (result, output) = run(&source);
        assert_eq!(output, "");
        let diagnostics = match result {
            Err(InterpretError::CompileError(diagnostics)) => diagnostics,
            other => panic!("expected a compile error, got {other:?}"),
        };
        assert_eq!(
            diagnostics.to_string(),
            "[line 1] Error at '+': Expression nested too deeply."
        );

        assert!(matches!(evaluate_source(&source), Err(InterpretError::CompileError(_))));
    }

    #[test]
    fn unterminated_string_keeps_earlier_tokens() {
        let diagnostics = parse_source("1 + 2 \"abc").unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Unterminated string.");
        assert!(matches!(parse_source("1 + 2"), Ok(exprs) if exprs.len() == 1));
    }
}
