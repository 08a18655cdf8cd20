use crate::config::InterpreterConfig;
use crate::error::report_all;
use crate::evaluator::Evaluator;
use crate::object::Object;
use crate::parser::parse;

/// Parses and evaluates a whole script, reporting diagnostics to stderr.
/// Returns `None` when parsing or evaluation failed.
pub fn run(source: &str, filename: Option<&str>, config: &InterpreterConfig) -> Option<Object> {
    let program = match parse(source) {
        Ok(program) => program,
        Err(errors) => {
            report_all(&errors, source, filename);
            return None;
        }
    };

    // A script with parse errors is never evaluated, even partially.
    let mut evaluator = Evaluator::new(config.clone());
    match evaluator.evaluate_program(&program) {
        Ok(value) => Some(value),
        Err(error) => {
            error.report(source, filename);
            None
        }
    }
}
