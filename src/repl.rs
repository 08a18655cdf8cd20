use crate::ast::{Expr, Stmt};
use crate::config::InterpreterConfig;
use crate::error::report_all;
use crate::evaluator::Evaluator;
use crate::lexer::{Lexer, TokenType};
use crate::object::Object;
use crate::parser::parse;
use std::io::{self, BufRead, Write};

/// Interactive shell; bindings persist between inputs.
pub fn start(config: &InterpreterConfig) {
    println!("UWSC Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut evaluator = Evaluator::new(config.clone());
    let mut buffer = String::new();
    let mut open_blocks = 0i32;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", if open_blocks > 0 { ".. " } else { "> " });
        if io::stdout().flush().is_err() {
            break;
        }

        let line = match lines.next() {
            None => {
                println!();
                break;
            }
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        };

        if open_blocks == 0 {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                println!("Goodbye!");
                break;
            }
        }

        open_blocks += block_depth_change(&line);
        buffer.push_str(&line);
        buffer.push('\n');

        // Keep reading until every IFB/FUNCTION/PROCEDURE/FOR has been closed.
        if open_blocks > 0 {
            continue;
        }
        open_blocks = 0;
        run_repl_input(&buffer, &mut evaluator);
        buffer.clear();
    }
}

/// Net number of blocks a line opens, judged by its first token.
fn block_depth_change(line: &str) -> i32 {
    match Lexer::new(line).next_token().token_type {
        TokenType::Ifb | TokenType::Function | TokenType::Procedure | TokenType::For => 1,
        TokenType::EndIf | TokenType::Fend | TokenType::Next => -1,
        _ => 0,
    }
}

fn run_repl_input(source: &str, evaluator: &mut Evaluator) {
    let program = match parse(source) {
        Ok(program) => program,
        Err(errors) => {
            report_all(&errors, source, None);
            return;
        }
    };

    // Assignments and declarations stay quiet.
    let echo = matches!(
        program.statements.last(),
        Some(Stmt::Expression { expr, .. }) if !matches!(expr, Expr::Assign { .. })
    );

    match evaluator.evaluate_program(&program) {
        Ok(Object::Null | Object::Empty) => {}
        Ok(value) if echo => println!("{}", value),
        Ok(_) => {}
        Err(error) => error.report(source, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_depth_change() {
        assert_eq!(block_depth_change("FUNCTION f(a)"), 1);
        assert_eq!(block_depth_change("  for i = 0 to 3"), 1);
        assert_eq!(block_depth_change("IFB a THEN"), 1);
        assert_eq!(block_depth_change("IF a THEN b = 1"), 0);
        assert_eq!(block_depth_change("next"), -1);
        assert_eq!(block_depth_change("ENDIF"), -1);
        assert_eq!(block_depth_change(""), 0);
    }
}
