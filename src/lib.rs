// UWSC Language Interpreter Library
//
// Lexer, Pratt parser and tree-walking evaluator for a BASIC-like scripting
// dialect with ordered hash tables and by-reference arrays.

pub mod ast;
pub mod builtins;
pub mod config;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod logging;
pub mod object;
pub mod parser;
pub mod repl;
pub mod runner;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use config::InterpreterConfig;
pub use environment::{EnvRef, Environment};
pub use error::{ErrorKind, ScriptError, Span};
pub use evaluator::{evaluate, Evaluator};
pub use lexer::{Lexer, Token, TokenType};
pub use object::Object;
pub use parser::{parse, Parser};

pub use repl::start as start_repl;
pub use runner::run;
