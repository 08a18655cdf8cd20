use crate::ast::{BlockStmt, Expr, Identifier, InfixOp, PrefixOp, Program, Stmt};
use crate::error::{ScriptError, Span};
use crate::lexer::{Lexer, Token, TokenType};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn of(token_type: TokenType) -> Self {
        match token_type {
            TokenType::EqualOrAssign | TokenType::NotEqual => Precedence::Equals,
            TokenType::Less
            | TokenType::LessEqual
            | TokenType::Greater
            | TokenType::GreaterEqual => Precedence::LessGreater,
            TokenType::Plus | TokenType::Minus => Precedence::Sum,
            TokenType::Asterisk | TokenType::Slash | TokenType::Mod => Precedence::Product,
            TokenType::LeftParen => Precedence::Call,
            TokenType::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_operator(token_type: TokenType) -> Option<InfixOp> {
    let operator = match token_type {
        TokenType::Plus => InfixOp::Add,
        TokenType::Minus => InfixOp::Subtract,
        TokenType::Asterisk => InfixOp::Multiply,
        TokenType::Slash => InfixOp::Divide,
        TokenType::Mod => InfixOp::Mod,
        TokenType::EqualOrAssign => InfixOp::Equal,
        TokenType::NotEqual => InfixOp::NotEqual,
        TokenType::Less => InfixOp::Less,
        TokenType::LessEqual => InfixOp::LessEqual,
        TokenType::Greater => InfixOp::Greater,
        TokenType::GreaterEqual => InfixOp::GreaterEqual,
        _ => return None,
    };
    Some(operator)
}

fn is_block_end(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Else | TokenType::ElseIf | TokenType::EndIf | TokenType::Fend | TokenType::Next
    )
}

/// Parses and collects errors instead of stopping at the first one.
pub fn parse(source: &str) -> Result<Program, Vec<ScriptError>> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

/// Pratt parser over a two-token window (`cur`, `peek`).
///
/// Every production starts with its first token in `cur` and returns with its
/// last token in `cur`. A failed statement records one error and the parser
/// resumes on the next line.
pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
    errors: Vec<ScriptError>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            cur,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ScriptError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ScriptError> {
        self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.cur_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement_recovering() {
                statements.push(statement);
            }
            self.next_token();
        }

        Program { statements }
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn cur_is(&self, token_type: TokenType) -> bool {
        self.cur.token_type == token_type
    }

    fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek.token_type == token_type
    }

    fn peek_is_line_end(&self) -> bool {
        self.peek_is(TokenType::Eol) || self.peek_is(TokenType::Eof)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.token_type)
    }

    fn expect_peek(&mut self, token_type: TokenType) -> Result<(), ScriptError> {
        if self.peek_is(token_type) {
            self.next_token();
            Ok(())
        } else {
            Err(self.peek_error(token_type))
        }
    }

    fn expect_peek_with_help(&mut self, token_type: TokenType, help: &str) -> Result<(), ScriptError> {
        self.expect_peek(token_type)
            .map_err(|error| error.with_help(help.to_string()))
    }

    /// A header line must be followed by a newline before its body begins.
    fn expect_line_end(&mut self, construct: &str) -> Result<(), ScriptError> {
        self.expect_peek_with_help(
            TokenType::Eol,
            &format!("the body of {} starts on the next line", construct),
        )
    }

    fn peek_error(&self, expected: TokenType) -> ScriptError {
        ScriptError::parse_error(
            self.peek.span,
            format!(
                "expected next token to be {}, got {} instead",
                expected, self.peek.token_type
            ),
        )
    }

    fn record(&mut self, error: ScriptError) {
        debug!(message = %error.message, start = error.span.start, "parse error");
        self.errors.push(error);
    }

    /// Skips the rest of the current line, stopping before its newline.
    fn synchronize(&mut self) {
        while !self.cur_is(TokenType::Eol) && !self.cur_is(TokenType::Eof) && !self.peek_is_line_end() {
            self.next_token();
        }
    }

    fn parse_statement_recovering(&mut self) -> Option<Stmt> {
        match self.parse_statement() {
            Ok(statement) => statement,
            Err(error) => {
                self.record(error);
                self.synchronize();
                None
            }
        }
    }

    fn current_identifier(&self) -> Identifier {
        Identifier {
            name: self.cur.literal.clone(),
            span: self.cur.span,
        }
    }

    fn parse_statement(&mut self) -> Result<Option<Stmt>, ScriptError> {
        let statement = match self.cur.token_type {
            TokenType::Eol => return Ok(None),
            TokenType::Dim => self.parse_dim(false)?,
            TokenType::Public => self.parse_dim(true)?,
            TokenType::Const => self.parse_const()?,
            TokenType::HashTbl => self.parse_hash_table()?,
            TokenType::If => self.parse_if()?,
            TokenType::Ifb => self.parse_if_block()?,
            TokenType::Function => self.parse_function(false)?,
            TokenType::Procedure => self.parse_function(true)?,
            TokenType::Result if self.peek_is(TokenType::EqualOrAssign) => self.parse_result()?,
            TokenType::For => self.parse_for()?,
            TokenType::Continue => Stmt::Continue { span: self.cur.span },
            TokenType::Break => Stmt::Break { span: self.cur.span },
            token_type if is_block_end(token_type) => {
                return Err(ScriptError::parse_error_with_help(
                    self.cur.span,
                    format!("unexpected {}", token_type),
                    format!("{} only closes or continues an open block", token_type),
                ));
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Some(statement))
    }

    fn parse_dim(&mut self, is_public: bool) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.expect_peek_with_help(
            TokenType::Identifier,
            "declarations name a variable: DIM name = value",
        )?;
        let name = self.current_identifier();

        let value = if self.peek_is(TokenType::LeftBracket) {
            self.next_token();
            Some(self.parse_array_literal()?)
        } else if self.peek_is(TokenType::EqualOrAssign) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        Ok(Stmt::Dim {
            name,
            value,
            is_public,
            span: start.to(self.cur.span),
        })
    }

    /// `[]`, `[N]`, `[] = e0, e1` or `[N] = e0, e1`, starting at `[`.
    fn parse_array_literal(&mut self) -> Result<Expr, ScriptError> {
        let start = self.cur.span;

        let size = if self.peek_is(TokenType::RightBracket) {
            self.next_token();
            None
        } else {
            self.next_token();
            let size = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek_with_help(
                TokenType::RightBracket,
                "array sizes are written name[N], declaring N + 1 slots",
            )?;
            Some(Box::new(size))
        };

        let mut elements = Vec::new();
        if self.peek_is(TokenType::EqualOrAssign) {
            self.next_token();
            loop {
                self.next_token();
                elements.push(self.parse_expression(Precedence::Lowest)?);
                if !self.peek_is(TokenType::Comma) {
                    break;
                }
                self.next_token();
            }
            if !self.peek_is_line_end() {
                return Err(self.peek_error(TokenType::Eol).with_help(
                    "array elements are separated by commas and end with the line".to_string(),
                ));
            }
        }

        Ok(Expr::Array {
            size,
            elements,
            span: start.to(self.cur.span),
        })
    }

    fn parse_const(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.expect_peek(TokenType::Identifier)?;
        let name = self.current_identifier();
        self.expect_peek_with_help(
            TokenType::EqualOrAssign,
            "constants must be initialized: CONST name = value",
        )?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Stmt::Const {
            name,
            value,
            span: start.to(self.cur.span),
        })
    }

    fn parse_hash_table(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.expect_peek(TokenType::Identifier)?;
        let name = self.current_identifier();

        let option = if self.peek_is(TokenType::EqualOrAssign) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        Ok(Stmt::HashTable {
            name,
            option,
            span: start.to(self.cur.span),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek_with_help(TokenType::Then, "single-line conditionals read IF cond THEN stmt")?;

        if self.peek_is_line_end() {
            return Err(ScriptError::parse_error_with_help(
                self.peek.span,
                format!("expected a statement after THEN, got {}", self.peek.token_type),
                "use IFB ... ENDIF for a conditional spanning several lines".to_string(),
            ));
        }
        self.next_token();
        let consequence = self.parse_inline_statement()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            self.next_token();
            Some(Box::new(self.parse_inline_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            consequence: Box::new(consequence),
            alternative,
            span: start.to(self.cur.span),
        })
    }

    fn parse_inline_statement(&mut self) -> Result<Stmt, ScriptError> {
        match self.parse_statement()? {
            Some(statement) => Ok(statement),
            None => Err(ScriptError::parse_error(
                self.cur.span,
                "expected a statement".to_string(),
            )),
        }
    }

    /// Entered on `IFB` or `ELSEIF`; returns with `ENDIF` in `cur`.
    fn parse_if_block(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenType::Then) {
            self.next_token();
        }
        self.expect_line_end("IFB")?;
        let consequence = self.parse_block();

        let alternative = match self.cur.token_type {
            TokenType::EndIf => None,
            TokenType::ElseIf => Some(Box::new(self.parse_if_block()?)),
            TokenType::Else => {
                self.expect_line_end("ELSE")?;
                let block = self.parse_block();
                if !self.cur_is(TokenType::EndIf) {
                    return Err(self.block_end_error(TokenType::EndIf, "IFB"));
                }
                Some(Box::new(Stmt::Block(block)))
            }
            _ => return Err(self.block_end_error(TokenType::EndIf, "IFB")),
        };

        Ok(Stmt::IfBlock {
            condition,
            consequence,
            alternative,
            span: start.to(self.cur.span),
        })
    }

    fn block_end_error(&self, expected: TokenType, construct: &str) -> ScriptError {
        ScriptError::parse_error_with_help(
            self.cur.span,
            format!("expected {}, got {} instead", expected, self.cur.token_type),
            format!("every {} must be closed with {}", construct, expected),
        )
    }

    /// Entered on the newline ending a block header; returns with the block-end
    /// token (or `Eof`) in `cur`.
    fn parse_block(&mut self) -> BlockStmt {
        let start = self.cur.span;
        let mut statements = Vec::new();
        self.next_token();

        while !is_block_end(self.cur.token_type) && !self.cur_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement_recovering() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStmt {
            statements,
            span: start.to(self.cur.span),
        }
    }

    fn parse_function(&mut self, is_procedure: bool) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        let keyword = if is_procedure { "PROCEDURE" } else { "FUNCTION" };
        self.expect_peek_with_help(
            TokenType::Identifier,
            &format!("{} needs a name: {} name(params)", keyword, keyword),
        )?;
        let name = self.current_identifier();

        let mut parameters = Vec::new();
        if self.peek_is(TokenType::LeftParen) {
            self.next_token();
            if self.peek_is(TokenType::RightParen) {
                self.next_token();
            } else {
                loop {
                    self.expect_peek_with_help(
                        TokenType::Identifier,
                        "parameters are plain names separated by commas",
                    )?;
                    parameters.push(self.current_identifier());
                    if self.peek_is(TokenType::Comma) {
                        self.next_token();
                        continue;
                    }
                    self.expect_peek(TokenType::RightParen)?;
                    break;
                }
            }
        }

        self.expect_line_end(keyword)?;
        let body = self.parse_block();
        if !self.cur_is(TokenType::Fend) {
            return Err(self.block_end_error(TokenType::Fend, keyword));
        }

        Ok(Stmt::Function {
            name,
            parameters,
            body,
            is_procedure,
            span: start.to(self.cur.span),
        })
    }

    fn parse_result(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.next_token();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(Stmt::Result {
            value,
            span: start.to(self.cur.span),
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        self.expect_peek(TokenType::Identifier)?;
        let variable = self.current_identifier();

        if self.peek_is(TokenType::In) {
            self.next_token();
            self.expect_peek_with_help(
                TokenType::Identifier,
                "FOR ... IN iterates over a variable holding an array",
            )?;
            let collection = self.current_identifier();
            self.expect_line_end("FOR")?;
            let body = self.parse_loop_body()?;
            return Ok(Stmt::ForIn {
                variable,
                collection,
                body,
                span: start.to(self.cur.span),
            });
        }

        if !self.peek_is(TokenType::EqualOrAssign) {
            return Err(ScriptError::parse_error_with_help(
                self.peek.span,
                format!(
                    "expected next token to be = or IN, got {} instead",
                    self.peek.token_type
                ),
                "loops read FOR i = from TO to [STEP n] or FOR item IN array".to_string(),
            ));
        }
        self.next_token();
        self.next_token();
        let from = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::To)?;
        self.next_token();
        let to = self.parse_expression(Precedence::Lowest)?;
        let step = if self.peek_is(TokenType::Step) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };
        self.expect_line_end("FOR")?;
        let body = self.parse_loop_body()?;

        Ok(Stmt::ForToStep {
            variable,
            from,
            to,
            step,
            body,
            span: start.to(self.cur.span),
        })
    }

    fn parse_loop_body(&mut self) -> Result<BlockStmt, ScriptError> {
        let body = self.parse_block();
        if !self.cur_is(TokenType::Next) {
            return Err(self.block_end_error(TokenType::Next, "FOR"));
        }
        Ok(body)
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.cur.span;
        let expr = self.parse_expression_at_statement_start()?;

        if !self.peek_is_line_end() && !self.peek_is(TokenType::Else) {
            return Err(ScriptError::parse_error_with_help(
                self.peek.span,
                format!("expected end of line, got {} instead", self.peek.token_type),
                "write one statement per line".to_string(),
            ));
        }

        Ok(Stmt::Expression {
            expr,
            span: start.to(self.cur.span),
        })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, ScriptError> {
        self.parse_expression_from(precedence, false)
    }

    fn parse_expression_at_statement_start(&mut self) -> Result<Expr, ScriptError> {
        self.parse_expression_from(Precedence::Lowest, true)
    }

    fn parse_expression_from(
        &mut self,
        precedence: Precedence,
        at_statement_start: bool,
    ) -> Result<Expr, ScriptError> {
        let mut left = self.parse_prefix()?;

        loop {
            // Checked again after each fold so `arr[i] = v` targets the index expression.
            if at_statement_start
                && self.peek_is(TokenType::EqualOrAssign)
                && matches!(left, Expr::Identifier(_) | Expr::Index { .. })
            {
                return self.parse_assign(left);
            }
            if self.peek_is(TokenType::Eol) || precedence >= self.peek_precedence() {
                break;
            }
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_assign(&mut self, target: Expr) -> Result<Expr, ScriptError> {
        self.next_token();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        let span = target.span().to(value.span());
        Ok(Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
            span,
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr, ScriptError> {
        let span = self.cur.span;
        match self.cur.token_type {
            TokenType::Identifier => Ok(Expr::Identifier(self.current_identifier())),
            TokenType::Result => Ok(Expr::Identifier(Identifier {
                name: "RESULT".to_string(),
                span,
            })),
            TokenType::Integer => match self.cur.literal.parse::<i64>() {
                Ok(value) => Ok(Expr::Integer { value, span }),
                Err(_) => Err(ScriptError::parse_error_with_help(
                    span,
                    format!("could not parse {} as integer", self.cur.literal),
                    format!("integers range from {} to {}", i64::MIN, i64::MAX),
                )),
            },
            TokenType::String => Ok(Expr::String {
                value: self.cur.literal.clone(),
                span,
            }),
            TokenType::True => Ok(Expr::Boolean { value: true, span }),
            TokenType::False => Ok(Expr::Boolean { value: false, span }),
            TokenType::Minus | TokenType::Bang => {
                let operator = if self.cur_is(TokenType::Minus) {
                    PrefixOp::Negate
                } else {
                    PrefixOp::Not
                };
                self.next_token();
                let right = self.parse_expression(Precedence::Prefix)?;
                let span = span.to(right.span());
                Ok(Expr::Prefix {
                    operator,
                    right: Box::new(right),
                    span,
                })
            }
            TokenType::LeftParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek_with_help(TokenType::RightParen, "unbalanced parentheses")?;
                Ok(expr)
            }
            TokenType::Illegal if self.cur.literal.starts_with('"') => {
                Err(ScriptError::parse_error_with_help(
                    span,
                    "unterminated string literal".to_string(),
                    "close the string with \" before the end of the input".to_string(),
                ))
            }
            TokenType::Illegal => Err(ScriptError::parse_error(
                span,
                format!("illegal character '{}'", self.cur.literal),
            )),
            token_type => Err(ScriptError::parse_error(
                span,
                format!("no prefix parse function for {} found", token_type),
            )),
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ScriptError> {
        match self.cur.token_type {
            TokenType::LeftParen => self.parse_call(left),
            TokenType::LeftBracket => self.parse_index(left),
            token_type => {
                let operator = infix_operator(token_type).ok_or_else(|| {
                    ScriptError::parse_error(
                        self.cur.span,
                        format!("no infix parse function for {} found", token_type),
                    )
                })?;
                let precedence = Precedence::of(token_type);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                let span = left.span().to(right.span());
                Ok(Expr::Infix {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                    span,
                })
            }
        }
    }

    /// Entered on `(`. A slot with nothing before its comma, or before the
    /// closing paren after a comma, becomes `EmptyArgument`.
    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ScriptError> {
        let mut arguments = Vec::new();

        if self.peek_is(TokenType::RightParen) {
            self.next_token();
        } else {
            loop {
                self.next_token();
                match self.cur.token_type {
                    TokenType::Comma => {
                        arguments.push(Expr::EmptyArgument { span: self.cur.span });
                    }
                    TokenType::RightParen => {
                        arguments.push(Expr::EmptyArgument { span: self.cur.span });
                        break;
                    }
                    _ => {
                        arguments.push(self.parse_expression(Precedence::Lowest)?);
                        if self.peek_is(TokenType::Comma) {
                            self.next_token();
                            continue;
                        }
                        self.expect_peek_with_help(
                            TokenType::RightParen,
                            "arguments are separated by commas and closed with )",
                        )?;
                        break;
                    }
                }
            }
        }

        let span = callee.span().to(self.cur.span);
        Ok(Expr::Call {
            callee: Box::new(callee),
            arguments,
            span,
        })
    }

    /// Entered on `[`: `left[index]` or `left[index, option]`.
    fn parse_index(&mut self, left: Expr) -> Result<Expr, ScriptError> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        let option = if self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            Some(Box::new(self.parse_expression(Precedence::Lowest)?))
        } else {
            None
        };
        self.expect_peek(TokenType::RightBracket)?;

        let span = left.span().to(self.cur.span);
        Ok(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
            option,
            span,
        })
    }
}
