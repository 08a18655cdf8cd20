use crate::error::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Illegal,
    Eof,
    Eol,

    // Literals
    Identifier,
    Integer,
    String,

    // Operators
    EqualOrAssign,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Mod,
    Bang,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,

    // Keywords
    Dim,
    Public,
    Const,
    HashTbl,
    True,
    False,
    If,
    ElseIf,
    Else,
    Ifb,
    EndIf,
    Then,
    Function,
    Procedure,
    Result,
    Fend,
    For,
    To,
    Step,
    In,
    Next,
    Continue,
    Break,
}

impl TokenType {
    /// Reserved words are matched case-insensitively.
    pub fn lookup_keyword(word: &str) -> Option<TokenType> {
        let token_type = match word.to_ascii_uppercase().as_str() {
            "DIM" => TokenType::Dim,
            "PUBLIC" => TokenType::Public,
            "CONST" => TokenType::Const,
            "HASHTBL" => TokenType::HashTbl,
            "TRUE" => TokenType::True,
            "FALSE" => TokenType::False,
            "MOD" => TokenType::Mod,
            "IF" => TokenType::If,
            "ELSEIF" => TokenType::ElseIf,
            "ELSE" => TokenType::Else,
            "IFB" => TokenType::Ifb,
            "ENDIF" => TokenType::EndIf,
            "THEN" => TokenType::Then,
            "FUNCTION" => TokenType::Function,
            "PROCEDURE" => TokenType::Procedure,
            "RESULT" => TokenType::Result,
            "FEND" => TokenType::Fend,
            "FOR" => TokenType::For,
            "TO" => TokenType::To,
            "STEP" => TokenType::Step,
            "IN" => TokenType::In,
            "NEXT" => TokenType::Next,
            "CONTINUE" => TokenType::Continue,
            "BREAK" => TokenType::Break,
            _ => return None,
        };
        Some(token_type)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::Eol => "EOL",
            TokenType::Identifier => "IDENT",
            TokenType::Integer => "INT",
            TokenType::String => "STRING",
            TokenType::EqualOrAssign => "=",
            TokenType::NotEqual => "<>",
            TokenType::Less => "<",
            TokenType::LessEqual => "<=",
            TokenType::Greater => ">",
            TokenType::GreaterEqual => ">=",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::Mod => "MOD",
            TokenType::Bang => "!",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Comma => ",",
            TokenType::Dim => "DIM",
            TokenType::Public => "PUBLIC",
            TokenType::Const => "CONST",
            TokenType::HashTbl => "HASHTBL",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::If => "IF",
            TokenType::ElseIf => "ELSEIF",
            TokenType::Else => "ELSE",
            TokenType::Ifb => "IFB",
            TokenType::EndIf => "ENDIF",
            TokenType::Then => "THEN",
            TokenType::Function => "FUNCTION",
            TokenType::Procedure => "PROCEDURE",
            TokenType::Result => "RESULT",
            TokenType::Fend => "FEND",
            TokenType::For => "FOR",
            TokenType::To => "TO",
            TokenType::Step => "STEP",
            TokenType::In => "IN",
            TokenType::Next => "NEXT",
            TokenType::Continue => "CONTINUE",
            TokenType::Break => "BREAK",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, literal: String, span: Span) -> Self {
        Self {
            token_type,
            literal,
            span,
        }
    }
}

pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            start: 0,
            current: 0,
        }
    }

    /// Returns `Eof` forever once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.current;

        if self.is_at_end() {
            return Token::new(TokenType::Eof, String::new(), Span::single(self.current));
        }

        let c = self.advance();
        match c {
            '\n' => self.make_token(TokenType::Eol),
            '=' => self.make_token(TokenType::EqualOrAssign),
            '+' => self.make_token(TokenType::Plus),
            '-' => self.make_token(TokenType::Minus),
            '*' => self.make_token(TokenType::Asterisk),
            '/' => self.make_token(TokenType::Slash),
            '!' => self.make_token(TokenType::Bang),
            '(' => self.make_token(TokenType::LeftParen),
            ')' => self.make_token(TokenType::RightParen),
            '[' => self.make_token(TokenType::LeftBracket),
            ']' => self.make_token(TokenType::RightBracket),
            ',' => self.make_token(TokenType::Comma),
            '<' => {
                let token_type = if self.match_char('>') {
                    TokenType::NotEqual
                } else if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.make_token(token_type)
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.make_token(token_type)
            }
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => self.make_token(TokenType::Illegal),
        }
    }

    /// Collects every token up to and including the terminating `Eof`.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' if !self.is_at_end() => {
                    self.current += 1;
                }
                '/' if self.peek_next() == '/' => {
                    // Comment goes until end of line; the newline itself is still a token
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.current += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token {
        while self.peek() != '"' && !self.is_at_end() {
            self.current += 1;
        }

        if self.is_at_end() {
            return self.make_token(TokenType::Illegal);
        }

        // Consume the closing "
        self.current += 1;

        let content: String = self.source[self.start + 1..self.current - 1].iter().collect();
        Token::new(
            TokenType::String,
            content,
            Span::new(self.start, self.current),
        )
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }
        self.make_token(TokenType::Integer)
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.current += 1;
        }

        let text = self.lexeme();
        let token_type = TokenType::lookup_keyword(&text).unwrap_or(TokenType::Identifier);
        Token::new(token_type, text, Span::new(self.start, self.current))
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token::new(token_type, self.lexeme(), Span::new(self.start, self.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        Lexer::new(input)
            .scan_tokens()
            .into_iter()
            .map(|token| token.token_type)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            types("=+(),-*/!<><=>=<>"),
            vec![
                TokenType::EqualOrAssign,
                TokenType::Plus,
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::Comma,
                TokenType::Minus,
                TokenType::Asterisk,
                TokenType::Slash,
                TokenType::Bang,
                TokenType::NotEqual,
                TokenType::LessEqual,
                TokenType::GreaterEqual,
                TokenType::NotEqual,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens = Lexer::new("dim Val = 5 mod 2\nFend").scan_tokens();
        assert_eq!(tokens[0].token_type, TokenType::Dim);
        assert_eq!(tokens[1].token_type, TokenType::Identifier);
        assert_eq!(tokens[1].literal, "Val");
        assert_eq!(tokens[4].token_type, TokenType::Mod);
        assert_eq!(tokens[6].token_type, TokenType::Eol);
        assert_eq!(tokens[7].token_type, TokenType::Fend);
    }

    #[test]
    fn test_string_and_comment() {
        let tokens = Lexer::new("\"hello world\" // trailing\n1").scan_tokens();
        assert_eq!(tokens[0].token_type, TokenType::String);
        assert_eq!(tokens[0].literal, "hello world");
        assert_eq!(tokens[0].span, Span::new(0, 13));
        assert_eq!(tokens[1].token_type, TokenType::Eol);
        assert_eq!(tokens[2].token_type, TokenType::Integer);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().token_type, TokenType::Identifier);
        assert_eq!(lexer.next_token().token_type, TokenType::Eof);
        assert_eq!(lexer.next_token().token_type, TokenType::Eof);
    }

    #[test]
    fn test_braces_are_illegal() {
        let tokens = Lexer::new("{}").scan_tokens();
        assert_eq!(tokens[0].token_type, TokenType::Illegal);
        assert_eq!(tokens[0].literal, "{");
        assert_eq!(tokens[1].token_type, TokenType::Illegal);
        assert_eq!(tokens[1].literal, "}");
    }

    #[test]
    fn test_unterminated_string_is_illegal() {
        assert_eq!(types("\"abc"), vec![TokenType::Illegal, TokenType::Eof]);
    }
}
