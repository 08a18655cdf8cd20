use crate::error::Span;
use std::fmt;

/// Root of every syntax tree. Nodes are immutable once the parser builds them;
/// their `Display` output is the canonical text used in diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `DIM name [= value]`, or `PUBLIC ...` when bound in the global scope.
    /// A missing initializer binds `Empty`.
    Dim {
        name: Identifier,
        value: Option<Expr>,
        is_public: bool,
        span: Span,
    },
    Const {
        name: Identifier,
        value: Expr,
        span: Span,
    },
    HashTable {
        name: Identifier,
        option: Option<Expr>,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
    /// Single-line `IF cond THEN stmt [ELSE stmt]`.
    If {
        condition: Expr,
        consequence: Box<Stmt>,
        alternative: Option<Box<Stmt>>,
        span: Span,
    },
    /// `IFB ... ENDIF`; an `ELSEIF` chain nests as another `IfBlock` in `alternative`,
    /// a plain `ELSE` as a `Block`.
    IfBlock {
        condition: Expr,
        consequence: BlockStmt,
        alternative: Option<Box<Stmt>>,
        span: Span,
    },
    Block(BlockStmt),
    Function {
        name: Identifier,
        parameters: Vec<Identifier>,
        body: BlockStmt,
        is_procedure: bool,
        span: Span,
    },
    Result {
        value: Expr,
        span: Span,
    },
    ForToStep {
        variable: Identifier,
        from: Expr,
        to: Expr,
        step: Option<Expr>,
        body: BlockStmt,
        span: Span,
    },
    ForIn {
        variable: Identifier,
        collection: Identifier,
        body: BlockStmt,
        span: Span,
    },
    Continue {
        span: Span,
    },
    Break {
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Dim { span, .. }
            | Stmt::Const { span, .. }
            | Stmt::HashTable { span, .. }
            | Stmt::Expression { span, .. }
            | Stmt::If { span, .. }
            | Stmt::IfBlock { span, .. }
            | Stmt::Function { span, .. }
            | Stmt::Result { span, .. }
            | Stmt::ForToStep { span, .. }
            | Stmt::ForIn { span, .. }
            | Stmt::Continue { span }
            | Stmt::Break { span } => *span,
            Stmt::Block(block) => block.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Integer {
        value: i64,
        span: Span,
    },
    String {
        value: String,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Prefix {
        operator: PrefixOp,
        right: Box<Expr>,
        span: Span,
    },
    Infix {
        left: Box<Expr>,
        operator: InfixOp,
        right: Box<Expr>,
        span: Span,
    },
    /// Target is an `Identifier` or an `Index` expression.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        span: Span,
    },
    /// An intentionally omitted positional argument: `f(a, , c)`.
    EmptyArgument {
        span: Span,
    },
    /// `[size] = e0, e1, ...`; either part may be absent.
    Array {
        size: Option<Box<Expr>>,
        elements: Vec<Expr>,
        span: Span,
    },
    /// `left[index]` or `left[index, option]`.
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
        option: Option<Box<Expr>>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(ident) => ident.span,
            Expr::Integer { span, .. }
            | Expr::String { span, .. }
            | Expr::Boolean { span, .. }
            | Expr::Prefix { span, .. }
            | Expr::Infix { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Call { span, .. }
            | Expr::EmptyArgument { span }
            | Expr::Array { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrefixOp::Negate => write!(f, "-"),
            PrefixOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Mod => "MOD",
            InfixOp::Equal => "=",
            InfixOp::NotEqual => "<>",
            InfixOp::Less => "<",
            InfixOp::LessEqual => "<=",
            InfixOp::Greater => ">",
            InfixOp::GreaterEqual => ">=",
        };
        write!(f, "{}", text)
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_if_block(
    f: &mut fmt::Formatter,
    keyword: &str,
    condition: &Expr,
    consequence: &BlockStmt,
    alternative: Option<&Stmt>,
) -> fmt::Result {
    write!(f, "{} {} THEN\n{}", keyword, condition, consequence)?;
    match alternative {
        Some(Stmt::IfBlock {
            condition,
            consequence,
            alternative,
            ..
        }) => write_if_block(f, "ELSEIF", condition, consequence, alternative.as_deref()),
        Some(other) => write!(f, "ELSE\n{}ENDIF", other),
        None => write!(f, "ENDIF"),
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for BlockStmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Dim {
                name,
                value,
                is_public,
                ..
            } => {
                let keyword = if *is_public { "PUBLIC" } else { "DIM" };
                match value {
                    Some(value) => write!(f, "{} {} = {}", keyword, name, value),
                    None => write!(f, "{} {}", keyword, name),
                }
            }
            Stmt::Const { name, value, .. } => write!(f, "CONST {} = {}", name, value),
            Stmt::HashTable { name, option, .. } => match option {
                Some(option) => write!(f, "HASHTBL {} = {}", name, option),
                None => write!(f, "HASHTBL {}", name),
            },
            Stmt::Expression { expr, .. } => write!(f, "{}", expr),
            Stmt::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "IF {} THEN {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " ELSE {}", alternative)?;
                }
                Ok(())
            }
            Stmt::IfBlock {
                condition,
                consequence,
                alternative,
                ..
            } => write_if_block(f, "IFB", condition, consequence, alternative.as_deref()),
            Stmt::Block(block) => write!(f, "{}", block),
            Stmt::Function {
                name,
                parameters,
                body,
                is_procedure,
                ..
            } => {
                let keyword = if *is_procedure { "PROCEDURE" } else { "FUNCTION" };
                write!(f, "{} {}(", keyword, name)?;
                write_joined(f, parameters, ", ")?;
                write!(f, ")\n{}FEND", body)
            }
            Stmt::Result { value, .. } => write!(f, "RESULT = {}", value),
            Stmt::ForToStep {
                variable,
                from,
                to,
                step,
                body,
                ..
            } => {
                write!(f, "FOR {} = {} TO {}", variable, from, to)?;
                if let Some(step) = step {
                    write!(f, " STEP {}", step)?;
                }
                write!(f, "\n{}NEXT", body)
            }
            Stmt::ForIn {
                variable,
                collection,
                body,
                ..
            } => write!(f, "FOR {} IN {}\n{}NEXT", variable, collection, body),
            Stmt::Continue { .. } => write!(f, "CONTINUE"),
            Stmt::Break { .. } => write!(f, "BREAK"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Identifier(ident) => write!(f, "{}", ident),
            Expr::Integer { value, .. } => write!(f, "{}", value),
            Expr::String { value, .. } => write!(f, "\"{}\"", value),
            Expr::Boolean { value, .. } => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            Expr::Prefix { operator, right, .. } => write!(f, "({}{})", operator, right),
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expr::Assign { target, value, .. } => write!(f, "{} = {}", target, value),
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", callee)?;
                write_joined(f, arguments, ", ")?;
                write!(f, ")")
            }
            Expr::EmptyArgument { .. } => Ok(()),
            Expr::Array { elements, .. } => {
                write!(f, "[")?;
                write_joined(f, elements, ", ")?;
                write!(f, "]")
            }
            Expr::Index {
                left,
                index,
                option,
                ..
            } => match option {
                Some(option) => write!(f, "({}[{}, {}])", left, index, option),
                None => write!(f, "({}[{}])", left, index),
            },
        }
    }
}
