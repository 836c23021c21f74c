use std::fmt;

use crate::lexer::Token;
use crate::value::format_number;

/// A complete strawk program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// The originating token of the program: its first statement's token,
    /// or an illegal placeholder when the program is empty.
    pub fn token(&self) -> Token {
        self.statements
            .first()
            .map(|s| s.token().clone())
            .unwrap_or_else(Token::illegal)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

/// A braced sequence of statements
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

/// User-defined function
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub token: Token,
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

/// Statement types
#[derive(Debug, Clone)]
pub enum Stmt {
    /// BEGIN { ... } - runs before the scan loop
    Begin { token: Token, body: Block },

    /// END { ... } - runs after the scan loop
    End { token: Token, body: Block },

    /// condition { ... } - a pattern-action rule
    ActionBlock {
        token: Token,
        condition: Expr,
        body: Block,
    },

    /// Bare expression list
    Expression {
        token: Token,
        expressions: Vec<Expr>,
    },

    /// print expr, expr, ...
    Print {
        token: Token,
        expressions: Vec<Expr>,
    },

    /// Parallel assignment: a, b = 1, 2
    Assign {
        token: Token,
        targets: Vec<Expr>,
        values: Vec<Expr>,
    },

    /// Compound assignment: x += expr
    AssignModify {
        token: Token,
        op: AssignOp,
        target: Expr,
        value: Expr,
    },

    /// if / else if chain with optional else
    If {
        token: Token,
        branches: Vec<(Expr, Block)>,
        alternative: Option<Block>,
    },

    While {
        token: Token,
        condition: Expr,
        body: Block,
    },

    DoWhile {
        token: Token,
        condition: Expr,
        body: Block,
    },

    /// C-style for (init; condition; step) { ... }
    For {
        token: Token,
        init: Box<Stmt>,
        condition: Expr,
        step: Box<Stmt>,
        body: Block,
    },

    /// for (key in array) { ... }
    ForEach {
        token: Token,
        var: String,
        array: String,
        body: Block,
    },

    Break { token: Token },

    Continue { token: Token },

    /// Stop evaluating the remaining rules for this input position
    Next { token: Token },

    Return { token: Token, value: Option<Expr> },

    Function(FunctionDef),

    /// delete array[index, ...]
    Delete {
        token: Token,
        array: String,
        indices: Vec<Expr>,
    },
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::Begin { token, .. }
            | Stmt::End { token, .. }
            | Stmt::ActionBlock { token, .. }
            | Stmt::Expression { token, .. }
            | Stmt::Print { token, .. }
            | Stmt::Assign { token, .. }
            | Stmt::AssignModify { token, .. }
            | Stmt::If { token, .. }
            | Stmt::While { token, .. }
            | Stmt::DoWhile { token, .. }
            | Stmt::For { token, .. }
            | Stmt::ForEach { token, .. }
            | Stmt::Break { token }
            | Stmt::Continue { token }
            | Stmt::Next { token }
            | Stmt::Return { token, .. }
            | Stmt::Delete { token, .. } => token,
            Stmt::Function(def) => &def.token,
        }
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

// Canonical-ish source reconstruction for diagnostics. Bodies of braced
// blocks are elided.
impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Begin { .. } => write!(f, "BEGIN {{ }}"),
            Stmt::End { .. } => write!(f, "END {{ }}"),
            Stmt::ActionBlock { condition, .. } => write!(f, "{} {{ }}", condition),
            Stmt::Expression { expressions, .. } => write!(f, "{}", join(expressions, ", ")),
            Stmt::Print { expressions, .. } => write!(f, "print {}", join(expressions, ", ")),
            Stmt::Assign {
                targets, values, ..
            } => write!(f, "{} = {}", join(targets, ", "), join(values, ", ")),
            Stmt::AssignModify {
                op, target, value, ..
            } => write!(f, "{} {} {}", target, op, value),
            Stmt::If { branches, alternative, .. } => {
                for (idx, (condition, _)) in branches.iter().enumerate() {
                    if idx == 0 {
                        write!(f, "if {} {{ }}", condition)?;
                    } else {
                        write!(f, " else if {} {{ }}", condition)?;
                    }
                }
                if alternative.is_some() {
                    write!(f, " else {{ }}")?;
                }
                Ok(())
            }
            Stmt::While { condition, .. } => write!(f, "while {} {{ }}", condition),
            Stmt::DoWhile { condition, .. } => write!(f, "do {{ }} while {}", condition),
            Stmt::For {
                init,
                condition,
                step,
                ..
            } => write!(f, "for ({}; {}; {}) {{ }}", init, condition, step),
            Stmt::ForEach { var, array, .. } => write!(f, "for ({} in {}) {{ }}", var, array),
            Stmt::Break { .. } => write!(f, "break"),
            Stmt::Continue { .. } => write!(f, "continue"),
            Stmt::Next { .. } => write!(f, "next"),
            Stmt::Return { value, .. } => match value {
                Some(v) => write!(f, "return {}", v),
                None => write!(f, "return"),
            },
            Stmt::Function(def) => {
                write!(f, "function {}({}) {{ }}", def.name, def.params.join(", "))
            }
            Stmt::Delete { array, indices, .. } => {
                write!(f, "delete {}[{}]", array, join(indices, ", "))
            }
        }
    }
}

/// Expression types
#[derive(Debug, Clone)]
pub enum Expr {
    Ident { token: Token, name: String },

    /// 64-bit float literal
    Num { token: Token, value: f64 },

    Str { token: Token, value: String },

    Regex { token: Token, pattern: String },

    /// array[i, j] - also carries an empty array name for the
    /// parenthesized key list of `(i, j) in array`
    Index {
        token: Token,
        array: String,
        indices: Vec<Expr>,
    },

    Prefix {
        token: Token,
        op: PrefixOp,
        right: Box<Expr>,
    },

    Postfix {
        token: Token,
        op: PostfixOp,
        left: Box<Expr>,
    },

    Infix {
        token: Token,
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Ternary {
        token: Token,
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },

    Call {
        token: Token,
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn token(&self) -> &Token {
        match self {
            Expr::Ident { token, .. }
            | Expr::Num { token, .. }
            | Expr::Str { token, .. }
            | Expr::Regex { token, .. }
            | Expr::Index { token, .. }
            | Expr::Prefix { token, .. }
            | Expr::Postfix { token, .. }
            | Expr::Infix { token, .. }
            | Expr::Ternary { token, .. }
            | Expr::Call { token, .. } => token,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident { name, .. } => write!(f, "{}", name),
            Expr::Num { value, .. } => write!(f, "{}", format_number(*value)),
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Regex { pattern, .. } => write!(f, "/{}/", pattern),
            Expr::Index { array, indices, .. } => {
                write!(f, "{}[{}]", array, join(indices, ", "))
            }
            Expr::Prefix { op, right, .. } => write!(f, "({}{})", op, right),
            Expr::Postfix { op, left, .. } => write!(f, "({}{})", left, op),
            Expr::Infix {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op, right),
            Expr::Ternary {
                condition,
                if_true,
                if_false,
                ..
            } => write!(f, "({} ? {} : {})", condition, if_true, if_false),
            Expr::Call { name, args, .. } => write!(f, "{}({})", name, join(args, ", ")),
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Not,       // !x
    Neg,       // -x
    Increment, // ++x
    Decrement, // --x
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrefixOp::Not => "!",
            PrefixOp::Neg => "-",
            PrefixOp::Increment => "++",
            PrefixOp::Decrement => "--",
        };
        write!(f, "{}", s)
    }
}

/// Postfix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment, // x++
    Decrement, // x--
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        };
        write!(f, "{}", s)
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Concat, // . (also inserted for juxtaposition)
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Match,    // ~
    NotMatch, // !~
    /// The stream-consuming variant of `~`: produced only by the parser's
    /// rewrite of a bare regex pattern, it tells the interpreter to drive
    /// the input scanner.
    MatchStream,
    In,
    And,
    Or,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfixOp::Concat => ".",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Pow => "^",
            InfixOp::Eq => "==",
            InfixOp::Ne => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Le => "<=",
            InfixOp::Ge => ">=",
            InfixOp::Match => "~",
            InfixOp::NotMatch => "!~",
            InfixOp::MatchStream => "~",
            InfixOp::In => "in",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

/// Compound assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Add, // +=
    Sub, // -=
    Mul, // *=
    Div, // /=
    Mod, // %=
    Pow, // ^=
}

impl AssignOp {
    /// The infix operation a compound assignment desugars to
    pub fn infix_op(self) -> InfixOp {
        match self {
            AssignOp::Add => InfixOp::Add,
            AssignOp::Sub => InfixOp::Sub,
            AssignOp::Mul => InfixOp::Mul,
            AssignOp::Div => InfixOp::Div,
            AssignOp::Mod => InfixOp::Mod,
            AssignOp::Pow => InfixOp::Pow,
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Pow => "^=",
        };
        write!(f, "{}", s)
    }
}
