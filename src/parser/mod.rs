use crate::ast::*;
use crate::error::{Error, Result};
use crate::lexer::{Cursor, Lexer, Token, TokenKind};

/// Binding strength, low to high. Implicit concatenation has its own band
/// between equality and sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    BooleanLogic, // || &&
    RegexMatch,   // ~ !~
    Membership,   // expr in array
    Ternary,      // cond ? a : b
    Equality,     // == != < > <= >=
    Concatenate,  // implied juxtaposition and .
    Sum,          // + -
    Product,      // * / %
    Exponent,     // ^
    Prefix,       // -x !x ++x --x
    Index,        // []
    Call,         // f(x)
}

fn token_precedence(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Or | TokenKind::And => Precedence::BooleanLogic,
        TokenKind::Match | TokenKind::NotMatch => Precedence::RegexMatch,
        TokenKind::In => Precedence::Membership,
        TokenKind::Question => Precedence::Ternary,
        TokenKind::Equal
        | TokenKind::NotEqual
        | TokenKind::Less
        | TokenKind::Greater
        | TokenKind::LessEqual
        | TokenKind::GreaterEqual => Precedence::Equality,
        TokenKind::Dot => Precedence::Concatenate,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
        TokenKind::Caret => Precedence::Exponent,
        TokenKind::LeftBracket => Precedence::Index,
        TokenKind::LeftParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn has_infix(kind: &TokenKind) -> bool {
    token_precedence(kind) > Precedence::Lowest
}

/// Tokens an expression never crosses
fn is_expr_terminator(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::Newline
            | TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign
            | TokenKind::CaretAssign
            | TokenKind::LeftBrace
            | TokenKind::Colon
            | TokenKind::RightBracket
            | TokenKind::Eof
    )
}

/// Pratt parser over a streaming lexer.
///
/// Alongside the usual cur/peek window it keeps the lexer cursor captured
/// right after each token (`cur_end`, `peek_end`). That is the handle for
/// regex re-reads: when `/` shows up in prefix position the parser rewinds
/// the lexer to `cur_end` (the byte after the slash) and asks it for a
/// regex literal, which discards whatever the lookahead lexed from inside
/// the pattern.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    errors: Vec<String>,

    cur: Token,
    peek: Token,
    cur_end: Cursor,
    peek_end: Cursor,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let cursor = lexer.save_position();
        let mut parser = Self {
            lexer,
            errors: Vec::new(),
            cur: Token::illegal(),
            peek: Token::illegal(),
            cur_end: cursor,
            peek_end: cursor,
        };
        // Read two tokens so cur and peek are both set
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Collected parse errors, already formatted for display
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Parse a complete program. Errors are pushed onto the error list and
    /// parsing resumes at the next statement boundary.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.cur_is(&TokenKind::Eof) {
            match self.parse_statement() {
                Ok(Some(stmt)) => program.statements.push(stmt),
                Ok(None) => {}
                Err(e) => {
                    self.errors.push(e.to_string());
                    self.synchronize();
                }
            }
        }

        program
    }

    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
        self.cur_end = self.peek_end;
        self.peek_end = self.lexer.save_position();
    }

    fn cur_is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.cur.kind) == std::mem::discriminant(kind)
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek.kind) == std::mem::discriminant(kind)
    }

    fn cur_precedence(&self) -> Precedence {
        token_precedence(&self.cur.kind)
    }

    fn parse_error(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.cur.location.line, self.cur.location.column)
    }

    fn expect(&self, kind: &TokenKind, message: &str) -> Result<()> {
        if self.cur_is(kind) {
            Ok(())
        } else {
            Err(self.parse_error(format!(
                "{}, got {}",
                message,
                self.cur.kind.literal()
            )))
        }
    }

    /// Skip to the next statement boundary after a parse error
    fn synchronize(&mut self) {
        while !matches!(
            self.cur.kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        ) {
            self.next_token();
        }
        if !self.cur_is(&TokenKind::Eof) {
            self.next_token();
        }
    }

    // ---- Statements ----

    fn parse_statement(&mut self) -> Result<Option<Stmt>> {
        match self.cur.kind {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.next_token();
                Ok(None)
            }
            TokenKind::Begin => self.parse_begin_statement().map(Some),
            TokenKind::End => self.parse_end_statement().map(Some),
            TokenKind::Function => self.parse_function_literal().map(Some),
            TokenKind::If => self.parse_if_statement().map(Some),
            TokenKind::While => self.parse_while_statement().map(Some),
            TokenKind::Do => self.parse_do_while_statement().map(Some),
            TokenKind::For => self.parse_for_statement().map(Some),
            TokenKind::Break => {
                let token = self.cur.clone();
                self.next_token();
                Ok(Some(Stmt::Break { token }))
            }
            TokenKind::Continue => {
                let token = self.cur.clone();
                self.next_token();
                Ok(Some(Stmt::Continue { token }))
            }
            TokenKind::Next => {
                let token = self.cur.clone();
                self.next_token();
                Ok(Some(Stmt::Next { token }))
            }
            TokenKind::Return => self.parse_return_statement().map(Some),
            TokenKind::Print => self.parse_print_statement().map(Some),
            TokenKind::Delete => self.parse_delete_statement().map(Some),
            _ => self.parse_expression_prefixed_statement().map(Some),
        }
    }

    /// Statements that open with an expression list: plain assignment,
    /// compound assignment, a pattern-action rule, or a bare expression.
    fn parse_expression_prefixed_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        let exprs =
            self.parse_expression_list(&[TokenKind::Assign, TokenKind::LeftBrace])?;

        match self.cur.kind {
            TokenKind::Assign => self.parse_assign_statement(token, exprs),
            TokenKind::PlusAssign => self.parse_assign_modify(token, AssignOp::Add, exprs),
            TokenKind::MinusAssign => self.parse_assign_modify(token, AssignOp::Sub, exprs),
            TokenKind::StarAssign => self.parse_assign_modify(token, AssignOp::Mul, exprs),
            TokenKind::SlashAssign => self.parse_assign_modify(token, AssignOp::Div, exprs),
            TokenKind::PercentAssign => self.parse_assign_modify(token, AssignOp::Mod, exprs),
            TokenKind::CaretAssign => self.parse_assign_modify(token, AssignOp::Pow, exprs),
            TokenKind::LeftBrace => self.parse_action_block(token, exprs),
            _ => Ok(Stmt::Expression {
                token,
                expressions: exprs,
            }),
        }
    }

    fn parse_begin_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        self.skip_newlines();
        let body = self.parse_block()?;
        Ok(Stmt::Begin { token, body })
    }

    fn parse_end_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        self.skip_newlines();
        let body = self.parse_block()?;
        Ok(Stmt::End { token, body })
    }

    fn parse_action_block(&mut self, token: Token, mut conditions: Vec<Expr>) -> Result<Stmt> {
        if conditions.len() > 1 {
            return Err(self.parse_error("Action block should have exactly 1 condition"));
        }

        // A pattern-less block always fires
        let condition = match conditions.pop() {
            Some(expr) => expr,
            None => Expr::Num {
                token: token.clone(),
                value: 1.0,
            },
        };

        // A bare regex pattern drives the stream scanner: /re/ becomes
        // $0 ~$0 /re/
        let condition = match condition {
            regex @ Expr::Regex { .. } => {
                let regex_token = regex.token().clone();
                Expr::Infix {
                    token: regex_token.clone(),
                    op: InfixOp::MatchStream,
                    left: Box::new(Expr::Ident {
                        token: regex_token,
                        name: "$0".to_string(),
                    }),
                    right: Box::new(regex),
                }
            }
            other => other,
        };

        let body = self.parse_block()?;
        Ok(Stmt::ActionBlock {
            token,
            condition,
            body,
        })
    }

    fn parse_assign_statement(&mut self, token: Token, targets: Vec<Expr>) -> Result<Stmt> {
        for target in &targets {
            if !matches!(target, Expr::Ident { .. } | Expr::Index { .. }) {
                return Err(self
                    .parse_error("found non-identifier expression on lhs of assign statement"));
            }
        }

        self.next_token();
        let values = self.parse_expression_list(&[])?;

        if targets.len() != values.len() {
            return Err(self.parse_error(format!(
                "assignment has {} targets but {} values",
                targets.len(),
                values.len()
            )));
        }

        Ok(Stmt::Assign {
            token,
            targets,
            values,
        })
    }

    fn parse_assign_modify(
        &mut self,
        token: Token,
        op: AssignOp,
        mut targets: Vec<Expr>,
    ) -> Result<Stmt> {
        if targets.len() != 1 {
            return Err(self.parse_error(format!("{} should have exactly 1 target", op)));
        }
        let target = targets.pop().expect("checked length");
        if !matches!(target, Expr::Ident { .. } | Expr::Index { .. }) {
            return Err(
                self.parse_error("found non-identifier expression on lhs of assign statement")
            );
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Stmt::AssignModify {
            token,
            op,
            target,
            value,
        })
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.expect(&TokenKind::LeftBrace, "Expected {")?;
        self.next_token();

        let mut statements = Vec::new();
        while !self.cur_is(&TokenKind::RightBrace) {
            if self.cur_is(&TokenKind::Eof) {
                return Err(self.parse_error("Expected }"));
            }
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }
        self.next_token();

        Ok(Block { statements })
    }

    /// Loop and branch bodies are either a braced block or a single
    /// statement
    fn parse_body(&mut self) -> Result<Block> {
        self.skip_newlines();
        if self.cur_is(&TokenKind::LeftBrace) {
            return self.parse_block();
        }
        match self.parse_statement()? {
            Some(stmt) => Ok(Block {
                statements: vec![stmt],
            }),
            None => Err(self.parse_error("Expected statement")),
        }
    }

    fn parse_if_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_body()?;

        let mut branches = vec![(condition, consequence)];
        let mut alternative = None;

        loop {
            self.skip_newlines();
            if self.cur_is(&TokenKind::Else) && self.peek_is(&TokenKind::If) {
                self.next_token();
                self.next_token();
                let condition = self.parse_expression(Precedence::Lowest)?;
                let consequence = self.parse_body()?;
                branches.push((condition, consequence));
            } else if self.cur_is(&TokenKind::Else) {
                self.next_token();
                alternative = Some(self.parse_body()?);
                break;
            } else {
                break;
            }
        }

        Ok(Stmt::If {
            token,
            branches,
            alternative,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_body()?;
        Ok(Stmt::While {
            token,
            condition,
            body,
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        self.skip_newlines();
        let body = self.parse_body()?;
        self.skip_newlines();
        self.expect(&TokenKind::While, "Expected while")?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        Ok(Stmt::DoWhile {
            token,
            condition,
            body,
        })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        self.expect(&TokenKind::LeftParen, "Expected (")?;
        self.next_token();

        // for (key in array) is told apart from the three-clause form by
        // the token after the loop variable
        if matches!(self.cur.kind, TokenKind::Ident(_)) && self.peek_is(&TokenKind::In) {
            let var = match &self.cur.kind {
                TokenKind::Ident(name) => name.clone(),
                _ => unreachable!(),
            };
            self.next_token(); // onto `in`
            self.next_token(); // onto the array name
            let array = match &self.cur.kind {
                TokenKind::Ident(name) => name.clone(),
                _ => return Err(self.parse_error("Expected identifier after in")),
            };
            self.next_token();
            self.expect(&TokenKind::RightParen, "Expected )")?;
            self.next_token();
            let body = self.parse_body()?;
            return Ok(Stmt::ForEach {
                token,
                var,
                array,
                body,
            });
        }

        let init = self
            .parse_statement()?
            .ok_or_else(|| self.parse_error("Expected initialization statement"))?;
        self.expect(&TokenKind::Semicolon, "Expected ;")?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(&TokenKind::Semicolon, "Expected ;")?;
        self.next_token();

        let step = self
            .parse_statement()?
            .ok_or_else(|| self.parse_error("Expected loop step statement"))?;
        self.expect(&TokenKind::RightParen, "Expected )")?;
        self.next_token();

        let body = self.parse_body()?;
        Ok(Stmt::For {
            token,
            init: Box::new(init),
            condition,
            step: Box::new(step),
            body,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        let value = if matches!(
            self.cur.kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        Ok(Stmt::Return { token, value })
    }

    fn parse_print_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        let expressions = self.parse_expression_list(&[])?;
        Ok(Stmt::Print { token, expressions })
    }

    fn parse_delete_statement(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        match expr {
            Expr::Index { array, indices, .. } if !array.is_empty() => Ok(Stmt::Delete {
                token,
                array,
                indices,
            }),
            _ => Err(self.parse_error("Expected Array Index Expression with delete statement")),
        }
    }

    fn parse_function_literal(&mut self) -> Result<Stmt> {
        let token = self.cur.clone();
        self.next_token();

        let name = match &self.cur.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.parse_error("expected identifier for function name")),
        };
        self.next_token();

        self.expect(&TokenKind::LeftParen, "Expected (")?;
        self.next_token();

        let mut params = Vec::new();
        if !self.cur_is(&TokenKind::RightParen) {
            loop {
                match &self.cur.kind {
                    TokenKind::Ident(name) => params.push(name.clone()),
                    _ => {
                        return Err(
                            self.parse_error("Expected identifier when parsing function params")
                        )
                    }
                }
                self.next_token();
                if self.cur_is(&TokenKind::Comma) {
                    self.next_token();
                    continue;
                }
                if self.cur_is(&TokenKind::RightParen) {
                    break;
                }
                return Err(self.parse_error("Expected , or ) when parsing function params"));
            }
        }
        self.next_token();
        self.skip_newlines();

        let body = self.parse_block()?;
        Ok(Stmt::Function(FunctionDef {
            token,
            name,
            params,
            body,
        }))
    }

    fn skip_newlines(&mut self) {
        while self.cur_is(&TokenKind::Newline) {
            self.next_token();
        }
    }

    // ---- Expressions ----

    fn parse_expression_list(&mut self, ends: &[TokenKind]) -> Result<Vec<Expr>> {
        let mut list = Vec::new();

        let at_end = ends.iter().any(|k| self.cur_is(k))
            || matches!(
                self.cur.kind,
                TokenKind::Semicolon
                    | TokenKind::Newline
                    | TokenKind::RightBrace
                    | TokenKind::Eof
            );
        if at_end {
            return Ok(list);
        }

        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.cur_is(&TokenKind::Comma) {
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        Ok(list)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr> {
        let mut left = self.parse_prefix()?;

        loop {
            if is_expr_terminator(&self.cur.kind) {
                break;
            }
            if has_infix(&self.cur.kind) && precedence < self.cur_precedence() {
                left = self.parse_infix(left)?;
                continue;
            }
            // Implicit concatenation: an adjacent token that could start a
            // new expression glues on with a synthetic `.`
            if precedence < Precedence::Concatenate && self.cur.kind.can_start_expression() {
                let token = self.cur.clone();
                let right = self.parse_expression(Precedence::Concatenate)?;
                left = Expr::Infix {
                    token,
                    op: InfixOp::Concat,
                    left: Box::new(left),
                    right: Box::new(right),
                };
                continue;
            }
            break;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        match &self.cur.kind {
            TokenKind::Ident(_) => self.parse_identifier_expr(),
            TokenKind::Number(_) => self.parse_numeric_literal(),
            TokenKind::Str(_) => self.parse_string_literal(),
            TokenKind::Slash => self.parse_regex_literal(),
            TokenKind::Not => self.parse_prefix_op(PrefixOp::Not),
            TokenKind::Minus => self.parse_prefix_op(PrefixOp::Neg),
            TokenKind::Increment => self.parse_prefix_op(PrefixOp::Increment),
            TokenKind::Decrement => self.parse_prefix_op(PrefixOp::Decrement),
            TokenKind::LeftParen => self.parse_grouped_expression(),
            _ => Err(self.parse_error(format!(
                "no prefix parse function for {} found",
                self.cur.kind.literal()
            ))),
        }
    }

    fn parse_identifier_expr(&mut self) -> Result<Expr> {
        let token = self.cur.clone();
        let name = match &token.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => unreachable!(),
        };
        let ident = Expr::Ident {
            token: token.clone(),
            name,
        };

        // x++ / x-- bind tighter than any infix
        let postfix = match self.peek.kind {
            TokenKind::Increment => Some(PostfixOp::Increment),
            TokenKind::Decrement => Some(PostfixOp::Decrement),
            _ => None,
        };
        if let Some(op) = postfix {
            self.next_token();
            let op_token = self.cur.clone();
            self.next_token();
            return Ok(Expr::Postfix {
                token: op_token,
                op,
                left: Box::new(ident),
            });
        }

        self.next_token();
        Ok(ident)
    }

    fn parse_numeric_literal(&mut self) -> Result<Expr> {
        let token = self.cur.clone();
        let literal = match &token.kind {
            TokenKind::Number(s) => s.clone(),
            _ => unreachable!(),
        };
        let value: f64 = literal
            .parse()
            .map_err(|_| self.parse_error("unparsable numeric type"))?;
        self.next_token();
        Ok(Expr::Num { token, value })
    }

    fn parse_string_literal(&mut self) -> Result<Expr> {
        let token = self.cur.clone();
        let value = match &token.kind {
            TokenKind::Str(s) => s.clone(),
            _ => unreachable!(),
        };
        self.next_token();
        Ok(Expr::Str { token, value })
    }

    /// `/` in prefix position opens a regex literal. The lookahead has
    /// already lexed ordinary tokens out of the pattern text, so rewind
    /// the lexer to the byte after the slash, read the literal, and
    /// re-prime the token window from the byte after the closing slash.
    fn parse_regex_literal(&mut self) -> Result<Expr> {
        let slash = self.cur.clone();

        self.lexer.restore_position(self.cur_end);
        let pattern = self.lexer.read_regex_literal();
        let after_regex = self.lexer.save_position();

        self.cur = Token::new(
            TokenKind::Regex(pattern.clone()),
            slash.location.line,
            slash.location.column,
        );
        self.cur_end = after_regex;
        self.peek = self.lexer.next_token();
        self.peek_end = self.lexer.save_position();

        let expr = Expr::Regex {
            token: self.cur.clone(),
            pattern,
        };
        self.next_token();
        Ok(expr)
    }

    fn parse_prefix_op(&mut self, op: PrefixOp) -> Result<Expr> {
        let token = self.cur.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix {
            token,
            op,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Result<Expr> {
        let token = self.cur.clone();
        self.next_token();

        let mut exprs = Vec::new();
        exprs.push(self.parse_expression(Precedence::Lowest)?);
        while self.cur_is(&TokenKind::Comma) {
            self.next_token();
            exprs.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect(&TokenKind::RightParen, "expected )")?;
        self.next_token();

        // (a, b) is a bare key list; only meaningful on the left of `in`
        if exprs.len() > 1 {
            return Ok(Expr::Index {
                token,
                array: String::new(),
                indices: exprs,
            });
        }
        Ok(exprs.pop().expect("non-empty"))
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr> {
        match self.cur.kind {
            TokenKind::Question => self.parse_ternary_expression(left),
            TokenKind::In => self.parse_membership_expression(left),
            TokenKind::LeftBracket => self.parse_array_index_expression(left),
            TokenKind::LeftParen => self.parse_call_expression(left),
            _ => {
                let token = self.cur.clone();
                let op = match token.kind {
                    TokenKind::Plus => InfixOp::Add,
                    TokenKind::Minus => InfixOp::Sub,
                    TokenKind::Star => InfixOp::Mul,
                    TokenKind::Slash => InfixOp::Div,
                    TokenKind::Percent => InfixOp::Mod,
                    TokenKind::Caret => InfixOp::Pow,
                    TokenKind::Equal => InfixOp::Eq,
                    TokenKind::NotEqual => InfixOp::Ne,
                    TokenKind::Less => InfixOp::Lt,
                    TokenKind::Greater => InfixOp::Gt,
                    TokenKind::LessEqual => InfixOp::Le,
                    TokenKind::GreaterEqual => InfixOp::Ge,
                    TokenKind::Match => InfixOp::Match,
                    TokenKind::NotMatch => InfixOp::NotMatch,
                    TokenKind::And => InfixOp::And,
                    TokenKind::Or => InfixOp::Or,
                    TokenKind::Dot => InfixOp::Concat,
                    _ => {
                        return Err(self.parse_error(format!(
                            "no infix parse function for {} found",
                            self.cur.kind.literal()
                        )))
                    }
                };
                let precedence = self.cur_precedence();
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Ok(Expr::Infix {
                    token,
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
        }
    }

    fn parse_ternary_expression(&mut self, condition: Expr) -> Result<Expr> {
        let token = self.cur.clone();
        self.next_token();
        let if_true = self.parse_expression(Precedence::Lowest)?;
        self.expect(&TokenKind::Colon, "expected :")?;
        self.next_token();
        let if_false = self.parse_expression(Precedence::Lowest)?;
        Ok(Expr::Ternary {
            token,
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    fn parse_membership_expression(&mut self, left: Expr) -> Result<Expr> {
        let token = self.cur.clone();
        self.next_token();
        if !matches!(self.cur.kind, TokenKind::Ident(_)) {
            return Err(
                self.parse_error("key in array expression: expected identifier on the right")
            );
        }
        let right = self.parse_expression(Precedence::Membership)?;
        Ok(Expr::Infix {
            token,
            op: InfixOp::In,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_array_index_expression(&mut self, left: Expr) -> Result<Expr> {
        let token = self.cur.clone();
        let array = match left {
            Expr::Ident { name, .. } => name,
            _ => return Err(self.parse_error("Attempt to address array with non-identifier")),
        };
        self.next_token();

        let mut indices = Vec::new();
        indices.push(self.parse_expression(Precedence::Lowest)?);
        while self.cur_is(&TokenKind::Comma) {
            self.next_token();
            indices.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect(&TokenKind::RightBracket, "Expected ]")?;

        let index_expr = Expr::Index {
            token,
            array,
            indices,
        };

        // a[i]++ / a[i]--
        let postfix = match self.peek.kind {
            TokenKind::Increment => Some(PostfixOp::Increment),
            TokenKind::Decrement => Some(PostfixOp::Decrement),
            _ => None,
        };
        if let Some(op) = postfix {
            self.next_token();
            let op_token = self.cur.clone();
            self.next_token();
            return Ok(Expr::Postfix {
                token: op_token,
                op,
                left: Box::new(index_expr),
            });
        }

        self.next_token();
        Ok(index_expr)
    }

    fn parse_call_expression(&mut self, function: Expr) -> Result<Expr> {
        let token = self.cur.clone();
        let name = match function {
            Expr::Ident { name, .. } => name,
            _ => return Err(self.parse_error("expected function name before (")),
        };
        self.next_token();

        let mut args = Vec::new();
        if !self.cur_is(&TokenKind::RightParen) {
            args.push(self.parse_expression(Precedence::Lowest)?);
            while self.cur_is(&TokenKind::Comma) {
                self.next_token();
                args.push(self.parse_expression(Precedence::Lowest)?);
            }
        }
        self.expect(&TokenKind::RightParen, "expected )")?;
        self.next_token();

        Ok(Expr::Call { token, name, args })
    }
}
