use std::io::Write;

use tracing::debug;

use crate::ast::*;
use crate::error::{Error, Result};
use crate::value::{compare_values, Value};

use super::Interpreter;

impl<'a> Interpreter<'a> {
    /// Evaluate an expression in a context with no output sink (builtin
    /// argument evaluation). Print output from nested calls is discarded.
    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        let mut sink = std::io::sink();
        self.eval_expr_with_output(expr, &mut sink)
    }

    pub(crate) fn eval_expr_with_output<W: Write>(
        &mut self,
        expr: &Expr,
        output: &mut W,
    ) -> Result<Value> {
        match expr {
            Expr::Num { value, .. } => Ok(Value::Num(*value)),

            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),

            // A regex literal reached outside a match position evaluates
            // to its pattern text
            Expr::Regex { pattern, .. } => Ok(Value::Str(pattern.clone())),

            Expr::Ident { name, .. } => Ok(self.lookup_var(name)),

            Expr::Index { array, indices, .. } => {
                let key = self.eval_index_key(indices, output)?;
                self.lookup_element(array, &key)
            }

            Expr::Prefix { op, right, token } => self.eval_prefix(*op, right, token, output),

            Expr::Postfix { op, left, token } => self.eval_postfix(*op, left, token, output),

            Expr::Infix {
                op, left, right, ..
            } => self.eval_infix(*op, left, right, output),

            Expr::Ternary {
                condition,
                if_true,
                if_false,
                ..
            } => {
                if self.eval_expr_with_output(condition, output)?.truthy()? {
                    self.eval_expr_with_output(if_true, output)
                } else {
                    self.eval_expr_with_output(if_false, output)
                }
            }

            Expr::Call { name, args, token } => {
                self.call_function(name, args, token.location, output)
            }
        }
    }

    /// Evaluate an index list and join it into the single map key
    pub(crate) fn eval_index_key<W: Write>(
        &mut self,
        indices: &[Expr],
        output: &mut W,
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(indices.len());
        for index in indices {
            parts.push(self.eval_expr_with_output(index, output)?.scalar_str()?);
        }
        Ok(parts.join(","))
    }

    fn eval_prefix<W: Write>(
        &mut self,
        op: PrefixOp,
        right: &Expr,
        token: &crate::lexer::Token,
        output: &mut W,
    ) -> Result<Value> {
        match op {
            PrefixOp::Not => self.eval_expr_with_output(right, output)?.invert(),
            PrefixOp::Neg => {
                let n = self.eval_expr_with_output(right, output)?.scalar_num()?;
                Ok(Value::Num(-n))
            }
            PrefixOp::Increment | PrefixOp::Decrement => {
                if !matches!(right, Expr::Ident { .. } | Expr::Index { .. }) {
                    return Err(Error::runtime_at(
                        "increment of non-variable",
                        token.location.line,
                        token.location.column,
                    ));
                }
                let delta = if op == PrefixOp::Increment { 1.0 } else { -1.0 };
                let current = self.eval_expr_with_output(right, output)?.scalar_num()?;
                let new_value = Value::Num(current + delta);
                self.assign_to(right, new_value.clone(), output)?;
                // Pre-increment yields the new value
                Ok(new_value)
            }
        }
    }

    fn eval_postfix<W: Write>(
        &mut self,
        op: PostfixOp,
        left: &Expr,
        token: &crate::lexer::Token,
        output: &mut W,
    ) -> Result<Value> {
        if !matches!(left, Expr::Ident { .. } | Expr::Index { .. }) {
            return Err(Error::runtime_at(
                "increment of non-variable",
                token.location.line,
                token.location.column,
            ));
        }
        let current = self.eval_expr_with_output(left, output)?;
        // Post-increment yields the old value as a string
        let old = Value::Str(current.scalar_str()?);
        let delta = if op == PostfixOp::Increment { 1.0 } else { -1.0 };
        let new_value = Value::Num(current.scalar_num()? + delta);
        self.assign_to(left, new_value, output)?;
        Ok(old)
    }

    fn eval_infix<W: Write>(
        &mut self,
        op: InfixOp,
        left: &Expr,
        right: &Expr,
        output: &mut W,
    ) -> Result<Value> {
        // The match operators consume their right side structurally: the
        // pattern must be a regex literal, not an evaluated scalar
        match op {
            InfixOp::Match => {
                return self
                    .regex_match(left, right, false, output)
                    .map(Value::bool)
            }
            InfixOp::NotMatch => {
                return self
                    .regex_match(left, right, false, output)
                    .map(|m| Value::bool(!m))
            }
            InfixOp::MatchStream => {
                return self.regex_match(left, right, true, output).map(Value::bool)
            }
            InfixOp::In => return self.array_membership(left, right, output),
            _ => {}
        }

        let lhs = self.eval_expr_with_output(left, output)?;
        let rhs = self.eval_expr_with_output(right, output)?;

        match op {
            InfixOp::Concat => {
                let mut s = lhs.scalar_str()?;
                s.push_str(&rhs.scalar_str()?);
                Ok(Value::Str(s))
            }
            InfixOp::Add => Ok(Value::Num(lhs.scalar_num()? + rhs.scalar_num()?)),
            InfixOp::Sub => Ok(Value::Num(lhs.scalar_num()? - rhs.scalar_num()?)),
            InfixOp::Mul => Ok(Value::Num(lhs.scalar_num()? * rhs.scalar_num()?)),
            InfixOp::Div => Ok(Value::Num(lhs.scalar_num()? / rhs.scalar_num()?)),
            InfixOp::Mod => Ok(Value::Num(lhs.scalar_num()? % rhs.scalar_num()?)),
            InfixOp::Pow => Ok(Value::Num(lhs.scalar_num()?.powf(rhs.scalar_num()?))),
            InfixOp::Eq => Ok(Value::bool(lhs.scalar_str()? == rhs.scalar_str()?)),
            InfixOp::Ne => Ok(Value::bool(lhs.scalar_str()? != rhs.scalar_str()?)),
            InfixOp::Lt => Ok(Value::bool(compare_values(&lhs, &rhs)?.is_lt())),
            InfixOp::Gt => Ok(Value::bool(compare_values(&lhs, &rhs)?.is_gt())),
            InfixOp::Le => Ok(Value::bool(compare_values(&lhs, &rhs)?.is_le())),
            InfixOp::Ge => Ok(Value::bool(compare_values(&lhs, &rhs)?.is_ge())),
            // Both sides are evaluated before the boolean is formed
            InfixOp::And => Ok(Value::bool(lhs.truthy()? && rhs.truthy()?)),
            InfixOp::Or => Ok(Value::bool(lhs.truthy()? || rhs.truthy()?)),
            InfixOp::Match | InfixOp::NotMatch | InfixOp::MatchStream | InfixOp::In => {
                unreachable!("handled above")
            }
        }
    }

    /// `~` / `!~` / the stream-consuming `~$0` variant.
    ///
    /// The stream form only engages at the top level (stack depth 1): it
    /// keeps extending `$0` while the leftmost match text still changes,
    /// backtracks the final extension, consumes the record, and publishes
    /// `$0..$n` of the longest match for the frame about to be pushed.
    fn regex_match<W: Write>(
        &mut self,
        left: &Expr,
        right: &Expr,
        streaming: bool,
        output: &mut W,
    ) -> Result<bool> {
        let streaming = streaming && self.stack_depth() == 1;

        let subject = match self.eval_expr_with_output(left, output)? {
            Value::Str(s) => s,
            _ => return Err(Error::runtime("non-string match against regex")),
        };
        let pattern = match right {
            Expr::Regex { pattern, .. } => pattern.clone(),
            _ => return Err(Error::runtime("non-regex match against string")),
        };
        let re = self.compiled_regex(&pattern)?;

        let captures = match re.captures(&subject) {
            Some(caps) => capture_texts(&caps),
            None => return Ok(false),
        };

        let captures = if streaming {
            let mut best = captures;
            loop {
                if self.input_pos() >= self.input_len() {
                    break;
                }
                self.advance_input();
                let record = self.record();
                let extended = re
                    .captures(&record)
                    .map(|caps| capture_texts(&caps))
                    .expect("extending the record preserves the match");
                if extended[0] != best[0] {
                    best = extended;
                } else {
                    self.backtrack_input();
                    break;
                }
            }
            debug!(matched = %best[0], position = self.input_pos(), "stream match consumed");
            self.consume_record();
            best
        } else {
            captures
        };

        for (idx, text) in captures.iter().enumerate() {
            self.last_captures
                .insert(format!("${}", idx), Value::from_literal(text));
        }
        Ok(true)
    }

    fn array_membership<W: Write>(
        &mut self,
        left: &Expr,
        right: &Expr,
        output: &mut W,
    ) -> Result<Value> {
        let key = match left {
            Expr::Index { indices, .. } => self.eval_index_key(indices, output)?,
            other => self.eval_expr_with_output(other, output)?.scalar_str()?,
        };
        match self.eval_expr_with_output(right, output)? {
            Value::Array(map) => Ok(Value::bool(map.contains_key(&key))),
            _ => Err(Error::runtime("membership test against non-array")),
        }
    }

    /// Write a value through an lvalue expression
    pub(crate) fn assign_to<W: Write>(
        &mut self,
        target: &Expr,
        value: Value,
        output: &mut W,
    ) -> Result<()> {
        match target {
            Expr::Ident { name, .. } => {
                self.set_scalar(name, value);
                Ok(())
            }
            Expr::Index { array, indices, .. } => {
                let key = self.eval_index_key(indices, output)?;
                self.set_element(array, key, value);
                Ok(())
            }
            _ => Err(Error::runtime(
                "found non-identifier expression on lhs of assignment",
            )),
        }
    }
}

fn capture_texts(caps: &regex::Captures<'_>) -> Vec<String> {
    caps.iter()
        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
        .collect()
}
