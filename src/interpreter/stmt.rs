use std::io::Write;

use crate::ast::*;
use crate::error::{Error, Result};
use crate::value::Value;

use super::Interpreter;

/// Result of executing a statement
pub enum StmtResult {
    Normal,
    Break,
    Continue,
    /// Stop evaluating the remaining rules for this input position
    Next,
    Return(Value),
}

impl<'a> Interpreter<'a> {
    pub(crate) fn execute_block_body<W: Write>(
        &mut self,
        block: &Block,
        output: &mut W,
    ) -> Result<StmtResult> {
        for stmt in &block.statements {
            match self.execute_stmt(stmt, output)? {
                StmtResult::Normal => continue,
                other => return Ok(other),
            }
        }
        Ok(StmtResult::Normal)
    }

    pub(crate) fn execute_stmt<W: Write>(
        &mut self,
        stmt: &Stmt,
        output: &mut W,
    ) -> Result<StmtResult> {
        match stmt {
            Stmt::Expression { expressions, .. } => {
                for expr in expressions {
                    self.eval_expr_with_output(expr, output)?;
                }
                Ok(StmtResult::Normal)
            }

            Stmt::Print { expressions, .. } => {
                let mut parts = Vec::with_capacity(expressions.len());
                for expr in expressions {
                    parts.push(self.eval_expr_with_output(expr, output)?.to_string());
                }
                writeln!(output, "{}", parts.join(" ")).map_err(Error::Io)?;
                Ok(StmtResult::Normal)
            }

            Stmt::ActionBlock {
                condition, body, ..
            } => self.run_action_block(condition, body, output),

            Stmt::Assign {
                targets, values, ..
            } => {
                for (target, value) in targets.iter().zip(values) {
                    let value = self.eval_expr_with_output(value, output)?;
                    self.assign_to(target, value, output)?;
                }
                Ok(StmtResult::Normal)
            }

            Stmt::AssignModify {
                op, target, value, ..
            } => {
                // x op= v desugars to x = x op v
                let current = self.eval_expr_with_output(target, output)?.scalar_num()?;
                let rhs = self.eval_expr_with_output(value, output)?.scalar_num()?;
                let result = match op.infix_op() {
                    InfixOp::Add => current + rhs,
                    InfixOp::Sub => current - rhs,
                    InfixOp::Mul => current * rhs,
                    InfixOp::Div => current / rhs,
                    InfixOp::Mod => current % rhs,
                    InfixOp::Pow => current.powf(rhs),
                    other => {
                        return Err(Error::runtime(format!(
                            "unknown compound assignment operator {}",
                            other
                        )))
                    }
                };
                self.assign_to(target, Value::Num(result), output)?;
                Ok(StmtResult::Normal)
            }

            Stmt::If {
                branches,
                alternative,
                ..
            } => {
                for (condition, consequence) in branches {
                    if self.eval_expr_with_output(condition, output)?.truthy()? {
                        return self.execute_block_body(consequence, output);
                    }
                }
                if let Some(alternative) = alternative {
                    return self.execute_block_body(alternative, output);
                }
                Ok(StmtResult::Normal)
            }

            Stmt::While {
                condition, body, ..
            } => {
                loop {
                    if !self.eval_expr_with_output(condition, output)?.truthy()? {
                        break;
                    }
                    match self.execute_block_body(body, output)? {
                        StmtResult::Normal | StmtResult::Continue => {}
                        StmtResult::Break => break,
                        other => return Ok(other),
                    }
                }
                Ok(StmtResult::Normal)
            }

            Stmt::DoWhile {
                condition, body, ..
            } => {
                loop {
                    match self.execute_block_body(body, output)? {
                        StmtResult::Normal | StmtResult::Continue => {}
                        StmtResult::Break => break,
                        other => return Ok(other),
                    }
                    if !self.eval_expr_with_output(condition, output)?.truthy()? {
                        break;
                    }
                }
                Ok(StmtResult::Normal)
            }

            Stmt::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                self.execute_stmt(init, output)?;
                loop {
                    if !self.eval_expr_with_output(condition, output)?.truthy()? {
                        break;
                    }
                    match self.execute_block_body(body, output)? {
                        StmtResult::Normal | StmtResult::Continue => {}
                        StmtResult::Break => break,
                        other => return Ok(other),
                    }
                    self.execute_stmt(step, output)?;
                }
                Ok(StmtResult::Normal)
            }

            Stmt::ForEach {
                var, array, body, ..
            } => {
                let keys: Vec<String> = match self.lookup_var(array) {
                    Value::Array(map) => map.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                for key in keys {
                    self.set_scalar(var, Value::Str(key));
                    match self.execute_block_body(body, output)? {
                        StmtResult::Normal | StmtResult::Continue => {}
                        StmtResult::Break => break,
                        other => return Ok(other),
                    }
                }
                Ok(StmtResult::Normal)
            }

            Stmt::Break { .. } => Ok(StmtResult::Break),

            Stmt::Continue { .. } => Ok(StmtResult::Continue),

            Stmt::Next { .. } => Ok(StmtResult::Next),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr_with_output(expr, output)?,
                    None => Value::default(),
                };
                Ok(StmtResult::Return(value))
            }

            Stmt::Delete { array, indices, .. } => {
                let key = self.eval_index_key(indices, output)?;
                self.delete_element(array, &key)?;
                Ok(StmtResult::Normal)
            }

            Stmt::Begin { token, .. } | Stmt::End { token, .. } => Err(Error::runtime_at(
                "BEGIN/END block not allowed here",
                token.location.line,
                token.location.column,
            )),

            Stmt::Function(def) => Err(Error::runtime_at(
                "function definition not allowed here",
                def.token.location.line,
                def.token.location.column,
            )),
        }
    }
}
