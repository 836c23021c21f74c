use std::collections::HashMap;
use std::io::Write;

use regex::NoExpand;

use crate::ast::{Expr, FunctionDef};
use crate::error::{Error, Result, SourceLocation};
use crate::value::Value;

use super::{Frame, Interpreter};

/// A built-in function: receives the interpreter and its unevaluated
/// argument list, so entries that want a regex literal can take it
/// structurally instead of through scalar evaluation.
pub(crate) type BuiltinFn =
    for<'p, 'e> fn(&mut Interpreter<'p>, &'e [Expr]) -> Result<Value>;

/// The standard library symbol table
pub(crate) fn install() -> HashMap<&'static str, BuiltinFn> {
    let mut table: HashMap<&'static str, BuiltinFn> = HashMap::new();
    table.insert("length", builtin_length);
    table.insert("sub", builtin_sub);
    table.insert("gsub", builtin_gsub);
    table.insert("split", builtin_split);
    table.insert("tolower", builtin_tolower);
    table.insert("toupper", builtin_toupper);
    table.insert("substr", builtin_substr);
    table.insert("index", builtin_index);
    table.insert("match", builtin_match);
    table
}

impl<'a> Interpreter<'a> {
    /// Dispatch a call: built-ins first, then user-defined functions
    pub(crate) fn call_function<W: Write>(
        &mut self,
        name: &str,
        args: &[Expr],
        location: SourceLocation,
        output: &mut W,
    ) -> Result<Value> {
        if let Some(builtin) = self.builtins.get(name).copied() {
            return builtin(self, args);
        }
        if let Some(func) = self.functions.get(name).copied() {
            return self.call_user_function(func, args, output);
        }
        Err(Error::runtime_at(
            format!("Function {} not found", name),
            location.line,
            location.column,
        ))
    }

    /// Bind evaluated arguments to the parameters in a fresh frame and run
    /// the body. Missing arguments bind to the empty string. The frame is
    /// popped on every exit path.
    fn call_user_function<W: Write>(
        &mut self,
        func: &'a FunctionDef,
        args: &[Expr],
        output: &mut W,
    ) -> Result<Value> {
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr_with_output(arg, output)?);
        }

        let mut locals = HashMap::new();
        for (idx, param) in func.params.iter().enumerate() {
            locals.insert(
                param.clone(),
                arg_values.get(idx).cloned().unwrap_or_default(),
            );
        }

        self.stack.push(Frame { locals });
        let result = self.execute_block_body(&func.body, output);
        self.stack.pop();

        match result? {
            super::stmt::StmtResult::Return(value) => Ok(value),
            _ => Ok(Value::default()),
        }
    }
}

/// First argument as a regex pattern: a regex literal contributes its
/// pattern text, anything else its scalar form
fn extract_pattern(interp: &mut Interpreter<'_>, expr: &Expr) -> Result<String> {
    match expr {
        Expr::Regex { pattern, .. } => Ok(pattern.clone()),
        other => interp.eval_expr(other)?.scalar_str(),
    }
}

fn arity(args: &[Expr], min: usize, max: usize, name: &str) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::runtime(format!(
            "Incorrect arguments to function {}",
            name
        )));
    }
    Ok(())
}

/// length(x) - length of the string form; element count for arrays
fn builtin_length(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 1, 1, "length")?;
    match interp.eval_expr(&args[0])? {
        Value::Array(map) => Ok(Value::Num(map.len() as f64)),
        scalar => Ok(Value::Num(scalar.scalar_str()?.chars().count() as f64)),
    }
}

fn regex_replace(
    interp: &mut Interpreter<'_>,
    args: &[Expr],
    global: bool,
    name: &str,
) -> Result<Value> {
    arity(args, 2, 3, name)?;
    let pattern = extract_pattern(interp, &args[0])?;
    let replacement = interp.eval_expr(&args[1])?.scalar_str()?;
    let subject = match args.get(2) {
        Some(expr) => interp.eval_expr(expr)?.scalar_str()?,
        None => interp.lookup_var("$0").scalar_str()?,
    };

    let re = interp.compiled_regex(&pattern)?;
    let replaced = if global {
        re.replace_all(&subject, NoExpand(&replacement))
    } else {
        re.replace(&subject, NoExpand(&replacement))
    };
    Ok(Value::Str(replaced.into_owned()))
}

/// sub(re, repl, s?) - replace the first match in s (default $0); returns
/// the result
fn builtin_sub(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    regex_replace(interp, args, false, "sub")
}

/// gsub(re, repl, s?) - replace all matches; returns the result
fn builtin_gsub(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    regex_replace(interp, args, true, "gsub")
}

/// split(s, sep) - split by literal separator into a 1-indexed array
fn builtin_split(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 2, 2, "split")?;
    let subject = interp.eval_expr(&args[0])?.scalar_str()?;
    let separator = interp.eval_expr(&args[1])?.scalar_str()?;

    let mut map = HashMap::new();
    for (idx, part) in subject.split(&separator).enumerate() {
        map.insert((idx + 1).to_string(), Value::Str(part.to_string()));
    }
    Ok(Value::Array(map))
}

fn builtin_tolower(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 1, 1, "tolower")?;
    let s = interp.eval_expr(&args[0])?.scalar_str()?;
    Ok(Value::Str(s.to_lowercase()))
}

fn builtin_toupper(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 1, 1, "toupper")?;
    let s = interp.eval_expr(&args[0])?.scalar_str()?;
    Ok(Value::Str(s.to_uppercase()))
}

/// substr(s, m, n?) - n characters from 0-based position m, or the rest of
/// the string when n is omitted
fn builtin_substr(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 2, 3, "substr")?;
    let s = interp.eval_expr(&args[0])?.scalar_str()?;
    let start = interp.eval_expr(&args[1])?.scalar_num()?.max(0.0) as usize;
    let result: String = match args.get(2) {
        Some(expr) => {
            let len = interp.eval_expr(expr)?.scalar_num()?.max(0.0) as usize;
            s.chars().skip(start).take(len).collect()
        }
        None => s.chars().skip(start).collect(),
    };
    Ok(Value::Str(result))
}

/// index(s, t) - 0-based position of t in s, or -1
fn builtin_index(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 2, 2, "index")?;
    let s = interp.eval_expr(&args[0])?.scalar_str()?;
    let target = interp.eval_expr(&args[1])?.scalar_str()?;
    let position = match s.find(&target) {
        Some(byte_idx) => s[..byte_idx].chars().count() as f64,
        None => -1.0,
    };
    Ok(Value::Num(position))
}

/// match(s, re) - 0-based start of the first match, or -1
fn builtin_match(interp: &mut Interpreter<'_>, args: &[Expr]) -> Result<Value> {
    arity(args, 2, 2, "match")?;
    let s = interp.eval_expr(&args[0])?.scalar_str()?;
    let pattern = extract_pattern(interp, &args[1])?;
    let re = interp.compiled_regex(&pattern)?;
    let position = match re.find(&s) {
        Some(m) => s[..m.start()].chars().count() as f64,
        None => -1.0,
    };
    Ok(Value::Num(position))
}
