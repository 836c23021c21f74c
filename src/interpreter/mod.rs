mod builtins;
mod expr;
pub mod stmt;

use std::collections::HashMap;
use std::io::Write;

use regex::Regex;
use tracing::trace;

use crate::ast::*;
use crate::error::{Error, Result};
use crate::value::Value;

use stmt::StmtResult;

/// One environment of local variables. Frame 0 owns `$0` and is never
/// popped; action blocks and function calls push frames above it.
pub(crate) struct Frame {
    pub(crate) locals: HashMap<String, Value>,
}

/// The strawk runtime: a tree walker over the parsed program driving a
/// byte cursor through the input.
///
/// The program is split at construction into the BEGIN block, the END
/// block, and the ordered list of rules. Each rule is evaluated once per
/// ingested input byte; a stream-consuming match (`~$0`) grows `$0` to the
/// longest matching prefix, resets it, and hands the capture groups to the
/// fired block as `$1..$n`.
pub struct Interpreter<'a> {
    begin: Option<&'a Block>,
    end: Option<&'a Block>,
    rules: Vec<&'a Stmt>,
    functions: HashMap<String, &'a FunctionDef>,

    input: Vec<u8>,
    input_pos: usize,

    pub(crate) stack: Vec<Frame>,
    pub(crate) globals: HashMap<String, Value>,
    builtins: HashMap<&'static str, builtins::BuiltinFn>,

    /// Capture groups of the most recent regex match, drained into the
    /// next frame push so `$1..$n` are visible inside the fired block.
    pub(crate) last_captures: HashMap<String, Value>,

    /// Compiled regex cache, keyed by pattern text
    regex_cache: HashMap<String, Regex>,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program, input: &str) -> Self {
        let mut begin = None;
        let mut end = None;
        let mut rules = Vec::new();
        let mut functions: HashMap<String, &'a FunctionDef> = HashMap::new();

        for stmt in &program.statements {
            match stmt {
                Stmt::Begin { body, .. } => begin = Some(body),
                Stmt::End { body, .. } => end = Some(body),
                Stmt::Function(def) => {
                    functions.insert(def.name.clone(), def);
                }
                other => rules.push(other),
            }
        }

        let mut locals = HashMap::new();
        locals.insert("$0".to_string(), Value::Str(String::new()));

        Self {
            begin,
            end,
            rules,
            functions,
            input: input.as_bytes().to_vec(),
            input_pos: 0,
            stack: vec![Frame { locals }],
            globals: HashMap::new(),
            builtins: builtins::install(),
            last_captures: HashMap::new(),
            regex_cache: HashMap::new(),
        }
    }

    /// Run the program: BEGIN, then the byte-by-byte scan loop, then END.
    pub fn run<W: Write>(&mut self, output: &mut W) -> Result<()> {
        if let Some(body) = self.begin {
            self.run_unconditional_block(body, output)?;
        }

        while self.input_pos < self.input.len() {
            self.advance_input();
            self.run_rules(output)?;
        }

        if let Some(body) = self.end {
            self.run_unconditional_block(body, output)?;
        }

        Ok(())
    }

    fn run_rules<W: Write>(&mut self, output: &mut W) -> Result<()> {
        let rules = self.rules.clone();
        for stmt in rules {
            trace!(position = self.input_pos, "evaluating rule");
            if let StmtResult::Next = self.execute_stmt(stmt, output)? {
                break;
            }
        }
        Ok(())
    }

    // ---- Input cursor ----

    /// Ingest one byte: append `input[pos]` to `$0`, then move the cursor.
    /// At any point `consumed bytes + len($0) == pos`.
    pub(crate) fn advance_input(&mut self) {
        if self.input_pos < self.input.len() {
            let ch = self.input[self.input_pos] as char;
            if let Some(Value::Str(record)) = self.stack[0].locals.get_mut("$0") {
                record.push(ch);
            }
        }
        self.input_pos += 1;
    }

    /// Undo the most recent extension of `$0`
    pub(crate) fn backtrack_input(&mut self) {
        self.input_pos -= 1;
        if let Some(Value::Str(record)) = self.stack[0].locals.get_mut("$0") {
            record.pop();
        }
    }

    /// A stream match consumed the record: reset `$0` to empty
    pub(crate) fn consume_record(&mut self) {
        self.stack[0]
            .locals
            .insert("$0".to_string(), Value::Str(String::new()));
    }

    pub(crate) fn record(&self) -> String {
        match self.stack[0].locals.get("$0") {
            Some(Value::Str(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub(crate) fn input_len(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn input_pos(&self) -> usize {
        self.input_pos
    }

    // ---- Variable and array access ----

    /// A name resolves to the innermost frame where it is present, then to
    /// the global map; missing names read as the empty string.
    pub(crate) fn lookup_var(&self, name: &str) -> Value {
        if let Some(value) = self.top_frame().locals.get(name) {
            return value.clone();
        }
        if let Some(value) = self.globals.get(name) {
            return value.clone();
        }
        Value::default()
    }

    /// Read `name[key]`. Absent names read as empty; indexing a scalar is
    /// fatal.
    pub(crate) fn lookup_element(&self, name: &str, key: &str) -> Result<Value> {
        let holder = self
            .top_frame()
            .locals
            .get(name)
            .or_else(|| self.globals.get(name));
        match holder {
            None => Ok(Value::default()),
            Some(Value::Array(map)) => Ok(map.get(key).cloned().unwrap_or_default()),
            Some(_) => Err(Error::runtime("attempt to address scalar with index")),
        }
    }

    /// Plain assignment: write through to the frame holding the name, else
    /// to globals.
    pub(crate) fn set_scalar(&mut self, name: &str, value: Value) {
        let top = self.top_frame_mut();
        if top.locals.contains_key(name) {
            top.locals.insert(name.to_string(), value);
        } else {
            self.globals.insert(name.to_string(), value);
        }
    }

    /// Indexed assignment. An absent or scalar slot is coerced to a fresh
    /// array first (auto-vivification).
    pub(crate) fn set_element(&mut self, name: &str, key: String, value: Value) {
        let slot = if self.top_frame().locals.contains_key(name) {
            self.top_frame_mut()
                .locals
                .get_mut(name)
                .expect("checked presence")
        } else {
            self.globals
                .entry(name.to_string())
                .or_insert_with(Value::empty_array)
        };
        if !slot.is_array() {
            *slot = Value::empty_array();
        }
        if let Value::Array(map) = slot {
            map.insert(key, value);
        }
    }

    pub(crate) fn delete_element(&mut self, name: &str, key: &str) -> Result<()> {
        let holder = if self.top_frame().locals.contains_key(name) {
            self.top_frame_mut().locals.get_mut(name)
        } else {
            self.globals.get_mut(name)
        };
        match holder {
            None => Ok(()),
            Some(Value::Array(map)) => {
                map.remove(key);
                Ok(())
            }
            Some(_) => Err(Error::runtime("attempt to delete from a scalar")),
        }
    }

    fn top_frame(&self) -> &Frame {
        self.stack.last().expect("frame 0 is never popped")
    }

    fn top_frame_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("frame 0 is never popped")
    }

    pub(crate) fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    // ---- Blocks and frames ----

    /// BEGIN and END bodies run unconditionally in their own frame
    fn run_unconditional_block<W: Write>(&mut self, body: &Block, output: &mut W) -> Result<()> {
        self.last_captures.clear();
        let locals = std::mem::take(&mut self.last_captures);
        self.stack.push(Frame { locals });
        let result = self.execute_block_body(body, output);
        self.stack.pop();
        result.map(|_| ())
    }

    /// Evaluate a rule condition; on truth, run the body in a frame seeded
    /// with the most recent capture groups. The frame is popped on every
    /// exit path.
    pub(crate) fn run_action_block<W: Write>(
        &mut self,
        condition: &Expr,
        body: &Block,
        output: &mut W,
    ) -> Result<StmtResult> {
        self.last_captures.clear();
        let fired = self.eval_expr_with_output(condition, output)?.truthy()?;
        if !fired {
            return Ok(StmtResult::Normal);
        }

        let locals = std::mem::take(&mut self.last_captures);
        self.stack.push(Frame { locals });
        let result = self.execute_block_body(body, output);
        self.stack.pop();

        match result? {
            StmtResult::Next => Ok(StmtResult::Next),
            _ => Ok(StmtResult::Normal),
        }
    }

    // ---- Regex cache ----

    /// Compile-once regex lookup. `Regex` is cheap to clone.
    pub(crate) fn compiled_regex(&mut self, pattern: &str) -> Result<Regex> {
        if let Some(re) = self.regex_cache.get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern).map_err(Error::Regex)?;
        self.regex_cache.insert(pattern.to_string(), re.clone());
        Ok(re)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::Interpreter;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run_strawk(program: &str, input: &str) -> String {
        let mut parser = Parser::new(Lexer::new(program));
        let ast = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "parse errors: {:?}",
            parser.errors()
        );

        let mut interpreter = Interpreter::new(&ast, input);
        let mut output = Vec::new();
        interpreter.run(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_begin_print() {
        assert_eq!(run_strawk(r#"BEGIN { print "hello" }"#, ""), "hello\n");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(run_strawk("BEGIN { print 2 + 3 * 4 }", ""), "14\n");
        assert_eq!(run_strawk("BEGIN { print 2 ^ 10 }", ""), "1024\n");
        assert_eq!(run_strawk("BEGIN { print 7 % 4 }", ""), "3\n");
    }

    #[test]
    fn test_variables_are_global_outside_frames() {
        assert_eq!(run_strawk("BEGIN { x = 5; print x }", ""), "5\n");
    }

    #[test]
    fn test_if_statement() {
        assert_eq!(
            run_strawk(r#"BEGIN { x = 10; if x > 5 { print "big" } }"#, ""),
            "big\n"
        );
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            run_strawk("BEGIN { i = 1; while i <= 3 { print i; i += 1 } }", ""),
            "1\n2\n3\n"
        );
    }

    #[test]
    fn test_stream_match_consumes_prefix() {
        assert_eq!(run_strawk("/foo/ { print $0 }", "xxfoozfoo"), "foo\nfoo\n");
    }

    #[test]
    fn test_stream_match_longest_prefix() {
        assert_eq!(run_strawk("/([0-9]+)/ { print $1 }", "aa12bb34"), "12\n34\n");
    }

    #[test]
    fn test_record_empty_at_end() {
        assert_eq!(
            run_strawk("/foo/ { hit = 1 }\nEND { print \"[\" $0 \"]\" }", "xxfoo"),
            "[]\n"
        );
    }

    #[test]
    fn test_foreach_sums_array() {
        assert_eq!(
            run_strawk("{ a[1]=10; a[2]=20; for (k in a) { s += a[k] } print s }", "x"),
            "30\n"
        );
    }

    #[test]
    fn test_user_function() {
        assert_eq!(
            run_strawk(
                "function add(a, b) { return a + b }\nBEGIN { print add(2, 3) }",
                ""
            ),
            "5\n"
        );
    }

    #[test]
    fn test_capture_groups_in_block() {
        assert_eq!(
            run_strawk("/(a+)(b+)/ { print $1, $2 }", "xaabbz"),
            "aa bb\n"
        );
    }
}
