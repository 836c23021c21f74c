#![no_main]

use libfuzzer_sys::fuzz_target;
use strawk::{Interpreter, Lexer, Parser};

fuzz_target!(|data: &str| {
    // Split the fuzz input into a program and an input stream at the
    // first newline
    let (source, input) = match data.split_once('\n') {
        Some(parts) => parts,
        None => (data, ""),
    };

    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        return;
    }

    // Runtime errors are fine; panics are not
    let mut interpreter = Interpreter::new(&program, input);
    let mut output = Vec::new();
    let _ = interpreter.run(&mut output);
});
