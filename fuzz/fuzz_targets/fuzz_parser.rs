#![no_main]

use libfuzzer_sys::fuzz_target;
use strawk::{Lexer, Parser};

fuzz_target!(|data: &str| {
    // Bad programs must land on the error list, never panic or hang
    let mut parser = Parser::new(Lexer::new(data));
    let _ = parser.parse_program();
    let _ = parser.errors();
});
