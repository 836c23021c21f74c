#![no_main]

use libfuzzer_sys::fuzz_target;
use strawk::Lexer;

fuzz_target!(|data: &str| {
    // The lexer is total: arbitrary input must tokenize without panicking
    let mut lexer = Lexer::new(data);
    let _ = lexer.tokenize();
});
