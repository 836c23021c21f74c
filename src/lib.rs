//! strawk - a stream-oriented AWK variant
//!
//! Where AWK consumes input line by line, strawk consumes it character by
//! character: the record `$0` grows one byte at a time, and a regex rule
//! that fires consumes the longest matching prefix of the stream and
//! resets `$0`. The interpreter behaves as a longest-prefix regex scanner
//! driving arbitrary action code.
//!
//! # Example
//!
//! ```
//! use strawk::{Interpreter, Lexer, Parser};
//!
//! let source = r#"BEGIN { print "Hello, World!" }"#;
//! let mut parser = Parser::new(Lexer::new(source));
//! let program = parser.parse_program();
//! assert!(parser.errors().is_empty());
//!
//! let mut interpreter = Interpreter::new(&program, "");
//! let mut output = Vec::new();
//! interpreter.run(&mut output).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "Hello, World!\n");
//! ```
//!
//! # Stream Matching Example
//!
//! Each firing of a regex rule consumes the matched prefix; `$0` inside
//! the block is the consumed text, and `$1..$n` are its capture groups.
//!
//! ```
//! use strawk::{Interpreter, Lexer, Parser};
//!
//! let source = "/([0-9]+)/ { print $1 }";
//! let mut parser = Parser::new(Lexer::new(source));
//! let program = parser.parse_program();
//! assert!(parser.errors().is_empty());
//!
//! let mut interpreter = Interpreter::new(&program, "aa12bb34");
//! let mut output = Vec::new();
//! interpreter.run(&mut output).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "12\n34\n");
//! ```

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{Error, Result, SourceLocation};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use value::Value;
