use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strawk::{Interpreter, Lexer, Parser};

#[derive(Debug, ClapParser)]
#[command(
    name = "strawk",
    version,
    about = "A stream-oriented AWK variant: rules match and consume prefixes of the input stream"
)]
struct Args {
    /// Program file to run
    #[arg(short = 'f', value_name = "PROGRAMFILE")]
    program_file: Option<PathBuf>,

    /// Program to run
    #[arg(value_name = "PROGRAM")]
    program: Option<String>,

    /// Files to use as input
    #[arg(value_name = "INPUTFILE")]
    input_files: Vec<String>,
}

fn main() {
    // RUST_LOG-controlled diagnostics on stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("strawk: {}", e);
            process::exit(2);
        }
    }
}

fn run(args: Args) -> Result<i32, Box<dyn std::error::Error>> {
    let (source, input_files) = match args.program_file {
        Some(path) => {
            let source = fs::read_to_string(&path)
                .map_err(|e| format!("Program File {} not found: {}", path.display(), e))?;
            // With -f present, the positional program is the first input
            // file instead
            let mut files = Vec::new();
            files.extend(args.program);
            files.extend(args.input_files);
            (source, files)
        }
        None => {
            let source = args.program.ok_or("no program supplied")?;
            (source, args.input_files)
        }
    };

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        for error in parser.errors() {
            eprintln!("{}", error);
        }
        return Ok(1);
    }

    // Only the first input file is read; with none, input comes from stdin
    let input = match input_files.first() {
        Some(file) => fs::read_to_string(file)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let mut interpreter = Interpreter::new(&program, &input);
    interpreter.run(&mut output)?;
    output.flush()?;

    Ok(0)
}
