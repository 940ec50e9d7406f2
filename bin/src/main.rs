use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
};

use clap::{Parser, ValueEnum};
use interpreter::{parse_source, run_source, InterpretError};
use log::info;
use scanner::{scan, Scanned};

#[derive(clap::Parser)]
#[command(about = "Evaluates arithmetic Lox expressions")]
struct Args {
    /// Source file with `;` separated expressions. Starts a prompt if omitted.
    file: Option<PathBuf>,

    /// What to print for each input.
    #[arg(long, value_enum, default_value_t = Emit::Value)]
    emit: Emit,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Emit {
    /// One token per line.
    Tokens,
    /// The parenthesized syntax tree of each expression.
    Ast,
    /// The value of each expression.
    Value,
}

fn run(source: &str, emit: Emit, output: &mut impl Write) -> Result<(), InterpretError> {
    match emit {
        Emit::Tokens => {
            let Scanned { tokens, errors } = scan(source);
            for token in tokens {
                writeln!(output, "{token:#}")?;
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(InterpretError::CompileError(errors.into_iter().collect()))
            }
        }
        Emit::Ast => {
            for expr in parse_source(source)? {
                writeln!(output, "{}", parser::print(&expr))?;
            }
            Ok(())
        }
        Emit::Value => run_source(source, output),
    }
}

fn exit_code(error: &InterpretError) -> i32 {
    match error {
        InterpretError::CompileError(_) => 65,
        InterpretError::RuntimeError(_) => 70,
        InterpretError::Io(_) => 74,
    }
}

fn run_file(path: PathBuf, emit: Emit) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&path)?;
    info!("Running {}", path.display());

    if let Err(e) = run(&source, emit, &mut stdout()) {
        eprintln!("{e}");
        std::process::exit(exit_code(&e));
    }
    Ok(())
}

fn run_prompt(emit: Emit) -> anyhow::Result<()> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if let Err(e) = run(&line, emit, &mut stdout()) {
            eprintln!("{e}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.file {
        Some(file) => run_file(file, args.emit),
        None => run_prompt(args.emit),
    }
}
