use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use bfexec::{Vm, compile, compile_unoptimized, disassemble};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bfexec")]
#[command(about = "An optimizing brainfuck interpreter")]
struct Args {
    /// Path to the Brainfuck program file to execute (.b or .bf)
    #[arg(value_name = "FILE")]
    file: String,

    /// Report the execution time after the program finishes
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    time: bool,

    /// Flush stdout after each . instruction
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    flush: bool,

    /// Print the compiled instructions instead of running them
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    dump: bool,

    /// Skip the loop optimizations
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_optimize: bool,
}

fn has_source_extension(file: &str) -> bool {
    matches!(
        Path::new(file).extension().and_then(|ext| ext.to_str()),
        Some("b" | "bf")
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    if !has_source_extension(&args.file) {
        eprintln!("Unrecognized file extension. Only use .b and .bf files.");
        return ExitCode::FAILURE;
    }
    let code = match fs::read_to_string(&args.file) {
        Ok(code) => code,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("File {} does not exist.", args.file);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{}: {}", args.file, e);
            return ExitCode::FAILURE;
        }
    };
    let compiled = if args.no_optimize {
        compile_unoptimized(&code)
    } else {
        compile(&code)
    };
    let prog = match compiled {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.dump {
        print!("{}", disassemble(&prog));
        return ExitCode::SUCCESS;
    }

    let stdout = BufWriter::new(io::stdout().lock());
    let mut vm = Vm::new(&prog, io::stdin().lock(), stdout).with_flush(args.flush);
    let elapsed = match vm.run() {
        Ok(elapsed) => elapsed,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if args.time {
        let mut out = vm.into_output();
        let millis = elapsed.as_secs_f64() * 1000.0;
        if write!(out, "\n\nExecution Time: {millis:.4}ms.")
            .and_then(|_| out.flush())
            .is_err()
        {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
