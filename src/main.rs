use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use snafu::ResultExt;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use blc::bytecode::disasm::disassemble;
use blc::frontend::lexer::Lexer;
use blc::frontend::token_dumper::TokenDumper;
use blc::lang::pretty::pretty_print;
use blc::lang::program::Program;
use blc::{ReadSnafu, Result, StdoutSnafu, WriteSnafu};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Length on the first line, then one value per line
    Text,
    /// postcard-encoded bytes
    Postcard,
}

/// BL compiler: turns a robot program into flat bytecode.
#[derive(Debug, Parser)]
#[command(name = "blc", version)]
struct Cli {
    /// BL source file
    file: PathBuf,

    /// Write the bytecode here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bytecode encoding
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Show tokens only
    #[arg(long)]
    tokens: bool,

    /// Disable ANSI colors in the token dump
    #[arg(long, requires = "tokens")]
    no_color: bool,

    /// Show source spelling instead of Debug in the token dump
    #[arg(long, requires = "tokens")]
    pretty: bool,

    /// Print the parsed tree
    #[arg(long)]
    ast: bool,

    /// Print the program in canonical layout
    #[arg(long)]
    pretty_print: bool,

    /// Print a disassembly listing of the compiled program
    #[arg(long)]
    disasm: bool,

    /// Print the number of primitive calls in the main body
    #[arg(long)]
    count: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn check_extension(path: &Path) {
    if path.extension().and_then(|e| e.to_str()) != Some("bl") {
        warn!("expected a .bl file, got {}", path.display());
    }
}

fn run(cli: &Cli) -> Result<()> {
    check_extension(&cli.file);
    let source = fs::read_to_string(&cli.file).context(ReadSnafu { path: &cli.file })?;
    debug!(file = %cli.file.display(), bytes = source.len(), "read source");

    if cli.tokens {
        let tokens = Lexer::new(&source).tokenize()?;
        let mut dumper = TokenDumper::new();
        if cli.no_color {
            dumper = dumper.no_color();
        }
        if cli.pretty {
            dumper = dumper.pretty();
        }
        dumper.dump(&tokens);
        return Ok(());
    }

    let program = Program::parse(&source)?;

    if cli.ast {
        println!("{:#?}", program);
        return Ok(());
    }
    if cli.pretty_print {
        print!("{}", pretty_print(&program));
        return Ok(());
    }
    if cli.count {
        println!("{}", program.count_primitive_calls());
        return Ok(());
    }

    let bc = program.generated_code()?;

    if cli.disasm {
        print!("{}", disassemble(&bc)?);
        return Ok(());
    }

    let bytes = match cli.format {
        Format::Text => bc.to_text().into_bytes(),
        Format::Postcard => bc.to_bytes()?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &bytes).context(WriteSnafu { path })?;
            debug!(path = %path.display(), values = bc.len(), "wrote bytecode");
        }
        None => std::io::stdout().write_all(&bytes).context(StdoutSnafu)?,
    }

    Ok(())
}
