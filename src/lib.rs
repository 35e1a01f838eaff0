//! # blc
//!
//! Compiler for BL, a small language for scripting robots on a grid.
//!
//! The pipeline is `frontend` (source text to tokens to `Program`), `lang`
//! (the tree itself, plus pretty-printing and rewrites) and `bytecode`
//! (flat opcode sequence, persisted forms, disassembly).
//!
//! ```
//! let bc = blc::compile("PROGRAM P IS BEGIN WHILE true DO move END WHILE END P").unwrap();
//! assert_eq!(bc.code(), &[16, 5, 0, 6, 0, 5]);
//! ```

pub mod bytecode;
pub mod frontend;
pub mod lang;

use std::path::PathBuf;

use snafu::Snafu;

use crate::bytecode::ProgramBc;
use crate::bytecode::compile_error::CompileError;
use crate::bytecode::disasm::DisasmError;
use crate::bytecode::ir::FormatError;
use crate::frontend::lexer::LexerError;
use crate::frontend::parser_error::ParserError;
use crate::lang::program::Program;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure along the pipeline, including file access by the CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to read '{}': {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write '{}': {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write to stdout: {source}"))]
    Stdout { source: std::io::Error },

    #[snafu(context(false), display("{source}"))]
    Lex { source: LexerError },

    #[snafu(context(false), display("{source}"))]
    Parse { source: ParserError },

    #[snafu(context(false), display("{source}"))]
    Compile { source: CompileError },

    #[snafu(context(false), display("{source}"))]
    Format { source: FormatError },

    #[snafu(context(false), display("{source}"))]
    Disasm { source: DisasmError },
}

/// Parses `source` and compiles it in one step.
pub fn compile(source: &str) -> Result<ProgramBc> {
    let program = Program::parse(source)?;
    Ok(program.generated_code()?)
}
