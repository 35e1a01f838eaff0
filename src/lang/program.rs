use std::collections::HashMap;

use super::statement::Statement;
use crate::bytecode::{CodeGenerator, ProgramBc, compile_error::CompileError};
use crate::frontend::{lexer::Lexer, parser::Parser, parser_error::ParserError};

/// User-defined instructions: name -> body.
pub type Context = HashMap<String, Statement>;

/// Parsed BL program.
///
/// Invariants (established by the parser): no context key is the name of a
/// primitive instruction, every key is a valid identifier, and keys are
/// unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
    context: Context,
    body: Statement,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    pub const DEFAULT_NAME: &'static str = "Unnamed";

    pub fn new() -> Self {
        Program {
            name: Self::DEFAULT_NAME.to_string(),
            context: Self::new_context(),
            body: Self::new_body(),
        }
    }

    pub fn new_context() -> Context {
        Context::new()
    }

    pub fn new_body() -> Statement {
        Statement::new_block()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn body(&self) -> &Statement {
        &self.body
    }

    /// Swaps in a new name and returns the previous one.
    pub fn replace_name(&mut self, name: impl Into<String>) -> String {
        std::mem::replace(&mut self.name, name.into())
    }

    /// Swaps in a new context and returns the previous one.
    pub fn replace_context(&mut self, context: Context) -> Context {
        std::mem::replace(&mut self.context, context)
    }

    /// Swaps in a new main body and returns the previous one.
    pub fn replace_body(&mut self, body: Statement) -> Statement {
        std::mem::replace(&mut self.body, body)
    }

    pub fn into_parts(self) -> (String, Context, Statement) {
        (self.name, self.context, self.body)
    }

    /// Instruction names in ascending order.
    pub fn instruction_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.context.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Tokenizes and parses `source` as a complete BL program.
    pub fn parse(source: &str) -> Result<Program, ParserError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize_clean()?;
        Parser::new(tokens).parse_program()
    }

    /// Compiles the program to flat bytecode. The program is only borrowed,
    /// so it is left exactly as it was.
    pub fn generated_code(&self) -> Result<ProgramBc, CompileError> {
        CodeGenerator::new(&self.context).generate(&self.body)
    }
}
