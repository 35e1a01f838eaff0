use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::{
    bytecode::{Instruction, ProgramBc, compile_error::CompileError},
    lang::{program::Context, statement::Statement},
};

/// Value written into a jump operand before its target is known.
const PLACEHOLDER: usize = 0;

/// Limit on open control statements and inlined calls.
pub const MAX_DEPTH: usize = 512;

/// Lowers a statement tree into flat bytecode with absolute jump targets.
///
/// Forward jumps are backpatched: the operand slot is reserved with a
/// placeholder when the jump is emitted and overwritten once the code it
/// skips has been generated. Calls to user-defined instructions are
/// expanded inline, since the target machine has no call/return.
///
/// The generator only borrows the tree and the context, so generating code
/// leaves the program exactly as it was.
pub struct CodeGenerator<'a> {
    context: &'a Context,

    /// Output bytecode
    code: Vec<usize>,

    /// Instructions currently being expanded, outermost first
    expanding: Vec<&'a str>,

    /// Instructions expanded at least once
    used: HashSet<&'a str>,

    /// Non-block statements currently being compiled
    depth: usize,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            code: Vec::new(),
            expanding: Vec::new(),
            used: HashSet::new(),
            depth: 0,
        }
    }

    /// Generates the code for a program whose main body is `body`,
    /// terminated by `HALT`.
    ///
    /// # Errors
    /// - `UndefinedInstruction` for a call that is neither a primitive nor
    ///   in the context.
    /// - `RecursiveInstruction` if expanding a call reaches the same
    ///   instruction again.
    pub fn generate(mut self, body: &'a Statement) -> Result<ProgramBc, CompileError> {
        self.compile_statement(body)?;
        self.emit(Instruction::Halt);

        let mut unused: Vec<&str> = self
            .context
            .keys()
            .map(String::as_str)
            .filter(|name| !self.used.contains(name))
            .collect();
        unused.sort_unstable();
        for name in unused {
            warn!(instruction = name, "instruction is defined but never called");
        }

        debug!(len = self.code.len(), "generated bytecode");
        Ok(ProgramBc::from_code(self.code))
    }

    fn position(&self) -> usize {
        self.code.len()
    }

    fn emit(&mut self, op: Instruction) {
        self.code.push(op.byte_code());
    }

    /// Emits a placeholder operand and returns its index for `patch`.
    fn reserve_slot(&mut self) -> usize {
        let slot = self.position();
        self.code.push(PLACEHOLDER);
        slot
    }

    fn patch(&mut self, slot: usize, target: usize) {
        trace!(slot, target, "patched jump target");
        self.code[slot] = target;
    }

    fn compile_statement(&mut self, statement: &'a Statement) -> Result<(), CompileError> {
        // blocks add no level of their own
        let nests = !matches!(statement, Statement::Block(_));
        if nests {
            if self.depth == MAX_DEPTH {
                return Err(CompileError::too_deep(MAX_DEPTH));
            }
            self.depth += 1;
        }

        let result = self.compile_node(statement);

        if nests {
            self.depth -= 1;
        }
        result
    }

    fn compile_node(&mut self, statement: &'a Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Block(block) => {
                for child in block {
                    self.compile_statement(child)?;
                }
            }

            // JUMP_IF_NOT_c  end
            // <body>
            // end:
            Statement::If { condition, body } => {
                self.emit(Instruction::conditional_jump(*condition));
                let skip = self.reserve_slot();
                self.compile_statement(body)?;
                let end = self.position();
                self.patch(skip, end);
            }

            // JUMP_IF_NOT_c  else
            // <then_body>
            // JUMP  end
            // else:
            // <else_body>
            // end:
            Statement::IfElse {
                condition,
                then_body,
                else_body,
            } => {
                self.emit(Instruction::conditional_jump(*condition));
                let to_else = self.reserve_slot();
                self.compile_statement(then_body)?;
                self.emit(Instruction::Jump);
                let to_end = self.reserve_slot();
                let else_start = self.position();
                self.patch(to_else, else_start);
                self.compile_statement(else_body)?;
                let end = self.position();
                self.patch(to_end, end);
            }

            // start:
            // JUMP_IF_NOT_c  end
            // <body>
            // JUMP  start
            // end:
            Statement::While { condition, body } => {
                let start = self.position();
                self.emit(Instruction::conditional_jump(*condition));
                let exit = self.reserve_slot();
                self.compile_statement(body)?;
                self.emit(Instruction::Jump);
                self.code.push(start);
                let end = self.position();
                self.patch(exit, end);
            }

            Statement::Call(name) => self.compile_call(name)?,
        }

        Ok(())
    }

    fn compile_call(&mut self, name: &'a str) -> Result<(), CompileError> {
        if let Some(op) = Instruction::primitive(name) {
            self.emit(op);
            return Ok(());
        }

        let Some((key, body)) = self.context.get_key_value(name) else {
            return Err(CompileError::undefined(name));
        };

        if let Some(first) = self.expanding.iter().position(|n| *n == name) {
            let mut chain: Vec<String> = self.expanding[first..].iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(CompileError::recursive(chain));
        }

        trace!(instruction = name, at = self.position(), "inlining instruction");
        self.expanding.push(key);
        self.used.insert(key);
        self.compile_statement(body)?;
        self.expanding.pop();

        Ok(())
    }
}
