pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;

pub use compile::CodeGenerator;
pub use ir::ProgramBc;
pub use op::Instruction;
