use std::collections::BTreeSet;
use std::fmt::Write;

use snafu::{OptionExt, Snafu};

use crate::bytecode::{Instruction, ProgramBc};

#[derive(Debug, Snafu)]
pub enum DisasmError {
    #[snafu(display("{at:04}: unknown opcode {code}"))]
    UnknownOpcode { at: usize, code: usize },

    #[snafu(display("{at:04}: {op} is missing its target operand"))]
    MissingOperand { at: usize, op: Instruction },

    #[snafu(display("{at:04}: jump target {target} is outside the program (length {len})"))]
    TargetOutOfRange { at: usize, target: usize, len: usize },
}

/// A decoded instruction and, for jumps, its absolute target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub at: usize,
    pub op: Instruction,
    pub target: Option<usize>,
}

/// Splits a bytecode sequence into instructions, checking opcodes,
/// operands and jump targets.
pub fn decode(bc: &ProgramBc) -> Result<Vec<Decoded>, DisasmError> {
    let code = bc.code();
    let mut decoded = Vec::new();
    let mut ip = 0;

    while ip < code.len() {
        let at = ip;
        let op = Instruction::from_byte_code(code[ip]).context(UnknownOpcodeSnafu { at, code: code[ip] })?;
        ip += 1;

        let target = if op.has_operand() {
            let target = code.get(ip).copied().context(MissingOperandSnafu { at, op })?;
            if target >= code.len() {
                return TargetOutOfRangeSnafu {
                    at,
                    target,
                    len: code.len(),
                }
                .fail();
            }
            ip += 1;
            Some(target)
        } else {
            None
        };

        decoded.push(Decoded { at, op, target });
    }

    Ok(decoded)
}

/// Renders a human-readable listing of `bc`.
///
/// One instruction per line, prefixed by its address. Addresses that are
/// jump targets are marked with `►` and preceded by a rule.
pub fn disassemble(bc: &ProgramBc) -> Result<String, DisasmError> {
    let decoded = decode(bc)?;
    let jump_targets: BTreeSet<usize> = decoded.iter().filter_map(|d| d.target).collect();

    let mut out = String::new();
    writeln!(out, "════════════════════════════════════════").ok();
    writeln!(out, " {} values, {} instructions", bc.len(), decoded.len()).ok();
    writeln!(out, "════════════════════════════════════════").ok();

    for d in &decoded {
        let is_target = jump_targets.contains(&d.at);
        if is_target {
            writeln!(out, "      ┌──────────────────────────────────").ok();
        }

        let marker = if is_target { "►" } else { " " };
        match d.target {
            Some(target) => {
                let direction = if target <= d.at { "↑" } else { "↓" };
                writeln!(
                    out,
                    "{:04} {} {:<32} {:04} {}",
                    d.at,
                    marker,
                    d.op.mnemonic(),
                    target,
                    direction
                )
                .ok();
            }
            None => {
                writeln!(out, "{:04} {} {}", d.at, marker, d.op.mnemonic()).ok();
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::program::Program;

    fn bc(code: Vec<usize>) -> ProgramBc {
        ProgramBc::from_code(code)
    }

    #[test]
    fn test_decode_while_loop() {
        let decoded = decode(&bc(vec![16, 5, 0, 6, 0, 5])).unwrap();
        assert_eq!(
            decoded,
            vec![
                Decoded {
                    at: 0,
                    op: Instruction::JumpIfNotTrue,
                    target: Some(5)
                },
                Decoded {
                    at: 2,
                    op: Instruction::Move,
                    target: None
                },
                Decoded {
                    at: 3,
                    op: Instruction::Jump,
                    target: Some(0)
                },
                Decoded {
                    at: 5,
                    op: Instruction::Halt,
                    target: None
                },
            ]
        );
    }

    #[test]
    fn test_listing_marks_jump_targets() {
        let listing = disassemble(&bc(vec![16, 5, 0, 6, 0, 5])).unwrap();

        assert!(listing.contains("6 values, 4 instructions"));
        assert!(listing.contains("0000 ► JUMP_IF_NOT_TRUE"));
        assert!(listing.contains("0002   MOVE"));
        assert!(listing.contains("0005 ► HALT"));

        let jump_line = listing.lines().find(|l| l.contains(" JUMP ")).unwrap();
        assert!(jump_line.starts_with("0003"));
        assert!(jump_line.ends_with("0000 ↑"));
    }

    #[test]
    fn test_listing_of_compiled_program() {
        let program = Program::parse(
            "PROGRAM P IS BEGIN IF random THEN turnleft ELSE turnright END IF END P",
        )
        .unwrap();
        let listing = disassemble(&program.generated_code().unwrap()).unwrap();
        assert!(listing.contains("JUMP_IF_NOT_RANDOM"));
        assert!(listing.contains("0005 ► TURNRIGHT"));
        assert!(listing.contains("0006 ► HALT"));
    }

    #[test]
    fn test_unknown_opcode() {
        let err = disassemble(&bc(vec![0, 42, 5])).unwrap_err();
        assert!(matches!(err, DisasmError::UnknownOpcode { at: 1, code: 42 }));
        assert_eq!(err.to_string(), "0001: unknown opcode 42");
    }

    #[test]
    fn test_missing_operand() {
        let err = disassemble(&bc(vec![0, 6])).unwrap_err();
        assert!(matches!(
            err,
            DisasmError::MissingOperand {
                at: 1,
                op: Instruction::Jump
            }
        ));
    }

    #[test]
    fn test_target_out_of_range() {
        let err = disassemble(&bc(vec![6, 9, 5])).unwrap_err();
        assert!(matches!(
            err,
            DisasmError::TargetOutOfRange {
                at: 0,
                target: 9,
                len: 3
            }
        ));
    }

    #[test]
    fn test_empty_program() {
        let listing = disassemble(&bc(Vec::new())).unwrap();
        assert!(listing.contains("0 values, 0 instructions"));
    }
}
