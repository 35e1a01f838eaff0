use std::fmt::Write;

use super::program::Program;
use super::statement::Statement;

/// Spaces per nesting level.
pub const INDENT_SIZE: usize = 4;

/// Renders `program` as canonical BL source.
///
/// Instructions are printed in name order so the output does not depend on
/// the context's hash order. The output parses back to an equal program.
pub fn pretty_print(program: &Program) -> String {
    let mut out = String::new();
    writeln!(out, "PROGRAM {} IS", program.name()).ok();
    writeln!(out).ok();

    for name in program.instruction_names() {
        let body = &program.context()[name];
        writeln!(out, "{}INSTRUCTION {} IS", spaces(INDENT_SIZE), name).ok();
        write_statement(&mut out, body, 2 * INDENT_SIZE);
        writeln!(out, "{}END {}", spaces(INDENT_SIZE), name).ok();
        writeln!(out).ok();
    }

    writeln!(out, "BEGIN").ok();
    write_statement(&mut out, program.body(), INDENT_SIZE);
    writeln!(out, "END {}", program.name()).ok();
    out
}

/// Renders one statement with every line indented by at least `indent`.
pub fn pretty_print_statement(statement: &Statement, indent: usize) -> String {
    let mut out = String::new();
    write_statement(&mut out, statement, indent);
    out
}

fn write_statement(out: &mut String, statement: &Statement, indent: usize) {
    let pad = spaces(indent);
    match statement {
        Statement::Block(block) => {
            for child in block {
                write_statement(out, child, indent);
            }
        }
        Statement::If { condition, body } => {
            writeln!(out, "{pad}IF {condition} THEN").ok();
            write_statement(out, body, indent + INDENT_SIZE);
            writeln!(out, "{pad}END IF").ok();
        }
        Statement::IfElse {
            condition,
            then_body,
            else_body,
        } => {
            writeln!(out, "{pad}IF {condition} THEN").ok();
            write_statement(out, then_body, indent + INDENT_SIZE);
            writeln!(out, "{pad}ELSE").ok();
            write_statement(out, else_body, indent + INDENT_SIZE);
            writeln!(out, "{pad}END IF").ok();
        }
        Statement::While { condition, body } => {
            writeln!(out, "{pad}WHILE {condition} DO").ok();
            write_statement(out, body, indent + INDENT_SIZE);
            writeln!(out, "{pad}END WHILE").ok();
        }
        Statement::Call(name) => {
            writeln!(out, "{pad}{name}").ok();
        }
    }
}

fn spaces(n: usize) -> String {
    " ".repeat(n)
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&pretty_print(self))
    }
}
