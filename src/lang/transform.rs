//! Whole-tree rewrites and walks over statements and programs.
//!
//! Rewrites take the tree by value and hand back the rewritten tree, so the
//! caller never observes a half-transformed node.

use super::program::{Context, Program};
use super::statement::Statement;
use crate::bytecode::Instruction;

/// Number of calls to primitive instructions anywhere in `statement`.
/// Calls to user-defined instructions are not followed.
pub fn count_primitive_calls(statement: &Statement) -> usize {
    match statement {
        Statement::Block(block) => block.iter().map(count_primitive_calls).sum(),
        Statement::If { body, .. } | Statement::While { body, .. } => count_primitive_calls(body),
        Statement::IfElse {
            then_body,
            else_body,
            ..
        } => count_primitive_calls(then_body) + count_primitive_calls(else_body),
        Statement::Call(name) => usize::from(Instruction::is_primitive_name(name)),
    }
}

/// Replaces every call to `old` with a call to `new`.
pub fn rename_instruction(statement: Statement, old: &str, new: &str) -> Statement {
    match statement {
        Statement::Block(block) => Statement::Block(
            block
                .into_iter()
                .map(|s| rename_instruction(s, old, new))
                .collect(),
        ),
        Statement::If { condition, body } => {
            Statement::assemble_if(condition, rename_instruction(*body, old, new))
        }
        Statement::IfElse {
            condition,
            then_body,
            else_body,
        } => Statement::assemble_if_else(
            condition,
            rename_instruction(*then_body, old, new),
            rename_instruction(*else_body, old, new),
        ),
        Statement::While { condition, body } => {
            Statement::assemble_while(condition, rename_instruction(*body, old, new))
        }
        Statement::Call(name) if name == old => Statement::assemble_call(new),
        call @ Statement::Call(_) => call,
    }
}

/// Rewrites every `IF next-is-not-X THEN a ELSE b` into
/// `IF next-is-X THEN b ELSE a`, at any depth.
pub fn simplify_if_else(statement: Statement) -> Statement {
    match statement {
        Statement::Block(block) => Statement::Block(block.into_iter().map(simplify_if_else).collect()),
        Statement::If { condition, body } => Statement::assemble_if(condition, simplify_if_else(*body)),
        Statement::IfElse {
            condition,
            then_body,
            else_body,
        } => {
            let then_body = simplify_if_else(*then_body);
            let else_body = simplify_if_else(*else_body);
            match condition.negated() {
                Some(positive) if condition.is_negative() => {
                    Statement::assemble_if_else(positive, else_body, then_body)
                }
                _ => Statement::assemble_if_else(condition, then_body, else_body),
            }
        }
        Statement::While { condition, body } => {
            Statement::assemble_while(condition, simplify_if_else(*body))
        }
        call @ Statement::Call(_) => call,
    }
}

fn map_context(context: Context, f: impl Fn(Statement) -> Statement) -> Context {
    context.into_iter().map(|(name, body)| (name, f(body))).collect()
}

impl Program {
    /// Renames the user-defined instruction `old` to `new`: its definition
    /// and every call to it, in instruction bodies and in the main body.
    ///
    /// `new` must not already name another instruction or a primitive;
    /// otherwise two definitions collapse into one.
    pub fn rename_instruction(self, old: &str, new: &str) -> Program {
        let (name, context, body) = self.into_parts();
        let context = context
            .into_iter()
            .map(|(key, s)| {
                let key = if key == old { new.to_string() } else { key };
                (key, rename_instruction(s, old, new))
            })
            .collect();

        let mut program = Program::new();
        program.replace_name(name);
        program.replace_context(context);
        program.replace_body(rename_instruction(body, old, new));
        program
    }

    /// Applies `simplify_if_else` to every instruction body and the main body.
    pub fn simplify_if_else(self) -> Program {
        let (name, context, body) = self.into_parts();
        let mut program = Program::new();
        program.replace_name(name);
        program.replace_context(map_context(context, simplify_if_else));
        program.replace_body(simplify_if_else(body));
        program
    }

    /// Primitive calls written directly in the main body.
    pub fn count_primitive_calls(&self) -> usize {
        count_primitive_calls(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::condition::Condition;

    fn parse(src: &str) -> Program {
        Program::parse(src).unwrap()
    }

    fn body(src: &str) -> Statement {
        let program = parse(&format!("PROGRAM T IS BEGIN {src} END T"));
        program.into_parts().2
    }

    #[test]
    fn test_count_ignores_user_calls() {
        let s = body("move foo IF random THEN infect ELSE skip turnleft END IF WHILE true DO bar END WHILE");
        assert_eq!(count_primitive_calls(&s), 4);
    }

    #[test]
    fn test_count_empty_block() {
        assert_eq!(count_primitive_calls(&Statement::new_block()), 0);
    }

    #[test]
    fn test_count_is_repeatable() {
        let s = body("WHILE true DO move turnright END WHILE");
        let before = s.clone();
        assert_eq!(count_primitive_calls(&s), 2);
        assert_eq!(count_primitive_calls(&s), 2);
        assert_eq!(s, before);
    }

    #[test]
    fn test_rename_statement_touches_only_matching_calls() {
        let s = body("walk IF next-is-wall THEN walk ELSE run END IF");
        let renamed = rename_instruction(s, "walk", "stroll");
        assert_eq!(renamed, body("stroll IF next-is-wall THEN stroll ELSE run END IF"));
    }

    #[test]
    fn test_rename_program_renames_definition_and_calls() {
        let program = parse(
            "PROGRAM P IS
               INSTRUCTION walk IS move END walk
               INSTRUCTION twice IS walk walk END twice
             BEGIN twice walk END P",
        );
        let renamed = program.rename_instruction("walk", "step");

        let expected = parse(
            "PROGRAM P IS
               INSTRUCTION step IS move END step
               INSTRUCTION twice IS step step END twice
             BEGIN twice step END P",
        );
        assert_eq!(renamed, expected);
    }

    #[test]
    fn test_rename_keeps_generated_code() {
        let program = parse(
            "PROGRAM P IS INSTRUCTION spin IS turnleft turnleft END spin BEGIN spin infect END P",
        );
        let before = program.generated_code().unwrap();
        let after = program.rename_instruction("spin", "twirl").generated_code().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_simplify_swaps_negative_branches() {
        let s = body("IF next-is-not-enemy THEN move ELSE infect END IF");
        let simplified = simplify_if_else(s);
        assert_eq!(simplified, body("IF next-is-enemy THEN infect ELSE move END IF"));
    }

    #[test]
    fn test_simplify_leaves_positive_and_plain_if() {
        let src = "IF next-is-wall THEN turnleft ELSE move END IF IF next-is-not-empty THEN skip END IF";
        assert_eq!(simplify_if_else(body(src)), body(src));
    }

    #[test]
    fn test_simplify_reaches_nested_statements() {
        let s = body(
            "WHILE true DO
               IF random THEN
                 IF next-is-not-wall THEN move ELSE turnright END IF
               END IF
             END WHILE",
        );
        let simplified = simplify_if_else(s);
        let expected = body(
            "WHILE true DO
               IF random THEN
                 IF next-is-wall THEN turnright ELSE move END IF
               END IF
             END WHILE",
        );
        assert_eq!(simplified, expected);
    }

    #[test]
    fn test_simplify_program_covers_instruction_bodies() {
        let program = parse(
            "PROGRAM P IS
               INSTRUCTION look IS IF next-is-not-friend THEN infect ELSE skip END IF END look
             BEGIN look END P",
        );
        let simplified = program.simplify_if_else();
        let look = &simplified.context()["look"];
        let (condition, then_body, else_body) = look
            .as_block()
            .unwrap()
            .iter()
            .next()
            .cloned()
            .unwrap()
            .disassemble_if_else()
            .unwrap();
        assert_eq!(condition, Condition::NextIsFriend);
        assert_eq!(then_body, body("skip"));
        assert_eq!(else_body, body("infect"));
    }

    #[test]
    fn test_program_count_primitive_calls() {
        let program = parse(
            "PROGRAM P IS INSTRUCTION go IS move move END go BEGIN go infect skip END P",
        );
        assert_eq!(program.count_primitive_calls(), 2);
    }
}
