use tracing::debug;

use crate::bytecode::op::Instruction;
use crate::frontend::lexer::{Span, Spanned};
use crate::frontend::parser_error::{
    DuplicateInstructionSnafu, InvalidConditionSnafu, MismatchedNameSnafu, ParserError,
    PrimitiveRedefinedSnafu, TooDeepSnafu, TrailingInputSnafu, UnexpectedTokenSnafu,
};
use crate::frontend::token::Token;
use crate::lang::condition::Condition;
use crate::lang::program::{Context, Program};
use crate::lang::statement::{Block, Statement};

static EOF: Token = Token::Eof;

/// Recursive-descent parser for BL.
///
/// The parser consumes a stream of lexed `Spanned` tokens without comments
/// or newlines, ending with `Token::Eof`, using one token of lookahead and
/// no backtracking.
/// The first violation of the grammar or of the declaration rules is
/// returned as an error; there is no recovery and no partial program.
///
/// Instruction names used in calls are not resolved here. A call to an
/// instruction defined later, or not at all, parses fine; the code
/// generator decides what it means.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Span of the most recently consumed token.
    ///
    /// Used to provide stable source locations for errors that occur after
    /// advancing past the last token.
    last_span: Option<Span>,

    /// IF / WHILE statements currently open.
    depth: usize,
}

impl Parser {
    /// Maximum number of nested IF / WHILE statements.
    pub const MAX_NESTING: usize = 128;

    /// Creates a new parser from `Lexer::tokenize_clean` output.
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser {
            tokens,
            pos: 0,
            last_span: None,
            depth: 0,
        }
    }

    /// Peeks the current token without consuming it. Past the end of the
    /// stream this is `Token::Eof`.
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|s| &s.token).unwrap_or(&EOF)
    }

    /// Consumes the current token and returns it.
    fn advance(&mut self) -> Token {
        match self.tokens.get(self.pos) {
            Some(s) => {
                self.last_span = Some(s.span);
                self.pos += 1;
                s.token.clone()
            }
            None => Token::Eof,
        }
    }

    /// Location of the current token, falling back to the last consumed one
    /// and finally to `1:1` for empty input.
    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|s| s.span)
            .or(self.last_span)
            .unwrap_or(Span { line: 1, col: 1 })
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        UnexpectedTokenSnafu {
            expected,
            found: self.peek().to_string(),
            span: self.span(),
        }
        .build()
    }

    /// Consumes `expected` or fails with an `UnexpectedToken` error.
    fn expect(&mut self, expected: Token) -> Result<(), ParserError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    /// Consumes an identifier and returns it with its location.
    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParserError> {
        let span = self.span();
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Consumes the name after a closing `END`, which must repeat `name`.
    fn expect_closing_name(&mut self, construct: &'static str, name: &str) -> Result<(), ParserError> {
        let span = self.span();
        match self.peek() {
            Token::Ident(found) if found == name => {
                self.advance();
                Ok(())
            }
            Token::Ident(found) => MismatchedNameSnafu {
                construct,
                expected: name,
                found: found.clone(),
                span,
            }
            .fail(),
            _ => Err(self.unexpected(&format!("'{}'", name))),
        }
    }

    /// Parses a complete BL program:
    ///
    /// ```text
    /// PROGRAM <name> IS
    ///   {INSTRUCTION <id> IS <block> END <id>}*
    /// BEGIN
    ///   <block>
    /// END <name>
    /// ```
    ///
    /// followed by the end of input.
    ///
    /// # Errors
    /// - A missing keyword, or a closing name that does not match.
    /// - An instruction named after a primitive, or defined twice.
    /// - Anything but end of input after the closing program name.
    pub fn parse_program(&mut self) -> Result<Program, ParserError> {
        self.expect(Token::Program)?;
        let (name, _) = self.expect_ident("program name")?;
        self.expect(Token::Is)?;

        let mut context = Program::new_context();
        while *self.peek() == Token::Instruction {
            let (instruction, body) = self.parse_instruction(&context)?;
            context.insert(instruction, body);
        }

        self.expect(Token::Begin)?;
        let body = self.parse_block()?;
        self.expect(Token::End)?;
        self.expect_closing_name("program", &name)?;

        if *self.peek() != Token::Eof {
            return TrailingInputSnafu {
                found: self.peek().to_string(),
                span: self.span(),
            }
            .fail();
        }

        debug!(
            program = %name,
            instructions = context.len(),
            "parsed program"
        );

        let mut program = Program::new();
        program.replace_context(context);
        program.replace_body(body);
        program.replace_name(name);
        Ok(program)
    }

    /// Parses one instruction definition:
    ///
    /// ```text
    /// INSTRUCTION <id> IS <block> END <id>
    /// ```
    ///
    /// `context` holds the instructions defined so far, for the uniqueness
    /// check.
    fn parse_instruction(&mut self, context: &Context) -> Result<(String, Statement), ParserError> {
        self.expect(Token::Instruction)?;
        let (name, span) = self.expect_ident("instruction name")?;

        if Instruction::is_primitive_name(&name) {
            return PrimitiveRedefinedSnafu { name, span }.fail();
        }
        if context.contains_key(&name) {
            return DuplicateInstructionSnafu { name, span }.fail();
        }

        self.expect(Token::Is)?;
        let body = self.parse_block()?;
        self.expect(Token::End)?;
        self.expect_closing_name("instruction", &name)?;

        Ok((name, body))
    }

    /// Parses a single statement, dispatching on the lookahead token.
    pub fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        match self.peek() {
            Token::If => self.nested(Self::parse_if),
            Token::While => self.nested(Self::parse_while),
            Token::Ident(_) => self.parse_call(),
            _ => Err(self.unexpected("a statement (IF, WHILE or an instruction call)")),
        }
    }

    /// Parses statements for as long as the lookahead can start one. The
    /// caller consumes whatever keyword ends the block.
    pub fn parse_block(&mut self) -> Result<Statement, ParserError> {
        let mut block = Block::new();
        while self.peek().starts_statement() {
            block.push(self.parse_statement()?);
        }
        Ok(Statement::Block(block))
    }

    /// ```text
    /// IF <condition> THEN <block> [ELSE <block>] END IF
    /// ```
    fn parse_if(&mut self) -> Result<Statement, ParserError> {
        self.expect(Token::If)?;
        let condition = self.parse_condition()?;
        self.expect(Token::Then)?;
        let then_body = self.parse_block()?;

        let statement = match self.peek() {
            Token::Else => {
                self.advance();
                let else_body = self.parse_block()?;
                Statement::assemble_if_else(condition, then_body, else_body)
            }
            Token::End => Statement::assemble_if(condition, then_body),
            _ => return Err(self.unexpected("'ELSE' or 'END'")),
        };

        self.expect(Token::End)?;
        self.expect(Token::If)?;
        Ok(statement)
    }

    /// ```text
    /// WHILE <condition> DO <block> END WHILE
    /// ```
    fn parse_while(&mut self) -> Result<Statement, ParserError> {
        self.expect(Token::While)?;
        let condition = self.parse_condition()?;
        self.expect(Token::Do)?;
        let body = self.parse_block()?;
        self.expect(Token::End)?;
        self.expect(Token::While)?;
        Ok(Statement::assemble_while(condition, body))
    }

    fn parse_call(&mut self) -> Result<Statement, ParserError> {
        let (name, _) = self.expect_ident("instruction name")?;
        Ok(Statement::assemble_call(name))
    }

    /// Runs `parse` one nesting level deeper.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Statement, ParserError>,
    ) -> Result<Statement, ParserError> {
        if self.depth == Self::MAX_NESTING {
            return TooDeepSnafu {
                limit: Self::MAX_NESTING,
                span: self.span(),
            }
            .fail();
        }
        self.depth += 1;
        let statement = parse(self);
        self.depth -= 1;
        statement
    }

    /// Accepts the exact condition token, or any word that matches a
    /// condition once case and `-`/`_` are normalized.
    fn parse_condition(&mut self) -> Result<Condition, ParserError> {
        let condition = match self.peek() {
            Token::Condition(condition) => Some(*condition),
            Token::Ident(word) | Token::Other(word) => Condition::parse(word),
            _ => None,
        };

        match condition {
            Some(condition) => {
                self.advance();
                Ok(condition)
            }
            None => InvalidConditionSnafu {
                found: self.peek().to_string(),
                span: self.span(),
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::lang::statement::Kind;

    fn tokens(source: &str) -> Vec<Spanned> {
        let mut lexer = Lexer::new(source);
        lexer.tokenize_clean().unwrap()
    }

    fn nested_ifs(depth: usize) -> String {
        format!(
            "PROGRAM P IS BEGIN {} move {} END P",
            "IF true THEN ".repeat(depth),
            "END IF ".repeat(depth)
        )
    }

    fn parse(source: &str) -> Program {
        Parser::new(tokens(source)).parse_program().unwrap()
    }

    fn parse_err(source: &str) -> ParserError {
        Parser::new(tokens(source)).parse_program().unwrap_err()
    }

    fn parse_block(source: &str) -> Statement {
        let mut parser = Parser::new(tokens(source));
        parser.parse_block().unwrap()
    }

    fn call(name: &str) -> Statement {
        Statement::assemble_call(name)
    }

    fn block(statements: Vec<Statement>) -> Statement {
        Statement::Block(Block::from(statements))
    }

    #[test]
    fn test_minimal_program() {
        let program = parse("PROGRAM Empty IS BEGIN END Empty");
        assert_eq!(program.name(), "Empty");
        assert!(program.context().is_empty());
        assert_eq!(program.body(), &Statement::new_block());
    }

    #[test]
    fn test_program_with_instructions() {
        let program = parse(
            r#"
            PROGRAM Test IS

              INSTRUCTION one IS
                move
                turnleft
              END one

              INSTRUCTION two IS
                one
                IF next-is-not-empty THEN
                  turnleft
                ELSE
                  one
                END IF
              END two

            BEGIN
              infect
              WHILE true DO
                two
                IF next-is-empty THEN
                  move
                END IF
                two
                one
              END WHILE
            END Test
            "#,
        );

        assert_eq!(program.name(), "Test");
        assert_eq!(program.instruction_names(), vec!["one", "two"]);
        assert_eq!(program.context()["one"], block(vec![call("move"), call("turnleft")]));

        let main = program.body().as_block().unwrap();
        assert_eq!(main.len(), 2);
        let kinds: Vec<_> = main.iter().map(Statement::kind).collect();
        assert_eq!(kinds, vec![Kind::Call, Kind::While]);
    }

    #[test]
    fn test_if_without_else() {
        let s = parse_block("IF next-is-wall THEN turnright END IF");
        assert_eq!(
            s,
            block(vec![Statement::assemble_if(
                Condition::NextIsWall,
                block(vec![call("turnright")])
            )])
        );
    }

    #[test]
    fn test_if_with_else() {
        let s = parse_block("IF random THEN turnleft ELSE turnright END IF");
        assert_eq!(
            s,
            block(vec![Statement::assemble_if_else(
                Condition::Random,
                block(vec![call("turnleft")]),
                block(vec![call("turnright")])
            )])
        );
    }

    #[test]
    fn test_while_with_empty_body() {
        let s = parse_block("WHILE next-is-friend DO END WHILE");
        assert_eq!(
            s,
            block(vec![Statement::assemble_while(
                Condition::NextIsFriend,
                Statement::new_block()
            )])
        );
    }

    #[test]
    fn test_block_stops_at_closing_keyword() {
        let mut parser = Parser::new(tokens("move skip END"));
        let s = parser.parse_block().unwrap();
        assert_eq!(s, block(vec![call("move"), call("skip")]));
        assert_eq!(*parser.peek(), Token::End);
    }

    #[test]
    fn test_parse_statement_single_call() {
        let mut parser = Parser::new(tokens("dance move"));
        assert_eq!(parser.parse_statement().unwrap(), call("dance"));
        assert_eq!(parser.parse_statement().unwrap(), call("move"));
    }

    #[test]
    fn test_forward_and_self_reference_parse() {
        let program = parse(
            "PROGRAM P IS INSTRUCTION a IS b a END a INSTRUCTION b IS move END b BEGIN a undefined END P",
        );
        assert_eq!(program.context()["a"], block(vec![call("b"), call("a")]));
        assert_eq!(program.body(), &block(vec![call("a"), call("undefined")]));
    }

    #[test]
    fn test_condition_spelling_is_normalized() {
        let s = parse_block("WHILE NEXT-IS-NOT-WALL DO move END WHILE");
        assert_eq!(
            s,
            block(vec![Statement::assemble_while(
                Condition::NextIsNotWall,
                block(vec![call("move")])
            )])
        );
    }

    #[test]
    fn test_condition_words_in_other_cases_are_identifiers() {
        let program = parse(
            "PROGRAM Random IS
               INSTRUCTION True IS move END True
             BEGIN
               True
               IF Random THEN True END IF
               WHILE next_is_empty DO skip END WHILE
             END Random",
        );
        assert_eq!(program.name(), "Random");
        assert_eq!(program.instruction_names(), vec!["True"]);

        let main = program.body().as_block().unwrap();
        assert_eq!(main.iter().next(), Some(&call("True")));
        let kinds: Vec<_> = main.iter().map(Statement::kind).collect();
        assert_eq!(kinds, vec![Kind::Call, Kind::If, Kind::While]);
        let (condition, _) = main.iter().nth(1).cloned().unwrap().disassemble_if().unwrap();
        assert_eq!(condition, Condition::Random);
    }

    #[test]
    fn test_invalid_condition_quotes_source_text() {
        let err = parse_err("PROGRAM P IS BEGIN IF Next-Is-Lava THEN move END IF END P");
        assert!(matches!(err, ParserError::InvalidCondition { ref found, .. } if found == "Next-Is-Lava"));
    }

    #[test]
    fn test_nesting_up_to_the_limit_parses() {
        let program = parse(&nested_ifs(Parser::MAX_NESTING));
        assert_eq!(program.body().as_block().unwrap().len(), 1);
    }

    #[test]
    fn test_nesting_past_the_limit_fails() {
        let err = parse_err(&nested_ifs(Parser::MAX_NESTING + 1));
        assert!(matches!(err, ParserError::TooDeep { limit: Parser::MAX_NESTING, .. }));
    }

    #[test]
    fn test_comments_are_ignored() {
        let program = parse(
            r#"
            # a robot that only walks
            PROGRAM Walker IS
            BEGIN
              move # forward
            END Walker
            "#,
        );
        assert_eq!(program.body(), &block(vec![call("move")]));
    }

    #[test]
    fn test_duplicate_instruction_fails() {
        let err = parse_err(
            "PROGRAM P IS INSTRUCTION a IS move END a INSTRUCTION a IS skip END a BEGIN END P",
        );
        assert!(matches!(err, ParserError::DuplicateInstruction { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_unique_instructions_succeed() {
        let program = parse(
            "PROGRAM P IS INSTRUCTION a IS move END a INSTRUCTION b IS skip END b BEGIN a b END P",
        );
        assert_eq!(program.context().len(), 2);
    }

    #[test]
    fn test_primitive_name_cannot_be_redefined() {
        for name in ["move", "turnleft", "turnright", "infect", "skip"] {
            let src = format!("PROGRAM P IS INSTRUCTION {name} IS skip END {name} BEGIN END P");
            let err = parse_err(&src);
            assert!(
                matches!(err, ParserError::PrimitiveRedefined { name: ref n, .. } if n == name),
                "err = {:?}",
                err
            );
        }
    }

    #[test]
    fn test_instruction_end_name_must_match() {
        let err = parse_err("PROGRAM P IS INSTRUCTION a IS move END b BEGIN END P");
        match err {
            ParserError::MismatchedName {
                construct,
                expected,
                found,
                ..
            } => {
                assert_eq!(construct, "instruction");
                assert_eq!(expected, "a");
                assert_eq!(found, "b");
            }
            other => panic!("expected MismatchedName, got {other:?}"),
        }
    }

    #[test]
    fn test_program_end_name_must_match() {
        let err = parse_err("PROGRAM Alpha IS BEGIN move END Beta");
        assert!(
            matches!(err, ParserError::MismatchedName { construct: "program", ref found, .. } if found == "Beta")
        );
    }

    #[test]
    fn test_missing_program_keyword() {
        let err = parse_err("PROGRAMME P IS BEGIN END P");
        assert!(matches!(err, ParserError::UnexpectedToken { .. }));
        assert!(err.to_string().contains("expected 'PROGRAM'"));
    }

    #[test]
    fn test_missing_is() {
        let err = parse_err("PROGRAM P BEGIN END P");
        assert!(err.to_string().contains("expected 'IS'"), "msg = {}", err);
    }

    #[test]
    fn test_missing_begin() {
        let err = parse_err("PROGRAM P IS move END P");
        assert!(err.to_string().contains("expected 'BEGIN'"), "msg = {}", err);
    }

    #[test]
    fn test_invalid_condition() {
        let err = parse_err("PROGRAM P IS BEGIN IF next-is-lava THEN move END IF END P");
        assert!(matches!(err, ParserError::InvalidCondition { ref found, .. } if found == "next-is-lava"));
    }

    #[test]
    fn test_missing_condition() {
        let err = parse_err("PROGRAM P IS BEGIN WHILE DO move END WHILE END P");
        assert!(matches!(err, ParserError::InvalidCondition { ref found, .. } if found == "DO"));
    }

    #[test]
    fn test_if_closed_by_end_while_fails() {
        let err = parse_err("PROGRAM P IS BEGIN IF true THEN move END WHILE END P");
        assert!(err.to_string().contains("expected 'IF'"), "msg = {}", err);
    }

    #[test]
    fn test_if_without_end() {
        let err = parse_err("PROGRAM P IS BEGIN IF true THEN move THEN END P");
        assert!(err.to_string().contains("'ELSE' or 'END'"), "msg = {}", err);
    }

    #[test]
    fn test_trailing_input_fails() {
        let err = parse_err("PROGRAM P IS BEGIN END P move");
        assert!(matches!(err, ParserError::TrailingInput { ref found, .. } if found == "move"));
    }

    #[test]
    fn test_punctuation_is_not_a_statement() {
        let err = parse_err("PROGRAM P IS BEGIN move; END P");
        assert!(err.to_string().contains("found ';'"), "msg = {}", err);
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = parse_err("PROGRAM P IS BEGIN move");
        assert!(err.to_string().contains("found 'end of input'"), "msg = {}", err);
        assert!(err.span().col > 0);
    }

    #[test]
    fn test_error_points_at_offending_token() {
        let src = "PROGRAM P IS\nBEGIN\n  move\n  IF true DO skip END IF\nEND P";
        let err = parse_err(src);
        assert_eq!(err.span(), Span { line: 4, col: 11 });
    }

    #[test]
    fn test_empty_input() {
        let err = parse_err("");
        assert_eq!(err.span(), Span { line: 1, col: 1 });
    }

    #[test]
    fn test_empty_token_stream_without_eof() {
        let err = Parser::new(Vec::new()).parse_program().unwrap_err();
        assert!(err.to_string().contains("expected 'PROGRAM'"));
    }
}
