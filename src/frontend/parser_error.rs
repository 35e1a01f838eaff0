use snafu::Snafu;

use crate::frontend::lexer::{LexerError, Span};

/// A fatal parse error.
///
/// Every variant carries the 1-based location of the offending token. For
/// errors at end of input the parser falls back to the last consumed token,
/// so locations are never `0:0`. Display is `line:col: message`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParserError {
    #[snafu(display("{}:{}: expected {expected}, found '{found}'", span.line, span.col))]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[snafu(display(
        "{}:{}: expected a condition (next-is-empty, next-is-not-empty, next-is-enemy, \
         next-is-not-enemy, next-is-friend, next-is-not-friend, next-is-wall, \
         next-is-not-wall, random or true), found '{found}'",
        span.line,
        span.col
    ))]
    InvalidCondition { found: String, span: Span },

    #[snafu(display(
        "{}:{}: {construct} '{expected}' must be closed by 'END {expected}', found 'END {found}'",
        span.line,
        span.col
    ))]
    MismatchedName {
        construct: &'static str,
        expected: String,
        found: String,
        span: Span,
    },

    #[snafu(display("{}:{}: instruction '{name}' is already defined", span.line, span.col))]
    DuplicateInstruction { name: String, span: Span },

    #[snafu(display(
        "{}:{}: '{name}' is a primitive instruction and cannot be redefined",
        span.line,
        span.col
    ))]
    PrimitiveRedefined { name: String, span: Span },

    #[snafu(display(
        "{}:{}: expected end of input after the program, found '{found}'",
        span.line,
        span.col
    ))]
    TrailingInput { found: String, span: Span },

    #[snafu(display(
        "{}:{}: statements nested more than {limit} levels deep",
        span.line,
        span.col
    ))]
    TooDeep { limit: usize, span: Span },

    #[snafu(context(false), display("{source}"))]
    Lex { source: LexerError },
}

impl ParserError {
    pub fn span(&self) -> Span {
        match self {
            ParserError::UnexpectedToken { span, .. }
            | ParserError::InvalidCondition { span, .. }
            | ParserError::MismatchedName { span, .. }
            | ParserError::DuplicateInstruction { span, .. }
            | ParserError::PrimitiveRedefined { span, .. }
            | ParserError::TrailingInput { span, .. }
            | ParserError::TooDeep { span, .. } => *span,
            ParserError::Lex { source } => source.span(),
        }
    }
}
