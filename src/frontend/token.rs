use crate::lang::condition::Condition;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Program,
    Is,
    Begin,
    End,
    Instruction,
    If,
    Then,
    Else,
    While,
    Do,

    // Sensor condition: `next-is-empty`, `random`, `true`, ...
    Condition(Condition),

    // Identifier (program, instruction or call name)
    Ident(String),

    // Anything the grammar has no use for (punctuation, malformed words)
    Other(String),

    // Special
    Comment(String),
    Newline,
    Eof,
}

impl Token {
    /// Classifies a word produced by the lexer.
    ///
    /// Keywords and condition spellings are both case-sensitive and exact;
    /// any other spelling of a condition is left to the parser.
    pub fn from_word(word: &str) -> Token {
        match word {
            "PROGRAM" => Token::Program,
            "IS" => Token::Is,
            "BEGIN" => Token::Begin,
            "END" => Token::End,
            "INSTRUCTION" => Token::Instruction,
            "IF" => Token::If,
            "THEN" => Token::Then,
            "ELSE" => Token::Else,
            "WHILE" => Token::While,
            "DO" => Token::Do,
            _ => {
                if let Some(condition) = Condition::from_source(word) {
                    Token::Condition(condition)
                } else if is_identifier(word) {
                    Token::Ident(word.to_string())
                } else {
                    Token::Other(word.to_string())
                }
            }
        }
    }

    /// Returns true if this token can start a statement.
    pub fn starts_statement(&self) -> bool {
        matches!(self, Token::If | Token::While | Token::Ident(_))
    }
}

/// Returns true if `word` is a syntactically valid BL identifier: a letter
/// followed by letters, digits or `-`, and not a keyword or the exact
/// spelling of a condition.
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

    starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !is_keyword(word)
        && Condition::from_source(word).is_none()
}

pub fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "PROGRAM" | "IS" | "BEGIN" | "END" | "INSTRUCTION" | "IF" | "THEN" | "ELSE" | "WHILE" | "DO"
    )
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Program => write!(f, "PROGRAM"),
            Token::Is => write!(f, "IS"),
            Token::Begin => write!(f, "BEGIN"),
            Token::End => write!(f, "END"),
            Token::Instruction => write!(f, "INSTRUCTION"),
            Token::If => write!(f, "IF"),
            Token::Then => write!(f, "THEN"),
            Token::Else => write!(f, "ELSE"),
            Token::While => write!(f, "WHILE"),
            Token::Do => write!(f, "DO"),
            Token::Condition(c) => write!(f, "{}", c),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Other(s) => write!(f, "{}", s),
            Token::Comment(s) => write!(f, "# {}", s),
            Token::Newline => write!(f, "\\n"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
