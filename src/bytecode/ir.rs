use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu};

/// A compiled BL program: one flat sequence of opcodes and jump operands.
///
/// The sequence is produced once by the code generator and never changed
/// afterwards; there is no public way to mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramBc {
    code: Vec<usize>,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    #[snafu(display("bytecode text is empty, expected a length on the first line"))]
    MissingLength,

    #[snafu(display("line {line}: expected a non-negative integer, found '{text}'"))]
    InvalidNumber { line: usize, text: String },

    #[snafu(display("length prefix says {declared} values but {actual} follow"))]
    LengthMismatch { declared: usize, actual: usize },

    #[snafu(display("postcard: {source}"))]
    Postcard { source: postcard::Error },
}

impl ProgramBc {
    pub(crate) fn from_code(code: Vec<usize>) -> Self {
        Self { code }
    }

    pub fn code(&self) -> &[usize] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Persisted text form: the length on the first line, then one value
    /// per line.
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.code.len());
        for value in &self.code {
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out
    }

    /// Reads the form written by `to_text`. Blank lines are ignored.
    pub fn from_text(text: &str) -> Result<Self, FormatError> {
        let mut values = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .map(|(line, l)| {
                l.parse::<usize>().ok().context(InvalidNumberSnafu { line, text: l })
            });

        let declared = values.next().context(MissingLengthSnafu)??;
        let code = values.collect::<Result<Vec<usize>, FormatError>>()?;

        if code.len() != declared {
            return LengthMismatchSnafu {
                declared,
                actual: code.len(),
            }
            .fail();
        }

        Ok(Self { code })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        postcard::to_allocvec(self).context(PostcardSnafu)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        postcard::from_bytes(bytes).context(PostcardSnafu)
    }
}
