use snafu::Snafu;

#[derive(Debug, Clone, Snafu)]
pub enum CompileError {
    /// A call to a name that is neither a primitive nor defined in the
    /// program's context
    #[snafu(display(
        "compile error: call to undefined instruction '{name}'\n  hint: define it with 'INSTRUCTION {name} IS ... END {name}' or call one of move, turnleft, turnright, infect, skip"
    ))]
    UndefinedInstruction { name: String },

    /// Instructions that call themselves, directly or through others. Calls
    /// are compiled by inlining, so such a program has no finite expansion.
    #[snafu(display(
        "compile error: instruction '{}' calls itself: {}\n  hint: instructions are expanded inline, so recursion cannot be compiled; use a WHILE loop instead",
        chain.first().map(String::as_str).unwrap_or_default(),
        chain.join(" -> ")
    ))]
    RecursiveInstruction {
        /// Call chain from the first instruction of the cycle back to itself.
        chain: Vec<String>,
    },

    /// Control statements nested deeper than the generator allows, counting
    /// the levels added by inlined instruction bodies.
    #[snafu(display(
        "compile error: statements nested more than {limit} levels deep after inlining\n  hint: split deeply nested instructions into WHILE loops or flatter bodies"
    ))]
    TooDeep { limit: usize },
}

impl CompileError {
    pub fn undefined(name: impl Into<String>) -> Self {
        CompileError::UndefinedInstruction { name: name.into() }
    }

    pub fn recursive(chain: Vec<String>) -> Self {
        CompileError::RecursiveInstruction { chain }
    }

    pub fn too_deep(limit: usize) -> Self {
        CompileError::TooDeep { limit }
    }
}
