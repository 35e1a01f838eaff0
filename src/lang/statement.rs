use super::condition::Condition;

/// Variant tag of a `Statement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Block,
    If,
    IfElse,
    While,
    Call,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Block => "BLOCK",
            Kind::If => "IF",
            Kind::IfElse => "IF_ELSE",
            Kind::While => "WHILE",
            Kind::Call => "CALL",
        };
        write!(f, "{}", name)
    }
}

/// BL statement tree.
///
/// Every node owns its children. Composite nodes are taken apart with the
/// `disassemble_*` methods, which consume the node and hand the payload back
/// by value, and rebuilt with the matching `assemble_*` constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Ordered sequence of statements, executed in order.
    Block(Block),

    /// `IF <condition> THEN <body> END IF`.
    If {
        condition: Condition,
        body: Box<Statement>,
    },

    /// `IF <condition> THEN <then_body> ELSE <else_body> END IF`.
    IfElse {
        condition: Condition,
        then_body: Box<Statement>,
        else_body: Box<Statement>,
    },

    /// `WHILE <condition> DO <body> END WHILE`.
    While {
        condition: Condition,
        body: Box<Statement>,
    },

    /// Call of a primitive or user-defined instruction.
    Call(String),
}

impl Default for Statement {
    fn default() -> Self {
        Statement::new_block()
    }
}

impl Statement {
    /// An empty `BLOCK`.
    pub fn new_block() -> Self {
        Statement::Block(Block::new())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Statement::Block(_) => Kind::Block,
            Statement::If { .. } => Kind::If,
            Statement::IfElse { .. } => Kind::IfElse,
            Statement::While { .. } => Kind::While,
            Statement::Call(_) => Kind::Call,
        }
    }

    pub fn assemble_if(condition: Condition, body: Statement) -> Self {
        Statement::If {
            condition,
            body: Box::new(body),
        }
    }

    pub fn assemble_if_else(condition: Condition, then_body: Statement, else_body: Statement) -> Self {
        Statement::IfElse {
            condition,
            then_body: Box::new(then_body),
            else_body: Box::new(else_body),
        }
    }

    pub fn assemble_while(condition: Condition, body: Statement) -> Self {
        Statement::While {
            condition,
            body: Box::new(body),
        }
    }

    pub fn assemble_call(name: impl Into<String>) -> Self {
        Statement::Call(name.into())
    }

    /// Takes an `IF` apart. Any other kind is handed back unchanged in `Err`.
    pub fn disassemble_if(self) -> Result<(Condition, Statement), Statement> {
        match self {
            Statement::If { condition, body } => Ok((condition, *body)),
            other => Err(other),
        }
    }

    /// Takes an `IF_ELSE` apart into condition, then-branch and else-branch.
    pub fn disassemble_if_else(self) -> Result<(Condition, Statement, Statement), Statement> {
        match self {
            Statement::IfElse {
                condition,
                then_body,
                else_body,
            } => Ok((condition, *then_body, *else_body)),
            other => Err(other),
        }
    }

    pub fn disassemble_while(self) -> Result<(Condition, Statement), Statement> {
        match self {
            Statement::While { condition, body } => Ok((condition, *body)),
            other => Err(other),
        }
    }

    pub fn disassemble_call(self) -> Result<String, Statement> {
        match self {
            Statement::Call(name) => Ok(name),
            other => Err(other),
        }
    }

    pub fn into_block(self) -> Result<Block, Statement> {
        match self {
            Statement::Block(block) => Ok(block),
            other => Err(other),
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Statement::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Statement::Block(block) => Some(block),
            _ => None,
        }
    }
}

impl From<Block> for Statement {
    fn from(block: Block) -> Self {
        Statement::Block(block)
    }
}

/// Payload of a `BLOCK` statement.
///
/// Indices are zero-based. `add` accepts `0..=len` and `remove` accepts
/// `0..len`; both shift the following statements, and both panic out of
/// range exactly like `Vec::insert` and `Vec::remove`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    statements: Vec<Statement>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn add(&mut self, index: usize, statement: Statement) {
        self.statements.insert(index, statement);
    }

    pub fn remove(&mut self, index: usize) -> Statement {
        self.statements.remove(index)
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }
}

impl From<Vec<Statement>> for Block {
    fn from(statements: Vec<Statement>) -> Self {
        Block { statements }
    }
}

impl FromIterator<Statement> for Block {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Block {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Block {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Block {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
