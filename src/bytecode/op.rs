use crate::lang::condition::Condition;

// =============================================================================
// INSTRUCTION - Robot virtual machine opcodes
// =============================================================================

/// Opcodes of the robot virtual machine, with their fixed numeric encoding.
///
/// `Jump` and the conditional jumps are followed by one operand: the absolute
/// index of the jump target. A conditional jump is taken when its condition
/// is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    // primitives
    Move,
    TurnLeft,
    TurnRight,
    Infect,
    Skip,

    Halt,

    // control flow
    Jump,
    JumpIfNotNextIsEmpty,
    JumpIfNotNextIsNotEmpty,
    JumpIfNotNextIsEnemy,
    JumpIfNotNextIsNotEnemy,
    JumpIfNotNextIsFriend,
    JumpIfNotNextIsNotFriend,
    JumpIfNotNextIsWall,
    JumpIfNotNextIsNotWall,
    JumpIfNotRandom,
    JumpIfNotTrue,
}

impl Instruction {
    /// Source names of the primitive instructions.
    pub const PRIMITIVE_NAMES: [&'static str; 5] = ["move", "turnleft", "turnright", "infect", "skip"];

    const ALL: [Instruction; 17] = [
        Instruction::Move,
        Instruction::TurnLeft,
        Instruction::TurnRight,
        Instruction::Infect,
        Instruction::Skip,
        Instruction::Halt,
        Instruction::Jump,
        Instruction::JumpIfNotNextIsEmpty,
        Instruction::JumpIfNotNextIsNotEmpty,
        Instruction::JumpIfNotNextIsEnemy,
        Instruction::JumpIfNotNextIsNotEnemy,
        Instruction::JumpIfNotNextIsFriend,
        Instruction::JumpIfNotNextIsNotFriend,
        Instruction::JumpIfNotNextIsWall,
        Instruction::JumpIfNotNextIsNotWall,
        Instruction::JumpIfNotRandom,
        Instruction::JumpIfNotTrue,
    ];

    pub fn byte_code(self) -> usize {
        match self {
            Instruction::Move => 0,
            Instruction::TurnLeft => 1,
            Instruction::TurnRight => 2,
            Instruction::Infect => 3,
            Instruction::Skip => 4,
            Instruction::Halt => 5,
            Instruction::Jump => 6,
            Instruction::JumpIfNotNextIsEmpty => 7,
            Instruction::JumpIfNotNextIsNotEmpty => 8,
            Instruction::JumpIfNotNextIsEnemy => 9,
            Instruction::JumpIfNotNextIsNotEnemy => 10,
            Instruction::JumpIfNotNextIsFriend => 11,
            Instruction::JumpIfNotNextIsNotFriend => 12,
            Instruction::JumpIfNotNextIsWall => 13,
            Instruction::JumpIfNotNextIsNotWall => 14,
            Instruction::JumpIfNotRandom => 15,
            Instruction::JumpIfNotTrue => 16,
        }
    }

    pub fn from_byte_code(code: usize) -> Option<Instruction> {
        Self::ALL.get(code).copied()
    }

    /// True for the jumps, which are followed by a target operand.
    pub fn has_operand(self) -> bool {
        self.byte_code() >= Instruction::Jump.byte_code()
    }

    /// The primitive instruction called `name` in BL source.
    pub fn primitive(name: &str) -> Option<Instruction> {
        match name {
            "move" => Some(Instruction::Move),
            "turnleft" => Some(Instruction::TurnLeft),
            "turnright" => Some(Instruction::TurnRight),
            "infect" => Some(Instruction::Infect),
            "skip" => Some(Instruction::Skip),
            _ => None,
        }
    }

    pub fn is_primitive_name(name: &str) -> bool {
        Self::primitive(name).is_some()
    }

    /// The jump taken when `condition` does not hold.
    pub fn conditional_jump(condition: Condition) -> Instruction {
        match condition {
            Condition::NextIsEmpty => Instruction::JumpIfNotNextIsEmpty,
            Condition::NextIsNotEmpty => Instruction::JumpIfNotNextIsNotEmpty,
            Condition::NextIsEnemy => Instruction::JumpIfNotNextIsEnemy,
            Condition::NextIsNotEnemy => Instruction::JumpIfNotNextIsNotEnemy,
            Condition::NextIsFriend => Instruction::JumpIfNotNextIsFriend,
            Condition::NextIsNotFriend => Instruction::JumpIfNotNextIsNotFriend,
            Condition::NextIsWall => Instruction::JumpIfNotNextIsWall,
            Condition::NextIsNotWall => Instruction::JumpIfNotNextIsNotWall,
            Condition::Random => Instruction::JumpIfNotRandom,
            Condition::True => Instruction::JumpIfNotTrue,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Move => "MOVE",
            Instruction::TurnLeft => "TURNLEFT",
            Instruction::TurnRight => "TURNRIGHT",
            Instruction::Infect => "INFECT",
            Instruction::Skip => "SKIP",
            Instruction::Halt => "HALT",
            Instruction::Jump => "JUMP",
            Instruction::JumpIfNotNextIsEmpty => "JUMP_IF_NOT_NEXT_IS_EMPTY",
            Instruction::JumpIfNotNextIsNotEmpty => "JUMP_IF_NOT_NEXT_IS_NOT_EMPTY",
            Instruction::JumpIfNotNextIsEnemy => "JUMP_IF_NOT_NEXT_IS_ENEMY",
            Instruction::JumpIfNotNextIsNotEnemy => "JUMP_IF_NOT_NEXT_IS_NOT_ENEMY",
            Instruction::JumpIfNotNextIsFriend => "JUMP_IF_NOT_NEXT_IS_FRIEND",
            Instruction::JumpIfNotNextIsNotFriend => "JUMP_IF_NOT_NEXT_IS_NOT_FRIEND",
            Instruction::JumpIfNotNextIsWall => "JUMP_IF_NOT_NEXT_IS_WALL",
            Instruction::JumpIfNotNextIsNotWall => "JUMP_IF_NOT_NEXT_IS_NOT_WALL",
            Instruction::JumpIfNotRandom => "JUMP_IF_NOT_RANDOM",
            Instruction::JumpIfNotTrue => "JUMP_IF_NOT_TRUE",
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
