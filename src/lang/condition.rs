/// Sensor predicate evaluated by the robot at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    NextIsEmpty,
    NextIsNotEmpty,
    NextIsEnemy,
    NextIsNotEnemy,
    NextIsFriend,
    NextIsNotFriend,
    NextIsWall,
    NextIsNotWall,
    Random,
    True,
}

impl Condition {
    pub const ALL: [Condition; 10] = [
        Condition::NextIsEmpty,
        Condition::NextIsNotEmpty,
        Condition::NextIsEnemy,
        Condition::NextIsNotEnemy,
        Condition::NextIsFriend,
        Condition::NextIsNotFriend,
        Condition::NextIsWall,
        Condition::NextIsNotWall,
        Condition::Random,
        Condition::True,
    ];

    /// Exact source spelling only, as the lexer sees it. `Random` or
    /// `NEXT-IS-WALL` are not conditions here; they lex as words.
    pub fn from_source(word: &str) -> Option<Condition> {
        Condition::ALL.into_iter().find(|c| c.as_str() == word)
    }

    /// Matches a word written where a condition is expected. Hyphens and
    /// underscores are interchangeable and case is ignored, so
    /// `next-is-empty` and `NEXT_IS_EMPTY` agree.
    pub fn parse(word: &str) -> Option<Condition> {
        let normalized = word.replace('-', "_").to_ascii_uppercase();
        let condition = match normalized.as_str() {
            "NEXT_IS_EMPTY" => Condition::NextIsEmpty,
            "NEXT_IS_NOT_EMPTY" => Condition::NextIsNotEmpty,
            "NEXT_IS_ENEMY" => Condition::NextIsEnemy,
            "NEXT_IS_NOT_ENEMY" => Condition::NextIsNotEnemy,
            "NEXT_IS_FRIEND" => Condition::NextIsFriend,
            "NEXT_IS_NOT_FRIEND" => Condition::NextIsNotFriend,
            "NEXT_IS_WALL" => Condition::NextIsWall,
            "NEXT_IS_NOT_WALL" => Condition::NextIsNotWall,
            "RANDOM" => Condition::Random,
            "TRUE" => Condition::True,
            _ => return None,
        };
        Some(condition)
    }

    /// Canonical source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::NextIsEmpty => "next-is-empty",
            Condition::NextIsNotEmpty => "next-is-not-empty",
            Condition::NextIsEnemy => "next-is-enemy",
            Condition::NextIsNotEnemy => "next-is-not-enemy",
            Condition::NextIsFriend => "next-is-friend",
            Condition::NextIsNotFriend => "next-is-not-friend",
            Condition::NextIsWall => "next-is-wall",
            Condition::NextIsNotWall => "next-is-not-wall",
            Condition::Random => "random",
            Condition::True => "true",
        }
    }

    /// The logical complement, for the sensor conditions that have one.
    pub fn negated(self) -> Option<Condition> {
        match self {
            Condition::NextIsEmpty => Some(Condition::NextIsNotEmpty),
            Condition::NextIsNotEmpty => Some(Condition::NextIsEmpty),
            Condition::NextIsEnemy => Some(Condition::NextIsNotEnemy),
            Condition::NextIsNotEnemy => Some(Condition::NextIsEnemy),
            Condition::NextIsFriend => Some(Condition::NextIsNotFriend),
            Condition::NextIsNotFriend => Some(Condition::NextIsFriend),
            Condition::NextIsWall => Some(Condition::NextIsNotWall),
            Condition::NextIsNotWall => Some(Condition::NextIsWall),
            Condition::Random | Condition::True => None,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(
            self,
            Condition::NextIsNotEmpty
                | Condition::NextIsNotEnemy
                | Condition::NextIsNotFriend
                | Condition::NextIsNotWall
        )
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
