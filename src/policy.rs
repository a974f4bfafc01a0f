use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// Every character the game can ask for: lowercase letters, digits, and the
/// punctuation reachable without shift on a US layout. The on-screen
/// keyboard rows cover exactly this set.
pub const VALID_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789-=[];',.";

/// Score ceiling. The largest integer a double represents exactly; the
/// score clamps here instead of overflowing.
pub const MAX_SCORE: f64 = 9_007_199_254_740_991.0;

/// Difficulty tier, ordered from no pressure to very little time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Difficulty {
    Zen,
    Easy,
    Medium,
    Difficult,
    Hell,
}

impl Difficulty {
    /// Time allotted to each target character before it counts as missed.
    pub fn char_budget(&self) -> Budget {
        match self {
            Difficulty::Zen => Budget::Infinite,
            Difficulty::Easy => Budget::Millis(5_000),
            Difficulty::Medium => Budget::Millis(2_000),
            Difficulty::Difficult => Budget::Millis(1_000),
            Difficulty::Hell => Budget::Millis(500),
        }
    }

    /// Total lookup for labels coming from a config file. Unrecognized
    /// labels fall back to easy.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "zen" => Difficulty::Zen,
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "difficult" => Difficulty::Difficult,
            "hell" => Difficulty::Hell,
            _ => Difficulty::Easy,
        }
    }

    pub fn label(&self) -> String {
        self.to_string().to_lowercase()
    }
}

/// Decay time for a single target character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Budget {
    Millis(u64),
    Infinite,
}

impl Budget {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Budget::Infinite)
    }

    pub fn millis(&self) -> Option<u64> {
        match self {
            Budget::Millis(ms) => Some(*ms),
            Budget::Infinite => None,
        }
    }
}

/// Whole-session time limit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeLimit {
    Seconds(u32),
    Infinite,
}

impl TimeLimit {
    pub fn is_infinite(&self) -> bool {
        matches!(self, TimeLimit::Infinite)
    }

    pub fn seconds(&self) -> Option<u32> {
        match self {
            TimeLimit::Seconds(s) => Some(*s),
            TimeLimit::Infinite => None,
        }
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLimit::Seconds(s) => write!(f, "{}s", s),
            TimeLimit::Infinite => write!(f, "∞"),
        }
    }
}

impl FromStr for TimeLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("infinite") {
            return Ok(TimeLimit::Infinite);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(TimeLimit::Seconds(n)),
            _ => Err(format!(
                "expected a positive number of seconds or \"infinite\", got {:?}",
                s
            )),
        }
    }
}

pub fn is_valid_char(c: char) -> bool {
    VALID_CHARS.contains(c)
}
