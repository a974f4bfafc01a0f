use crate::policy::{Budget, Difficulty, TimeLimit};

/// Where the player is in the game lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    Playing,
    GameOver,
}

/// The single mutable record of a game in progress. Created at startup,
/// reset on every restart, and mutated only by the engine.
#[derive(Debug, Clone)]
pub struct Session {
    /// True only during the play phase.
    pub active: bool,
    /// Clamped to `[0, MAX_SCORE]`; never decreases while active.
    pub score: f64,
    /// Correct key presses only.
    pub keystrokes: u32,
    pub difficulty: Difficulty,
    pub time_limit: TimeLimit,
    /// Counts down once per second while active; stays `Infinite` when the
    /// limit is infinite.
    pub time_remaining: TimeLimit,
    /// Exactly one target is set whenever `active` is true.
    pub current_target: Option<char>,
    /// Decay time allotted to the current target, fixed at generation.
    pub char_budget: Budget,
    /// Counts down from the budget; saturates at zero.
    pub char_remaining_ms: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            active: false,
            score: 0.0,
            keystrokes: 0,
            difficulty: Difficulty::Zen,
            time_limit: TimeLimit::Seconds(60),
            time_remaining: TimeLimit::Seconds(60),
            current_target: None,
            char_budget: Budget::Infinite,
            char_remaining_ms: 0,
        }
    }
}
