use crate::policy::{Difficulty, TimeLimit};
use crate::util::round_tenths;

/// End-of-game snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStats {
    /// Score rounded to one decimal for display.
    pub display_score: f64,
    pub keystrokes: u32,
    /// Keystrokes per minute, rounded to one decimal.
    pub kpm: f64,
    pub difficulty: Difficulty,
    pub time_limit: TimeLimit,
}

impl GameStats {
    pub fn compute(
        score: f64,
        keystrokes: u32,
        difficulty: Difficulty,
        time_limit: TimeLimit,
        time_remaining: TimeLimit,
    ) -> Self {
        // With no time limit there is no elapsed duration to derive; a
        // fixed minute keeps the rate meaningful.
        let elapsed_minutes = match (time_limit.seconds(), time_remaining.seconds()) {
            (Some(limit), Some(remaining)) => f64::from(limit.saturating_sub(remaining)) / 60.0,
            _ => 1.0,
        };

        let kpm = if keystrokes == 0 {
            0.0
        } else {
            let rate = round_tenths(f64::from(keystrokes) / elapsed_minutes.max(0.01));
            if rate.is_finite() {
                rate
            } else {
                0.0
            }
        };

        Self {
            display_score: round_tenths(score),
            keystrokes,
            kpm,
            difficulty,
            time_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpm_from_half_elapsed_session() {
        let stats = GameStats::compute(
            20.0,
            15,
            Difficulty::Medium,
            TimeLimit::Seconds(60),
            TimeLimit::Seconds(30),
        );
        // 30 elapsed seconds -> 0.5 minutes -> 15 / 0.5
        assert_eq!(stats.kpm, 30.0);
        assert_eq!(stats.display_score, 20.0);
        assert_eq!(stats.keystrokes, 15);
    }

    #[test]
    fn test_kpm_infinite_limit_uses_one_minute() {
        let stats = GameStats::compute(
            5.0,
            42,
            Difficulty::Zen,
            TimeLimit::Infinite,
            TimeLimit::Infinite,
        );
        assert_eq!(stats.kpm, 42.0);
        assert_eq!(stats.time_limit, TimeLimit::Infinite);
    }

    #[test]
    fn test_kpm_zero_keystrokes() {
        let stats = GameStats::compute(
            0.0,
            0,
            Difficulty::Hell,
            TimeLimit::Seconds(60),
            TimeLimit::Seconds(0),
        );
        assert_eq!(stats.kpm, 0.0);
    }

    #[test]
    fn test_kpm_instant_end_clamps_duration() {
        // Ending with the full limit remaining would divide by zero
        // minutes; the 0.01 floor keeps the rate finite.
        let stats = GameStats::compute(
            2.0,
            1,
            Difficulty::Easy,
            TimeLimit::Seconds(60),
            TimeLimit::Seconds(60),
        );
        assert_eq!(stats.kpm, 100.0);
    }

    #[test]
    fn test_display_score_rounds_to_tenths() {
        let stats = GameStats::compute(
            10.25,
            7,
            Difficulty::Easy,
            TimeLimit::Seconds(60),
            TimeLimit::Seconds(30),
        );
        assert_eq!(stats.display_score, 10.3);
    }
}
