use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::game::{Game, GameEvent, Screen, MISS_GRACE_MS};
use crate::policy::{Difficulty, TimeLimit};
use crate::stats::GameStats;

/// Menu order on the configuration screen.
pub const DIFFICULTIES: [Difficulty; 5] = [
    Difficulty::Zen,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Difficult,
    Difficulty::Hell,
];

pub const TIME_LIMITS: [TimeLimit; 5] = [
    TimeLimit::Seconds(15),
    TimeLimit::Seconds(30),
    TimeLimit::Seconds(60),
    TimeLimit::Seconds(120),
    TimeLimit::Infinite,
];

/// Transient wrong/missed key highlight; cleared when its time runs out or
/// a new target appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissFlash {
    pub key: char,
    pub ttl_ms: u64,
}

/// View model over the engine: routes key events per screen, applies the
/// engine's events to renderable state, and never computes game rules
/// itself.
#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub screen: Screen,
    pub countdown: u8,
    pub score: f64,
    pub time_remaining: TimeLimit,
    pub target: Option<char>,
    /// `Some` only while a finite decay budget is running.
    pub progress: Option<f64>,
    pub flash: Option<MissFlash>,
    pub stats: Option<GameStats>,
    pub difficulty_idx: usize,
    pub time_idx: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(difficulty: Difficulty, limit: TimeLimit) -> Self {
        let mut game = Game::new();
        game.set_difficulty(difficulty);
        game.set_time_limit(limit);
        let mut app = Self::wrap(game, difficulty, limit);
        app.game.init_session();
        app.apply_events();
        app
    }

    /// Deterministic variant for tests.
    pub fn from_seed(seed: u64, difficulty: Difficulty, limit: TimeLimit) -> Self {
        let mut game = Game::from_seed(seed);
        game.set_difficulty(difficulty);
        game.set_time_limit(limit);
        let mut app = Self::wrap(game, difficulty, limit);
        app.game.init_session();
        app.apply_events();
        app
    }

    fn wrap(game: Game, difficulty: Difficulty, limit: TimeLimit) -> Self {
        let difficulty_idx = DIFFICULTIES.iter().position(|&d| d == difficulty).unwrap_or(0);
        // A CLI-supplied duration outside the menu keeps working in the
        // engine; the cursor just starts on the closest stock option.
        let time_idx = TIME_LIMITS.iter().position(|&t| t == limit).unwrap_or(2);
        Self {
            game,
            screen: Screen::Config,
            countdown: 0,
            score: 0.0,
            time_remaining: limit,
            target: None,
            progress: None,
            flash: None,
            stats: None,
            difficulty_idx,
            time_idx,
            should_quit: false,
        }
    }

    /// Current settings in persistable form.
    pub fn settings(&self) -> Config {
        Config::from_settings(
            self.game.session().difficulty,
            self.game.session().time_limit,
        )
    }

    /// One runtime tick: advance the engine clock, age the miss flash, and
    /// fold any emitted events into the view.
    pub fn on_tick(&mut self, dt_ms: u64) {
        self.game.advance(dt_ms);
        if let Some(flash) = &mut self.flash {
            flash.ttl_ms = flash.ttl_ms.saturating_sub(dt_ms);
            if flash.ttl_ms == 0 {
                self.flash = None;
            }
        }
        self.apply_events();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Config => self.handle_config_key(key),
            Screen::Instructions => match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                    self.screen = Screen::Config;
                }
                _ => {}
            },
            Screen::Countdown => {}
            Screen::Playing => match key.code {
                KeyCode::Esc => self.game.force_end(),
                KeyCode::Char(c) => self.game.handle_key_press(c),
                _ => {}
            },
            Screen::GameOver => match key.code {
                KeyCode::Char('r') => self.game.init_session(),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
        }

        self.apply_events();
    }

    fn handle_config_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => {
                self.difficulty_idx = self.difficulty_idx.saturating_sub(1);
                self.game.set_difficulty(DIFFICULTIES[self.difficulty_idx]);
            }
            KeyCode::Right => {
                self.difficulty_idx = (self.difficulty_idx + 1).min(DIFFICULTIES.len() - 1);
                self.game.set_difficulty(DIFFICULTIES[self.difficulty_idx]);
            }
            KeyCode::Up => {
                self.time_idx = self.time_idx.saturating_sub(1);
                self.game.set_time_limit(TIME_LIMITS[self.time_idx]);
            }
            KeyCode::Down => {
                self.time_idx = (self.time_idx + 1).min(TIME_LIMITS.len() - 1);
                self.game.set_time_limit(TIME_LIMITS[self.time_idx]);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.game.start_session(),
            KeyCode::Char('i') => self.screen = Screen::Instructions,
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn apply_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::ScreenChanged(screen) => {
                    self.screen = screen;
                    if screen == Screen::Config {
                        self.stats = None;
                        self.target = None;
                        self.progress = None;
                        self.flash = None;
                    }
                }
                GameEvent::CountdownTick(n) => self.countdown = n,
                GameEvent::TimerUpdated(t) => self.time_remaining = t,
                GameEvent::TargetChanged(c) => {
                    self.target = Some(c);
                    self.flash = None;
                    self.progress = self
                        .game
                        .session()
                        .char_budget
                        .millis()
                        .map(|_| 1.0);
                }
                GameEvent::ProgressUpdated(fraction) => self.progress = Some(fraction),
                GameEvent::KeyMissed(c) => {
                    self.flash = Some(MissFlash {
                        key: c,
                        ttl_ms: MISS_GRACE_MS,
                    });
                }
                GameEvent::ScoreUpdated(score) => self.score = score,
                GameEvent::GameOver(stats) => self.stats = Some(stats),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Phase;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::from_seed(11, Difficulty::Medium, TimeLimit::Seconds(60))
    }

    /// Enter + three seconds of ticks lands on the playing screen.
    fn start_playing(app: &mut App) {
        app.handle_key(key(KeyCode::Enter));
        for _ in 0..60 {
            app.on_tick(50);
        }
        assert_eq!(app.screen, Screen::Playing);
    }

    #[test]
    fn starts_on_config_screen_with_given_settings() {
        let app = app();
        assert_eq!(app.screen, Screen::Config);
        assert_eq!(app.difficulty_idx, 2);
        assert_eq!(app.time_idx, 2);
        assert_eq!(app.time_remaining, TimeLimit::Seconds(60));
        assert!(!app.should_quit);
    }

    #[test]
    fn config_cursors_move_and_update_the_engine() {
        let mut app = app();

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.game.session().difficulty, Difficulty::Difficult);
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left)); // saturates at zen
        assert_eq!(app.game.session().difficulty, Difficulty::Zen);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down)); // saturates at infinite
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.game.session().time_limit, TimeLimit::Infinite);
        assert_eq!(app.time_remaining, TimeLimit::Infinite);
    }

    #[test]
    fn enter_starts_countdown_then_play() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Countdown);
        assert_eq!(app.countdown, 3);

        for _ in 0..20 {
            app.on_tick(50);
        }
        assert_eq!(app.countdown, 2);

        for _ in 0..40 {
            app.on_tick(50);
        }
        assert_eq!(app.screen, Screen::Playing);
        assert!(app.target.is_some());
        assert_eq!(app.progress, Some(1.0));
    }

    #[test]
    fn correct_press_updates_score_and_target() {
        let mut app = app();
        start_playing(&mut app);

        let target = app.target.unwrap();
        app.handle_key(key(KeyCode::Char(target)));
        assert_eq!(app.score, 2.0);
        assert!(app.target.is_some());
    }

    #[test]
    fn wrong_key_flashes_then_fades() {
        let mut app = app();
        start_playing(&mut app);

        let target = app.target.unwrap();
        let wrong = crate::policy::VALID_CHARS
            .chars()
            .find(|&c| c != target)
            .unwrap();
        app.handle_key(key(KeyCode::Char(wrong)));
        assert_eq!(app.flash.map(|f| f.key), Some(wrong));

        for _ in 0..6 {
            app.on_tick(50);
        }
        assert_eq!(app.flash, None);
    }

    #[test]
    fn zen_play_has_no_progress_gauge() {
        let mut app = App::from_seed(5, Difficulty::Zen, TimeLimit::Infinite);
        start_playing(&mut app);
        assert_eq!(app.progress, None);
        assert_eq!(app.time_remaining, TimeLimit::Infinite);
    }

    #[test]
    fn escape_during_play_ends_with_stats() {
        let mut app = app();
        start_playing(&mut app);

        let target = app.target.unwrap();
        app.handle_key(key(KeyCode::Char(target)));
        app.handle_key(key(KeyCode::Esc));

        assert_eq!(app.screen, Screen::GameOver);
        let stats = app.stats.clone().expect("stats after game over");
        assert_eq!(stats.keystrokes, 1);
        assert_eq!(stats.display_score, 2.0);
    }

    #[test]
    fn restart_returns_to_config_and_clears_view() {
        let mut app = app();
        start_playing(&mut app);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::GameOver);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.screen, Screen::Config);
        assert_eq!(app.game.phase(), Phase::Idle);
        assert_eq!(app.score, 0.0);
        assert_eq!(app.stats, None);
        assert_eq!(app.target, None);
    }

    #[test]
    fn instructions_screen_is_view_only() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.screen, Screen::Instructions);
        assert_eq!(app.game.phase(), Phase::Idle);

        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.screen, Screen::Config);
    }

    #[test]
    fn ctrl_c_quits_from_any_screen() {
        let mut app = app();
        start_playing(&mut app);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn settings_round_trip_into_config() {
        let app = App::from_seed(1, Difficulty::Hell, TimeLimit::Infinite);
        let cfg = app.settings();
        assert_eq!(cfg.difficulty(), Difficulty::Hell);
        assert_eq!(cfg.time_limit(), TimeLimit::Infinite);
    }
}
