use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::policy::{self, Budget, Difficulty, TimeLimit, MAX_SCORE};
use crate::session::{Phase, Session};
use crate::stats::GameStats;
use crate::timer::{TimerId, TimerKind, TimerWheel};
use crate::util::{ceil_tenths, round_tenths};

/// Granularity of the decay gauge updates.
pub const PROGRESS_TICK_MS: u64 = 50;
/// Pause between a miss being shown and the next target appearing.
pub const MISS_GRACE_MS: u64 = 300;
/// Pre-game countdown starts here and ticks once per second.
pub const COUNTDOWN_FROM: u8 = 3;

/// Screens the presentation layer can show. The engine drives all of them
/// except `Instructions`, which the UI enters on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Config,
    Countdown,
    Playing,
    GameOver,
    Instructions,
}

/// Everything the engine tells the outside world. The presentation layer
/// drains these after every key press or tick and renders accordingly.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScreenChanged(Screen),
    CountdownTick(u8),
    TimerUpdated(TimeLimit),
    TargetChanged(char),
    /// Fraction of the decay budget remaining, in `[0, 1]`.
    ProgressUpdated(f64),
    /// The given key was wrong, or the target expired unanswered.
    KeyMissed(char),
    /// Score rounded to one decimal for display.
    ScoreUpdated(f64),
    GameOver(GameStats),
}

/// The gameplay engine: session state, per-character decay timers, scoring,
/// and the idle -> countdown -> playing -> game-over lifecycle.
///
/// All timing runs off the logical [`TimerWheel`]; callers advance it via
/// [`advance`](Self::advance) and feed key input via
/// [`handle_key_press`](Self::handle_key_press). Operations invoked outside
/// their valid phase are silent no-ops, so a restart is always safe.
#[derive(Debug)]
pub struct Game {
    session: Session,
    phase: Phase,
    timers: TimerWheel,
    countdown_left: u8,
    countdown_timer: Option<TimerId>,
    session_timer: Option<TimerId>,
    progress_timer: Option<TimerId>,
    expiry_timer: Option<TimerId>,
    grace_timer: Option<TimerId>,
    events: Vec<GameEvent>,
    rng: StdRng,
}

impl Game {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic target sequence, for tests.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            session: Session::default(),
            phase: Phase::Idle,
            timers: TimerWheel::new(),
            countdown_left: 0,
            countdown_timer: None,
            session_timer: None,
            progress_timer: None,
            expiry_timer: None,
            grace_timer: None,
            events: Vec::new(),
            rng,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Take all events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reset to the configuration screen. Safe to call in any phase; every
    /// pending timer is dropped so nothing from a previous game can fire
    /// into the new one.
    pub fn init_session(&mut self) {
        self.session.score = 0.0;
        self.session.keystrokes = 0;
        self.session.active = false;
        self.session.current_target = None;
        self.session.time_remaining = self.session.time_limit;
        self.clear_timers();
        self.phase = Phase::Idle;
        self.emit(GameEvent::ScreenChanged(Screen::Config));
        self.emit(GameEvent::TimerUpdated(self.session.time_limit));
        self.emit(GameEvent::ScoreUpdated(0.0));
    }

    /// Pending-configuration mutator; ignored once a game has started.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.phase == Phase::Idle {
            self.session.difficulty = difficulty;
        }
    }

    /// Pending-configuration mutator; ignored once a game has started.
    pub fn set_time_limit(&mut self, limit: TimeLimit) {
        if self.phase == Phase::Idle {
            self.session.time_limit = limit;
            self.session.time_remaining = limit;
            self.emit(GameEvent::TimerUpdated(limit));
        }
    }

    /// Idle -> Countdown. Gameplay begins after three one-second ticks.
    pub fn start_session(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Countdown;
        self.countdown_left = COUNTDOWN_FROM;
        self.emit(GameEvent::ScreenChanged(Screen::Countdown));
        self.emit(GameEvent::CountdownTick(self.countdown_left));
        self.countdown_timer = Some(self.timers.every(TimerKind::Countdown, 1_000));
    }

    /// Advance the logical clock and dispatch every timer that comes due,
    /// in order. Each handler runs to completion before the next timer
    /// fires, and a handler cancelling a sibling timer keeps it from firing
    /// even when both were due in the same step.
    ///
    /// The clock moves from due time to due time rather than jumping to the
    /// end of the step, so a handler scheduling a follow-up (the miss
    /// grace, the next expiry) anchors it at its own fire time.
    pub fn advance(&mut self, dt_ms: u64) {
        let target = self.timers.now() + dt_ms;
        while let Some(due) = self.timers.next_due().filter(|&due| due <= target) {
            self.timers.advance_to(due);
            while let Some((_, kind)) = self.timers.pop_due() {
                match kind {
                    TimerKind::Countdown => self.on_countdown_tick(),
                    TimerKind::SessionClock => self.on_session_tick(),
                    TimerKind::Progress => self.on_progress_tick(),
                    TimerKind::CharExpiry => {
                        self.expiry_timer = None;
                        self.on_char_expired();
                    }
                    TimerKind::MissGrace => {
                        self.grace_timer = None;
                        self.generate_target();
                    }
                }
            }
        }
        self.timers.advance_to(target);
    }

    /// Feed one raw key press into the game. Input is normalized to
    /// lowercase; keys outside the valid alphabet are ignored entirely.
    pub fn handle_key_press(&mut self, raw: char) {
        if !self.session.active {
            return;
        }
        let key = raw.to_ascii_lowercase();

        if Some(key) == self.session.current_target {
            // A hit cancels the pending expiry before it can fire, so
            // success and expiry are mutually exclusive for this target.
            cancel(&mut self.timers, &mut self.expiry_timer);
            cancel(&mut self.timers, &mut self.progress_timer);

            let bonus = match self.session.char_budget {
                Budget::Millis(budget) => {
                    ceil_tenths(self.session.char_remaining_ms as f64 / budget as f64)
                }
                Budget::Infinite => 0.0,
            };
            let points = 1.0 + bonus;
            self.session.score = (self.session.score + points).min(MAX_SCORE);
            self.session.keystrokes += 1;
            self.emit(GameEvent::ScoreUpdated(round_tenths(self.session.score)));

            self.generate_target();

            if self.session.score >= MAX_SCORE {
                self.end_session();
            }
        } else if policy::is_valid_char(key) {
            self.emit(GameEvent::KeyMissed(key));
        }
    }

    /// Pick the next target and arm its decay timers. No-op unless active.
    pub fn generate_target(&mut self) {
        if !self.session.active {
            return;
        }
        // Drop every timer belonging to the previous target generation,
        // including a pending miss-grace regeneration.
        cancel(&mut self.timers, &mut self.expiry_timer);
        cancel(&mut self.timers, &mut self.progress_timer);
        cancel(&mut self.timers, &mut self.grace_timer);

        let alphabet = policy::VALID_CHARS.as_bytes();
        let target = alphabet[self.rng.gen_range(0..alphabet.len())] as char;
        self.session.current_target = Some(target);
        self.emit(GameEvent::TargetChanged(target));

        self.session.char_budget = self.session.difficulty.char_budget();
        match self.session.char_budget {
            Budget::Millis(ms) => {
                self.session.char_remaining_ms = ms;
                self.progress_timer =
                    Some(self.timers.every(TimerKind::Progress, PROGRESS_TICK_MS));
                self.expiry_timer = Some(self.timers.once(TimerKind::CharExpiry, ms));
            }
            Budget::Infinite => {
                self.session.char_remaining_ms = 0;
            }
        }
    }

    /// End the game and emit final statistics. No-op unless active.
    pub fn end_session(&mut self) {
        if !self.session.active {
            return;
        }
        self.session.active = false;
        self.clear_timers();
        self.phase = Phase::GameOver;
        self.emit(GameEvent::ScreenChanged(Screen::GameOver));
        let stats = GameStats::compute(
            self.session.score,
            self.session.keystrokes,
            self.session.difficulty,
            self.session.time_limit,
            self.session.time_remaining,
        );
        self.emit(GameEvent::GameOver(stats));
    }

    /// Explicit abort, e.g. the player hitting escape mid-game.
    pub fn force_end(&mut self) {
        self.end_session();
    }

    fn on_countdown_tick(&mut self) {
        if self.phase != Phase::Countdown {
            return;
        }
        self.countdown_left = self.countdown_left.saturating_sub(1);
        self.emit(GameEvent::CountdownTick(self.countdown_left));
        if self.countdown_left == 0 {
            cancel(&mut self.timers, &mut self.countdown_timer);
            self.begin_play();
        }
    }

    fn begin_play(&mut self) {
        self.phase = Phase::Playing;
        self.session.active = true;
        self.session.time_remaining = self.session.time_limit;
        self.emit(GameEvent::ScreenChanged(Screen::Playing));
        self.emit(GameEvent::TimerUpdated(self.session.time_remaining));
        // No session clock for an infinite limit: the timeout transition
        // must never fire.
        if !self.session.time_limit.is_infinite() {
            self.session_timer = Some(self.timers.every(TimerKind::SessionClock, 1_000));
        }
        self.generate_target();
    }

    fn on_session_tick(&mut self) {
        if !self.session.active {
            return;
        }
        let TimeLimit::Seconds(secs) = self.session.time_remaining else {
            return;
        };
        let secs = secs.saturating_sub(1);
        self.session.time_remaining = TimeLimit::Seconds(secs);
        self.emit(GameEvent::TimerUpdated(self.session.time_remaining));
        if secs == 0 {
            self.end_session();
        }
    }

    fn on_progress_tick(&mut self) {
        if !self.session.active {
            return;
        }
        let Budget::Millis(budget) = self.session.char_budget else {
            return;
        };
        self.session.char_remaining_ms =
            self.session.char_remaining_ms.saturating_sub(PROGRESS_TICK_MS);
        let fraction = self.session.char_remaining_ms as f64 / budget as f64;
        self.emit(GameEvent::ProgressUpdated(fraction));
    }

    fn on_char_expired(&mut self) {
        if !self.session.active {
            return;
        }
        if let Some(target) = self.session.current_target {
            self.emit(GameEvent::KeyMissed(target));
        }
        // Leave the miss visible for a beat before swapping targets.
        self.grace_timer = Some(self.timers.once(TimerKind::MissGrace, MISS_GRACE_MS));
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn clear_timers(&mut self) {
        self.timers.clear();
        self.countdown_timer = None;
        self.session_timer = None;
        self.progress_timer = None;
        self.expiry_timer = None;
        self.grace_timer = None;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Take a tracked handle and drop its pending timer, if any.
fn cancel(timers: &mut TimerWheel, slot: &mut Option<TimerId>) {
    if let Some(id) = slot.take() {
        timers.cancel(id);
    }
}
