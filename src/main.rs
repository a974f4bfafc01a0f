use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
};

use klak::{
    app::App,
    config::{ConfigStore, FileConfigStore},
    policy::{Difficulty, TimeLimit},
    runtime::{CrosstermEventSource, FixedTicker, InputEvent, Runner, TICK_RATE_MS},
    ui,
};

/// terminal reflex typing game
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reflex typing game for the terminal: a key lights up on an on-screen keyboard and decays on a difficulty-dependent fuse. Hit it in time; faster hits score higher."
)]
struct Cli {
    /// difficulty tier controlling how fast each target decays
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// session length in seconds, or "infinite"
    #[clap(short, long)]
    secs: Option<TimeLimit>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let saved = store.load();
    let difficulty = cli.difficulty.unwrap_or_else(|| saved.difficulty());
    let limit = cli.secs.unwrap_or_else(|| saved.time_limit());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(difficulty, limit);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Remember the last-used settings for the next run.
    let _ = store.save(&app.settings());

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| ui::render(app, f))?;
    loop {
        match runner.step() {
            InputEvent::Tick => app.on_tick(TICK_RATE_MS),
            InputEvent::Key(key) => app.handle_key(key),
            InputEvent::Resize => {}
        }
        if app.should_quit {
            break;
        }
        terminal.draw(|f| ui::render(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["klak"]);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.secs, None);
    }

    #[test]
    fn test_cli_difficulty() {
        let cli = Cli::parse_from(["klak", "-d", "hell"]);
        assert_eq!(cli.difficulty, Some(Difficulty::Hell));

        let cli = Cli::parse_from(["klak", "--difficulty", "zen"]);
        assert_eq!(cli.difficulty, Some(Difficulty::Zen));
    }

    #[test]
    fn test_cli_secs() {
        let cli = Cli::parse_from(["klak", "-s", "90"]);
        assert_eq!(cli.secs, Some(TimeLimit::Seconds(90)));

        let cli = Cli::parse_from(["klak", "--secs", "infinite"]);
        assert_eq!(cli.secs, Some(TimeLimit::Infinite));
    }

    #[test]
    fn test_cli_rejects_bad_secs() {
        assert!(Cli::try_parse_from(["klak", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["klak", "-s", "soon"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["klak", "-d", "brutal"]).is_err());
    }
}
