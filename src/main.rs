use boardsight::{
    config::{Config, ConfigStore, FileConfigStore},
    controller::{Event, SessionController},
    geometry::PieceKind,
    runtime::{spawn_input_thread, AppEvent},
    timer::ThreadTimerSpawner,
    trial::Response,
    ui::SessionView,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
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
    sync::mpsc,
};

/// timed board-vision drill in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A board-vision trainer: squares light up one at a time and you signal whenever the reference piece could reach the shown square from its origin, before the response window closes."
)]
pub struct Cli {
    /// reference piece for the reachability drill
    #[clap(short = 'p', long, value_enum)]
    piece: Option<PieceArg>,

    /// number of rounds per session
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// number of trials per round
    #[clap(short = 't', long)]
    trials: Option<usize>,

    /// countdown seconds before round play (0 starts immediately)
    #[clap(short = 'c', long)]
    countdown_secs: Option<u32>,

    /// response window per trial, in milliseconds
    #[clap(short = 'w', long)]
    response_window_ms: Option<u64>,

    /// pause before each round, in milliseconds
    #[clap(long)]
    round_delay_ms: Option<u64>,

    /// start with voice announcements enabled
    #[clap(long)]
    voice: bool,

    /// persist the merged settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum PieceArg {
    Knight,
    Bishop,
}

impl PieceArg {
    fn as_piece(&self) -> PieceKind {
        match self {
            PieceArg::Knight => PieceKind::Knight,
            PieceArg::Bishop => PieceKind::Bishop,
        }
    }
}

impl Cli {
    /// Overlay the flags the user actually passed onto the stored config.
    fn apply(&self, cfg: &mut Config) {
        if let Some(piece) = self.piece {
            cfg.piece = piece.to_string().to_lowercase();
        }
        if let Some(rounds) = self.rounds {
            cfg.rounds = rounds;
        }
        if let Some(trials) = self.trials {
            cfg.trials_per_round = trials;
        }
        if let Some(countdown) = self.countdown_secs {
            cfg.countdown_secs = countdown;
        }
        if let Some(window) = self.response_window_ms {
            cfg.response_window_ms = window;
        }
        if let Some(delay) = self.round_delay_ms {
            cfg.round_delay_ms = delay;
        }
        if self.voice {
            cfg.voice = true;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let mut cfg = store.load();
    cli.apply(&mut cfg);
    if cli.save_config {
        store.save(&cfg)?;
    }

    let (tx, rx) = mpsc::channel();
    let timers = ThreadTimerSpawner::new(tx.clone());
    // Construct (and thereby validate) the session before touching the
    // terminal, so configuration errors print on a normal screen.
    let mut controller = match SessionController::new(cfg.to_session_config(), timers) {
        Ok(controller) => controller,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    spawn_input_thread(tx);
    let result = run(&mut terminal, &mut controller, &rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut SessionController<ThreadTimerSpawner<AppEvent>>,
    rx: &mpsc::Receiver<AppEvent>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(SessionView::new(controller.snapshot()), f.area()))?;

        match rx.recv()? {
            AppEvent::Timer(id) => controller.handle(Event::Tick(id)),
            AppEvent::Resize => {}
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char(' ') | KeyCode::Enter => {
                    controller.handle(Event::Response(Response::Match))
                }
                KeyCode::Char('s') => controller.handle(Event::Start),
                KeyCode::Char('r') => controller.handle(Event::Restart),
                KeyCode::Char('v') => controller.handle(Event::ToggleVoice),
                _ => {}
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["boardsight"]);

        assert!(cli.piece.is_none());
        assert_eq!(cli.rounds, None);
        assert_eq!(cli.trials, None);
        assert_eq!(cli.countdown_secs, None);
        assert_eq!(cli.response_window_ms, None);
        assert_eq!(cli.round_delay_ms, None);
        assert!(!cli.voice);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_piece() {
        let cli = Cli::parse_from(["boardsight", "-p", "knight"]);
        assert!(matches!(cli.piece, Some(PieceArg::Knight)));

        let cli = Cli::parse_from(["boardsight", "--piece", "bishop"]);
        assert!(matches!(cli.piece, Some(PieceArg::Bishop)));
    }

    #[test]
    fn test_cli_rounds_and_trials() {
        let cli = Cli::parse_from(["boardsight", "-r", "5", "-t", "12"]);
        assert_eq!(cli.rounds, Some(5));
        assert_eq!(cli.trials, Some(12));

        let cli = Cli::parse_from(["boardsight", "--rounds", "2", "--trials", "4"]);
        assert_eq!(cli.rounds, Some(2));
        assert_eq!(cli.trials, Some(4));
    }

    #[test]
    fn test_cli_timing_flags() {
        let cli = Cli::parse_from([
            "boardsight",
            "-c",
            "0",
            "-w",
            "1500",
            "--round-delay-ms",
            "250",
        ]);
        assert_eq!(cli.countdown_secs, Some(0));
        assert_eq!(cli.response_window_ms, Some(1500));
        assert_eq!(cli.round_delay_ms, Some(250));
    }

    #[test]
    fn test_piece_arg_as_piece() {
        assert_eq!(PieceArg::Knight.as_piece(), PieceKind::Knight);
        assert_eq!(PieceArg::Bishop.as_piece(), PieceKind::Bishop);
    }

    #[test]
    fn test_piece_arg_display() {
        assert_eq!(PieceArg::Knight.to_string(), "Knight");
        assert_eq!(PieceArg::Bishop.to_string(), "Bishop");
    }

    #[test]
    fn test_apply_overrides_only_passed_flags() {
        let cli = Cli::parse_from(["boardsight", "-r", "7", "--voice"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);

        assert_eq!(cfg.rounds, 7);
        assert!(cfg.voice);
        // Untouched fields keep their stored values.
        assert_eq!(cfg.piece, "knight");
        assert_eq!(cfg.trials_per_round, 8);
        assert_eq!(cfg.response_window_ms, 3000);
    }

    #[test]
    fn test_apply_maps_piece_to_config_string() {
        let cli = Cli::parse_from(["boardsight", "-p", "bishop"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.piece, "bishop");
    }

    #[test]
    fn test_apply_without_flags_changes_nothing() {
        let cli = Cli::parse_from(["boardsight"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg, Config::default());
    }
}
