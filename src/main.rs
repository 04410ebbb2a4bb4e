use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
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
    path::PathBuf,
    time::{Duration, Instant},
};

use reflex::{
    app::{App, AppOptions, Flow},
    app_dirs::{AppDirs, LOG_FILE},
    config::{Config, ConfigStore, FileConfigStore},
    export::export_csv,
    logging,
    mode::TestMode,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    store::{open_backend, HistoryStore, Leaderboard, StorageKind, HISTORY_RECORD, LEADERBOARD_RECORD},
};

const TICK_RATE_MS: u64 = 100;

/// reaction time tests in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Measure your reaction time, target clicking speed and visual search speed, with per-mode benchmarks, history, a local leaderboard and a training dashboard."
)]
pub struct Cli {
    /// test mode to start in (defaults to the last one used)
    #[clap(short, long, value_enum)]
    mode: Option<TestMode>,

    /// player name recorded on the leaderboard
    #[clap(short, long)]
    name: Option<String>,

    /// where history and leaderboard are kept
    #[clap(long, value_enum)]
    storage: Option<StorageKind>,

    /// seed the random delays, positions and grids for a reproducible run
    #[clap(long)]
    seed: Option<u64>,

    /// first duel player's name
    #[clap(long)]
    player1: Option<String>,

    /// second duel player's name
    #[clap(long)]
    player2: Option<String>,

    /// write the history as CSV to FILE and exit
    #[clap(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// delete the result history and exit
    #[clap(long)]
    clear_history: bool,

    /// delete the leaderboard and exit
    #[clap(long)]
    clear_leaderboard: bool,

    /// directory for the database, record files and log
    #[clap(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// config file to use instead of the default location
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Fold the flags into `config`; mode and name stick for later runs.
    fn merge(&self, mut config: Config) -> (Config, StorageKind, AppOptions) {
        if let Some(mode) = self.mode {
            config.default_mode = mode;
        }
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            config.player_name = name.to_string();
        }
        let storage = self.storage.unwrap_or(config.storage);

        let options = AppOptions {
            mode: config.default_mode,
            player_name: config.player_name.clone(),
            safe_area: config.safe_area,
            duel_names: [
                self.player1.clone().unwrap_or_default(),
                self.player2.clone().unwrap_or_default(),
            ],
            seed: self.seed,
        };
        (config, storage, options)
    }

    fn is_batch(&self) -> bool {
        self.export.is_some() || self.clear_history || self.clear_leaderboard
    }
}

/// Run the non-interactive flags against the stores.
fn run_batch(
    cli: &Cli,
    history: &mut HistoryStore,
    leaderboard: &mut Leaderboard,
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &cli.export {
        let rows = export_csv(history.entries(), path)?;
        println!("exported {rows} results to {}", path.display());
    }
    if cli.clear_history {
        history.clear();
        println!("history cleared");
    }
    if cli.clear_leaderboard {
        leaderboard.clear();
        println!("leaderboard cleared");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let state_dir = cli
        .data_dir
        .clone()
        .or_else(AppDirs::state_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    if let Err(e) = logging::init(&state_dir.join(LOG_FILE)) {
        eprintln!("logging disabled: {e}");
    }

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let (config, storage, options) = cli.merge(config_store.load());

    let mut history = HistoryStore::open(open_backend(storage, &state_dir, HISTORY_RECORD));
    let mut leaderboard = Leaderboard::open(open_backend(storage, &state_dir, LEADERBOARD_RECORD));

    if cli.is_batch() {
        return run_batch(&cli, &mut history, &mut leaderboard);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = config_store.save(&config) {
        log::warn!("could not save config to {}: {e}", config_store.path().display());
    }
    log::info!(
        "starting in {} mode, storage {storage}, data in {}",
        options.mode,
        state_dir.display()
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(options, history, leaderboard);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step_until(app.next_deadline()) {
            AppEvent::Key(key, at) => {
                if app.handle_key(key, at) == Flow::Quit {
                    break;
                }
            }
            AppEvent::Mouse(mouse, at) => app.handle_mouse(mouse, at),
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.resize(size.width, size.height);
            }
            AppEvent::Tick => {}
        }

        app.fire_due_timers(Instant::now());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex::engine::SafeArea;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["reflex"]);
        assert_eq!(cli.mode, None);
        assert_eq!(cli.name, None);
        assert_eq!(cli.storage, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.is_batch());
    }

    #[test]
    fn test_cli_mode_and_storage() {
        let cli = Cli::parse_from(["reflex", "-m", "sequence", "--storage", "json", "--seed", "42"]);
        assert_eq!(cli.mode, Some(TestMode::Sequence));
        assert_eq!(cli.storage, Some(StorageKind::Json));
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["reflex", "--mode", "typing"]).is_err());
    }

    #[test]
    fn test_cli_batch_flags() {
        let cli = Cli::parse_from(["reflex", "--export", "out.csv"]);
        assert_eq!(cli.export, Some(PathBuf::from("out.csv")));
        assert!(cli.is_batch());

        let cli = Cli::parse_from(["reflex", "--clear-history", "--clear-leaderboard"]);
        assert!(cli.clear_history && cli.clear_leaderboard);
        assert!(cli.is_batch());
    }

    #[test]
    fn test_merge_prefers_flags_and_remembers_them() {
        let cli = Cli::parse_from([
            "reflex",
            "--mode",
            "target",
            "--name",
            "  grace ",
            "--storage",
            "json",
            "--player1",
            "ada",
        ]);
        let config = Config {
            default_mode: TestMode::Reaction,
            player_name: "You".into(),
            storage: StorageKind::Sqlite,
            safe_area: SafeArea::default(),
        };

        let (config, storage, options) = cli.merge(config);

        assert_eq!(config.default_mode, TestMode::Target);
        assert_eq!(config.player_name, "grace");
        // storage applies to this run only
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(storage, StorageKind::Json);
        assert_eq!(options.mode, TestMode::Target);
        assert_eq!(options.player_name, "grace");
        assert_eq!(options.duel_names, ["ada".to_string(), String::new()]);
    }

    #[test]
    fn test_merge_without_flags_uses_config() {
        let cli = Cli::parse_from(["reflex", "--name", "   "]);
        let config = Config {
            default_mode: TestMode::Sequence,
            ..Config::default()
        };

        let (config, storage, options) = cli.merge(config);

        assert_eq!(options.mode, TestMode::Sequence);
        assert_eq!(config.player_name, "You");
        assert_eq!(storage, StorageKind::Sqlite);
    }

    #[test]
    fn test_run_batch_exports_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("history.csv");
        let cli = Cli::parse_from(["reflex", "--export", out.to_str().unwrap(), "--clear-history"]);
        let mut history = HistoryStore::in_memory();
        history.append(reflex::GameResult::new(TestMode::Reaction, 222));
        let mut leaderboard = Leaderboard::in_memory();
        leaderboard.append(reflex::LeaderboardEntry::new(
            reflex::GameResult::new(TestMode::Reaction, 222),
            "ada",
        ));

        run_batch(&cli, &mut history, &mut leaderboard).unwrap();

        let csv = std::fs::read_to_string(&out).unwrap();
        assert!(csv.contains("reaction,222,"));
        assert!(history.entries().is_empty());
        assert_eq!(leaderboard.entries().len(), 1);
    }
}
