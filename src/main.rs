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
    sync::Arc,
    time::{Duration, Instant},
};
use typeclock::{
    app::{Action, App},
    app_dirs::AppDirs,
    best_score::{BestScoreStore, BestScoreTracker, MemoryBestScoreStore, SqliteBestScoreStore},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{spawn_text_fetch, AppEvent, CrosstermEventSource, FixedTicker, Runner},
    word_source::{
        FallbackWordSource, RemoteWordSource, StaticWordSource, WordProvider, WordSource,
    },
};

/// terminal typing speed test
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test in the terminal: type the fetched words before the countdown runs out and get raw wpm, accuracy and your best score."
)]
pub struct Cli {
    /// number of seconds per test (selector offers 15/30/60/120)
    #[clap(short = 's', long = "secs", value_parser = clap::value_parser!(u64).range(1..))]
    secs: Option<u64>,

    /// number of words to request from the word service
    #[clap(short = 'w', long = "words")]
    words: Option<usize>,

    /// custom text to type instead of fetched words
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// skip the word service and use the built-in word list
    #[clap(long)]
    offline: bool,

    /// word service returning a JSON array of words
    #[clap(long)]
    url: Option<String>,

    /// word service timeout in milliseconds
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// do not write a log file
    #[clap(long)]
    no_log: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config.
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.secs {
            cfg.duration_secs = secs;
        }
        if let Some(words) = self.words {
            cfg.word_count = words;
        }
        if let Some(ref url) = self.url {
            cfg.word_api_url = url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            cfg.fetch_timeout_ms = ms;
        }
        cfg.offline |= self.offline;
        cfg
    }

    fn word_source(&self, cfg: &Config) -> Box<dyn WordSource> {
        if let Some(ref prompt) = self.prompt {
            Box::new(StaticWordSource::new(prompt))
        } else if cfg.offline {
            Box::new(FallbackWordSource)
        } else {
            Box::new(RemoteWordSource::new(
                cfg.word_api_url.clone(),
                cfg.word_count,
                Duration::from_millis(cfg.fetch_timeout_ms),
            ))
        }
    }
}

fn open_best_store() -> Box<dyn BestScoreStore> {
    let path = AppDirs::best_score_db();
    match SqliteBestScoreStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "best score kept in memory only");
            Box::new(MemoryBestScoreStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = if cli.no_log {
        None
    } else {
        logging::init_file_logging(&AppDirs::log_dir())
    };

    let config_store = FileConfigStore::new();
    let stored_config = config_store.load();
    let config = cli.apply_to(stored_config.clone());
    tracing::info!(?config, "starting");

    let provider = Arc::new(WordProvider::new(cli.word_source(&config)));
    let mut app = App::new(config.duration_secs, BestScoreTracker::load(open_best_store()));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, provider);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let remembered = Config {
        duration_secs: app.session.duration_secs(),
        ..stored_config
    };
    if let Err(e) = config_store.save(&remembered) {
        tracing::warn!(error = %e, "could not save config");
    }

    outcome
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    provider: Arc<WordProvider>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let tx = runner.event_source().sender();

    spawn_text_fetch(Arc::clone(&provider), app.begin_reload(), tx.clone());

    let mut last_tick = Instant::now();
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();

        // time keeps flowing into the countdown whatever woke us up
        let now = Instant::now();
        app.on_tick(now - last_tick);
        last_tick = now;

        match event {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::TextReady { request, text } => {
                app.on_text_ready(request, text);
            }
            AppEvent::Key(key) => match app.handle_key(key) {
                Action::Quit => break,
                Action::Fetch(request) => {
                    spawn_text_fetch(Arc::clone(&provider), request, tx.clone());
                }
                Action::None => {}
            },
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
