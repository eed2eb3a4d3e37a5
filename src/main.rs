pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod ghost;
pub mod metrics;
pub mod quotes;
pub mod runtime;
pub mod session;
pub mod sound;
pub mod store;
pub mod ui;

use crate::{
    clock::{Clock, ClockMode},
    config::{Config, ConfigStore, FileConfigStore, Mode},
    ghost::GhostPlayer,
    quotes::{Category, PassageConfig, PassageSource},
    runtime::{AppEvent, Ticker},
    session::{InputKind, SessionEvent, TypingSession},
    sound::SoundPlayer,
    store::{RunRecord, ScoreStore},
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::{Receiver, Sender},
    time::Duration,
};
use webbrowser::Browser;

/// Metric recomputation cadence; the clock advances one second per tick.
const TICK_RATE_MS: u64 = 1000;

/// terminal typing-speed trainer with ghost replay
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing-speed trainer: type a passage against the clock or to a word goal, watch live wpm/accuracy, and race the ghost cursor of your best recorded run."
)]
pub struct Cli {
    /// run a countdown session of this many seconds (time mode)
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..))]
    seconds: Option<u64>,

    /// type until this many words are complete (words mode)
    #[clap(short = 'w', long, conflicts_with = "seconds", value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    words: Option<usize>,

    /// passage category to pull from
    #[clap(short = 'c', long, value_enum)]
    category: Option<Category>,

    /// custom passage to type instead of a category quote
    #[clap(short = 'p', long)]
    passage: Option<String>,

    /// race the ghost cursor of your best recorded run
    #[clap(short = 'g', long)]
    ghost: bool,

    /// hard mode: mask the untyped portion of the passage
    #[clap(long)]
    hard: bool,

    /// disable terminal-bell feedback
    #[clap(long)]
    no_sound: bool,
}

impl Cli {
    /// Overlay the flags that were actually given on the persisted config
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(words) = self.words {
            cfg.mode = Mode::Words;
            cfg.word_count = words;
        } else if let Some(seconds) = self.seconds {
            cfg.mode = Mode::Time;
            cfg.seconds = seconds;
        }
        if let Some(category) = self.category {
            cfg.category = category.to_string();
        }
        if self.ghost {
            cfg.ghost = true;
        }
        if self.hard {
            cfg.hard_mode = true;
        }
        if self.no_sound {
            cfg.sound = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub config: Config,
    pub session: TypingSession,
    pub clock: Clock,
    pub state: AppState,
    /// Bumped on every reset; ghost events from older epochs are discarded.
    pub epoch: u64,
    pub ghost_cursor: Option<usize>,
    pub history: Vec<RunRecord>,
    pub high_score: u32,
    pub new_high_score: bool,
    pub last_result: Option<RunRecord>,
    pub paste_rejected: bool,
    store: ScoreStore,
    sound: SoundPlayer,
    ticker: Option<Ticker>,
    ghost: Option<GhostPlayer>,
    tx: Sender<AppEvent>,
}

impl App {
    pub fn new(cli: Cli, config: Config, store: ScoreStore, tx: Sender<AppEvent>) -> Self {
        let session = TypingSession::new(generate_passage(&config, cli.passage.clone()));
        let clock = clock_for(&config);
        let history = store.history();
        let high_score = store.high_score();
        let sound = SoundPlayer::new(config.sound);

        Self {
            cli: Some(cli),
            config,
            session,
            clock,
            state: AppState::Typing,
            epoch: 0,
            ghost_cursor: None,
            history,
            high_score,
            new_high_score: false,
            last_result: None,
            paste_rejected: false,
            store,
            sound,
            ticker: None,
            ghost: None,
            tx,
        }
    }

    /// Discard the current session and start fresh with a new passage.
    pub fn reset(&mut self) {
        self.cancel_scheduled();
        self.epoch += 1;
        let custom = self.cli.as_ref().and_then(|c| c.passage.clone());
        self.session = TypingSession::new(generate_passage(&self.config, custom));
        self.clock = clock_for(&self.config);
        self.ghost_cursor = None;
        self.new_high_score = false;
        self.last_result = None;
        self.paste_rejected = false;
        self.state = AppState::Typing;
    }

    pub fn handle_char(&mut self, c: char) {
        if self.state != AppState::Typing || self.session.has_finished() {
            return;
        }
        let mut value = self.session.typed_value();
        value.push(c);
        self.apply_input(&value, InputKind::Insertion);
    }

    pub fn handle_backspace(&mut self) {
        if self.state != AppState::Typing || self.session.has_finished() {
            return;
        }
        let mut value = self.session.typed_value();
        value.pop();
        self.apply_input(&value, InputKind::Deletion);
    }

    /// Bulk input is not a way to advance a session; reject and notify.
    pub fn handle_paste(&mut self) {
        if self.state != AppState::Typing || self.session.has_finished() {
            return;
        }
        for event in self.session.submit_input("", InputKind::Paste) {
            if event == SessionEvent::Rejected {
                self.paste_rejected = true;
                self.sound.play(event);
            }
        }
    }

    pub fn on_tick(&mut self) {
        if self.state != AppState::Typing || self.session.has_finished() {
            return;
        }
        if self.clock.on_tick() {
            // countdown expired: forced completion wherever the prefix is
            self.session.force_finish();
            self.finish_session();
        }
    }

    pub fn on_ghost(&mut self, epoch: u64, cursor: usize) {
        if epoch != self.epoch || self.state != AppState::Typing || self.session.has_finished() {
            return;
        }
        self.ghost_cursor = Some(cursor);
    }

    fn apply_input(&mut self, value: &str, kind: InputKind) {
        let was_started = self.session.has_started();
        let events = self.session.submit_input(value, kind);
        if !was_started && self.session.has_started() {
            self.begin_run();
        }
        self.paste_rejected = false;

        let mut completed = false;
        for event in events {
            match event {
                SessionEvent::Completed => completed = true,
                SessionEvent::Rejected => self.paste_rejected = true,
                other => self.sound.play(other),
            }
        }
        if completed {
            self.finish_session();
        }
    }

    fn begin_run(&mut self) {
        self.clock.start();
        self.ticker = Some(Ticker::spawn(
            self.tx.clone(),
            Duration::from_millis(TICK_RATE_MS),
        ));
        if self.config.ghost {
            if let Some(best) = self.store.best_run() {
                self.ghost = Some(GhostPlayer::start(best.keystrokes, self.epoch, self.tx.clone()));
            }
        }
    }

    fn finish_session(&mut self) {
        self.cancel_scheduled();
        self.clock.stop();
        self.ghost_cursor = None;

        let record = RunRecord {
            wpm: self.wpm(),
            accuracy: self.accuracy(),
            timestamp: Local::now(),
            mode: self.config.mode,
        };
        self.history = self.store.record_result(&record);
        self.new_high_score = self
            .store
            .record_best_if_higher(record.wpm, self.session.keystrokes());
        if self.new_high_score {
            self.high_score = record.wpm;
        }
        self.last_result = Some(record);
        self.sound.play(SessionEvent::Completed);
        self.state = AppState::Results;
    }

    /// Every path out of a running session goes through here; pending
    /// ticker and ghost callbacks must never outlive the session.
    fn cancel_scheduled(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        if let Some(ghost) = self.ghost.take() {
            ghost.cancel();
        }
    }

    pub fn wpm(&self) -> u32 {
        metrics::wpm(self.session.typed_len(), self.clock.elapsed_secs())
    }

    pub fn accuracy(&self) -> u32 {
        metrics::accuracy(self.session.correct_chars(), self.session.typed_len())
    }

    pub fn share_text(&self) -> String {
        let (wpm, accuracy) = match &self.last_result {
            Some(r) => (r.wpm, r.accuracy),
            None => (self.wpm(), self.accuracy()),
        };
        format!("I just typed {wpm} WPM with {accuracy}% accuracy")
    }
}

fn generate_passage(config: &Config, custom: Option<String>) -> String {
    PassageSource::new(PassageConfig {
        category: Category::from_name(&config.category),
        mode: config.mode,
        word_count: config.word_count,
        custom_passage: custom,
    })
    .generate()
}

fn clock_for(config: &Config) -> Clock {
    match config.mode {
        Mode::Time => Clock::new(ClockMode::CountDown {
            seconds: config.seconds,
        }),
        Mode::Words => Clock::new(ClockMode::CountUp),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);
    let _ = config_store.save(&config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = runtime::channel();
    runtime::spawn_input_source(tx.clone());

    let mut app = App::new(cli, config, ScoreStore::new(), tx);
    let res = run_app(&mut terminal, &mut app, &rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &Receiver<AppEvent>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match rx.recv()? {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Ghost { epoch, cursor } => app.on_ghost(epoch, cursor),
            AppEvent::Paste(_) => app.handle_paste(),
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Tab => app.reset(),
                KeyCode::Backspace => app.handle_backspace(),
                KeyCode::Char(c) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                        break;
                    }
                    match app.state {
                        AppState::Typing => app.handle_char(c),
                        AppState::Results => match c {
                            'r' => app.reset(),
                            't' => {
                                if Browser::is_available() {
                                    let text = app
                                        .share_text()
                                        .replace('%', "%25")
                                        .replace(' ', "%20");
                                    webbrowser::open(&format!(
                                        "https://twitter.com/intent/tweet?text={text}"
                                    ))
                                    .unwrap_or_default();
                                }
                            }
                            _ => {}
                        },
                    }
                }
                _ => {}
            },
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
