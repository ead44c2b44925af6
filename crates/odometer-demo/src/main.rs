#![forbid(unsafe_code)]

//! Terminal demo for the odometer ticker.
//!
//! Controls: `space`/`↑` count up, `↓` count down, `r` toggles between the
//! counter and a word, `q`/`Esc`/`Ctrl+C` quit. The counter also ticks up on
//! its own.
//!
//! Environment:
//!
//! - `ODOMETER_DEMO_EXIT_AFTER_MS`: quit after this many milliseconds.
//! - `ODOMETER_DEMO_SEED`: jitter seed (default 0).
//! - `ODOMETER_DEMO_DURATION_MS`: base roll duration (default 300).
//! - `ODOMETER_DEMO_LOG`: write `tracing` output to this file; the filter
//!   comes from `RUST_LOG` (default `odometer=debug`).

mod render;
mod terminal_host;

use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use odometer::config::DEFAULT_DURATION;
use odometer::{ContentNode, NestedTicker, Ticker, TickerConfig, TickerView};
use odometer_core::style::{TextAttrs, TextStyle};
use tracing_subscriber::EnvFilter;

use crate::render::render_rows;
use crate::terminal_host::TerminalHost;

const FRAME: Duration = Duration::from_millis(16);
const AUTO_STEP: Duration = Duration::from_millis(2500);
const WORDS: &[&str] = &["ODOMETER", "ROLLING", "TICKER"];

#[derive(Debug, Clone)]
struct DemoConfig {
    exit_after: Option<Duration>,
    seed: u64,
    duration: Duration,
    log_path: Option<String>,
}

impl DemoConfig {
    fn from_env() -> Self {
        Self {
            exit_after: env_u64("ODOMETER_DEMO_EXIT_AFTER_MS")
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis),
            seed: env_u64("ODOMETER_DEMO_SEED").unwrap_or(0),
            duration: env_u64("ODOMETER_DEMO_DURATION_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DURATION),
            log_path: env_string("ODOMETER_DEMO_LOG"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    ToggleMode,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Counter,
    Word(usize),
}

#[derive(Debug)]
struct DemoState {
    counter: i64,
    rising: bool,
    mode: Mode,
}

impl DemoState {
    fn new() -> Self {
        Self {
            counter: 9_985,
            rising: true,
            mode: Mode::Counter,
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Up => self.step(1),
            Action::Down => self.step(-1),
            Action::ToggleMode => {
                self.mode = match self.mode {
                    Mode::Counter => Mode::Word(0),
                    Mode::Word(i) if i + 1 < WORDS.len() => Mode::Word(i + 1),
                    Mode::Word(_) => Mode::Counter,
                };
            }
            Action::Quit => {}
        }
    }

    fn step(&mut self, delta: i64) {
        self.counter = self.counter.saturating_add(delta);
        self.rising = delta >= 0;
        self.mode = Mode::Counter;
    }

    fn content(&self) -> Vec<ContentNode> {
        match self.mode {
            Mode::Counter => {
                let arrow = if self.rising { "▲" } else { "▼" };
                vec![
                    NestedTicker::new(["▲", "▼"], arrow).into(),
                    " ".into(),
                    group_thousands(self.counter).into(),
                ]
            }
            Mode::Word(i) => vec![WORDS[i].into()],
        }
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Char('r') => Some(Action::ToggleMode),
        _ => None,
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn init_logging(path: &str) -> io::Result<()> {
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("odometer=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)
}

fn draw(out: &mut impl Write, view: &TickerView<'_>, state: &DemoState) -> io::Result<()> {
    let rows = render_rows(view);
    let bold = view.text_style.attrs.contains(TextAttrs::BOLD);
    queue!(out, Clear(ClearType::All))?;
    if let Some(label) = view.accessibility_label {
        queue!(out, MoveTo(2, 1), Print(label))?;
    }
    queue!(
        out,
        MoveTo(4, 3),
        SetAttribute(Attribute::Dim),
        Print(&rows.above),
        SetAttribute(Attribute::Reset),
        MoveTo(4, 4),
    )?;
    if bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    queue!(
        out,
        Print(&rows.centre),
        SetAttribute(Attribute::Reset),
        MoveTo(4, 5),
        SetAttribute(Attribute::Dim),
        Print(&rows.below),
        SetAttribute(Attribute::Reset),
    )?;
    let status = match (view.is_placeholder(), state.mode) {
        (true, _) => format!("measuring {} glyph(s)", view.measuring.len()),
        (false, Mode::Counter) => format!("counter {}", state.counter),
        (false, Mode::Word(i)) => format!("word {}/{}", i + 1, WORDS.len()),
    };
    queue!(
        out,
        MoveTo(2, 7),
        Print(status),
        MoveTo(2, 8),
        Print("space/↑ up  ↓ down  r word  q quit"),
    )?;
    out.flush()
}

fn run(out: &mut impl Write, config: &DemoConfig) -> io::Result<()> {
    let mut host = TerminalHost::new();
    let mut ticker = Ticker::new(
        TickerConfig::new()
            .duration(config.duration)
            .seed(config.seed)
            .text_style(TextStyle::new().attrs(TextAttrs::BOLD))
            .accessibility_label("Odometer")
            .strict_reels(false),
    );
    let mut state = DemoState::new();
    ticker
        .update(state.content(), &mut host)
        .map_err(io::Error::other)?;

    let start = Instant::now();
    let mut last_frame = start;
    let mut last_step = start;
    loop {
        let input_pending = event::poll(FRAME)?;
        if input_pending {
            if let Event::Key(key) = event::read()? {
                match action_for(key) {
                    Some(Action::Quit) => break,
                    Some(action) => {
                        state.apply(action);
                        last_step = Instant::now();
                        ticker
                            .update(state.content(), &mut host)
                            .map_err(io::Error::other)?;
                    }
                    None => {}
                }
            }
        }

        let now = Instant::now();
        if config.exit_after.is_some_and(|limit| now - start >= limit) {
            tracing::info!(elapsed = ?(now - start), "exit timer reached");
            break;
        }
        if state.mode == Mode::Counter && now - last_step >= AUTO_STEP {
            state.step(1);
            last_step = now;
            ticker
                .update(state.content(), &mut host)
                .map_err(io::Error::other)?;
        }

        for event in host.poll_events(input_pending) {
            ticker.handle_event(event, &mut host);
        }
        ticker.tick(now - last_frame, &mut host);
        last_frame = now;
        draw(out, &ticker.view(), &state)?;
    }
    ticker.dispose();
    Ok(())
}

fn main() -> io::Result<()> {
    let config = DemoConfig::from_env();
    if let Some(path) = &config.log_path {
        init_logging(path)?;
    }
    tracing::info!(?config, "odometer demo starting");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let result = run(&mut stdout, &config);
    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn key_bindings() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(action_for(press(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(
            action_for(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(action_for(press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(action_for(press(KeyCode::Down, KeyModifiers::NONE)), Some(Action::Down));
    }

    #[test]
    fn mode_cycles_through_words() {
        let mut state = DemoState::new();
        for expected in [Mode::Word(0), Mode::Word(1), Mode::Word(2), Mode::Counter] {
            state.apply(Action::ToggleMode);
            assert_eq!(state.mode, expected);
        }
        state.apply(Action::ToggleMode);
        state.apply(Action::Down);
        assert_eq!(state.mode, Mode::Counter);
        assert!(!state.rising);
    }

    #[test]
    fn counter_content_has_direction_slot() {
        let state = DemoState::new();
        let content = state.content();
        assert_eq!(content.len(), 3);
        assert!(matches!(&content[0], ContentNode::Nested(n) if n.target.as_str() == "▲"));
    }
}
