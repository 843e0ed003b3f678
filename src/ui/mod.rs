//! Run progress, rendered as a terminal dashboard, log lines, or not at all

mod components;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

use components::{ActivityLog, Header, StageBoard};

/// Coarse run phase shown in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Transforming,
    Writing,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Loading => "Loading raw relations",
            Phase::Transforming => "Transforming",
            Phase::Writing => "Writing output",
            Phase::Complete => "Complete",
        })
    }
}

/// Receives progress events from a pipeline run
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn log(&mut self, message: impl Into<String>);

    /// Stage `n` (zero-based) of `total` is about to run
    fn stage_started(&mut self, stage: &str, n: usize, total: usize);

    fn stage_finished(&mut self, stage: &str, rows: usize) {
        self.log(format!("{}: {} rows", stage, rows));
    }
}

/// Raw mode and the alternate screen, undone on drop
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout))?,
            active: true,
        })
    }

    fn leave(&mut self) -> Result<()> {
        if self.active {
            self.active = false;
            terminal::disable_raw_mode()?;
            self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
            self.terminal.show_cursor()?;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.leave().ok();
    }
}

/// Everything the dashboard shows
struct Dashboard {
    header: Header,
    board: StageBoard,
    log: ActivityLog,
}

impl Dashboard {
    fn render(&self, frame: &mut Frame) {
        let [header, board, log] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(8),
            ])
            .areas(frame.area());

        self.header.render(frame, header);
        self.board.render(frame, board);
        self.log.render(frame, log);
    }
}

/// Full-screen terminal dashboard
pub struct UiApp {
    guard: TerminalGuard,
    dashboard: Dashboard,
}

impl UiApp {
    pub fn new() -> Result<Self> {
        Ok(Self {
            guard: TerminalGuard::enter()?,
            dashboard: Dashboard {
                header: Header::new(),
                board: StageBoard::new(),
                log: ActivityLog::with_capacity(100),
            },
        })
    }

    fn redraw(&mut self) {
        let dashboard = &self.dashboard;
        // A failed frame is dropped; the next event redraws
        self.guard.terminal.draw(|frame| dashboard.render(frame)).ok();
    }

    /// Show the summary, wait for q, Enter or Esc, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.dashboard.header.phase = Phase::Complete;
        for line in summary.lines() {
            self.dashboard.log.push(line);
        }
        self.dashboard.log.push("Press q or Enter to exit");
        self.redraw();

        loop {
            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Enter | KeyCode::Esc)
                {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Leave the dashboard immediately
    pub fn restore(mut self) -> Result<()> {
        self.guard.leave()
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.dashboard.header.phase = phase;
        self.redraw();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.dashboard.header.info = info.into();
        self.redraw();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.dashboard.log.push(message);
        self.redraw();
    }

    fn stage_started(&mut self, stage: &str, _n: usize, total: usize) {
        self.dashboard.board.start(stage, total as u64);
        self.redraw();
    }

    fn stage_finished(&mut self, stage: &str, rows: usize) {
        self.dashboard.board.finish(stage, rows);
        self.redraw();
    }
}

/// Forwards progress to `tracing`, for non-interactive runs
#[derive(Default)]
pub struct LogUi {
    phase: Option<Phase>,
}

impl LogUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for LogUi {
    fn set_phase(&mut self, phase: Phase) {
        if self.phase.replace(phase) != Some(phase) {
            tracing::info!("{}", phase);
        }
    }

    fn set_info(&mut self, info: impl Into<String>) {
        tracing::info!("{}", info.into());
    }

    fn log(&mut self, message: impl Into<String>) {
        tracing::info!("{}", message.into());
    }

    fn stage_started(&mut self, stage: &str, n: usize, total: usize) {
        tracing::debug!(stage, "stage {}/{}", n + 1, total);
    }

    // The pipeline already logs each materialized stage
    fn stage_finished(&mut self, _stage: &str, _rows: usize) {}
}

/// Discards everything, for tests and library use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn log(&mut self, _message: impl Into<String>) {}
    fn stage_started(&mut self, _stage: &str, _n: usize, _total: usize) {}
}
