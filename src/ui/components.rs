//! Widgets for the terminal dashboard

use std::collections::VecDeque;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use super::Phase;

const ACCENT: Color = Color::Red;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(ACCENT))
}

/// Phase line plus a free-form description of the run
pub struct Header {
    pub phase: Phase,
    pub info: String,
}

impl Header {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            info: String::new(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (glyph, color) = match self.phase {
            Phase::Loading => ("↓", Color::Cyan),
            Phase::Transforming => ("⚙", Color::Cyan),
            Phase::Writing => ("↑", Color::Yellow),
            Phase::Complete => ("✓", Color::Green),
        };
        let bold = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let text = vec![
            Line::from(vec![
                Span::styled(format!(" {} {}", glyph, self.phase), bold),
            ]),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(text).block(panel(" Pokédex ETL ")), area);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum StageState {
    Running,
    Done(usize),
}

/// Stages seen so far, with a gauge over the planned total
pub struct StageBoard {
    total: u64,
    stages: Vec<(String, StageState)>,
}

impl StageBoard {
    pub fn new() -> Self {
        Self {
            total: 0,
            stages: Vec::new(),
        }
    }

    pub fn start(&mut self, stage: &str, total: u64) {
        self.total = total;
        if !self.stages.iter().any(|(name, _)| name == stage) {
            self.stages.push((stage.to_string(), StageState::Running));
        }
    }

    pub fn finish(&mut self, stage: &str, rows: usize) {
        match self.stages.iter_mut().find(|(name, _)| name == stage) {
            Some((_, state)) => *state = StageState::Done(rows),
            None => self.stages.push((stage.to_string(), StageState::Done(rows))),
        }
    }

    fn done(&self) -> usize {
        self.stages
            .iter()
            .filter(|(_, s)| matches!(s, StageState::Done(_)))
            .count()
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.done() as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [gauge_area, table_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .areas(area);

        let gauge = Gauge::default()
            .block(panel(" Progress "))
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(self.ratio())
            .label(format!("{}/{} stages", self.done(), self.total));
        frame.render_widget(gauge, gauge_area);

        let rows = self.stages.iter().map(|(name, state)| {
            let (rows, style) = match state {
                StageState::Running => ("…".to_string(), Style::default().fg(Color::Cyan)),
                StageState::Done(0) => ("0".to_string(), Style::default().fg(Color::Yellow)),
                StageState::Done(n) => (n.to_string(), Style::default()),
            };
            Row::new(vec![Cell::from(name.as_str()), Cell::from(rows)]).style(style)
        });
        let table = Table::new(rows, [Constraint::Min(28), Constraint::Length(10)])
            .header(
                Row::new(vec!["stage", "rows"]).style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(panel(" Stages "));
        frame.render_widget(table, table_area);
    }
}

/// Bounded history of log lines, newest last
pub struct ActivityLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .lines
            .iter()
            .skip(self.lines.len().saturating_sub(visible))
            .map(|line| ListItem::new(format!(" {}", line)).style(Style::default().fg(Color::Gray)))
            .collect();
        frame.render_widget(List::new(items).block(panel(" Activity ")), area);
    }
}
