use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use netops_protocol::ExecutionStatus;

use crate::notices::NoticeLevel;

/// Which of the two gauge colour pairs a resource bar uses. Both pairs
/// switch at the same 80 percent cut.
#[derive(Clone, Copy)]
pub(crate) enum GaugeKind {
    Cpu,
    Memory,
}

pub(crate) struct Theme {
    border: Color,
    title: Color,
    text: Color,
    dim: Color,
    accent: Color,
    ok: Color,
    warn: Color,
    error: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    cpu_low: Color,
    cpu_high: Color,
    mem_low: Color,
    mem_high: Color,
}

impl Theme {
    pub(crate) fn dark() -> Self {
        Self {
            border: Color::DarkGray,
            title: Color::Blue,
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Cyan,
            ok: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            highlight_fg: Color::White,
            highlight_bg: Color::DarkGray,
            cpu_low: Color::Blue,
            cpu_high: Color::Red,
            mem_low: Color::Green,
            mem_high: Color::Yellow,
        }
    }

    pub(crate) fn block<'a>(&self, title: &'a str) -> Block<'a> {
        Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(self.title).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border))
    }

    pub(crate) fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub(crate) fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn help_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn warn_style(&self) -> Style {
        Style::default().fg(self.warn).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn badge_style(&self, status: ExecutionStatus) -> Style {
        match status {
            ExecutionStatus::Running => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ExecutionStatus::Pending => Style::default().fg(self.dim),
            ExecutionStatus::Success => {
                Style::default().fg(self.ok).add_modifier(Modifier::BOLD)
            }
            ExecutionStatus::Failed => {
                Style::default().fg(self.error).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Shared two-colour scheme for hardware ok/not-ok indicators.
    pub(crate) fn indicator_style(&self, ok: bool) -> Style {
        if ok {
            Style::default().fg(self.ok)
        } else {
            Style::default().fg(self.error).add_modifier(Modifier::BOLD)
        }
    }

    /// Gauge style, switching pairs at 80 percent inclusive on the high side.
    pub(crate) fn gauge_style(&self, kind: GaugeKind, percent: f64) -> Style {
        let high = percent >= 80.0;
        let color = match (kind, high) {
            (GaugeKind::Cpu, false) => self.cpu_low,
            (GaugeKind::Cpu, true) => self.cpu_high,
            (GaugeKind::Memory, false) => self.mem_low,
            (GaugeKind::Memory, true) => self.mem_high,
        };
        Style::default().fg(color)
    }

    pub(crate) fn notice_style(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => Style::default().fg(self.accent),
            NoticeLevel::Success => Style::default().fg(self.ok),
            NoticeLevel::Warning => self.warn_style(),
            NoticeLevel::Error => self.error_style(),
        }
    }
}
