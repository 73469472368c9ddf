use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use netops_protocol::{HostReport, StepPayload, StepRecord};

use super::app::{AppState, View};
use super::form::Form;
use super::format::{
    badge_label, pretty_json, spinner_frame, status_glyph, step_glyph, step_label,
};
use super::health::health_card_lines;
use super::text::{sanitize_output, truncate_with_ellipsis, wrap_lines};
use super::theme::Theme;

const DETAIL_INDENT: &str = "      ";
const PAYLOAD_WRAP_WIDTH: usize = 96;

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_line(app, &theme)).block(theme.block("netops-console"));
    frame.render_widget(header, chunks[0]);

    let body_lines = match app.view {
        View::Timeline => timeline_lines(app, &theme),
        View::Devices => device_lines(app, &theme),
        View::Versions => version_lines(app, &theme),
    };
    let body = Paragraph::new(Text::from(body_lines))
        .block(theme.block(app.view.title()))
        .style(theme.text_style())
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(body, chunks[1]);

    let footer = Paragraph::new(footer_line(app, &theme)).block(theme.block("Controls"));
    frame.render_widget(footer, chunks[2]);

    if let Some(form) = &app.form {
        let area = popup_area(frame.area(), 44, (form.fields.len() + 3) as u16);
        frame.render_widget(Clear, area);
        let popup = Paragraph::new(Text::from(form_lines(form, &theme)))
            .block(theme.block(&form.title))
            .style(theme.text_style());
        frame.render_widget(popup, area);
    }
}

/// Plain-text rendering of the timeline for headless use (`--once`).
pub(crate) fn timeline_text(app: &AppState) -> Vec<String> {
    timeline_lines(app, &Theme::dark())
        .into_iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect()
}

fn popup_area(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}

pub(crate) fn form_lines(form: &Form, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, field) in form.fields.iter().enumerate() {
        let active = index == form.active;
        let marker = if active { "»" } else { " " };
        let cursor = if active { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} "), theme.dim_style()),
            Span::styled(format!("{:<9}", field.label), theme.help_style()),
            Span::styled(
                format!("{}{cursor}", field.value),
                if active {
                    theme.highlight_style()
                } else {
                    theme.text_style()
                },
            ),
        ]));
    }
    lines.push(Line::styled(
        "Enter=next/save  Esc=cancel".to_string(),
        theme.dim_style(),
    ));
    lines
}

fn header_line(app: &AppState, theme: &Theme) -> Line<'static> {
    let mut spans = vec![
        Span::styled("view: ", theme.help_style()),
        Span::styled(app.view.title().to_string(), theme.accent_style()),
    ];
    if let Some(report) = &app.report {
        spans.push(Span::styled(
            format!("  hosts: {}", report.host_count()),
            theme.dim_style(),
        ));
    }
    if app.loading {
        spans.push(Span::styled(
            format!("  {} fetching", spinner_frame(app.tick)),
            theme.accent_style(),
        ));
    }
    Line::from(spans)
}

fn footer_line(app: &AppState, theme: &Theme) -> Line<'static> {
    let help = match app.view {
        View::Timeline => "Tab=view  j/k=host  Enter=fold  1-9=step  r=refresh  i=inspect  b=backup  n=new job  q=quit",
        View::Devices => "Tab=view  j/k=select  n=new  e=edit  x=delete  d=reload  q=quit",
        View::Versions => {
            if app.diff.is_some() {
                "Esc=close diff  q=quit"
            } else {
                "Tab=view  j/k=select  Enter=pick  c=compare  v=reload  q=quit"
            }
        }
    };
    let mut spans = vec![Span::styled(help.to_string(), theme.help_style())];
    if app.confirm_quit {
        spans.push(Span::styled(
            "  press q again to quit / Esc to stay",
            theme.warn_style(),
        ));
    }
    if let Some(notice) = app.notices.current() {
        spans.push(Span::styled(
            format!("  [{}] {}", notice.title, notice.body),
            theme.notice_style(notice.level),
        ));
    }
    Line::from(spans)
}

/// Body of the timeline view. Precedence is fixed: a loading fetch hides
/// everything, then a system-level failure, then the empty placeholder,
/// then one panel per host in mapping order.
pub(crate) fn timeline_lines(app: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    if app.loading {
        return vec![
            Line::default(),
            Line::styled(
                format!("  {} running automation task...", spinner_frame(app.tick)),
                theme.accent_style(),
            ),
            Line::styled(
                "  waiting for backend workers to report".to_string(),
                theme.dim_style(),
            ),
        ];
    }

    let Some(report) = &app.report else {
        return empty_placeholder(theme);
    };

    if let Some(message) = report.system_error() {
        return vec![
            Line::default(),
            Line::styled("  ✘ system execution failure", theme.error_style()),
            Line::styled(format!("  {message}"), theme.text_style()),
        ];
    }

    if report.is_empty() {
        return empty_placeholder(theme);
    }

    let mut lines = Vec::new();
    for (index, (host, data)) in report.hosts().enumerate() {
        host_lines(app, theme, index, host, data, &mut lines);
        lines.push(Line::default());
    }
    lines
}

fn empty_placeholder(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::styled("  no execution results yet".to_string(), theme.dim_style()),
        Line::styled(
            "  pick an execution record to see its timeline".to_string(),
            theme.dim_style(),
        ),
    ]
}

fn host_lines(
    app: &AppState,
    theme: &Theme,
    index: usize,
    host: &str,
    data: &HostReport,
    lines: &mut Vec<Line<'static>>,
) {
    let expanded = app.is_host_expanded(host);
    let cursor = if index == app.host_cursor { "»" } else { " " };
    let fold = if expanded { "▾" } else { "▸" };
    let status = data.effective_status();

    let mut spans = vec![
        Span::styled(format!("{cursor} {fold} "), theme.dim_style()),
        Span::styled(
            format!("{} {host}", status_glyph(status, app.tick)),
            if index == app.host_cursor {
                theme.highlight_style()
            } else {
                theme.accent_style()
            },
        ),
    ];
    if data.has_steps() {
        spans.push(Span::styled(
            format!("  {} steps", data.steps.len()),
            theme.dim_style(),
        ));
    }
    spans.push(Span::styled(
        format!("  [{}]", badge_label(status)),
        theme.badge_style(status),
    ));
    if !data.has_steps() && data.final_result.is_none() {
        // Malformed entry: header only, nothing to traverse.
        spans.push(Span::styled("  no steps".to_string(), theme.dim_style()));
    }
    lines.push(Line::from(spans));

    if !expanded {
        return;
    }
    if let Some(error) = &data.error {
        lines.push(Line::styled(
            format!("    error: {error}"),
            theme.error_style(),
        ));
    }
    for (step_index, step) in data.steps.iter().enumerate() {
        step_lines(app, theme, host, step_index, step, &mut *lines);
    }
    if let Some(summary) = &data.final_result {
        lines.push(Line::styled(
            format!("    {summary}"),
            theme.dim_style(),
        ));
    }
}

fn step_lines(
    app: &AppState,
    theme: &Theme,
    host: &str,
    index: usize,
    step: &StepRecord,
    lines: &mut Vec<Line<'static>>,
) {
    let status = step.effective_status();
    let expanded = app.is_step_expanded(host, index);
    let fold = if expanded { "▾" } else { "▸" };

    let name_style = if step.is_pending() {
        theme.dim_style()
    } else {
        theme.text_style()
    };
    lines.push(Line::from(vec![
        Span::styled(format!("    {fold} "), theme.dim_style()),
        Span::styled(
            format!("{} ", status_glyph(status, app.tick)),
            theme.badge_style(status),
        ),
        Span::styled(
            format!("{} {} ", step_glyph(&step.name), step_label(&step.name)),
            name_style,
        ),
        Span::styled(format!("[{}]", badge_label(status)), theme.badge_style(status)),
    ]));

    // Pending steps never expose detail, expanded or not.
    if !expanded || step.is_pending() {
        return;
    }

    if let Some(exception) = &step.exception {
        lines.push(Line::styled(
            format!("{DETAIL_INDENT}exception: {exception}"),
            theme.error_style(),
        ));
    }

    // Fixed ordering inside the detail panel: timing strip, audit trail,
    // then the classified payload.
    if let Some(timing) = step.timing() {
        lines.push(Line::styled(
            format!("{DETAIL_INDENT}{}", super::format::format_timing_strip(&timing)),
            theme.dim_style(),
        ));
    }

    let commands = step.audit_commands();
    if !commands.is_empty() {
        lines.push(Line::styled(
            format!("{DETAIL_INDENT}audit log"),
            theme.accent_style(),
        ));
        for (cmd_index, command) in commands.iter().enumerate() {
            lines.push(Line::styled(
                format!("{DETAIL_INDENT}#{} {}", cmd_index + 1, command),
                theme.text_style(),
            ));
        }
    }

    payload_lines(theme, step, lines);
}

fn payload_lines(theme: &Theme, step: &StepRecord, lines: &mut Vec<Line<'static>>) {
    match step.payload() {
        StepPayload::Health(snapshot) => {
            for line in health_card_lines(&snapshot, theme) {
                lines.push(indent_line(line));
            }
        }
        StepPayload::Structured(value) => {
            for text in wrap_lines(&pretty_json(&value), PAYLOAD_WRAP_WIDTH) {
                lines.push(Line::styled(
                    format!("{DETAIL_INDENT}{text}"),
                    theme.text_style(),
                ));
            }
        }
        StepPayload::Text(text) if !text.is_empty() => {
            for text in wrap_lines(&sanitize_output(&text), PAYLOAD_WRAP_WIDTH) {
                lines.push(Line::styled(
                    format!("{DETAIL_INDENT}{text}"),
                    theme.text_style(),
                ));
            }
        }
        StepPayload::Text(_) | StepPayload::Empty => {
            let placeholder = if step.is_running() {
                "receiving output..."
            } else {
                "completed with no output"
            };
            lines.push(Line::styled(
                format!("{DETAIL_INDENT}{placeholder}"),
                theme.dim_style(),
            ));
        }
    }
}

fn indent_line(line: Line<'static>) -> Line<'static> {
    let mut spans = vec![Span::raw(DETAIL_INDENT)];
    spans.extend(line.spans);
    Line::from(spans)
}

pub(crate) fn device_lines(app: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    if app.devices.is_empty() {
        return vec![
            Line::default(),
            Line::styled(
                "  no devices loaded, press d to fetch the inventory".to_string(),
                theme.dim_style(),
            ),
        ];
    }
    let mut lines = Vec::new();
    for (index, device) in app.devices.iter().enumerate() {
        let cursor = if index == app.device_cursor { "»" } else { " " };
        let online = device.status.eq_ignore_ascii_case("online");
        lines.push(Line::from(vec![
            Span::styled(format!("{cursor} "), theme.dim_style()),
            Span::styled(
                format!("{:<20}", truncate_with_ellipsis(&device.name, 20)),
                if index == app.device_cursor {
                    theme.highlight_style()
                } else {
                    theme.text_style()
                },
            ),
            Span::styled(format!(" {:<16}", device.ip), theme.dim_style()),
            Span::styled(format!(" {:<14}", device.platform), theme.dim_style()),
            Span::styled(device.status.clone(), theme.indicator_style(online)),
        ]));
    }
    lines
}

pub(crate) fn version_lines(app: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    if let Some(diff) = &app.diff {
        let mut lines = vec![Line::styled(
            "  diff of selected versions".to_string(),
            theme.accent_style(),
        )];
        for text in wrap_lines(&sanitize_output(diff), PAYLOAD_WRAP_WIDTH) {
            let style = if text.starts_with('+') {
                theme.indicator_style(true)
            } else if text.starts_with('-') {
                theme.error_style()
            } else {
                theme.text_style()
            };
            lines.push(Line::styled(format!("  {text}"), style));
        }
        return lines;
    }

    if app.versions.is_empty() {
        return vec![
            Line::default(),
            Line::styled(
                "  no version history, press v to fetch it".to_string(),
                theme.dim_style(),
            ),
        ];
    }

    let mut lines = Vec::new();
    for (index, version) in app.versions.iter().enumerate() {
        let cursor = if index == app.version_cursor { "»" } else { " " };
        let marker = match app
            .selected_versions
            .iter()
            .position(|hash| hash == &version.commit_hash)
        {
            Some(0) => Span::styled("[old]".to_string(), theme.warn_style()),
            Some(_) => Span::styled("[new]".to_string(), theme.accent_style()),
            None => Span::styled("     ".to_string(), theme.dim_style()),
        };
        let mut spans = vec![
            Span::styled(format!("{cursor} "), theme.dim_style()),
            marker,
            Span::styled(format!(" {} ", version.short_hash), theme.accent_style()),
            Span::styled(
                truncate_with_ellipsis(&version.message, 48),
                if index == app.version_cursor {
                    theme.highlight_style()
                } else {
                    theme.text_style()
                },
            ),
        ];
        if version.has_changes() {
            spans.push(Span::styled(
                format!("  +{}", version.insertions),
                theme.indicator_style(true),
            ));
            spans.push(Span::styled(
                format!(" -{}", version.deletions),
                theme.error_style(),
            ));
        }
        spans.push(Span::styled(
            format!("  {}", version.timestamp),
            theme.dim_style(),
        ));
        lines.push(Line::from(spans));
    }

    let hint = match app.selected_versions.len() {
        0 => "pick a version to start a comparison",
        1 => "pick one more version to compare",
        _ => "two versions selected, press c to compare",
    };
    lines.push(Line::default());
    lines.push(Line::styled(format!("  {hint}"), theme.help_style()));
    lines
}
