use ratatui::text::{Line, Span};

use netops_protocol::health::{HardwareStatus, HealthSnapshot};

use super::format::{format_percent, format_uptime};
use super::theme::{GaugeKind, Theme};

const GAUGE_CELLS: usize = 20;

/// Renders one health snapshot as a fixed five-block layout: identity
/// header, resource gauges, interface totals, hardware status, and a static
/// note on how the inspection was performed.
pub(crate) fn health_card_lines(snapshot: &HealthSnapshot, theme: &Theme) -> Vec<Line<'static>> {
    // The one explicit defensive check in this module: without `basic` the
    // payload is not worth traversing.
    let Some(basic) = &snapshot.basic else {
        return vec![Line::styled(
            "health payload parse failed",
            theme.dim_style(),
        )];
    };

    let mut lines = Vec::new();

    // 1. identity header
    let hostname = if basic.hostname.is_empty() {
        "Unknown Host".to_string()
    } else {
        basic.hostname.clone()
    };
    lines.push(Line::from(vec![
        Span::styled(hostname, theme.accent_style()),
        Span::styled(format!("  {}", basic.model), theme.text_style()),
        Span::styled(format!("  SN: {}", basic.sn), theme.dim_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("version ", theme.dim_style()),
        Span::styled(basic.version.clone(), theme.text_style()),
        Span::styled("  uptime ", theme.dim_style()),
        Span::styled(format_uptime(basic.uptime), theme.text_style()),
    ]));
    lines.push(Line::default());

    // 2. resource gauges
    lines.push(gauge_line(
        theme,
        GaugeKind::Cpu,
        "cpu",
        snapshot.resources.cpu_avg,
    ));
    lines.push(gauge_line(
        theme,
        GaugeKind::Memory,
        "mem",
        snapshot.resources.memory_usage,
    ));
    lines.push(Line::default());

    // 3. interface totals
    let stats = &snapshot.interface_stats;
    lines.push(Line::from(vec![
        Span::styled("interfaces ", theme.dim_style()),
        Span::styled(format!("{} total", stats.total), theme.text_style()),
        Span::styled(format!("  {} up", stats.up_count), theme.indicator_style(true)),
        Span::styled(
            format!("  {} errors", stats.error_total),
            theme.indicator_style(stats.error_total == 0),
        ),
    ]));
    lines.push(Line::default());

    // 4. hardware status
    lines.push(hardware_line(theme, &snapshot.hardware));
    lines.push(Line::default());

    // 5. inspection methodology, informational only
    lines.push(Line::styled(
        "collected over SSH (netmiko/paramiko), platform auto-detected",
        theme.dim_style(),
    ));
    lines.push(Line::styled(
        "probes: version, environment, interfaces, cpu, memory",
        theme.dim_style(),
    ));
    if let Some(timestamp) = &snapshot.timestamp {
        lines.push(Line::styled(
            format!("sampled at {timestamp}"),
            theme.dim_style(),
        ));
    }

    lines
}

/// Percentage bar. Width is clamped to 100 percent; the label keeps the raw
/// value so an over-100 reading is still visible as text.
fn gauge_line(theme: &Theme, kind: GaugeKind, label: &str, value: f64) -> Line<'static> {
    let clamped = value.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * GAUGE_CELLS as f64).round() as usize;
    let filled = filled.min(GAUGE_CELLS);
    let bar: String = "█".repeat(filled) + &"░".repeat(GAUGE_CELLS - filled);
    Line::from(vec![
        Span::styled(format!("{label:<4}"), theme.dim_style()),
        Span::styled(bar, theme.gauge_style(kind, value)),
        Span::styled(format!(" {}", format_percent(value)), theme.text_style()),
    ])
}

fn hardware_line(theme: &Theme, hardware: &HardwareStatus) -> Line<'static> {
    let mut spans = vec![Span::styled("hardware ", theme.dim_style())];
    spans.push(indicator_span(theme, "pwr", hardware.pwr_ok, None));
    spans.push(indicator_span(theme, "fan", hardware.fans_ok, None));
    // Temperature shows the reading instead of the ok/fault word when the
    // backend supplied one.
    let reading = hardware.max_temp.map(|t| format!("{t}°C"));
    spans.push(indicator_span(theme, "temp", hardware.temp_ok, reading));
    Line::from(spans)
}

fn indicator_span(
    theme: &Theme,
    label: &str,
    ok: bool,
    reading: Option<String>,
) -> Span<'static> {
    let word = reading.unwrap_or_else(|| if ok { "ok" } else { "fault" }.to_string());
    Span::styled(format!("{label}:{word}  "), theme.indicator_style(ok))
}
