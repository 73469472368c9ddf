use netops_protocol::{ExecutionStatus, StepPerformance};
use serde_json::Value;

/// Well-known backend step identifiers, prettified for display. Unknown
/// names pass through untouched.
pub(crate) fn step_label(name: &str) -> &str {
    match name {
        "inspect_health" => "Health inspection",
        "napalm_get" => "NAPALM data fetch",
        "netmiko_send_command" => "Netmiko command run",
        "netmiko_send_config" => "Netmiko config push",
        "backup_config" => "Config backup",
        "run_commands" => "Batch command run",
        "apply_config" => "Config apply",
        other => other,
    }
}

/// Icon glyph for a step, from a case-insensitive substring match.
/// First matching rule wins; order matters.
pub(crate) fn step_glyph(name: &str) -> char {
    let name = name.to_lowercase();
    if name.contains("napalm") || name.contains("get") {
        '≡' // data fetch
    } else if name.contains("netmiko") || name.contains("command") {
        '❯' // command push
    } else if name.contains("health") || name.contains("inspect") {
        '∿' // health probe
    } else {
        '▣' // generic processing
    }
}

pub(crate) fn badge_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Running => "RUNNING",
        ExecutionStatus::Pending => "PENDING",
        ExecutionStatus::Success => "SUCCESS",
        ExecutionStatus::Failed => "FAILURE",
    }
}

const SPINNER_FRAMES: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];

pub(crate) fn spinner_frame(tick: u64) -> char {
    SPINNER_FRAMES[(tick % SPINNER_FRAMES.len() as u64) as usize]
}

pub(crate) fn status_glyph(status: ExecutionStatus, tick: u64) -> char {
    match status {
        ExecutionStatus::Running => spinner_frame(tick),
        ExecutionStatus::Pending => '◷',
        ExecutionStatus::Success => '✔',
        ExecutionStatus::Failed => '✘',
    }
}

/// Canonical fallback for a missing timing bucket.
pub(crate) fn format_latency(seconds: Option<f64>) -> String {
    match seconds {
        Some(value) => format!("{value:.2}s"),
        None => "—".to_string(),
    }
}

pub(crate) fn format_timing_strip(timing: &StepPerformance) -> String {
    format!(
        "connect {}  env {}  intf {}  total {}",
        format_latency(timing.connect_latency),
        format_latency(timing.env_gather_latency),
        format_latency(timing.intf_gather_latency),
        format_latency(timing.total_processing),
    )
}

pub(crate) fn format_percent(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{:.0}%", value)
    } else {
        format!("{value:.1}%")
    }
}

/// Uptime seconds decomposed into whole days, hours and minutes. Zero means
/// the backend had nothing, not a zero-length uptime.
pub(crate) fn format_uptime(seconds: u64) -> String {
    if seconds == 0 {
        return "N/A".to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

pub(crate) fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_protocol::StepPerformance;

    #[test]
    fn known_step_names_get_labels() {
        assert_eq!(step_label("napalm_get"), "NAPALM data fetch");
        assert_eq!(step_label("custom_probe"), "custom_probe");
    }

    #[test]
    fn glyph_rules_fire_in_order() {
        // "napalm_get" matches the data-fetch rule before anything else.
        assert_eq!(step_glyph("napalm_get"), '≡');
        assert_eq!(step_glyph("NETMIKO_SEND_COMMAND"), '❯');
        assert_eq!(step_glyph("inspect_health"), '∿');
        assert_eq!(step_glyph("mystery_step"), '▣');
        // A name matching both the fetch and health rules takes the first.
        assert_eq!(step_glyph("get_health"), '≡');
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(90_000), "1d 1h 0m");
        assert_eq!(format_uptime(0), "N/A");
        assert_eq!(format_uptime(3_660), "0d 1h 1m");
    }

    #[test]
    fn timing_strip_uses_dash_fallback() {
        let timing = StepPerformance {
            connect_latency: Some(0.42),
            env_gather_latency: None,
            intf_gather_latency: Some(2.1),
            total_processing: None,
        };
        assert_eq!(
            format_timing_strip(&timing),
            "connect 0.42s  env —  intf 2.10s  total —"
        );
    }

    #[test]
    fn percent_drops_trailing_zero_fraction() {
        assert_eq!(format_percent(63.0), "63%");
        assert_eq!(format_percent(63.5), "63.5%");
    }
}
