use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use netops_protocol::inventory::{Device, VersionEntry};
use netops_protocol::{ExecutionReport, HostReport};

use crate::events::ServiceEvent;
use crate::notices::{NoticeBoard, NoticeLevel};

use super::form::Form;

const NOTICE_TTL: Duration = Duration::from_secs(4);

/// How many versions may be selected for a diff.
const MAX_SELECTED_VERSIONS: usize = 2;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum View {
    #[default]
    Timeline,
    Devices,
    Versions,
}

impl View {
    pub(crate) fn next(self) -> Self {
        match self {
            View::Timeline => View::Devices,
            View::Devices => View::Versions,
            View::Versions => View::Timeline,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            View::Timeline => "Execution Timeline",
            View::Devices => "Device Inventory",
            View::Versions => "Version History",
        }
    }
}

/// All state owned by the rendering context. Expansion sets are pure view
/// state: never derived from the report, discarded with the view.
pub(crate) struct AppState {
    pub(crate) view: View,
    pub(crate) report: Option<ExecutionReport>,
    pub(crate) loading: bool,
    pub(crate) expanded_hosts: BTreeSet<String>,
    pub(crate) expanded_steps: BTreeSet<(String, usize)>,
    pub(crate) host_cursor: usize,
    pub(crate) devices: Vec<Device>,
    pub(crate) device_cursor: usize,
    pub(crate) versions: Vec<VersionEntry>,
    pub(crate) version_cursor: usize,
    /// Ordered, at most two entries; first is the old side of the diff.
    pub(crate) selected_versions: Vec<String>,
    pub(crate) diff: Option<String>,
    pub(crate) notices: NoticeBoard,
    /// Modal edit form; while open it captures all key input.
    pub(crate) form: Option<Form>,
    pub(crate) scroll: u16,
    pub(crate) tick: u64,
    pub(crate) confirm_quit: bool,
}

impl AppState {
    pub(crate) fn new() -> Self {
        Self {
            view: View::default(),
            report: None,
            loading: false,
            expanded_hosts: BTreeSet::new(),
            expanded_steps: BTreeSet::new(),
            host_cursor: 0,
            devices: Vec::new(),
            device_cursor: 0,
            versions: Vec::new(),
            version_cursor: 0,
            selected_versions: Vec::new(),
            diff: None,
            notices: NoticeBoard::new(NOTICE_TTL),
            form: None,
            scroll: 0,
            tick: 0,
            confirm_quit: false,
        }
    }

    pub(crate) fn handle_event(&mut self, event: ServiceEvent, now: Instant) {
        match event {
            ServiceEvent::ResultsLoading => {
                if self.report.is_none() {
                    self.loading = true;
                }
            }
            ServiceEvent::ResultsUpdated(report) => self.apply_report(report),
            ServiceEvent::DevicesLoaded(devices) => {
                self.devices = devices;
                if !self.devices.is_empty() {
                    self.device_cursor = self.device_cursor.min(self.devices.len() - 1);
                } else {
                    self.device_cursor = 0;
                }
            }
            ServiceEvent::VersionsLoaded(versions) => {
                self.versions = versions;
                let known = &self.versions;
                self.selected_versions
                    .retain(|hash| known.iter().any(|v| &v.commit_hash == hash));
                if !self.versions.is_empty() {
                    self.version_cursor = self.version_cursor.min(self.versions.len() - 1);
                } else {
                    self.version_cursor = 0;
                }
            }
            ServiceEvent::DiffReady(diff) => {
                self.diff = Some(diff);
            }
            ServiceEvent::Notice(level, title, body) => {
                self.notices.push_at(now, level, title, body);
            }
        }
    }

    /// Installs a fresh report and auto-expands every host present in it.
    /// Hosts are only ever added here; collapsing stays a user action so a
    /// newly appearing host is always visible without a click.
    pub(crate) fn apply_report(&mut self, report: ExecutionReport) {
        for (host, _) in report.hosts() {
            self.expanded_hosts.insert(host.clone());
        }
        if report.host_count() > 0 {
            self.host_cursor = self.host_cursor.min(report.host_count() - 1);
        } else {
            self.host_cursor = 0;
        }
        self.report = Some(report);
        self.loading = false;
    }

    /// Involutive: toggling twice restores the prior state.
    pub(crate) fn toggle_host(&mut self, host: &str) {
        if !self.expanded_hosts.remove(host) {
            self.expanded_hosts.insert(host.to_string());
        }
    }

    /// Step expansion is keyed by (host, index) and independent of the
    /// host's own expansion state.
    pub(crate) fn toggle_step(&mut self, host: &str, index: usize) {
        let key = (host.to_string(), index);
        if !self.expanded_steps.remove(&key) {
            self.expanded_steps.insert(key);
        }
    }

    pub(crate) fn is_host_expanded(&self, host: &str) -> bool {
        self.expanded_hosts.contains(host)
    }

    pub(crate) fn is_step_expanded(&self, host: &str, index: usize) -> bool {
        self.expanded_steps
            .contains(&(host.to_string(), index))
    }

    pub(crate) fn selected_host(&self) -> Option<(&String, &HostReport)> {
        self.report.as_ref()?.host_at(self.host_cursor)
    }

    pub(crate) fn toggle_selected_host(&mut self) {
        if let Some((host, _)) = self.selected_host() {
            let host = host.clone();
            self.toggle_host(&host);
        }
    }

    pub(crate) fn toggle_step_of_selected(&mut self, index: usize) {
        let Some((host, report)) = self.selected_host() else {
            return;
        };
        if index >= report.steps.len() {
            return;
        }
        let host = host.clone();
        self.toggle_step(&host, index);
    }

    pub(crate) fn select_next(&mut self) {
        match self.view {
            View::Timeline => {
                let count = self.report.as_ref().map_or(0, ExecutionReport::host_count);
                if count > 0 {
                    self.host_cursor = (self.host_cursor + 1) % count;
                }
            }
            View::Devices => {
                if !self.devices.is_empty() {
                    self.device_cursor = (self.device_cursor + 1) % self.devices.len();
                }
            }
            View::Versions => {
                if !self.versions.is_empty() {
                    self.version_cursor = (self.version_cursor + 1) % self.versions.len();
                }
            }
        }
    }

    pub(crate) fn select_prev(&mut self) {
        match self.view {
            View::Timeline => {
                let count = self.report.as_ref().map_or(0, ExecutionReport::host_count);
                if count > 0 {
                    self.host_cursor = self.host_cursor.checked_sub(1).unwrap_or(count - 1);
                }
            }
            View::Devices => {
                if !self.devices.is_empty() {
                    self.device_cursor = self
                        .device_cursor
                        .checked_sub(1)
                        .unwrap_or(self.devices.len() - 1);
                }
            }
            View::Versions => {
                if !self.versions.is_empty() {
                    self.version_cursor = self
                        .version_cursor
                        .checked_sub(1)
                        .unwrap_or(self.versions.len() - 1);
                }
            }
        }
    }

    pub(crate) fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.scroll = 0;
    }

    pub(crate) fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub(crate) fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub(crate) fn close_diff(&mut self) {
        self.diff = None;
        self.scroll = 0;
    }

    /// Bounded two-item selection for diffing. Reselecting a hash drops it;
    /// a third selection evicts the oldest so the newest click always lands.
    pub(crate) fn select_version(&mut self, commit_hash: &str) {
        if let Some(pos) = self
            .selected_versions
            .iter()
            .position(|hash| hash == commit_hash)
        {
            self.selected_versions.remove(pos);
            return;
        }
        if self.selected_versions.len() == MAX_SELECTED_VERSIONS {
            self.selected_versions.remove(0);
        }
        self.selected_versions.push(commit_hash.to_string());
    }

    pub(crate) fn select_version_under_cursor(&mut self) {
        if let Some(entry) = self.versions.get(self.version_cursor) {
            let hash = entry.commit_hash.clone();
            self.select_version(&hash);
        }
    }

    pub(crate) fn can_compare(&self) -> bool {
        self.selected_versions.len() == MAX_SELECTED_VERSIONS
    }

    /// (old, new) pair once exactly two versions are selected.
    pub(crate) fn compare_pair(&self) -> Option<(String, String)> {
        if !self.can_compare() {
            return None;
        }
        Some((
            self.selected_versions[0].clone(),
            self.selected_versions[1].clone(),
        ))
    }

    pub(crate) fn open_device_form(&mut self) {
        self.form = Some(Form::new_device());
    }

    pub(crate) fn open_edit_device_form(&mut self) {
        if let Some(device) = self.devices.get(self.device_cursor) {
            self.form = Some(Form::edit_device(device));
        }
    }

    pub(crate) fn open_job_form(&mut self) {
        self.form = Some(Form::new_job());
    }

    pub(crate) fn close_form(&mut self) {
        self.form = None;
    }

    pub(crate) fn selected_device_id(&self) -> Option<i64> {
        self.devices.get(self.device_cursor)?.id
    }

    pub(crate) fn notice(&mut self, level: NoticeLevel, title: &str, body: &str, now: Instant) {
        self.notices.push_at(now, level, title, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(hosts: &[&str]) -> ExecutionReport {
        let mut map = serde_json::Map::new();
        for host in hosts {
            map.insert(
                host.to_string(),
                json!({"success": true, "steps": [{"name": "backup_config", "success": true}]}),
            );
        }
        ExecutionReport::from_value(serde_json::Value::Object(map))
    }

    fn version(hash: &str) -> VersionEntry {
        VersionEntry {
            commit_hash: hash.to_string(),
            short_hash: hash.chars().take(7).collect(),
            ..VersionEntry::default()
        }
    }

    #[test]
    fn toggle_host_is_an_involution() {
        let mut app = AppState::new();
        let before = app.expanded_hosts.clone();
        app.toggle_host("core-01");
        app.toggle_host("core-01");
        assert_eq!(app.expanded_hosts, before);

        app.expanded_hosts.insert("edge-02".to_string());
        let before = app.expanded_hosts.clone();
        app.toggle_host("edge-02");
        app.toggle_host("edge-02");
        assert_eq!(app.expanded_hosts, before);
    }

    #[test]
    fn toggle_step_is_independent_of_host_expansion() {
        let mut app = AppState::new();
        app.toggle_step("core-01", 2);
        assert!(app.is_step_expanded("core-01", 2));
        assert!(!app.is_host_expanded("core-01"));
        app.toggle_step("core-01", 2);
        assert!(!app.is_step_expanded("core-01", 2));
    }

    #[test]
    fn fresh_report_auto_expands_every_host() {
        let mut app = AppState::new();
        assert!(app.expanded_hosts.is_empty());
        app.apply_report(report(&["alpha", "beta"]));
        assert!(app.is_host_expanded("alpha"));
        assert!(app.is_host_expanded("beta"));
    }

    #[test]
    fn auto_expand_never_collapses_known_hosts() {
        let mut app = AppState::new();
        app.apply_report(report(&["alpha", "beta"]));
        // A later poll without beta leaves it expanded.
        app.apply_report(report(&["alpha"]));
        assert!(app.is_host_expanded("beta"));
    }

    #[test]
    fn user_collapse_survives_until_next_report() {
        let mut app = AppState::new();
        app.apply_report(report(&["alpha"]));
        app.toggle_host("alpha");
        assert!(!app.is_host_expanded("alpha"));
        // The next poll re-expands it; visibility wins over tidiness.
        app.apply_report(report(&["alpha"]));
        assert!(app.is_host_expanded("alpha"));
    }

    #[test]
    fn report_update_clears_loading() {
        let mut app = AppState::new();
        app.handle_event(ServiceEvent::ResultsLoading, Instant::now());
        assert!(app.loading);
        app.handle_event(ServiceEvent::ResultsUpdated(report(&["alpha"])), Instant::now());
        assert!(!app.loading);
    }

    #[test]
    fn loading_flag_skipped_once_data_is_on_screen() {
        let mut app = AppState::new();
        app.apply_report(report(&["alpha"]));
        app.handle_event(ServiceEvent::ResultsLoading, Instant::now());
        assert!(!app.loading);
    }

    #[test]
    fn version_selection_is_bounded_to_two() {
        let mut app = AppState::new();
        app.select_version("aaa");
        app.select_version("bbb");
        assert!(app.can_compare());
        // Third selection evicts the oldest.
        app.select_version("ccc");
        assert_eq!(app.selected_versions, vec!["bbb", "ccc"]);
        assert_eq!(
            app.compare_pair(),
            Some(("bbb".to_string(), "ccc".to_string()))
        );
    }

    #[test]
    fn reselecting_a_version_deselects_it() {
        let mut app = AppState::new();
        app.select_version("aaa");
        app.select_version("bbb");
        app.select_version("aaa");
        assert_eq!(app.selected_versions, vec!["bbb"]);
        assert!(!app.can_compare());
        assert_eq!(app.compare_pair(), None);
    }

    #[test]
    fn stale_selections_dropped_when_history_reloads() {
        let mut app = AppState::new();
        app.select_version("aaa");
        app.select_version("bbb");
        app.handle_event(
            ServiceEvent::VersionsLoaded(vec![version("bbb"), version("ccc")]),
            Instant::now(),
        );
        assert_eq!(app.selected_versions, vec!["bbb"]);
    }

    #[test]
    fn timeline_cursor_wraps() {
        let mut app = AppState::new();
        app.apply_report(report(&["alpha", "beta", "gamma"]));
        assert_eq!(app.host_cursor, 0);
        app.select_prev();
        assert_eq!(app.host_cursor, 2);
        app.select_next();
        assert_eq!(app.host_cursor, 0);
    }

    #[test]
    fn step_toggle_ignores_out_of_range_index() {
        let mut app = AppState::new();
        app.apply_report(report(&["alpha"]));
        app.toggle_step_of_selected(5);
        assert!(app.expanded_steps.is_empty());
        app.toggle_step_of_selected(0);
        assert!(app.is_step_expanded("alpha", 0));
    }
}
