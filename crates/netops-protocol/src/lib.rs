use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod health;
pub mod inventory;
pub mod payload;

pub use health::HealthSnapshot;
pub use payload::StepPayload;

/// Reserved key in a results mapping that turns the whole report into a
/// single top-level failure. It is a sentinel, never a host.
pub const SYSTEM_ERROR_KEY: &str = "system_error";

/// Step name the backend uses for health probes. A step carrying this name
/// routes to the health card even when the payload shape is off.
pub const HEALTH_STEP_NAME: &str = "inspect_health";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Pending,
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Failed)
    }
}

/// Timing breakdown attached to a step result, seconds per bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepPerformance {
    #[serde(default)]
    pub connect_latency: Option<f64>,
    #[serde(default)]
    pub env_gather_latency: Option<f64>,
    #[serde(default)]
    pub intf_gather_latency: Option<f64>,
    #[serde(default)]
    pub total_processing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<ExecutionStatus>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub performance: Option<StepPerformance>,
}

impl StepRecord {
    /// An absent status is a terminal state derived from `success`.
    pub fn effective_status(&self) -> ExecutionStatus {
        self.status.unwrap_or(if self.success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == Some(ExecutionStatus::Pending)
    }

    pub fn is_running(&self) -> bool {
        self.status == Some(ExecutionStatus::Running)
    }

    /// Classifies the result payload once; renderers match on the variant
    /// instead of re-probing the JSON shape.
    pub fn payload(&self) -> StepPayload {
        payload::classify(&self.name, self.result.as_ref())
    }

    /// Ordered command log under `audit_trail.commands_executed`, if any.
    /// Shown regardless of which payload variant the step carries.
    pub fn audit_commands(&self) -> Vec<String> {
        self.result
            .as_ref()
            .and_then(|value| value.get("audit_trail"))
            .and_then(|audit| audit.get("commands_executed"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Timing buckets; the copy embedded in the result wins over the
    /// step-level field when both are present.
    pub fn timing(&self) -> Option<StepPerformance> {
        self.result
            .as_ref()
            .and_then(|value| value.get("performance"))
            .and_then(|perf| serde_json::from_value(perf.clone()).ok())
            .or_else(|| self.performance.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<ExecutionStatus>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub final_result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HostReport {
    pub fn effective_status(&self) -> ExecutionStatus {
        self.status.unwrap_or(if self.success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        })
    }

    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// One polled snapshot of per-host execution results. Transient: rebuilt
/// wholesale on every fetch, no identity beyond host key and step index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    system_error: Option<String>,
    hosts: Vec<(String, HostReport)>,
}

impl ExecutionReport {
    /// Interprets a raw results mapping. Host entries keep mapping order.
    /// Host values that do not parse as a report degrade to an empty one
    /// instead of failing the whole snapshot.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let mut system_error = None;
        let mut hosts = Vec::with_capacity(map.len());
        for (key, entry) in map {
            if key == SYSTEM_ERROR_KEY {
                let message = match entry {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                if !message.is_empty() {
                    system_error = Some(message);
                }
                continue;
            }
            let report = serde_json::from_value(entry).unwrap_or_default();
            hosts.push((key, report));
        }
        Self {
            system_error,
            hosts,
        }
    }

    /// Top-level failure message. When present it is the only thing a
    /// consumer should show; per-host data is suppressed.
    pub fn system_error(&self) -> Option<&str> {
        self.system_error.as_deref()
    }

    /// Hosts in mapping order, sentinel excluded.
    pub fn hosts(&self) -> impl Iterator<Item = (&String, &HostReport)> {
        self.hosts.iter().map(|(name, report)| (name, report))
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn host_at(&self, index: usize) -> Option<(&String, &HostReport)> {
        self.hosts.get(index).map(|(name, report)| (name, report))
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step_status_falls_back_to_success_flag() {
        let step: StepRecord = serde_json::from_value(json!({
            "name": "backup_config",
            "success": true
        }))
        .expect("deserialize");
        assert_eq!(step.effective_status(), ExecutionStatus::Success);

        let step: StepRecord = serde_json::from_value(json!({
            "name": "backup_config",
            "success": false
        }))
        .expect("deserialize");
        assert_eq!(step.effective_status(), ExecutionStatus::Failed);
    }

    #[test]
    fn explicit_status_wins_over_success_flag() {
        let step: StepRecord = serde_json::from_value(json!({
            "name": "backup_config",
            "success": false,
            "status": "running"
        }))
        .expect("deserialize");
        assert_eq!(step.effective_status(), ExecutionStatus::Running);
        assert!(step.is_running());
    }

    #[test]
    fn report_keeps_host_mapping_order() {
        let report = ExecutionReport::from_value(json!({
            "edge-02": {"success": true, "steps": []},
            "core-01": {"success": false, "steps": []},
        }));
        let names: Vec<&str> = report.hosts().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["edge-02", "core-01"]);
    }

    #[test]
    fn system_error_is_extracted_and_excluded_from_hosts() {
        let report = ExecutionReport::from_value(json!({
            "system_error": "scheduler crashed",
            "core-01": {"success": true},
        }));
        assert_eq!(report.system_error(), Some("scheduler crashed"));
        assert!(report.hosts().all(|(name, _)| name != SYSTEM_ERROR_KEY));
    }

    #[test]
    fn empty_system_error_is_ignored() {
        let report = ExecutionReport::from_value(json!({
            "system_error": "",
            "core-01": {"success": true},
        }));
        assert_eq!(report.system_error(), None);
        assert_eq!(report.host_count(), 1);
    }

    #[test]
    fn non_string_system_error_is_stringified() {
        let report = ExecutionReport::from_value(json!({
            "system_error": {"code": 500},
        }));
        assert_eq!(report.system_error(), Some(r#"{"code":500}"#));
    }

    #[test]
    fn malformed_host_entry_degrades_to_empty_report() {
        let report = ExecutionReport::from_value(json!({
            "core-01": "not an object",
        }));
        let (_, host) = report.host_at(0).expect("host present");
        assert!(!host.has_steps());
        assert!(host.final_result.is_none());
    }

    #[test]
    fn non_object_report_is_empty() {
        let report = ExecutionReport::from_value(json!([1, 2, 3]));
        assert!(report.is_empty());
        assert_eq!(report.system_error(), None);
    }

    #[test]
    fn audit_commands_extracted_in_order() {
        let step: StepRecord = serde_json::from_value(json!({
            "name": "run_commands",
            "success": true,
            "result": {
                "audit_trail": {
                    "commands_executed": ["show version", "show env", "show int"]
                }
            }
        }))
        .expect("deserialize");
        assert_eq!(
            step.audit_commands(),
            vec!["show version", "show env", "show int"]
        );
    }

    #[test]
    fn result_embedded_performance_wins() {
        let step: StepRecord = serde_json::from_value(json!({
            "name": "inspect_health",
            "success": true,
            "performance": {"total_processing": 9.0},
            "result": {"performance": {"total_processing": 3.5}}
        }))
        .expect("deserialize");
        let timing = step.timing().expect("timing present");
        assert_eq!(timing.total_processing, Some(3.5));
    }

    #[test]
    fn host_report_roundtrip() {
        let host = HostReport {
            success: true,
            status: Some(ExecutionStatus::Success),
            steps: vec![StepRecord {
                name: "napalm_get".to_string(),
                success: true,
                status: None,
                result: Some(json!({"facts": {"os": "ios"}})),
                exception: None,
                performance: None,
            }],
            final_result: Some("done".to_string()),
            error: None,
        };
        let json = serde_json::to_string(&host).expect("serialize");
        let decoded: HostReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(host, decoded);
    }
}
