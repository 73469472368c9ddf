use serde::{Deserialize, Serialize};

/// Point-in-time device health snapshot. The backend marks no explicit type
/// tag; the shape is recognized structurally by the presence of `basic`,
/// `resources` and `hardware` at the top level. Every field is defaulted so
/// a partial snapshot still parses and renders what it has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub basic: Option<BasicInfo>,
    #[serde(default)]
    pub resources: ResourceMetrics,
    #[serde(default)]
    pub hardware: HardwareStatus,
    #[serde(default)]
    pub interface_stats: InterfaceStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub version: String,
    /// Uptime in whole seconds.
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub sn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// Averaged CPU load, percent. May exceed 100 on multi-core readings.
    #[serde(default)]
    pub cpu_avg: f64,
    #[serde(default)]
    pub memory_usage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareStatus {
    #[serde(default)]
    pub fans_ok: bool,
    #[serde(default)]
    pub pwr_ok: bool,
    #[serde(default)]
    pub temp_ok: bool,
    #[serde(default)]
    pub max_temp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub up_count: u64,
    #[serde(default)]
    pub error_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_snapshot_parses() {
        let snapshot: HealthSnapshot = serde_json::from_value(json!({
            "timestamp": "2026-08-30T10:00:00Z",
            "basic": {
                "hostname": "core-01",
                "model": "C9300",
                "version": "17.9",
                "uptime": 90000,
                "sn": "FCW1234"
            },
            "resources": {"cpu_avg": 12.5, "memory_usage": 63.0},
            "hardware": {"fans_ok": true, "pwr_ok": true, "temp_ok": true, "max_temp": 41.0},
            "interface_stats": {"total": 48, "up_count": 32, "error_total": 0}
        }))
        .expect("deserialize");
        let basic = snapshot.basic.expect("basic present");
        assert_eq!(basic.hostname, "core-01");
        assert_eq!(basic.uptime, 90000);
        assert_eq!(snapshot.interface_stats.up_count, 32);
    }

    #[test]
    fn partial_snapshot_still_parses() {
        let snapshot: HealthSnapshot = serde_json::from_value(json!({
            "resources": {"cpu_avg": 99.0}
        }))
        .expect("deserialize");
        assert!(snapshot.basic.is_none());
        assert_eq!(snapshot.resources.cpu_avg, 99.0);
        assert_eq!(snapshot.resources.memory_usage, 0.0);
    }
}
