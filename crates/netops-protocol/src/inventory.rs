use serde::{Deserialize, Serialize};

/// A managed network device as the backend inventory returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Scheduled automation job definition. Cron evaluation happens backend-side;
/// this layer only submits and displays it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationJob {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Backend job kind identifier, e.g. "backup" or "inspect".
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub cron: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub device_names: Vec<String>,
}

/// One entry of the git-backed configuration version history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub commit_hash: String,
    #[serde(default)]
    pub short_hash: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub insertions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
}

impl VersionEntry {
    pub fn has_changes(&self) -> bool {
        self.insertions > 0 || self.deletions > 0
    }
}
