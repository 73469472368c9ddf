use netops_protocol::inventory::{AutomationJob, Device, VersionEntry};
use netops_protocol::ExecutionReport;

use crate::notices::NoticeLevel;

/// Data pushed from the poller task to the UI loop.
pub(crate) enum ServiceEvent {
    ResultsLoading,
    ResultsUpdated(ExecutionReport),
    DevicesLoaded(Vec<Device>),
    VersionsLoaded(Vec<VersionEntry>),
    DiffReady(String),
    Notice(NoticeLevel, String, String),
}

/// Requests the UI fires at the poller task. Fire-and-forget; outcomes come
/// back as `ServiceEvent`s.
pub(crate) enum ServiceCommand {
    RefreshResults,
    TriggerInspect,
    TriggerBackup,
    LoadDevices,
    SaveDevice(Device),
    DeleteDevice(i64),
    SaveJob(AutomationJob),
    LoadVersions,
    CompareVersions { old: String, new: String },
}
