use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use crate::client::ApiClient;
use crate::events::{ServiceCommand, ServiceEvent};
use crate::notices::NoticeLevel;

/// Spawns the background task that talks to the backend. Results polling
/// runs on a fixed cadence; everything else is on demand. Each request is
/// independent: no de-duplication, no cancellation of in-flight calls.
pub(crate) fn spawn_poller(
    client: Arc<ApiClient>,
    job_id: Option<i64>,
    config_path: Option<String>,
    poll_interval: Duration,
    event_tx: mpsc::Sender<ServiceEvent>,
    mut cmd_rx: mpsc::Receiver<ServiceCommand>,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    refresh_results(&client, job_id, &event_tx).await;
                }
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    handle_command(&client, job_id, config_path.as_deref(), cmd, &event_tx).await;
                }
            }
        }
    });
}

async fn refresh_results(
    client: &ApiClient,
    job_id: Option<i64>,
    event_tx: &mpsc::Sender<ServiceEvent>,
) {
    let Some(job_id) = job_id else {
        return;
    };
    let _ = event_tx.send(ServiceEvent::ResultsLoading).await;
    match client.fetch_results(job_id).await {
        Ok(report) => {
            let _ = event_tx.send(ServiceEvent::ResultsUpdated(report)).await;
        }
        Err(err) => {
            warn!(error = %err, "results fetch failed");
            let _ = event_tx
                .send(ServiceEvent::Notice(
                    NoticeLevel::Error,
                    "fetch failed".to_string(),
                    err.to_string(),
                ))
                .await;
        }
    }
}

async fn handle_command(
    client: &ApiClient,
    job_id: Option<i64>,
    config_path: Option<&str>,
    cmd: ServiceCommand,
    event_tx: &mpsc::Sender<ServiceEvent>,
) {
    match cmd {
        ServiceCommand::RefreshResults => {
            refresh_results(client, job_id, event_tx).await;
        }
        ServiceCommand::TriggerInspect => {
            notify_outcome(
                event_tx,
                "inspection",
                client.trigger_inspect(&[]).await,
                "inspection triggered for all devices",
            )
            .await;
        }
        ServiceCommand::TriggerBackup => {
            notify_outcome(
                event_tx,
                "backup",
                client.trigger_backup(&[]).await,
                "backup triggered for all devices",
            )
            .await;
        }
        ServiceCommand::LoadDevices => match client.list_devices().await {
            Ok(devices) => {
                let _ = event_tx.send(ServiceEvent::DevicesLoaded(devices)).await;
            }
            Err(err) => {
                let _ = event_tx
                    .send(ServiceEvent::Notice(
                        NoticeLevel::Error,
                        "device list failed".to_string(),
                        err.to_string(),
                    ))
                    .await;
            }
        },
        ServiceCommand::SaveDevice(device) => {
            let outcome = client.save_device(&device).await;
            match outcome {
                Ok(saved) => {
                    let _ = event_tx
                        .send(ServiceEvent::Notice(
                            NoticeLevel::Success,
                            "device saved".to_string(),
                            saved.name,
                        ))
                        .await;
                    if let Ok(devices) = client.list_devices().await {
                        let _ = event_tx.send(ServiceEvent::DevicesLoaded(devices)).await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "device save failed");
                    let _ = event_tx
                        .send(ServiceEvent::Notice(
                            NoticeLevel::Error,
                            "device save failed".to_string(),
                            err.to_string(),
                        ))
                        .await;
                }
            }
        }
        ServiceCommand::DeleteDevice(id) => {
            match client.delete_device(id).await {
                Ok(()) => {
                    let _ = event_tx
                        .send(ServiceEvent::Notice(
                            NoticeLevel::Success,
                            "device deleted".to_string(),
                            format!("device {id} removed from inventory"),
                        ))
                        .await;
                    if let Ok(devices) = client.list_devices().await {
                        let _ = event_tx.send(ServiceEvent::DevicesLoaded(devices)).await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "device delete failed");
                    let _ = event_tx
                        .send(ServiceEvent::Notice(
                            NoticeLevel::Error,
                            "device delete failed".to_string(),
                            err.to_string(),
                        ))
                        .await;
                }
            }
        }
        ServiceCommand::SaveJob(job) => {
            let event = match client.save_job(&job).await {
                Ok(saved) => ServiceEvent::Notice(
                    NoticeLevel::Success,
                    "job saved".to_string(),
                    format!("automation job '{}' saved", saved.name),
                ),
                Err(err) => {
                    warn!(error = %err, "job save failed");
                    ServiceEvent::Notice(
                        NoticeLevel::Error,
                        "job save failed".to_string(),
                        err.to_string(),
                    )
                }
            };
            let _ = event_tx.send(event).await;
        }
        ServiceCommand::LoadVersions => {
            let Some(path) = config_path else {
                let _ = event_tx
                    .send(ServiceEvent::Notice(
                        NoticeLevel::Warning,
                        "no config path".to_string(),
                        "set config_path to browse version history".to_string(),
                    ))
                    .await;
                return;
            };
            match client.list_versions(path).await {
                Ok(versions) => {
                    let _ = event_tx.send(ServiceEvent::VersionsLoaded(versions)).await;
                }
                Err(err) => {
                    let _ = event_tx
                        .send(ServiceEvent::Notice(
                            NoticeLevel::Error,
                            "version history failed".to_string(),
                            err.to_string(),
                        ))
                        .await;
                }
            }
        }
        ServiceCommand::CompareVersions { old, new } => {
            let Some(path) = config_path else {
                return;
            };
            match client.request_diff(path, &old, &new).await {
                Ok(diff) => {
                    let _ = event_tx.send(ServiceEvent::DiffReady(diff)).await;
                }
                Err(err) => {
                    let _ = event_tx
                        .send(ServiceEvent::Notice(
                            NoticeLevel::Error,
                            "compare failed".to_string(),
                            err.to_string(),
                        ))
                        .await;
                }
            }
        }
    }
}

async fn notify_outcome(
    event_tx: &mpsc::Sender<ServiceEvent>,
    what: &str,
    outcome: anyhow::Result<()>,
    success_body: &str,
) {
    let event = match outcome {
        Ok(()) => ServiceEvent::Notice(
            NoticeLevel::Success,
            format!("{what} started"),
            success_body.to_string(),
        ),
        Err(err) => {
            warn!(error = %err, "{what} trigger failed");
            ServiceEvent::Notice(
                NoticeLevel::Error,
                format!("{what} failed"),
                err.to_string(),
            )
        }
    };
    let _ = event_tx.send(event).await;
}
