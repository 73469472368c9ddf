use anyhow::Context;
use netops_protocol::inventory::{AutomationJob, Device, VersionEntry};
use netops_protocol::ExecutionReport;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

/// Thin request/response client for the automation backend. No retries and
/// no in-flight cancellation; a failed call surfaces one message and stops.
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl ApiClient {
    pub(crate) fn new(base_url: &str, api_token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, self.endpoint(path));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<Value> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.finish(request, path).await
    }

    async fn finish(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> anyhow::Result<Value> {
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;

        let status = response.status();
        let payload: Option<Value> = response.json().await.ok();
        if status.is_success() {
            Ok(payload.unwrap_or(Value::Null))
        } else {
            anyhow::bail!(extract_error_message(status, payload))
        }
    }

    /// Latest execution log of a job, reduced to its results mapping.
    pub(crate) async fn fetch_results(&self, job_id: i64) -> anyhow::Result<ExecutionReport> {
        let logs = self
            .send(Method::GET, &format!("/automation/jobs/{job_id}/logs"), None)
            .await?;
        // The backend returns the full log list; the newest entry (highest
        // id) carries the results currently on screen.
        let results = match logs {
            Value::Array(entries) => entries
                .into_iter()
                .max_by_key(|entry| entry.get("id").and_then(Value::as_i64).unwrap_or(i64::MIN))
                .and_then(|entry| entry.get("results").cloned())
                .unwrap_or(Value::Null),
            other => other.get("results").cloned().unwrap_or(other),
        };
        Ok(ExecutionReport::from_value(results))
    }

    pub(crate) async fn list_devices(&self) -> anyhow::Result<Vec<Device>> {
        let value = self.send(Method::GET, "/devices/", None).await?;
        serde_json::from_value(value).context("unexpected device list shape")
    }

    pub(crate) async fn save_device(&self, device: &Device) -> anyhow::Result<Device> {
        let body = serde_json::to_value(device).context("serialize device")?;
        let value = match device.id {
            Some(id) => {
                self.send(Method::PATCH, &format!("/devices/{id}"), Some(body))
                    .await?
            }
            None => self.send(Method::POST, "/devices/", Some(body)).await?,
        };
        serde_json::from_value(value).context("unexpected device shape")
    }

    pub(crate) async fn delete_device(&self, id: i64) -> anyhow::Result<()> {
        self.send(Method::DELETE, &format!("/devices/{id}"), None)
            .await?;
        Ok(())
    }

    pub(crate) async fn save_job(&self, job: &AutomationJob) -> anyhow::Result<AutomationJob> {
        let body = serde_json::to_value(job).context("serialize job")?;
        let value = match job.id {
            Some(id) => {
                self.send(Method::PUT, &format!("/automation/jobs/{id}"), Some(body))
                    .await?
            }
            None => {
                self.send(Method::POST, "/automation/jobs", Some(body))
                    .await?
            }
        };
        serde_json::from_value(value).context("unexpected job shape")
    }

    pub(crate) async fn trigger_backup(&self, device_names: &[String]) -> anyhow::Result<()> {
        self.send(
            Method::POST,
            "/automation/backup",
            Some(json!({ "device_names": device_names })),
        )
        .await?;
        Ok(())
    }

    pub(crate) async fn trigger_inspect(&self, device_names: &[String]) -> anyhow::Result<()> {
        self.send(
            Method::POST,
            "/automation/inspect",
            Some(json!({ "device_names": device_names })),
        )
        .await?;
        Ok(())
    }

    pub(crate) async fn list_versions(&self, path: &str) -> anyhow::Result<Vec<VersionEntry>> {
        // The path goes through `.query` so reserved characters are encoded.
        let request = self
            .request(Method::GET, "/configs/versions")
            .query(&[("path", path)]);
        let value = self.finish(request, "/configs/versions").await?;
        serde_json::from_value(value).context("unexpected version list shape")
    }

    pub(crate) async fn request_diff(
        &self,
        path: &str,
        old: &str,
        new: &str,
    ) -> anyhow::Result<String> {
        let value = self
            .send(
                Method::POST,
                "/configs/versions/diff",
                Some(json!({ "path": path, "old": old, "new": new })),
            )
            .await?;
        let diff = value
            .get("diff")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        Ok(diff)
    }
}

/// Best-effort extraction of the backend's `detail` field from an error
/// body; falls back to the HTTP status line, and stringifies non-string
/// details instead of dropping them.
fn extract_error_message(status: StatusCode, payload: Option<Value>) -> String {
    let detail = payload.as_ref().and_then(|body| body.get("detail"));
    match detail {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        // Empty and null details carry no information; use the status line.
        Some(Value::String(_)) | Some(Value::Null) | None => format!(
            "backend returned {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        ),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_detail_string() {
        let message = extract_error_message(
            StatusCode::BAD_REQUEST,
            Some(json!({"detail": "device already exists"})),
        );
        assert_eq!(message, "device already exists");
    }

    #[test]
    fn error_message_stringifies_structured_detail() {
        let message = extract_error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(json!({"detail": [{"loc": ["name"], "msg": "required"}]})),
        );
        assert!(message.contains("required"));
    }

    #[test]
    fn error_message_falls_back_to_status_line() {
        let message = extract_error_message(StatusCode::BAD_GATEWAY, None);
        assert_eq!(message, "backend returned 502 Bad Gateway");

        let message = extract_error_message(StatusCode::NOT_FOUND, Some(json!({"other": 1})));
        assert_eq!(message, "backend returned 404 Not Found");
    }

    #[test]
    fn empty_detail_string_falls_back_to_status_line() {
        let message =
            extract_error_message(StatusCode::BAD_REQUEST, Some(json!({"detail": ""})));
        assert_eq!(message, "backend returned 400 Bad Request");
    }

    #[test]
    fn version_query_encodes_reserved_characters() {
        let client = ApiClient::new("http://127.0.0.1:8000", None).expect("client");
        let request = client
            .request(Method::GET, "/configs/versions")
            .query(&[("path", "backups/core&site=01.cfg")])
            .build()
            .expect("build request");
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("path".to_string(), "backups/core&site=01.cfg".to_string())]
        );
    }
}
