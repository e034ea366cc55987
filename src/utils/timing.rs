use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::info;

#[derive(Debug)]
pub struct UploadTimer {
    request_id: String,
    style: String,
    original_name: Option<String>,
    stored_name: Option<String>,
    started_at: DateTime<Utc>,
    started_perf: Instant,
    status: String,
    detail: Option<String>,
    completed: bool,
}

impl UploadTimer {
    pub fn new(request_id: &str) -> Self {
        UploadTimer {
            request_id: request_id.to_string(),
            style: String::new(),
            original_name: None,
            stored_name: None,
            started_at: Utc::now(),
            started_perf: Instant::now(),
            status: "success".to_string(),
            detail: None,
            completed: false,
        }
    }

    pub fn log_received(&self) {
        info!(
            target: "newsify.timing",
            "event=upload_received request_id={} style={} file={:?} received_at={}",
            self.request_id,
            self.style,
            self.original_name,
            self.started_at.to_rfc3339()
        );
    }

    pub fn set_style(&mut self, style: &str) {
        self.style = style.to_string();
    }

    pub fn set_original_name(&mut self, name: Option<&str>) {
        self.original_name = name.map(|value| value.chars().take(200).collect());
    }

    pub fn set_stored_name(&mut self, name: &str) {
        self.stored_name = Some(name.to_string());
    }

    pub fn mark_status(&mut self, status: &str, detail: Option<String>) {
        self.status = status.to_string();
        self.detail = detail;
    }

    pub fn log_completed(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        let completed_at = Utc::now();
        let duration = self.started_perf.elapsed().as_secs_f64();
        info!(
            target: "newsify.timing",
            "event=upload_completed request_id={} style={} file={:?} stored_as={:?} started_at={} completed_at={} duration_s={:.3} status={} detail={}",
            self.request_id,
            self.style,
            self.original_name,
            self.stored_name,
            self.started_at.to_rfc3339(),
            completed_at.to_rfc3339(),
            duration,
            self.status,
            self.detail.clone().unwrap_or_default()
        );
    }
}

impl Drop for UploadTimer {
    fn drop(&mut self) {
        if !self.completed {
            self.mark_status("aborted", None);
            self.log_completed();
        }
    }
}

pub async fn log_llm_timing<T, F, Fut>(
    provider: &str,
    model: &str,
    operation: &str,
    metadata: Option<JsonValue>,
    call: F,
) -> Result<T, anyhow::Error>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, anyhow::Error>>,
{
    let started_at = Utc::now();
    let started_perf = Instant::now();
    let metadata_text = metadata
        .as_ref()
        .map(|value| value.to_string())
        .unwrap_or_else(|| "{}".to_string());
    info!(
        target: "newsify.timing",
        "event=llm_request provider={} model={} operation={} started_at={} metadata={}",
        provider,
        model,
        operation,
        started_at.to_rfc3339(),
        metadata_text
    );

    let result = call().await;
    let status = if result.is_ok() { "success" } else { "error" };

    let completed_at = Utc::now();
    let duration = started_perf.elapsed().as_secs_f64();
    info!(
        target: "newsify.timing",
        "event=llm_response provider={} model={} operation={} completed_at={} duration_s={:.3} status={} metadata={}",
        provider,
        model,
        operation,
        completed_at.to_rfc3339(),
        duration,
        status,
        metadata_text
    );

    result
}
