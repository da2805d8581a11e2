use chrono::Utc;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::adapters::http::HttpTransport;
use crate::adapters::modelslab::*;
use crate::core::backoff::Backoff;
use crate::core::errors::{JobError, PollError, SubmitError, TransportError};
use crate::core::job::{JobHandle, JobRequest, JobStatus};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }
}

/// Submits generation jobs and drives them to a terminal state.
///
/// Holds no per-job state, so a single client can run any number of jobs
/// side by side.
pub struct AsyncJobClient<T: HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl<T: HttpTransport> AsyncJobClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub async fn submit(&self, request: &JobRequest, api_key: &str) -> Result<JobHandle, SubmitError> {
        let payload = SubmitPayload::from_request(request, api_key);
        let body = serde_json::to_value(&payload)
            .map_err(|e| TransportError::Other(format!("Failed to encode submission: {}", e)))?;

        info!("Submitting generation job for image {}", request.image_reference());
        let reply = self.transport.post_json(&submit_url(&self.config.base_url), &body).await?;

        if !reply.is_success() {
            error!("Submission rejected with HTTP {}: {}", reply.status, reply.body);
            return Err(SubmitError::Rejected { status: reply.status, body: reply.body });
        }

        let track_id = serde_json::from_str::<SubmitResponse>(&reply.body)
            .ok()
            .and_then(|response| response.track_id())
            .ok_or_else(|| SubmitError::MalformedResponse(reply.body.clone()))?;

        debug!("Submission accepted: {}", reply.body);
        Ok(JobHandle::new(track_id))
    }

    /// Issues one status request for `handle`.
    pub async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, PollError> {
        let url = status_url(&self.config.base_url, handle.track_id());
        let reply = self
            .transport
            .get(&url)
            .await
            .map_err(|e| PollError::Transient(e.to_string()))?;

        match reply.status {
            200..=299 => {}
            404 | 410 => {
                return Err(PollError::Fatal(format!(
                    "job {} is unknown to the service (HTTP {})",
                    handle.track_id(),
                    reply.status
                )))
            }
            408 | 425 | 429 | 500..=599 => {
                return Err(PollError::Transient(format!("HTTP {}: {}", reply.status, reply.body)))
            }
            status => return Err(PollError::Fatal(format!("HTTP {}: {}", status, reply.body))),
        }

        let mut response: StatusResponse = serde_json::from_str(&reply.body)
            .map_err(|e| PollError::Transient(format!("unreadable status response: {}", e)))?;

        match response.status.trim().to_ascii_lowercase().as_str() {
            STATUS_SUCCESS => {
                let output = response.take_output();
                if output.is_empty() {
                    return Err(PollError::Fatal(format!(
                        "job {} succeeded without any output",
                        handle.track_id()
                    )));
                }
                Ok(JobStatus::Success(output))
            }
            STATUS_FAILED => Ok(JobStatus::Failed(response.failure_reason())),
            other => {
                debug!("Job {} is {}", handle.track_id(), other);
                Ok(JobStatus::Pending)
            }
        }
    }

    /// Submits `request` and polls every `poll_interval` until it finishes or
    /// `max_wait` runs out.
    pub async fn run_to_completion(
        &self,
        request: &JobRequest,
        api_key: &str,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<Vec<String>, JobError> {
        self.run_with_backoff(request, api_key, Backoff::fixed(poll_interval), max_wait)
            .await
    }

    pub async fn run_with_backoff(
        &self,
        request: &JobRequest,
        api_key: &str,
        backoff: Backoff,
        max_wait: Duration,
    ) -> Result<Vec<String>, JobError> {
        let handle = self.submit(request, api_key).await?;
        info!("Job {} submitted", handle.track_id());
        self.await_completion(handle, backoff, max_wait).await
    }

    /// Polls an already submitted job. Takes the handle by value: each handle
    /// drives at most one loop.
    pub async fn await_completion(
        &self,
        handle: JobHandle,
        backoff: Backoff,
        max_wait: Duration,
    ) -> Result<Vec<String>, JobError> {
        let deadline = Instant::now() + max_wait;
        let mut delays = backoff.delays();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.poll(&handle).await {
                Ok(JobStatus::Success(output)) => {
                    info!("Job {} finished after {} polls", handle.track_id(), attempt);
                    return Ok(output);
                }
                Ok(JobStatus::Failed(reason)) => {
                    error!("Job {} failed: {:?}", handle.track_id(), reason);
                    return Err(JobError::Failed(reason));
                }
                Ok(JobStatus::Pending) => {
                    debug!("Job {} still pending (poll {})", handle.track_id(), attempt);
                }
                Err(e) if e.is_transient() => {
                    warn!("Poll {} for job {} failed: {}", attempt, handle.track_id(), e);
                }
                Err(e) => {
                    error!("Giving up on job {}: {}", handle.track_id(), e);
                    return Err(e.into());
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "Job {} still pending {}s after submission, giving up",
                    handle.track_id(),
                    (Utc::now() - handle.created_at()).num_seconds()
                );
                return Err(JobError::Timeout(max_wait));
            }
            let delay = delays.next().unwrap_or(backoff.max_delay).min(deadline - now);
            sleep(delay).await;
        }
    }
}
