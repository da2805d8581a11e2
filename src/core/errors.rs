use std::time::Duration;
use thiserror::Error;

/// Failure at the HTTP seam, before any response status is available.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("image reference must not be empty")]
    MissingImage,
    #[error("prompt must not be empty")]
    MissingPrompt,
    #[error("strength must be within 0..=1, got {0}")]
    StrengthOutOfRange(f32),
    #[error("guidance scale must be positive, got {0}")]
    InvalidGuidanceScale(f32),
    #[error("num_inference_steps must be at least 1")]
    NoInferenceSteps,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("submission could not be sent: {0}")]
    Transport(#[from] TransportError),
    #[error("submission rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("submission response has no track_id: {0}")]
    MalformedResponse(String),
}

/// A single poll attempt failed. `Transient` is retried by the poll loop,
/// `Fatal` ends it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PollError {
    #[error("status check failed, will retry: {0}")]
    Transient(String),
    #[error("status check failed permanently: {0}")]
    Fatal(String),
}

impl PollError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PollError::Transient(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    #[error("job still pending after {0:?}")]
    Timeout(Duration),
    #[error("image generation failed{}", .0.as_deref().map(|r| format!(": {}", r)).unwrap_or_default())]
    Failed(Option<String>),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_message_includes_reason_when_present() {
        let with_reason = JobError::Failed(Some("nsfw content".to_string()));
        assert_eq!(with_reason.to_string(), "image generation failed: nsfw content");
        assert_eq!(JobError::Failed(None).to_string(), "image generation failed");
    }

    #[test]
    fn transport_errors_convert_into_submit_errors() {
        let err: SubmitError = TransportError::Connect("refused".to_string()).into();
        assert!(matches!(err, SubmitError::Transport(TransportError::Connect(_))));
    }

    #[test]
    fn only_transient_poll_errors_are_transient() {
        assert!(PollError::Transient("503".to_string()).is_transient());
        assert!(!PollError::Fatal("404".to_string()).is_transient());
    }
}
