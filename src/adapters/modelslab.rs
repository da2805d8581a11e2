use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::job::JobRequest;

pub const DEFAULT_BASE_URL: &str = "https://modelslab.com/api/v6";

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";

pub fn submit_url(base_url: &str) -> String {
    format!("{}/interior/make", base_url.trim_end_matches('/'))
}

pub fn status_url(base_url: &str, track_id: &str) -> String {
    format!("{}/status/{}", base_url.trim_end_matches('/'), track_id)
}

/// Body of the `interior/make` call.
#[derive(Debug, Serialize)]
pub struct SubmitPayload<'a> {
    pub key: &'a str,
    pub prompt: &'a str,
    pub negative_prompt: &'a str,
    pub init_image: &'a str,
    pub seed: i64,
    pub guidance_scale: f32,
    pub strength: f32,
    pub num_inference_steps: u32,
    pub base64: bool,
    pub temp: bool,
    pub webhook: Option<&'a str>,
    pub track_id: Option<&'a str>,
}

impl<'a> SubmitPayload<'a> {
    pub fn from_request(request: &'a JobRequest, api_key: &'a str) -> Self {
        let params = request.parameters();
        Self {
            key: api_key,
            prompt: request.prompt(),
            negative_prompt: request.negative_prompt(),
            init_image: request.image_reference(),
            seed: params.seed,
            guidance_scale: params.guidance_scale,
            strength: params.strength,
            num_inference_steps: params.num_inference_steps,
            base64: params.base64,
            temp: params.temp,
            webhook: params.webhook.as_deref(),
            track_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub track_id: Option<Value>,
}

impl SubmitResponse {
    /// The service sends `track_id` either as a string or as a number.
    pub fn track_id(&self) -> Option<String> {
        match self.track_id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub output: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn take_output(&mut self) -> Vec<String> {
        self.output.take().unwrap_or_default()
    }

    pub fn failure_reason(&self) -> Option<String> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::JobParameters;
    use serde_json::json;

    #[test]
    fn payload_carries_every_wire_field() {
        let request = JobRequest::new(
            "http://x/room.png",
            "A bedroom with blue walls",
            "blurry",
            JobParameters::default(),
        )
        .unwrap();
        let payload = serde_json::to_value(SubmitPayload::from_request(&request, "secret")).unwrap();
        assert_eq!(payload["key"], json!("secret"));
        assert_eq!(payload["prompt"], json!("A bedroom with blue walls"));
        assert_eq!(payload["negative_prompt"], json!("blurry"));
        assert_eq!(payload["init_image"], json!("http://x/room.png"));
        assert_eq!(payload["seed"], json!(0));
        assert_eq!(payload["guidance_scale"].as_f64(), Some(8.0));
        let strength = payload["strength"].as_f64().unwrap();
        assert!((strength - 0.3).abs() < 1e-6);
        assert_eq!(payload["num_inference_steps"], json!(51));
        assert_eq!(payload["base64"], json!(false));
        assert_eq!(payload["temp"], json!(false));
        assert!(payload["webhook"].is_null());
        assert!(payload["track_id"].is_null());
        assert_eq!(payload.as_object().unwrap().len(), 12);
    }

    #[test]
    fn track_id_accepts_strings_and_numbers() {
        let text: SubmitResponse = serde_json::from_str(r#"{"track_id":"abc"}"#).unwrap();
        assert_eq!(text.track_id().as_deref(), Some("abc"));
        let number: SubmitResponse = serde_json::from_str(r#"{"track_id":42}"#).unwrap();
        assert_eq!(number.track_id().as_deref(), Some("42"));
        let missing: SubmitResponse = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert_eq!(missing.track_id(), None);
        let null: SubmitResponse = serde_json::from_str(r#"{"track_id":null}"#).unwrap();
        assert_eq!(null.track_id(), None);
    }

    #[test]
    fn failure_reason_prefers_message_then_error() {
        let both: StatusResponse =
            serde_json::from_str(r#"{"status":"failed","message":"out of credits","error":"x"}"#).unwrap();
        assert_eq!(both.failure_reason().as_deref(), Some("out of credits"));
        let error_only: StatusResponse =
            serde_json::from_str(r#"{"status":"failed","error":"gpu crashed"}"#).unwrap();
        assert_eq!(error_only.failure_reason().as_deref(), Some("gpu crashed"));
        let none: StatusResponse = serde_json::from_str(r#"{"status":"failed"}"#).unwrap();
        assert_eq!(none.failure_reason(), None);
    }

    #[test]
    fn null_output_reads_as_empty() {
        let mut pending: StatusResponse =
            serde_json::from_str(r#"{"status":"processing","output":null}"#).unwrap();
        assert!(pending.take_output().is_empty());
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        assert_eq!(submit_url("https://api.test/v6/"), "https://api.test/v6/interior/make");
        assert_eq!(status_url("https://api.test/v6", "t1"), "https://api.test/v6/status/t1");
    }
}
