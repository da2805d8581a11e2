use chrono::{DateTime, Utc};
use crate::core::errors::RequestError;

/// Tuning knobs forwarded to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParameters {
    pub seed: i64,
    pub guidance_scale: f32,
    pub strength: f32,
    pub num_inference_steps: u32,
    pub base64: bool,
    pub temp: bool,
    pub webhook: Option<String>,
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            guidance_scale: 8.0,
            strength: 0.3,
            num_inference_steps: 51,
            base64: false,
            temp: false,
            webhook: None,
        }
    }
}

impl JobParameters {
    pub fn validate(&self) -> Result<(), RequestError> {
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(RequestError::StrengthOutOfRange(self.strength));
        }
        if !self.guidance_scale.is_finite() || self.guidance_scale <= 0.0 {
            return Err(RequestError::InvalidGuidanceScale(self.guidance_scale));
        }
        if self.num_inference_steps == 0 {
            return Err(RequestError::NoInferenceSteps);
        }
        Ok(())
    }
}

/// A generation request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    image_reference: String,
    prompt: String,
    negative_prompt: String,
    parameters: JobParameters,
}

impl JobRequest {
    pub fn new(
        image_reference: impl Into<String>,
        prompt: impl Into<String>,
        negative_prompt: impl Into<String>,
        parameters: JobParameters,
    ) -> Result<Self, RequestError> {
        let image_reference = image_reference.into();
        let prompt = prompt.into();
        if image_reference.trim().is_empty() {
            return Err(RequestError::MissingImage);
        }
        if prompt.trim().is_empty() {
            return Err(RequestError::MissingPrompt);
        }
        parameters.validate()?;
        Ok(Self {
            image_reference,
            prompt,
            negative_prompt: negative_prompt.into(),
            parameters,
        })
    }

    pub fn image_reference(&self) -> &str {
        &self.image_reference
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    pub fn parameters(&self) -> &JobParameters {
        &self.parameters
    }
}

/// Polling key for a submitted job.
///
/// Not `Clone`: a handle moves into exactly one poll loop.
#[derive(Debug, PartialEq)]
pub struct JobHandle {
    track_id: String,
    created_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(track_id: impl Into<String>) -> Self {
        Self { track_id: track_id.into(), created_at: Utc::now() }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    /// Non-empty list of result URLs; the first is the primary result.
    Success(Vec<String>),
    Failed(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_tuning() {
        let params = JobParameters::default();
        assert_eq!(params.seed, 0);
        assert_eq!(params.guidance_scale, 8.0);
        assert_eq!(params.strength, 0.3);
        assert_eq!(params.num_inference_steps, 51);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_strength() {
        let params = JobParameters { strength: 1.5, ..Default::default() };
        let err = JobRequest::new("http://x/room.png", "a room", "", params).unwrap_err();
        assert_eq!(err, RequestError::StrengthOutOfRange(1.5));
    }

    #[test]
    fn rejects_non_finite_guidance_and_zero_steps() {
        let nan = JobParameters { guidance_scale: f32::NAN, ..Default::default() };
        assert!(matches!(nan.validate(), Err(RequestError::InvalidGuidanceScale(_))));
        let infinite = JobParameters { guidance_scale: f32::INFINITY, ..Default::default() };
        assert!(matches!(infinite.validate(), Err(RequestError::InvalidGuidanceScale(_))));

        let zero = JobParameters { num_inference_steps: 0, ..Default::default() };
        assert_eq!(zero.validate(), Err(RequestError::NoInferenceSteps));
    }

    #[test]
    fn rejects_blank_image_and_prompt() {
        assert_eq!(
            JobRequest::new("  ", "a room", "", JobParameters::default()),
            Err(RequestError::MissingImage)
        );
        assert_eq!(
            JobRequest::new("http://x/room.png", "", "", JobParameters::default()),
            Err(RequestError::MissingPrompt)
        );
    }
}
