use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use reqwest::Url;
use std::fs::create_dir_all;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::modelslab::DEFAULT_BASE_URL;
use crate::core::backoff::Backoff;
use crate::core::job::JobParameters;
use crate::core::prompts::{DEFAULT_FLOOR_TYPE, DEFAULT_ROOM, DEFAULT_WALL_COLOR};

const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(60);

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Restyle a room photo with new walls and flooring", long_about = None)]
pub struct Args {
    /// Public http(s) URL of the room photo (PNG or JPEG)
    #[clap(long, value_parser = parse_image_url)]
    pub image: String,

    #[clap(long, default_value = DEFAULT_WALL_COLOR)]
    pub wall_color: String,

    #[clap(long, default_value = DEFAULT_FLOOR_TYPE)]
    pub floor_type: String,

    #[clap(long, default_value = DEFAULT_ROOM)]
    pub room: String,

    /// Prompted for on stdin when neither the flag nor the env var is set
    #[clap(long, env = "MODELSLAB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds between status checks
    #[clap(long, default_value = "5")]
    pub poll_interval: u64,

    /// Seconds to wait for the job before giving up
    #[clap(long, default_value = "300")]
    pub max_wait: u64,

    #[clap(long, default_value = "30")]
    pub request_timeout: u64,

    #[clap(long, value_enum, default_value = "fixed")]
    pub backoff: BackoffKind,

    #[clap(long, default_value = "0")]
    pub seed: i64,

    #[clap(long, default_value = "8")]
    pub guidance_scale: f32,

    #[clap(long, default_value = "0.3")]
    pub strength: f32,

    #[clap(long, default_value = "51")]
    pub steps: u32,

    /// File or directory to download the result image into
    #[clap(short, long, value_parser)]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn backoff(&self) -> Backoff {
        match self.backoff {
            BackoffKind::Fixed => Backoff::fixed(self.poll_interval()),
            BackoffKind::Exponential => Backoff::exponential(self.poll_interval(), MAX_BACKOFF_DELAY),
        }
    }

    pub fn job_parameters(&self) -> JobParameters {
        JobParameters {
            seed: self.seed,
            guidance_scale: self.guidance_scale,
            strength: self.strength,
            num_inference_steps: self.steps,
            ..JobParameters::default()
        }
    }
}

pub fn parse_image_url(value: &str) -> Result<String> {
    let url = Url::parse(value.trim()).with_context(|| format!("Invalid image URL: {}", value))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("Image URL must use http or https, got {}", url.scheme());
    }
    let path = url.path().to_ascii_lowercase();
    if !(path.ends_with(".png") || path.ends_with(".jpg") || path.ends_with(".jpeg")) {
        warn!("Image URL {} does not look like a PNG or JPEG", url);
    }
    Ok(url.to_string())
}

/// Resolves where the result image is saved, creating directories as needed.
/// `None` means the result is only reported, not downloaded.
pub fn get_output_file_path(output_arg: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let Some(path) = output_arg else {
        return Ok(None);
    };
    if path.is_dir() || path.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
        create_dir_all(&path).context("Failed to create output directory")?;
        return Ok(Some(path.join(Local::now().format("%Y%m%d_%H%M%S.png").to_string())));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).context("Failed to create output directory")?;
    }
    Ok(Some(path))
}

pub fn create_spinner(message: &str) -> Result<ProgressBar, io::Error> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}
