use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use crate::adapters::http::ReqwestTransport;
use crate::adapters::output::download_result;
use crate::core::client::{AsyncJobClient, ClientConfig};
use crate::core::job::JobRequest;
use crate::core::prompts::{room_prompt, NEGATIVE_PROMPT};
use crate::utils::input::input_api_key;
use crate::utils::lib::*;

pub async fn run_cli_interface() -> Result<()> {
    let args = Args::parse();
    let output_path = get_output_file_path(args.output.clone())
        .context("Failed to prepare output path")?;

    let api_key = match args.api_key.clone().filter(|key| !key.trim().is_empty()) {
        Some(key) => key,
        None => input_api_key().context("Failed to read API key")?,
    };

    let prompt = room_prompt(&args.room, &args.wall_color, &args.floor_type);
    let request = JobRequest::new(&args.image, prompt, NEGATIVE_PROMPT, args.job_parameters())
        .context("Invalid generation request")?;
    println!("Source image: {}", request.image_reference());
    info!("Prompt: {}", request.prompt());

    let transport = ReqwestTransport::new(args.request_timeout())
        .context("Failed to build HTTP client")?;
    let client = AsyncJobClient::new(transport, ClientConfig { base_url: args.base_url.clone() });

    let spinner = create_spinner("Submitting...")
        .context("Failed to create progress spinner")?;
    let handle = match client.submit(&request, &api_key).await {
        Ok(handle) => handle,
        Err(e) => {
            spinner.abandon_with_message("Submission failed");
            return Err(e).context("There was an issue with the image modification process");
        }
    };
    spinner.set_message(format!("Processing job {}... Please wait.", handle.track_id()));

    let result = tokio::select! {
        result = client.await_completion(handle, args.backoff(), args.max_wait()) => result,
        _ = tokio::signal::ctrl_c() => {
            spinner.abandon_with_message("Cancelled");
            bail!("Cancelled before the job finished");
        }
    };

    let outputs = match result {
        Ok(outputs) => outputs,
        Err(e) => {
            spinner.abandon_with_message("Image generation failed");
            return Err(e).context("Image generation failed. Please try again");
        }
    };
    spinner.finish_with_message("Done");

    let Some(first) = outputs.first() else {
        bail!("The service returned no result images");
    };
    println!("Modified room image: {}", first);
    for extra in outputs.iter().skip(1) {
        println!("Additional result: {}", extra);
    }

    if let Some(path) = output_path {
        download_result(first, &path, args.request_timeout()).await
            .context("Failed to save result image")?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
