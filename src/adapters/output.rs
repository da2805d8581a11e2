use anyhow::{bail, Context, Result};
use log::info;
use std::path::Path;
use std::time::Duration;

/// Downloads the result image at `url` into `path`. Returns the byte count.
/// The whole transfer is bounded by `request_timeout`.
pub async fn download_result(url: &str, path: &Path, request_timeout: Duration) -> Result<usize> {
    let client = reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .context("Failed to build download client")?;
    let response = client.get(url).send().await
        .with_context(|| format!("Failed to fetch result image {}", url))?;
    if !response.status().is_success() {
        bail!("Result image download failed with HTTP {}", response.status());
    }
    let bytes = response.bytes().await
        .context("Failed to read result image body")?;

    tokio::fs::write(path, &bytes).await
        .with_context(|| format!("Failed to write result image to {:?}", path))?;
    info!("Saved {} bytes to {:?}", bytes.len(), path);
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn stalled_download_gives_up_after_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // Accept and never answer.
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let path = std::env::temp_dir().join(format!("roomcraft-stalled-{}.png", std::process::id()));
        let started = std::time::Instant::now();
        let result = download_result(&format!("http://{}/img.png", addr), &path, Duration::from_millis(300)).await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!path.exists());
        server.abort();
    }
}
