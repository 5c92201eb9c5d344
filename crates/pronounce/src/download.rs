use std::path::Path;
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use crate::PlaybackError;

/// Streams `url` into `path`, replacing whatever was there.
pub(crate) async fn download_to(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<(), PlaybackError> {
    let mut res = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(PlaybackError::Download)?;
    let status = res.status();
    if !status.is_success() {
        return Err(PlaybackError::Status(status));
    }
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0;
    while let Some(chunk) = res.chunk().await.map_err(PlaybackError::Download)? {
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;
    tracing::debug!(url, path = %path.display(), bytes = written, "downloaded pronunciation clip");
    Ok(())
}
