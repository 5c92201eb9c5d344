//! Pronunciation clip playback: download a clip, decode it, play it to the
//! end before returning.

use std::path::PathBuf;
use std::time::Duration;

mod decode;
mod download;
mod output;

pub use decode::Clip;

/// Whether this build can play audio at all (the `speaker` feature).
pub const OUTPUT_AVAILABLE: bool = cfg!(feature = "speaker");

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("failed to download clip: {0}")]
    Download(#[source] reqwest::Error),
    #[error("clip server replied {0}")]
    Status(reqwest::StatusCode),
    #[error("clip file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode clip: {0}")]
    Decode(String),
    #[error("audio output failed: {0}")]
    Output(String),
    #[error("playback did not finish within {0:?}")]
    Timeout(Duration),
    #[error("built without audio output support")]
    NoOutput,
}

/// Plays the clip behind `url` and resolves once it has finished.
#[async_trait::async_trait]
pub trait Pronouncer: Send + Sync {
    async fn play(&self, url: &str) -> Result<(), PlaybackError>;
}

/// Downloads each clip to the same temporary file, then decodes and plays it
/// on a blocking thread. Calls must not overlap.
pub struct ClipPlayer {
    client: reqwest::Client,
    path: PathBuf,
    timeout: Duration,
}

impl ClipPlayer {
    pub const FILE_NAME: &'static str = "wordz-pronunciation.mp3";

    pub fn new(timeout: Duration) -> Self {
        Self::with_path(std::env::temp_dir().join(Self::FILE_NAME), timeout)
    }

    pub fn with_path(path: PathBuf, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            path,
            timeout,
        }
    }

    /// Downloads and decodes without playing.
    pub async fn load(&self, url: &str) -> Result<Clip, PlaybackError> {
        download::download_to(&self.client, url, &self.path, self.timeout).await?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || decode::decode_file(&path))
            .await
            .map_err(|e| PlaybackError::Output(e.to_string()))?
    }
}

#[async_trait::async_trait]
impl Pronouncer for ClipPlayer {
    async fn play(&self, url: &str) -> Result<(), PlaybackError> {
        if !OUTPUT_AVAILABLE {
            return Err(PlaybackError::NoOutput);
        }
        let clip = self.load(url).await?;
        tracing::debug!(
            url,
            sample_rate = clip.sample_rate,
            channels = clip.channels,
            duration_ms = clip.duration().as_millis() as u64,
            "playing pronunciation"
        );
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || output::play(clip, timeout))
            .await
            .map_err(|e| PlaybackError::Output(e.to_string()))?
    }
}
