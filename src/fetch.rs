use crate::error::{SetupError, SetupResult};
use futures_util::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, instrument};

/// Outcome of [`Fetcher::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    Skipped,
    Downloaded { bytes: u64 },
}

/// Downloads a file unless it is already on disk.
pub struct Fetcher {
    client: reqwest::Client,
    progress: bool,
}

impl Fetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, progress: true }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Writes the body of `url` to `dest`.
    ///
    /// An existing `dest` is left alone and no request is made, unless `force` is set.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str, dest: &Path, force: bool) -> SetupResult<Fetched> {
        if !force && dest.exists() {
            debug!("already present, skipping");
            return Ok(Fetched::Skipped);
        }

        println!("📥 Downloading {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SetupError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_size = response.content_length().unwrap_or(0);
        let pb = self.progress_bar(total_size);
        if let Some(name) = dest.file_name() {
            pb.set_message(format!("Downloading {}", name.to_string_lossy()));
        }

        let mut stream = response.bytes_stream();
        let mut file_data = Vec::new();
        while let Some(chunk) = stream.try_next().await? {
            file_data.extend_from_slice(&chunk);
            pb.set_position(file_data.len() as u64);
        }

        tokio::fs::write(dest, &file_data)
            .await
            .map_err(SetupError::io(dest))?;

        pb.finish_with_message("Download complete!");
        debug!(bytes = file_data.len());

        Ok(Fetched::Downloaded {
            bytes: file_data.len() as u64,
        })
    }

    fn progress_bar(&self, total_size: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")
        {
            pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        pb
    }
}
