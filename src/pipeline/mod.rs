//! Episode materialization.
//!
//! For every article in a directory the pipeline makes sure the derived
//! artifacts exist, generating only the missing ones:
//!
//! ```text
//! a.txt ─▶ a.txt.summary.txt ─▶ a.txt.png
//!   └────────────────────────▶ a.txt.mp3
//! ```
//!
//! Articles are processed one at a time in modification-time order. Once all
//! artifacts of an article exist, later runs make no remote calls for it.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::ai::Intelligence;
use crate::app::{CancellationToken, PodcastError, Result};
use crate::domain::episode::file_name;
use crate::domain::{Article, Episode};

const COPY_BUFFER: usize = 64 * 1024;

pub struct EpisodePipeline {
    ai: Arc<dyn Intelligence>,
    cancel: CancellationToken,
    episodes: Vec<Episode>,
}

impl EpisodePipeline {
    pub fn new(ai: Arc<dyn Intelligence>, cancel: CancellationToken) -> Self {
        Self {
            ai,
            cancel,
            episodes: Vec::new(),
        }
    }

    /// Episodes materialized so far, in scan order.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Materialize every article in `directory`, oldest first.
    ///
    /// The first failing article aborts the scan; artifacts written up to that
    /// point stay on disk.
    pub async fn scan(&mut self, directory: &Path) -> Result<usize> {
        let articles = list_articles(directory).await?;
        tracing::debug!(
            directory = %directory.display(),
            articles = articles.len(),
            "Scanned directory"
        );

        for (path, name) in &articles {
            if self.cancel.is_cancelled() {
                return Err(PodcastError::Canceled);
            }
            self.add_episode(path)
                .await
                .map_err(|e| e.in_episode(name))?;
        }

        Ok(articles.len())
    }

    /// Bring one article's artifacts up to date and record the episode.
    pub async fn add_episode(&mut self, content_file: &Path) -> Result<()> {
        let article = read_article(content_file).await?;
        tracing::debug!(article = %article.name, bytes = article.content.len(), "Read article");

        let mut episode = Episode::new(article.path.clone(), article.created_at);

        episode.summary = self.ensure_summary(&article, &episode).await?;
        self.ensure_illustration(&article, &episode).await?;

        let audio = self.ensure_audio(&article, &episode).await?;
        episode.audio_length = audio.len();
        episode.updated_at = modified_at(&audio)?;

        tracing::debug!(article = %article.name, total = self.episodes.len() + 1, "Episode ready");
        self.episodes.push(episode);
        Ok(())
    }

    async fn ensure_summary(&self, article: &Article, episode: &Episode) -> Result<String> {
        match fs::read_to_string(&episode.summary_file).await {
            Ok(summary) if !summary.trim().is_empty() => {
                tracing::debug!(article = %article.name, "Using existing summary");
                return Ok(summary);
            }
            Ok(_) => tracing::info!(article = %article.name, "Summary file is empty, generating one..."),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::info!(article = %article.name, "No summary file found, generating one...")
            }
            Err(e) if e.kind() == IoErrorKind::InvalidData => {
                tracing::warn!(article = %article.name, "Summary file is not UTF-8, regenerating...")
            }
            Err(e) => return Err(e.into()),
        }

        let summary = self.ai.summary(&self.cancel, &article.content).await?;
        if summary.trim().is_empty() {
            return Err(PodcastError::Remote("summary came back empty".into()));
        }
        write_artifact(&episode.summary_file, summary.as_bytes()).await?;
        tracing::debug!(article = %article.name, bytes = summary.len(), "Summary written");

        Ok(summary)
    }

    async fn ensure_illustration(&self, article: &Article, episode: &Episode) -> Result<()> {
        if artifact_exists(&episode.illustration_file).await? {
            tracing::debug!(article = %article.name, "Using existing illustration");
            return Ok(());
        }
        tracing::info!(article = %article.name, "No illustration file found, generating one...");

        let png = self.ai.illustration(&self.cancel, &episode.summary).await?;
        if png.is_empty() {
            return Err(PodcastError::Remote("illustration came back empty".into()));
        }
        write_artifact(&episode.illustration_file, &png).await?;
        tracing::debug!(article = %article.name, bytes = png.len(), "Illustration written");

        Ok(())
    }

    async fn ensure_audio(&self, article: &Article, episode: &Episode) -> Result<std::fs::Metadata> {
        if artifact_exists(&episode.audio_file).await? {
            tracing::debug!(article = %article.name, "Using existing audio");
            return Ok(fs::metadata(&episode.audio_file).await?);
        }
        tracing::info!(article = %article.name, "No audio file found, generating one...");

        let partial = episode.partial_audio_file();
        let written = match self.stream_audio(&partial, &article.content).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        if written == 0 {
            let _ = fs::remove_file(&partial).await;
            return Err(PodcastError::Remote("speech produced no audio".into()));
        }

        fs::rename(&partial, &episode.audio_file).await?;
        tracing::info!(article = %article.name, bytes = written, "Audio written");

        Ok(fs::metadata(&episode.audio_file).await?)
    }

    /// Drain the speech stream into `path`, returning the bytes written.
    async fn stream_audio(&self, path: &Path, content: &str) -> Result<u64> {
        let mut file = create_artifact(path).await?;
        let mut stream = self.ai.speech(&self.cancel, content).await?;

        let mut buf = vec![0u8; COPY_BUFFER];
        let mut written = 0u64;
        loop {
            let n = self.cancel.or_cancel(stream.read(&mut buf)).await??;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await?;
            written += n as u64;
        }
        file.flush().await?;

        stream.finish().await?;
        Ok(written)
    }
}

/// Article files in `directory`, sorted by modification time and then name.
async fn list_articles(directory: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = fs::read_dir(directory).await?;
    let mut found: Vec<(SystemTime, String, PathBuf)> = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !Article::is_article_name(&name) {
            tracing::debug!(file = %name, "Skipping non-article file");
            continue;
        }

        let metadata = fs::metadata(entry.path()).await?;
        if !metadata.is_file() {
            tracing::debug!(file = %name, "Skipping directory");
            continue;
        }
        found.push((metadata.modified()?, name, entry.path()));
    }

    found.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(found
        .into_iter()
        .map(|(_, name, path)| (path, name))
        .collect())
}

async fn read_article(path: &Path) -> Result<Article> {
    let metadata = fs::metadata(path).await?;
    if metadata.len() == 0 {
        return Err(PodcastError::InvalidArgument(format!(
            "{} is empty",
            path.display()
        )));
    }
    let created_at = modified_at(&metadata)?;
    let content = fs::read_to_string(path).await?;

    Ok(Article {
        path: path.to_path_buf(),
        name: file_name(path),
        content,
        created_at,
    })
}

fn modified_at(metadata: &std::fs::Metadata) -> Result<DateTime<Utc>> {
    Ok(DateTime::<Utc>::from(metadata.modified()?))
}

/// Whether a non-empty artifact is already on disk. Zero-byte files are
/// leftovers of an interrupted run and count as missing.
async fn artifact_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.len() > 0 => Ok(true),
        Ok(_) => {
            tracing::warn!(file = %path.display(), "Ignoring empty artifact");
            Ok(false)
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Create (or truncate) an artifact file with mode 0644.
async fn create_artifact(path: &Path) -> Result<fs::File> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o644))
            .await?;
    }

    Ok(file)
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = create_artifact(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}
