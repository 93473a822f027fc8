use std::path::Path;

use anyhow::Context;
use chrono::Utc;

use crate::app::AppContext;
use crate::cli::Cli;
use crate::feed::render_rss;

/// Build the context from `cli`, scan its directory and return the RSS
/// document. Cancellation is wired to SIGINT and SIGTERM.
pub async fn run(cli: &Cli) -> anyhow::Result<String> {
    let ctx = AppContext::new(&cli.channel).context("failed to load configuration")?;
    ctx.cancel.cancel_on_signals();
    tracing::debug!(settings = ?ctx.settings, channel = %ctx.channel.title, "Configuration loaded");

    generate_feed(&ctx, &cli.directory).await
}

/// Materialize every episode in `directory` and render the feed.
///
/// Nothing is rendered unless every article succeeds.
pub async fn generate_feed(ctx: &AppContext, directory: &Path) -> anyhow::Result<String> {
    let mut pipeline = ctx.pipeline();
    let count = pipeline
        .scan(directory)
        .await
        .with_context(|| format!("failed to scan {}", directory.display()))?;
    tracing::info!(episodes = count, "Scan complete");

    let rss = render_rss(&ctx.channel, pipeline.episodes(), Utc::now())
        .context("failed to render feed")?;
    Ok(rss)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::ai::{AudioStream, Intelligence};
    use crate::app::{CancellationToken, PodcastError, Result};
    use crate::cli::one_line;
    use crate::config::{ChannelConfig, Settings};

    struct Echo;

    #[async_trait]
    impl Intelligence for Echo {
        async fn summary(&self, _cancel: &CancellationToken, content: &str) -> Result<String> {
            Ok(content.to_uppercase())
        }

        async fn illustration(&self, _cancel: &CancellationToken, _content: &str) -> Result<Vec<u8>> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }

        async fn speech(&self, _cancel: &CancellationToken, content: &str) -> Result<AudioStream> {
            if content.contains("unspeakable") {
                return Err(PodcastError::Remote("speech endpoint returned 500".into()));
            }
            Ok(AudioStream::from_bytes(content.as_bytes().to_vec()))
        }
    }

    fn context() -> AppContext {
        AppContext {
            channel: ChannelConfig {
                title: "Reading List".into(),
                link: "https://example.com/pod".into(),
                description: "Read aloud.".into(),
            },
            settings: Settings {
                api_key: "sk-test".into(),
                base_url: "http://127.0.0.1:9".into(),
            },
            ai: Arc::new(Echo),
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn test_generate_feed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello there.").unwrap();

        let rss = generate_feed(&context(), dir.path()).await.unwrap();

        assert!(rss.starts_with("<?xml"));
        assert!(rss.contains("<description>HELLO THERE.</description>"));
        assert!(rss.contains("length=\"12\""));
    }

    #[tokio::test]
    async fn test_failed_article_suppresses_feed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "unspeakable").unwrap();

        let err = generate_feed(&context(), dir.path()).await.unwrap_err();
        let line = one_line(&err);

        assert!(line.starts_with("failed to scan "));
        assert!(line.ends_with("a.txt: Remote error: speech endpoint returned 500"));
        assert!(!line.contains('\n'));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_feed(&context(), &dir.path().join("nope"))
            .await
            .unwrap_err();
        assert!(one_line(&err).contains("IO error"));
    }
}
