pub mod openai;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, DuplexStream, ReadBuf};
use tokio::task::JoinHandle;

use crate::app::{CancellationToken, PodcastError, Result};

pub use openai::OpenAiClient;

pub const SUMMARY_PROMPT: &str =
    "Summarize the following text into one or two sentences. No more than 50 words in total.";
pub const ILLUSTRATION_PROMPT: &str = "An illustration for a podcast with covering the following:\n";

/// The three generative operations the episode pipeline depends on.
#[async_trait]
pub trait Intelligence: Send + Sync {
    /// Summarize an article in one or two sentences.
    async fn summary(&self, cancel: &CancellationToken, content: &str) -> Result<String>;

    /// Produce PNG bytes for a cover image illustrating `content`.
    async fn illustration(&self, cancel: &CancellationToken, content: &str) -> Result<Vec<u8>>;

    /// Narrate `content`. Audio is streamed while later parts are still being
    /// synthesized.
    async fn speech(&self, cancel: &CancellationToken, content: &str) -> Result<AudioStream>;
}

/// Readable audio produced by [`Intelligence::speech`].
///
/// Reaching EOF does not mean synthesis succeeded: call
/// [`finish`](Self::finish) after draining to learn whether the producer
/// delivered everything.
pub struct AudioStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    producer: Option<JoinHandle<Result<()>>>,
}

impl AudioStream {
    /// Audio that is already fully available.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            reader: Box::new(io::Cursor::new(bytes)),
            producer: None,
        }
    }

    /// Read side of a pipe fed by a background producer task.
    pub fn piped(reader: DuplexStream, producer: JoinHandle<Result<()>>) -> Self {
        Self {
            reader: Box::new(reader),
            producer: Some(producer),
        }
    }

    /// Wait for the producer and report how it ended.
    pub async fn finish(self) -> Result<()> {
        drop(self.reader);
        match self.producer {
            None => Ok(()),
            Some(handle) => handle
                .await
                .map_err(|e| PodcastError::Remote(format!("speech producer failed: {}", e)))?,
        }
    }
}

impl AsyncRead for AudioStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}
