use thiserror::Error;

use crate::chunker::SplitError;
use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum PodcastError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Chunking error: {0}")]
    Split(#[from] SplitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed rendering error: {0}")]
    Feed(String),

    #[error("Operation canceled")]
    Canceled,

    #[error("{name}: {source}")]
    Episode {
        name: String,
        source: Box<PodcastError>,
    },
}

/// Coarse classification of a [`PodcastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InputTooLong,
    Io,
    Remote,
    Canceled,
}

impl PodcastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PodcastError::InvalidArgument(_) | PodcastError::Config(_) => ErrorKind::InvalidArgument,
            PodcastError::Split(SplitError::InvalidArgument(_)) => ErrorKind::InvalidArgument,
            PodcastError::Split(SplitError::InputTooLong { .. }) => ErrorKind::InputTooLong,
            PodcastError::Io(_) | PodcastError::Feed(_) => ErrorKind::Io,
            PodcastError::Http(_) | PodcastError::Remote(_) => ErrorKind::Remote,
            PodcastError::Canceled => ErrorKind::Canceled,
            PodcastError::Episode { source, .. } => source.kind(),
        }
    }

    /// Attribute this error to the article `name`.
    pub fn in_episode(self, name: &str) -> Self {
        PodcastError::Episode {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PodcastError>;
