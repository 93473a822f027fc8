use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::article::SUMMARY_SUFFIX;

/// An article together with its derived artifacts.
///
/// Artifact files are siblings of the article: `a.txt` yields
/// `a.txt.summary.txt`, `a.txt.png` and `a.txt.mp3`.
#[derive(Debug, Clone)]
pub struct Episode {
    pub content_file: PathBuf,
    pub summary_file: PathBuf,
    pub illustration_file: PathBuf,
    pub audio_file: PathBuf,
    pub summary: String,
    pub audio_length: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Episode {
    pub fn new(content_file: PathBuf, created_at: DateTime<Utc>) -> Self {
        Self {
            summary_file: sibling(&content_file, SUMMARY_SUFFIX),
            illustration_file: sibling(&content_file, ".png"),
            audio_file: sibling(&content_file, ".mp3"),
            content_file,
            summary: String::new(),
            audio_length: 0,
            created_at,
            updated_at: created_at,
        }
    }

    /// Name of the source article, used as the item title.
    pub fn title(&self) -> String {
        file_name(&self.content_file)
    }

    /// Where audio is streamed before it is moved into place.
    pub fn partial_audio_file(&self) -> PathBuf {
        sibling(&self.audio_file, ".part")
    }
}

/// Final path component as a string, for URLs and titles.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
