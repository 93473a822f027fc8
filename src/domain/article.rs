use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub const ARTICLE_EXTENSION: &str = "txt";
pub const SUMMARY_SUFFIX: &str = ".summary.txt";

/// A plain-text source file in the scanned directory.
#[derive(Debug, Clone)]
pub struct Article {
    pub path: PathBuf,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Whether a directory entry named `name` is an article.
    ///
    /// Summary sidecars share the `.txt` extension and are excluded.
    pub fn is_article_name(name: &str) -> bool {
        Path::new(name)
            .extension()
            .is_some_and(|ext| ext == ARTICLE_EXTENSION)
            && !name.ends_with(SUMMARY_SUFFIX)
    }
}
