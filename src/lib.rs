//! # Podcaster
//!
//! Turns a directory of plain-text articles into a podcast: every article
//! gets a summary, a cover illustration and a narrated MP3, and the
//! collection is published as an RSS 2.0 feed.
//!
//! ## Architecture
//!
//! ```text
//! articles → Pipeline ⇄ Intelligence (OpenAI) → Episodes → Feed
//! ```
//!
//! Generated files sit next to their article, so re-running over the same
//! directory only generates what is missing.
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cat > channel.yaml <<YAML
//! title: Reading List
//! link: https://podcasts.example.com/reading
//! description: Articles I meant to read, read aloud.
//! YAML
//! podcaster ~/articles > ~/articles/feed.xml
//! ```

/// Application context, error types and cancellation.
///
/// The [`AppContext`](app::AppContext) struct wires together the channel
/// configuration, settings and the OpenAI client.
pub mod app;

/// Command-line interface using clap.
///
/// `podcaster [-d] [-v] [--channel <PATH>] <DIRECTORY>`
pub mod cli;

/// Configuration from the environment and `channel.yaml`.
pub mod config;

/// Splitting article text into pieces small enough for one speech request.
pub mod chunker;

/// Core domain models.
///
/// - [`Article`](domain::Article): a source text file
/// - [`Episode`](domain::Episode): an article plus its generated artifacts
pub mod domain;

/// Generative backends.
///
/// - [`Intelligence`](ai::Intelligence): summary, illustration and speech
/// - [`OpenAiClient`](ai::OpenAiClient): reqwest-based implementation
pub mod ai;

/// Per-article artifact generation.
pub mod pipeline;

/// RSS 2.0 rendering.
pub mod feed;
