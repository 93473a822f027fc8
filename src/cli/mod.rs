pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::DEFAULT_CHANNEL_FILE;

#[derive(Parser, Debug)]
#[command(name = "podcaster")]
#[command(version, about = "Turn a directory of articles into a podcast feed", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Directory of .txt articles to scan
    pub directory: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Channel metadata file
    #[arg(long, default_value = DEFAULT_CHANNEL_FILE)]
    pub channel: PathBuf,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),
}

/// Render an error chain on one line, `outer: inner: root`.
///
/// Causes already spelled out by their wrapper's message are not repeated.
pub fn one_line(err: &anyhow::Error) -> String {
    let mut line = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if line.ends_with(&text) {
            continue;
        }
        if !line.is_empty() {
            line.push_str(": ");
        }
        line.push_str(&text);
    }
    line
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use clap::error::ErrorKind as ClapErrorKind;
    use clap::CommandFactory;

    use super::*;
    use crate::app::PodcastError;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_directory_and_debug() {
        let cli = Cli::try_parse_from(["podcaster", "-d", "articles"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.directory, PathBuf::from("articles"));
        assert_eq!(cli.channel, PathBuf::from("channel.yaml"));
    }

    #[test]
    fn test_channel_override() {
        let cli =
            Cli::try_parse_from(["podcaster", "--channel", "/etc/pod.yaml", "articles"]).unwrap();
        assert!(!cli.debug);
        assert_eq!(cli.channel, PathBuf::from("/etc/pod.yaml"));
    }

    #[test]
    fn test_missing_directory_is_a_usage_error() {
        let err = Cli::try_parse_from(["podcaster"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_extra_positional_is_a_usage_error() {
        let err = Cli::try_parse_from(["podcaster", "a", "b"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["podcaster", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::DisplayVersion);
        assert!(!err.use_stderr());
        assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_one_line_skips_repeated_causes() {
        let err = Err::<(), _>(PodcastError::Canceled.in_episode("a.txt"))
            .context("failed to scan articles")
            .unwrap_err();
        assert_eq!(
            one_line(&err),
            "failed to scan articles: a.txt: Operation canceled"
        );
    }

    #[test]
    fn test_one_line_keeps_distinct_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        let err = Err::<(), _>(PodcastError::from(io))
            .context("failed to scan articles")
            .unwrap_err();
        assert_eq!(
            one_line(&err),
            "failed to scan articles: IO error: no such directory"
        );
    }
}
