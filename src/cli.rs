use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::ToolVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

macro_rules! arg_env {
    ($v:literal) => {
        concat!("YTDLP_MATRIX_", $v)
    };
}

/// Install several `yt-dlp` versions side by side with `pipx`
/// and check that each one can still fetch and download a video.
///
/// Options not given here are read from the configuration file, then use the defaults.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// The yt-dlp versions to test, e.g. 2024.03.10
    #[arg(env=arg_env!("VERSIONS"), value_delimiter = ',')]
    pub versions: Vec<ToolVersion>,

    /// The URL of the video to fetch and download
    #[arg(long, env=arg_env!("URL"))]
    pub url: Option<String>,

    /// The path to the TOML configuration file.
    /// Defaults to `ytdlp-matrix.toml` in the working directory, if it exists
    #[arg(long, env=arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// The path to the directory receiving the downloaded videos
    #[arg(long, env=arg_env!("OUT_DIR"))]
    pub out: Option<PathBuf>,

    /// The pipx program to install yt-dlp with
    #[arg(long, env=arg_env!("PIPX"))]
    pub pipx: Option<PathBuf>,

    /// The directory where pipx creates its environments.
    /// Asked to pipx when not given
    #[arg(long, env=arg_env!("VENVS_DIR"))]
    pub venvs_dir: Option<PathBuf>,

    /// The yt-dlp format selector
    #[arg(long, env=arg_env!("FORMAT"))]
    pub format: Option<String>,

    /// The yt-dlp format sorting
    #[arg(long, env=arg_env!("FORMAT_SORT"))]
    pub format_sort: Option<String>,

    /// Also save the metadata of the video next to each download
    #[arg(long, env=arg_env!("WRITE_INFO_JSON"))]
    pub write_info_json: bool,

    /// Write a JSON report of the results to this file
    #[arg(long, env=arg_env!("REPORT"))]
    pub report: Option<PathBuf>,

    /// Randomize the order in which the versions are tested
    #[arg(long, env=arg_env!("SHUFFLE"))]
    pub shuffle: bool,

    /// The maximum level of the logs
    #[arg(long, value_enum, default_value_t=LogLevel::Info, env=arg_env!("LOG_LEVEL"))]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_comma_separated_versions() {
        let args = Args::parse_from(["ytdlp-matrix", "2024.03.10,2024.04.09", "2024.05.27"]);
        assert_eq!(args.versions.len(), 3);
        assert_eq!(args.log_level, LogLevel::Info);
    }

    #[test]
    fn rejects_invalid_versions() {
        assert!(Args::try_parse_from(["ytdlp-matrix", "2024.05.27,\""]).is_err());
    }
}
