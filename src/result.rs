use std::fmt::Display;

use miette::miette;

use crate::types::ToolVersion;

#[derive(Debug)]
pub enum Error {
    /// The downloader reported the video as unavailable
    UnavailableStream,

    /// The installed binary does not report the version that was requested
    VersionMismatch {
        expected: ToolVersion,
        installed: String,
    },

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Miette(miette!("{err}"))
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::UnavailableStream => miette!("Unavailable stream"),
            Error::VersionMismatch {
                expected,
                installed,
            } => miette!(
                "Failed to install yt-dlp version {expected}. Installed version: {installed}"
            ),
            Error::Miette(err) => err,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnavailableStream => write!(f, "Unavailable stream"),
            Error::VersionMismatch {
                expected,
                installed,
            } => write!(
                f,
                "Failed to install yt-dlp version {expected}. Installed version: {installed}"
            ),
            // Alternate formatting prints the whole context chain
            Error::Miette(report) => write!(f, "{report:#}"),
        }
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn err_msg<D: Display + Send + Sync + 'static>(msg: D) -> Error {
    Error::Miette(miette!("{msg}"))
}

pub fn bail<T, D: Display + Send + Sync + 'static>(msg: D) -> Result<T> {
    Err(err_msg(msg))
}
