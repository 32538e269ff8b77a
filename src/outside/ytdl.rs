use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use miette::{miette, Context, IntoDiagnostic};

use super::command::{command_stdout, run_command, Capture};
use crate::{
    result::{Error, Result},
    types::{FormatOptions, VideoInfo},
};

/// Interface for fetching video metadata and downloading videos
pub trait VideoTool {
    /// The version string the tool reports about itself
    fn version(&self) -> Result<String>;

    /// Get the video metadata, including its available formats
    fn get_info(&self, url: &str) -> Result<VideoInfo>;

    /// Download the video using the given output template.
    ///
    /// Returns whether the tool exited successfully.
    /// An error means the tool could not be run at all.
    fn download(&self, url: &str, format: &FormatOptions, output: &Path) -> Result<bool>;
}

/// Interface for one installed copy of the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
#[derive(Debug, Clone)]
pub struct Ytdl {
    program: PathBuf,
}

impl Ytdl {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Run the command and check if it failed with saying the stream is unavailable.
    /// In that case, return [`Error::UnavailableStream`].
    ///
    /// In other cases, return the output handle.
    pub fn run_check_availability<F>(&self, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(&self.program, f, capture | Capture::STDERR)?;

        let stderr = String::from_utf8_lossy(&res.stderr);
        let is_unavailable = stderr
            .lines()
            .any(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"));
        if is_unavailable {
            Err(Error::UnavailableStream)
        } else {
            Ok(res)
        }
    }
}

impl VideoTool for Ytdl {
    fn version(&self) -> Result<String> {
        command_stdout(&self.program, |cmd| cmd.arg("--version"))
    }

    fn get_info(&self, url: &str) -> Result<VideoInfo> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("--print-json")
                    .arg("--skip-download")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT,
        )?;

        if !res.status.success() {
            let stderr = String::from_utf8_lossy(&res.stderr);
            return Err(miette!(
                "{} exited with {}. Here is its stderr: {}",
                self.program.display(),
                res.status,
                stderr.trim()
            )
            .into());
        }

        let output = String::from_utf8(res.stdout)
            .into_diagnostic()
            .wrap_err("Output from command is not valid UTF-8")?;

        Ok(VideoInfo::from_json(output.trim())?)
    }

    fn download(&self, url: &str, format: &FormatOptions, output: &Path) -> Result<bool> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.args(format.to_args())
                    .args([OsStr::new("-o"), output.as_os_str()])
                    .arg("--")
                    .arg(url)
            },
            Capture::empty(),
        )?;

        Ok(res.status.success())
    }
}
