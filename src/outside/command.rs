use std::{
    ffi::OsStr,
    process::{Command, Output, Stdio},
};

use bitflags::bitflags;
use miette::{miette, Context, IntoDiagnostic};
use tracing::{debug, trace, Level};

use crate::result::{bail, Result};

pub const PIPX: &str = "pipx";
pub const YT_DLP: &str = "yt-dlp";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capture: u8 {
        const STDIN = 0b0000001;
        const STDOUT = 0b0000010;
        const STDERR = 0b0000100;
    }
}

/// Run a command, returning its raw output handle.
///
/// IO handles will be captured only if the caller required it or if the log level is Debug.
/// In that last case, `stdout` and `stderr` will be logged.
///
/// The function returns an error only if the command failed to execute.
/// If the program runs but returns a non-0 status code, it will not trigger an error.
pub fn run_command<P, F>(program: P, f: F, capture: Capture) -> Result<Output>
where
    P: AsRef<OsStr>,
    F: FnOnce(&mut Command) -> &mut Command,
{
    let program = program.as_ref();
    let is_debug = tracing::enabled!(Level::DEBUG);
    let get_io = |capture| {
        if capture {
            Stdio::piped()
        } else {
            Stdio::null()
        }
    };

    let mut cmd = Command::new(program);
    let cmd = f(&mut cmd)
        .stdin(get_io(capture.contains(Capture::STDIN)))
        .stdout(get_io(is_debug || capture.contains(Capture::STDOUT)))
        .stderr(get_io(is_debug || capture.contains(Capture::STDERR)));

    debug!("Executing command: {cmd:?}");
    let res = cmd
        .output()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not run {}", program.to_string_lossy()))?;

    if is_debug {
        debug!("status: {}", res.status);
        debug!("stdout: {} bytes long", res.stdout.len());
        trace!("stdout: {:?}", String::from_utf8_lossy(&res.stdout));
        debug!("stderr: {} bytes long", res.stderr.len());
        trace!("stderr: {:?}", String::from_utf8_lossy(&res.stderr));
    }

    Ok(res)
}

/// Run the command and verify that it has returned a success status code.
pub fn assert_success_command<P, F>(program: P, f: F) -> Result<()>
where
    P: AsRef<OsStr>,
    F: FnOnce(&mut Command) -> &mut Command,
{
    let program = program.as_ref();
    let res = run_command(program, f, Capture::empty())?;
    if res.status.success() {
        Ok(())
    } else {
        bail(format!(
            "{} did run but was not successful ({})",
            program.to_string_lossy(),
            res.status
        ))
    }
}

/// Run the command, verify its status code and return its trimmed stdout.
pub fn command_stdout<P, F>(program: P, f: F) -> Result<String>
where
    P: AsRef<OsStr>,
    F: FnOnce(&mut Command) -> &mut Command,
{
    let program = program.as_ref();
    let res = run_command(program, f, Capture::STDOUT | Capture::STDERR)?;

    if !res.status.success() {
        let stderr = String::from_utf8_lossy(&res.stderr);
        return Err(miette!(
            "{} did run but was not successful. Here is its stderr: {}",
            program.to_string_lossy(),
            stderr.trim()
        )
        .into());
    }

    let stdout = String::from_utf8(res.stdout)
        .into_diagnostic()
        .wrap_err("Output from command is not valid UTF-8")?;
    Ok(stdout.trim().to_owned())
}
