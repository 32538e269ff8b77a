use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use tracing::debug;

use super::{
    command::{assert_success_command, command_stdout},
    ytdl::{VideoTool, Ytdl},
};
use crate::{
    result::{err_msg, Result},
    types::ToolVersion,
};

#[cfg(not(windows))]
const VENV_BIN_DIR: &str = "bin";
#[cfg(windows)]
const VENV_BIN_DIR: &str = "Scripts";

/// Interface for installing isolated copies of the tool under test
pub trait ToolInstaller {
    type Tool: VideoTool;

    /// Install the given version in its own environment,
    /// replacing any previous install of that version.
    fn install(&self, version: &ToolVersion) -> Result<()>;

    /// Make sure the installed apps are reachable from the `PATH`
    fn ensure_path(&self) -> Result<()>;

    /// Handle to the binary installed for this version
    fn tool(&self, version: &ToolVersion) -> Self::Tool;
}

/// Name of the virtual environment created for a package installed with a suffix.
///
/// The installer normalizes it like a python package name:
/// runs of `-`, `_`, `.` become a single `-` and everything is lowercased.
/// e.g. ("yt-dlp", "_2024.03.10") -> "yt-dlp-2024-03-10"
pub fn venv_name(package: &str, suffix: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATORS.get_or_init(|| Regex::new(r"[-_.]+").unwrap());

    re.replace_all(&format!("{package}{suffix}"), "-")
        .to_lowercase()
}

/// Interface for the [pipx](https://pipx.pypa.io) program
#[derive(Debug)]
pub struct Pipx {
    program: PathBuf,
    package: String,
    binary: String,
    venvs_dir: PathBuf,
}

impl Pipx {
    /// Verify that the `pipx` binary is reachable and locate its environments directory.
    ///
    /// When `venvs_dir` is not given, ask `pipx` where it puts its environments.
    pub fn new(
        program: PathBuf,
        package: String,
        binary: String,
        venvs_dir: Option<PathBuf>,
    ) -> Result<Self> {
        assert_success_command(&program, |cmd| cmd.arg("--version"))
            .map_err(|err| err.wrap_err_with(|| "pipx is not usable"))?;

        let venvs_dir = match venvs_dir {
            Some(dir) => dir,
            None => {
                let dir = command_stdout(&program, |cmd| {
                    cmd.args(["environment", "--value", "PIPX_LOCAL_VENVS"])
                })
                .map_err(|err| err.wrap_err_with(|| "Could not locate the pipx environments"))?;

                if dir.is_empty() {
                    return Err(err_msg("pipx did not report its environments directory"));
                }
                PathBuf::from(dir)
            }
        };
        debug!("pipx environments are in {}", venvs_dir.display());

        Ok(Self {
            program,
            package,
            binary,
            venvs_dir,
        })
    }

    pub fn venvs_dir(&self) -> &Path {
        &self.venvs_dir
    }

    /// Path of the binary installed for this version
    pub fn binary_path(&self, version: &ToolVersion) -> PathBuf {
        let mut path = self
            .venvs_dir
            .join(venv_name(&self.package, &version.install_suffix()));
        path.push(VENV_BIN_DIR);
        path.push(&self.binary);

        if cfg!(windows) {
            path.set_extension("exe");
        }
        path
    }
}

impl ToolInstaller for Pipx {
    type Tool = Ytdl;

    fn install(&self, version: &ToolVersion) -> Result<()> {
        assert_success_command(&self.program, |cmd| {
            cmd.arg("install")
                .arg(format!("--suffix={}", version.install_suffix()))
                .arg(version.requirement(&self.package))
                .arg("--force")
        })
        .map_err(|err| err.wrap_err_with(|| format!("Failed to install {} {version}", self.package)))
    }

    fn ensure_path(&self) -> Result<()> {
        assert_success_command(&self.program, |cmd| cmd.arg("ensurepath"))
    }

    fn tool(&self, version: &ToolVersion) -> Ytdl {
        Ytdl::new(self.binary_path(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_venv_names() {
        assert_eq!(venv_name("yt-dlp", "_2024.03.10"), "yt-dlp-2024-03-10");
        assert_eq!(venv_name("Some_Package", "__1..0"), "some-package-1-0");
    }

    #[cfg(unix)]
    #[test]
    fn builds_binary_path() {
        let pipx = Pipx {
            program: PathBuf::from("pipx"),
            package: "yt-dlp".to_owned(),
            binary: "yt-dlp".to_owned(),
            venvs_dir: PathBuf::from("/root/.local/share/pipx/venvs"),
        };
        let version: ToolVersion = "2024.03.10".parse().unwrap();

        assert_eq!(
            pipx.binary_path(&version),
            Path::new("/root/.local/share/pipx/venvs/yt-dlp-2024-03-10/bin/yt-dlp")
        );
    }

    /// Runs the installer against a script logging its arguments,
    /// one call per line
    #[cfg(unix)]
    #[test]
    fn passes_install_arguments() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let venvs = dir.path().join("venvs");
        let program = dir.path().join("pipx");
        fs::write(
            &program,
            format!(
                "#!/bin/sh\necho \"$*\" >> '{}'\n[ \"$1\" = environment ] && echo '{}'\nexit 0\n",
                log.display(),
                venvs.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

        let pipx = Pipx::new(program, "yt-dlp".to_owned(), "yt-dlp".to_owned(), None).unwrap();
        assert_eq!(pipx.venvs_dir(), venvs);

        let version: ToolVersion = "2024.03.10".parse().unwrap();
        pipx.install(&version).unwrap();
        pipx.ensure_path().unwrap();

        let calls = fs::read_to_string(&log).unwrap();
        assert_eq!(
            calls.lines().collect::<Vec<_>>(),
            [
                "--version",
                "environment --value PIPX_LOCAL_VENVS",
                "install --suffix=_2024.03.10 yt-dlp==2024.03.10 --force",
                "ensurepath",
            ]
        );
    }
}
