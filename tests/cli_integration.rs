#![cfg(unix)]

use std::{
    error::Error,
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use indoc::{formatdoc, indoc};
use predicates::{prelude::*, str::contains};
use tempfile::{tempdir, TempDir};

/// Stand-in for yt-dlp. Reports the version written next to it by the fake pipx,
/// prints a small metadata document and "downloads" by creating the output file.
const FAKE_YT_DLP: &str = indoc! {r#"
    #!/bin/sh
    here="$(dirname "$0")"
    case "$1" in
        --version)
            cat "$here/version"
            ;;
        --print-json)
            if [ -f "$here/no-info" ]; then
                echo "ERROR: [youtube] hBC7i-vHWsU: Video unavailable" >&2
                exit 1
            fi
            echo '{"id": "hBC7i-vHWsU", "formats": [{"format_id": "18", "ext": "mp4", "tbr": 612.5}]}'
            ;;
        *)
            out=""
            while [ $# -gt 0 ]; do
                if [ "$1" = "-o" ]; then
                    out="$2"
                fi
                shift
            done
            touch "$(printf '%s' "$out" | sed 's/%(ext)s$/mp4/')"
            ;;
    esac
"#};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Result<Self, Box<dyn Error>> {
        let sandbox = Self { dir: tempdir()? };
        fs::create_dir_all(sandbox.venvs())?;
        fs::create_dir_all(sandbox.out())?;

        let template = sandbox.dir.path().join("yt-dlp-template");
        write_script(&template, FAKE_YT_DLP)?;

        // Installs the template in "<venvs>/yt-dlp-<dashed version>/bin"
        // and records the version it was asked for. Rejects an install
        // without the matching suffix or without --force, and any install
        // at all once the failure marker exists.
        let pipx = formatdoc! {r#"
            #!/bin/sh
            venvs="{venvs}"
            case "$1" in
                --version)
                    echo 1.4.3
                    ;;
                environment)
                    [ "$2" = --value ] && [ "$3" = PIPX_LOCAL_VENVS ] || exit 1
                    echo "$*" >> "{calls}"
                    echo "$venvs"
                    ;;
                ensurepath)
                    echo "$*" >> "{calls}"
                    ;;
                install)
                    [ -f "{fail}" ] && exit 1
                    version=""
                    suffix=""
                    force=""
                    for arg in "$@"; do
                        case "$arg" in
                            yt-dlp==*) version="${{arg#yt-dlp==}}" ;;
                            --suffix=*) suffix="${{arg#--suffix=}}" ;;
                            --force) force=1 ;;
                        esac
                    done
                    [ -n "$version" ] || exit 1
                    [ "$suffix" = "_$version" ] || exit 1
                    [ -n "$force" ] || exit 1
                    bin="$venvs/yt-dlp-$(echo "$version" | tr . -)/bin"
                    mkdir -p "$bin"
                    cp "{template}" "$bin/yt-dlp"
                    echo "$version" > "$bin/version"
                    echo "$version" >> "{log}"
                    ;;
                *)
                    exit 1
                    ;;
            esac
            "#,
            venvs = sandbox.venvs().display(),
            template = template.display(),
            log = sandbox.install_log().display(),
            calls = sandbox.calls_log().display(),
            fail = sandbox.fail_marker().display(),
        };
        write_script(&sandbox.pipx(), &pipx)?;

        Ok(sandbox)
    }

    fn venvs(&self) -> PathBuf {
        self.dir.path().join("venvs")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn pipx(&self) -> PathBuf {
        self.dir.path().join("pipx")
    }

    fn install_log(&self) -> PathBuf {
        self.dir.path().join("installs.log")
    }

    /// Every `environment` and `ensurepath` call, one per line
    fn calls_log(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    /// When present, every install fails
    fn fail_marker(&self) -> PathBuf {
        self.dir.path().join("fail-install")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ytdlp-matrix").unwrap();
        cmd.current_dir(self.dir.path())
            .arg("--pipx")
            .arg(self.pipx())
            .arg("--out")
            .arg(self.out());
        cmd
    }
}

fn write_script(path: &Path, content: &str) -> Result<(), Box<dyn Error>> {
    fs::write(path, content)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[test]
fn every_version_downloads_the_video() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new()?;
    let report = sandbox.dir.path().join("report.json");

    sandbox
        .cmd()
        .arg("--report")
        .arg(&report)
        .args(["2024.03.10", "2024.04.09"])
        .assert()
        .success()
        .stdout(contains("2 passed, 0 failed"));

    assert!(sandbox.out().join("hBC7i-vHWsU - 2024-03-10.mp4").is_file());
    assert!(sandbox.out().join("hBC7i-vHWsU - 2024-04-09.mp4").is_file());

    // Each version is installed exactly once
    let installs = fs::read_to_string(sandbox.install_log())?;
    assert_eq!(installs.lines().collect::<Vec<_>>(), ["2024.03.10", "2024.04.09"]);

    // The venvs directory is asked for once, the path is ensured after each install
    let calls = fs::read_to_string(sandbox.calls_log())?;
    assert_eq!(
        calls.lines().collect::<Vec<_>>(),
        [
            "environment --value PIPX_LOCAL_VENVS",
            "ensurepath",
            "ensurepath"
        ]
    );

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(report)?)?;
    assert_eq!(report["cases"][0]["outcome"], "SUCCESS");
    assert_eq!(report["cases"][1]["video_id"], "hBC7i-vHWsU");

    Ok(())
}

#[test]
fn missing_metadata_fails_the_run() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new()?;

    // Install first so that the marker can be dropped next to the binary
    sandbox.cmd().arg("2024.05.27").assert().success();
    fs::write(
        sandbox.venvs().join("yt-dlp-2024-05-27/bin/no-info"),
        "",
    )?;

    // The installer runs again (forced reinstall), the marker stays in place
    sandbox
        .cmd()
        .arg("2024.05.27")
        .assert()
        .failure()
        .stdout(contains("SKIPPED"))
        .stdout(contains("0 passed, 1 failed"))
        .stderr(contains("Failed to retrieve video information."));

    Ok(())
}

#[test]
fn invalid_version_is_rejected() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new()?;

    sandbox.cmd().arg("2024.05.27,\"").assert().failure();
    assert!(!sandbox.install_log().exists());

    Ok(())
}

#[test]
fn failing_install_aborts_the_run() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new()?;
    fs::write(sandbox.fail_marker(), "")?;

    sandbox
        .cmd()
        .arg("2024.03.10")
        .assert()
        .failure()
        .stdout(contains("passed").not());

    assert!(!sandbox.install_log().exists());
    assert!(fs::read_dir(sandbox.out())?.next().is_none());

    Ok(())
}
