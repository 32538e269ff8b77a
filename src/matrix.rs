use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use miette::{Context, IntoDiagnostic};
use tracing::{debug, error, info, warn};

use crate::{
    installed::InstalledVersions,
    outside::{ToolInstaller, VideoTool},
    report::{CaseFailure, CaseReport, MatrixReport},
    result::{Error, Result},
    types::{DownloadOutcome, FormatOptions, ToolVersion, VideoInfo},
};

/// What every version of the matrix is tested against
#[derive(Debug, Clone)]
pub struct MatrixOptions {
    pub url: String,
    pub format: FormatOptions,
    pub out_dir: PathBuf,
    pub write_info_json: bool,
}

/// Output template given to the downloader, the extension being filled in by it.
/// e.g. "hBC7i-vHWsU - 2024-03-10.%(ext)s"
pub fn output_template(video_id: &str, version: &ToolVersion) -> String {
    format!("{video_id} - {}.%(ext)s", version.dashed())
}

/// Runs the install, metadata fetch and download steps for each tool version
pub struct Matrix<'a, I: ToolInstaller> {
    installer: &'a I,
    options: &'a MatrixOptions,
    installed: InstalledVersions,
}

impl<'a, I: ToolInstaller> Matrix<'a, I> {
    pub fn new(installer: &'a I, options: &'a MatrixOptions) -> Self {
        Self {
            installer,
            options,
            installed: InstalledVersions::default(),
        }
    }

    /// Install every version that has not been installed yet during this run.
    ///
    /// Fails on the first version that cannot be installed or that does not
    /// report the requested version once installed.
    pub fn install_all(&mut self, versions: &[ToolVersion]) -> Result<()> {
        for version in versions {
            if self.installed.contains(version) {
                debug!("yt-dlp {version} already installed");
                continue;
            }

            if let Err(err) = self.install(version) {
                error!("Failed to install yt-dlp: {err}");
                return Err(err);
            }
        }

        debug!("{} versions installed", self.installed.len());
        Ok(())
    }

    fn install(&mut self, version: &ToolVersion) -> Result<()> {
        info!("Installing yt-dlp {version}");
        self.installer.install(version)?;
        self.installer.ensure_path()?;

        let installed = self
            .installer
            .tool(version)
            .version()
            .map_err(|err| err.wrap_err_with(|| "Could not check the installed version"))?;
        if installed != version.as_str() {
            return Err(Error::VersionMismatch {
                expected: version.clone(),
                installed,
            });
        }

        info!("Installed yt-dlp version: {installed}");
        self.installed.push(version.clone())
    }

    /// Fetch the video metadata with the given version.
    ///
    /// Any failure is logged and turned into `None`.
    pub fn fetch_info(&self, version: &ToolVersion) -> Option<VideoInfo> {
        let url = &self.options.url;

        match self.installer.tool(version).get_info(url) {
            Ok(info) => Some(info),
            Err(Error::UnavailableStream) => {
                error!("Failed to retrieve format information for video {url}: video unavailable");
                None
            }
            Err(err) => {
                error!("Failed to retrieve format information for video {url}: {err}");
                None
            }
        }
    }

    /// Download the video with the given version, unless its metadata is missing
    pub fn download(&self, version: &ToolVersion, info: Option<&VideoInfo>) -> DownloadOutcome {
        let Some(info) = info else {
            warn!("Skipping download due to missing video info.");
            return DownloadOutcome::Skipped;
        };

        let output = self
            .options
            .out_dir
            .join(output_template(&info.id, version));
        info!("Downloading video to: {}", output.display());

        let tool = self.installer.tool(version);
        match tool.download(&self.options.url, &self.options.format, &output) {
            Ok(true) => DownloadOutcome::Success,
            Ok(false) => {
                error!("Download failed: yt-dlp {version} exited with an error");
                DownloadOutcome::Failed
            }
            Err(err) => {
                error!("Download failed: {err}");
                DownloadOutcome::Failed
            }
        }
    }

    /// Test one version: make sure everything is installed, fetch the metadata,
    /// list the formats and download the video.
    pub fn run_case(
        &mut self,
        version: &ToolVersion,
        all_versions: &[ToolVersion],
    ) -> Result<CaseReport> {
        self.install_all(all_versions)?;

        let url = &self.options.url;
        info!("Testing video: {url} with yt-dlp version {version}");
        info!("----------------------------------------------------------------");

        let info = self.fetch_info(version);

        if let Some(info) = &info {
            info!(
                "Video: {} ({})",
                info.title.as_deref().unwrap_or("untitled"),
                info.id
            );

            if self.options.write_info_json {
                if let Err(err) = self.write_info_json(version, info) {
                    warn!("Could not save the video metadata: {err:?}");
                }
            }

            if info.has_formats() {
                info!("Available formats and qualities:");
                for format in &info.formats {
                    info!("{format}");
                }
            }
        }

        let outcome = self.download(version, info.as_ref());

        let failure = if info.is_none() {
            Some(CaseFailure::MissingInfo)
        } else if outcome != DownloadOutcome::Success {
            Some(CaseFailure::DownloadFailed {
                url: url.clone(),
                version: version.clone(),
            })
        } else {
            None
        };

        match &failure {
            None => info!("Download successful!"),
            Some(failure) => error!("{failure}"),
        }

        Ok(CaseReport {
            version: version.clone(),
            video_id: info.as_ref().map(|info| info.id.clone()),
            formats: info.as_ref().map_or(0, |info| info.formats.len()),
            outcome,
            failure,
        })
    }

    /// Test every version, in the given order or shuffled
    pub fn run(&mut self, versions: &[ToolVersion], shuffle: bool) -> Result<MatrixReport> {
        let mut order = versions.to_vec();
        if shuffle {
            debug!("Shuffling the versions test order");
            fastrand::shuffle(&mut order);
        }

        let mut report = MatrixReport::new(self.options.url.clone());
        for version in &order {
            report.cases.push(self.run_case(version, versions)?);
        }

        Ok(report)
    }

    fn write_info_json(&self, version: &ToolVersion, info: &VideoInfo) -> miette::Result<()> {
        let path = info_json_path(&self.options.out_dir, &info.id, version);
        debug!("Saving video metadata to {}", path.display());

        let file = File::create(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), info.raw())
            .into_diagnostic()
            .wrap_err("Could not write the metadata")
    }
}

fn info_json_path(out_dir: &Path, video_id: &str, version: &ToolVersion) -> PathBuf {
    out_dir.join(format!("{video_id} - {}.info.json", version.dashed()))
}
