use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, IsTerminal, Write},
    path::Path,
};

use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde::{Serialize, Serializer};

use crate::types::{DownloadOutcome, ToolVersion};

/// Why a version did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseFailure {
    MissingInfo,
    DownloadFailed { url: String, version: ToolVersion },
}

impl Display for CaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseFailure::MissingInfo => write!(f, "Failed to retrieve video information."),
            CaseFailure::DownloadFailed { url, version } => write!(
                f,
                "Video download failed for video: {url} using yt-dlp version {version}"
            ),
        }
    }
}

impl Serialize for CaseFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub version: ToolVersion,
    pub video_id: Option<String>,
    pub formats: usize,
    pub outcome: DownloadOutcome,
    pub failure: Option<CaseFailure>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub url: String,
    pub cases: Vec<CaseReport>,
}

impl MatrixReport {
    pub fn new(url: String) -> Self {
        Self {
            url,
            cases: Vec::new(),
        }
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not create report file {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self)
            .into_diagnostic()
            .wrap_err("Could not serialize report")?;
        writeln!(writer).into_diagnostic()?;
        writer.flush().into_diagnostic()
    }

    /// Print one line per version on stdout, coloured when it is a terminal
    pub fn print_summary(&self) {
        let ansi = std::io::stdout().is_terminal();

        println!("{}", self.url);
        for case in &self.cases {
            println!("{}", summary_line(case, ansi));
        }
        println!(
            "{} passed, {} failed",
            self.passed(),
            self.failed()
        );
    }
}

/// One aligned summary row. The outcome is padded before being coloured
/// so the escape codes do not count in the column width.
fn summary_line(case: &CaseReport, ansi: bool) -> String {
    let outcome = format!("{:<8}", case.outcome);
    let outcome = match (ansi, case.passed()) {
        (false, _) => outcome,
        (true, true) => outcome.green().to_string(),
        (true, false) => outcome.red().to_string(),
    };

    let video = match &case.video_id {
        Some(id) => format!("{id} ({} formats)", case.formats),
        None => "-".to_owned(),
    };

    format!("  {:<12} {outcome} {video}", case.version.as_str())
}
