mod cli;
mod config;
mod installed;
mod logging;
mod matrix;
mod outside;
mod report;
mod result;
mod types;

use clap::Parser;
use miette::{bail, miette, Context, IntoDiagnostic};
use tracing::{debug, info};

use crate::{
    cli::Args,
    config::Settings,
    logging::init_logging,
    matrix::Matrix,
    outside::Pipx,
};

fn main() -> miette::Result<()> {
    // Initialize the logging & CLI
    let args = Args::parse();
    init_logging(args.log_level.into())?;

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.merge_args(&args);
    debug!("Settings: {settings:?}");

    if settings.versions.is_empty() {
        bail!("No yt-dlp version to test");
    }

    // Make sure the output directory exists
    std::fs::create_dir_all(&settings.out_dir)
        .into_diagnostic()
        .wrap_err("Could not create out directory")?;

    let pipx = Pipx::new(
        settings.pipx.clone(),
        settings.package.clone(),
        settings.binary.clone(),
        settings.venvs_dir.clone(),
    )?;
    info!("Using pipx environments in {}", pipx.venvs_dir().display());

    let options = settings.matrix_options();
    let mut matrix = Matrix::new(&pipx, &options);

    info!("Installing {} yt-dlp versions", settings.versions.len());
    matrix.install_all(&settings.versions)?;

    let report = matrix.run(&settings.versions, settings.shuffle)?;
    report.print_summary();

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }

    if report.is_success() {
        info!("All versions passed");
        Ok(())
    } else {
        Err(miette!(
            "{} of {} versions failed",
            report.failed(),
            report.cases.len()
        ))
    }
}
