use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;

use crate::{
    cli::Args,
    matrix::MatrixOptions,
    outside::{PIPX, YT_DLP},
    types::{FormatOptions, ToolVersion},
};

pub const ENV_PREFIX: &str = "YTDLP_MATRIX";
pub const DEFAULT_CONFIG_FILE: &str = "ytdlp-matrix.toml";
pub const DEFAULT_URL: &str = "https://www.youtube.com/watch?v=hBC7i-vHWsU";
pub const DEFAULT_VERSIONS: [&str; 3] = ["2024.03.10", "2024.04.09", "2024.05.27"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub url: String,
    pub versions: Vec<ToolVersion>,
    /// Package given to the installer
    pub package: String,
    /// Name of the binary inside the installed environment
    pub binary: String,
    pub pipx: PathBuf,
    pub venvs_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub format: String,
    pub format_sort: String,
    pub write_info_json: bool,
    pub shuffle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let format = FormatOptions::default();
        Self {
            url: DEFAULT_URL.to_owned(),
            versions: DEFAULT_VERSIONS
                .iter()
                .flat_map(|v| v.parse())
                .collect(),
            package: YT_DLP.to_owned(),
            binary: YT_DLP.to_owned(),
            pipx: PathBuf::from(PIPX),
            venvs_dir: None,
            out_dir: PathBuf::from("."),
            format: format.format,
            format_sort: format.sort,
            write_info_json: false,
            shuffle: false,
        }
    }
}

impl Settings {
    /// Load the settings from the configuration file then the environment.
    ///
    /// When no path is given, the default file is read if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("versions"),
            )
            .build()
            .into_diagnostic()
            .wrap_err("Could not load the configuration")?
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid configuration")
    }

    /// Override the settings with the options given on the command line
    pub fn merge_args(&mut self, args: &Args) {
        if !args.versions.is_empty() {
            self.versions = args.versions.clone();
        }
        if let Some(url) = &args.url {
            self.url = url.clone();
        }
        if let Some(out) = &args.out {
            self.out_dir = out.clone();
        }
        if let Some(pipx) = &args.pipx {
            self.pipx = pipx.clone();
        }
        if let Some(venvs_dir) = &args.venvs_dir {
            self.venvs_dir = Some(venvs_dir.clone());
        }
        if let Some(format) = &args.format {
            self.format = format.clone();
        }
        if let Some(format_sort) = &args.format_sort {
            self.format_sort = format_sort.clone();
        }
        self.write_info_json |= args.write_info_json;
        self.shuffle |= args.shuffle;
    }

    pub fn matrix_options(&self) -> MatrixOptions {
        MatrixOptions {
            url: self.url.clone(),
            format: FormatOptions {
                format: self.format.clone(),
                sort: self.format_sort.clone(),
            },
            out_dir: self.out_dir.clone(),
            write_info_json: self.write_info_json,
        }
    }
}
