use std::{fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters allowed in a release identifier.
/// Anything else (quotes, commas, spaces) is a typo in the version list.
const VERSION_PATTERN: &str = r"^[0-9A-Za-z][0-9A-Za-z.\-_+!]*$";

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

/// A release of the tool under test, e.g. `2024.03.10`.
///
/// The same string selects the package version (`yt-dlp==2024.03.10`)
/// and suffixes the isolated install.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolVersion(String);

impl ToolVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The version with its dots replaced by dashes.
    /// e.g. "2024.03.10" -> "2024-03-10"
    pub fn dashed(&self) -> String {
        self.0.replace('.', "-")
    }

    /// The suffix given to the installer so that each version lives in its own environment
    pub fn install_suffix(&self) -> String {
        format!("_{}", self.0)
    }

    /// The package requirement selecting exactly this version
    pub fn requirement(&self, package: &str) -> String {
        format!("{package}=={}", self.0)
    }
}

impl FromStr for ToolVersion {
    type Err = Box<dyn std::error::Error + Sync + Send>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Box::from("Version is empty"));
        }

        let re = VERSION_RE.get_or_init(|| Regex::new(VERSION_PATTERN).unwrap());
        if re.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(Box::from(format!("Invalid version '{s}'")))
        }
    }
}

impl TryFrom<String> for ToolVersion {
    type Error = Box<dyn std::error::Error + Sync + Send>;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToolVersion> for String {
    fn from(version: ToolVersion) -> Self {
        version.0
    }
}

impl Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
