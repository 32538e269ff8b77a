use std::ffi::OsString;

/// Format selection passed to the downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Value of `--format`, e.g. "best"
    pub format: String,
    /// Value of `--format-sort`, e.g. "tbr~1000" to prefer a total bitrate close to 1000 kbps
    pub sort: String,
}

impl FormatOptions {
    pub fn to_args(&self) -> [OsString; 4] {
        [
            "--format".into(),
            self.format.as_str().into(),
            "--format-sort".into(),
            self.sort.as_str().into(),
        ]
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            format: "best".to_owned(),
            sort: "tbr~1000".to_owned(),
        }
    }
}
