mod format;
mod metadata;
mod outcome;
mod version;

pub use format::FormatOptions;
pub use metadata::VideoInfo;
pub use outcome::DownloadOutcome;
pub use version::ToolVersion;
