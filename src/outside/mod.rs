mod command;
mod pipx;
mod ytdl;

pub use command::{PIPX, YT_DLP};
pub use pipx::{Pipx, ToolInstaller};
pub use ytdl::VideoTool;
