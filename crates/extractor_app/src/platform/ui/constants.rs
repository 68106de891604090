//! Command words typed at the prompt.

pub const CMD_OPEN: &str = "open";
pub const CMD_REMOVE: &str = "remove";
pub const CMD_ALL: &str = "all";
pub const CMD_NONE: &str = "none";
pub const CMD_PREVIEW: &str = "preview";
pub const CMD_SAVE_PREVIEW: &str = "save-preview";
pub const CMD_PROCESS: &str = "process";
pub const CMD_DOWNLOAD: &str = "download";
pub const CMD_NEW: &str = "new";
pub const CMD_HELP: &str = "help";
pub const CMD_QUIT: &str = "quit";

pub const PREVIEW_HTML_FILENAME: &str = "preview.html";
pub const MAX_CELL_WIDTH: usize = 24;
pub const PROGRESS_BAR_WIDTH: usize = 30;
