use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const TOAST_LOG_FILE: &str = "toast.log";

/// Append a user-facing notice to `path` with a timestamp.
pub fn append_toast_log(path: &Path, msg: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{} - {}", Local::now().to_rfc3339(), msg);
    }
}
