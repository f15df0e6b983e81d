use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. With `debug` the default level is `debug` and may be
/// overridden via `RUST_LOG`; otherwise `info` is forced.
///
/// When `log_file` is given, output is also appended to that file through a
/// non-blocking writer that lives for the rest of the process.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(debug, env.as_deref());

    let file_writer = log_file.and_then(|path| {
        let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| ".".into());
        let name = path.file_name()?.to_owned();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("failed to create log directory {}: {e}", dir.display());
            return None;
        }
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Some(writer)
    });

    let result = match file_writer {
        Some(writer) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr.and(writer))
            .with_ansi(false)
            .try_init(),
        None => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    if result.is_err() {
        tracing::debug!("logger already initialised");
    }
}

/// `RUST_LOG` only applies with debug logging; invalid directives fall back
/// to `debug`.
fn env_filter(debug: bool, env: Option<&str>) -> EnvFilter {
    match env {
        Some(directives) if debug => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("debug"))
        }
        _ if debug => EnvFilter::new("debug"),
        _ => EnvFilter::new("info"),
    }
}
