//! Tracing subscriber writing to a log file
//!
//! The terminal UI owns stdout and stderr, so diagnostics go to a file or
//! nowhere.

use std::io;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter at `level`, unless `directives` (RUST_LOG syntax) names something else
pub fn filter(level: LevelFilter, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives.unwrap_or(""))
}

/// Appender that writes to exactly `path`, never rotating
fn appender(path: &Path) -> io::Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(io::Error::other)
}

fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}

/// Install the global subscriber, appending to `path`.
///
/// The returned guard flushes the background writer when dropped, so it
/// must live until the program exits.
pub fn init(path: &Path, level: LevelFilter) -> io::Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(appender(path)?);
    let directives = std::env::var("RUST_LOG").ok();
    tracing::subscriber::set_global_default(subscriber(filter(level, directives.as_deref()), writer))
        .map_err(io::Error::other)?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Log one warning and one debug line through `filter`, returning the file
    fn capture(name: &str, filter: EnvFilter) -> String {
        let dir = std::env::temp_dir().join(format!("cmm-ide-log-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).expect("Should create dir");
        let path = dir.join("ide.log");

        let writer = appender(&path).expect("Should open");
        tracing::subscriber::with_default(subscriber(filter, writer), || {
            tracing::warn!("kept");
            tracing::debug!("detail");
        });

        let contents = std::fs::read_to_string(&path).expect("Should read");
        let _ = std::fs::remove_dir_all(&dir);
        contents
    }

    #[test]
    fn test_level_filter_drops_lower_levels() {
        let contents = capture("info", filter(LevelFilter::INFO, None));
        assert!(contents.contains("WARN"));
        assert!(contents.contains("kept"));
        assert!(!contents.contains("detail"));
    }

    #[test]
    fn test_directives_override_level() {
        let contents = capture("debug", filter(LevelFilter::WARN, Some("debug")));
        assert!(contents.contains("kept"));
        assert!(contents.contains("detail"));
    }

    #[test]
    fn test_path_without_file_name_is_rejected() {
        assert!(appender(Path::new("/")).is_err());
    }
}
