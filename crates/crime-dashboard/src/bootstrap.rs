use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashboard_core::settings::APP_DIR_NAME;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name used for the interactive-mode log.
pub const LOG_FILE_NAME: &str = "crime-dashboard.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.crime-dashboard/logs/` exists and return the logs directory.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

pub fn ensure_directories_in(home: &Path) -> anyhow::Result<PathBuf> {
    let logs = home.join(APP_DIR_NAME).join("logs");
    std::fs::create_dir_all(&logs)?;
    Ok(logs)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG|INFO|WARNING|ERROR|CRITICAL` level name to an `EnvFilter`
/// directive. Unknown names are passed through so that full directives like
/// `dashboard_data=debug` still work.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Where log output should go.
///
/// An explicit `--log-file` always wins. The interactive dashboard owns the
/// terminal, so it logs to `logs_dir/crime-dashboard.log`; report mode logs
/// to stderr (`None`).
pub fn resolve_log_path(
    log_file: Option<&Path>,
    interactive: bool,
    logs_dir: &Path,
) -> Option<PathBuf> {
    match log_file {
        Some(p) => Some(p.to_path_buf()),
        None if interactive => Some(logs_dir.join(LOG_FILE_NAME)),
        None => None,
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Falls back to `"info"` if the level string is not a valid directive.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Crime selection ────────────────────────────────────────────────────────────

/// Pick the highlighted crime: the requested one when the dataset has it,
/// otherwise the first distinct description.
pub fn choose_crime(requested: Option<&str>, descriptions: &[String]) -> String {
    if let Some(want) = requested {
        if descriptions.iter().any(|d| d == want) {
            return want.to_string();
        }
        warn!("Crime {:?} not found in dataset; using first description", want);
    }
    descriptions.first().cloned().unwrap_or_default()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── ensure_directories ────────────────────────────────────────────────────

    #[test]
    fn test_ensure_directories_in_creates_logs() {
        let tmp = TempDir::new().expect("tempdir");
        let logs = ensure_directories_in(tmp.path()).expect("create dirs");
        assert_eq!(logs, tmp.path().join(".crime-dashboard").join("logs"));
        assert!(logs.is_dir());
    }

    #[test]
    fn test_ensure_directories_in_is_repeatable() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories_in(tmp.path()).expect("first");
        ensure_directories_in(tmp.path()).expect("second");
    }

    // ── filter_directive ──────────────────────────────────────────────────────

    #[test]
    fn test_filter_directive_maps_level_names() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("CRITICAL"), "error");
    }

    #[test]
    fn test_filter_directive_passes_through_directives() {
        assert_eq!(filter_directive("dashboard_data=debug"), "dashboard_data=debug");
    }

    // ── resolve_log_path ──────────────────────────────────────────────────────

    #[test]
    fn test_resolve_log_path_explicit_wins() {
        let logs = Path::new("/tmp/logs");
        let explicit = Path::new("/var/log/crime.log");
        assert_eq!(
            resolve_log_path(Some(explicit), true, logs),
            Some(explicit.to_path_buf())
        );
        assert_eq!(
            resolve_log_path(Some(explicit), false, logs),
            Some(explicit.to_path_buf())
        );
    }

    #[test]
    fn test_resolve_log_path_interactive_defaults_to_file() {
        let logs = Path::new("/tmp/logs");
        assert_eq!(
            resolve_log_path(None, true, logs),
            Some(logs.join(LOG_FILE_NAME))
        );
    }

    #[test]
    fn test_resolve_log_path_report_uses_stderr() {
        assert_eq!(resolve_log_path(None, false, Path::new("/tmp/logs")), None);
    }

    // ── choose_crime ──────────────────────────────────────────────────────────

    #[test]
    fn test_choose_crime() {
        let descs = vec!["LARCENY".to_string(), "ARSON".to_string()];
        assert_eq!(choose_crime(None, &descs), "LARCENY");
        assert_eq!(choose_crime(Some("ARSON"), &descs), "ARSON");
        assert_eq!(choose_crime(Some("PIRACY"), &descs), "LARCENY");
        assert_eq!(choose_crime(None, &[]), "");
    }
}
