use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// Level selected by the `-v` count.
fn verbosity_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// `-q` turns the console off entirely; the log file is unaffected.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else {
        verbosity_level(verbosity)
    }
}

fn build_subscriber(
    verbosity: u8,
    quiet: bool,
    log_file: Option<File>,
) -> impl Subscriber + Send + Sync {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(console_level(verbosity, quiet));

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true)
            .with_filter(verbosity_level(verbosity))
    });

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let file = log_file
        .map(|path| File::create(&path).map_err(CliError::Io))
        .transpose()?;
    build_subscriber(verbosity, quiet, file).init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::{debug, trace, warn};

    fn capture(verbosity: u8, quiet: bool, emit: impl FnOnce()) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frostrisk.log");
        let file = File::create(&path).unwrap();
        tracing::subscriber::with_default(build_subscriber(verbosity, quiet, Some(file)), emit);
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn console_level_follows_the_flags() {
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(7, false), LevelFilter::TRACE);
        assert_eq!(console_level(0, true), LevelFilter::OFF);
    }

    #[test]
    fn log_file_keeps_recording_under_quiet() {
        let content = capture(0, true, || {
            warn!(dam_id = "77", "Registry mismatch.");
        });
        assert!(content.contains("Registry mismatch."));
        assert!(content.contains("dam_id=\"77\""));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    fn log_file_honours_the_verbosity_level() {
        let content = capture(2, false, || {
            debug!("Falling back to latitude climatology.");
            trace!("Cell cache lookup.");
        });
        assert!(content.contains("DEBUG"));
        assert!(content.contains("Falling back to latitude climatology."));
        assert!(!content.contains("Cell cache lookup."));
    }

    #[test]
    #[serial]
    fn setup_installs_the_global_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assess.log");

        setup_logging(1, false, Some(path.clone())).unwrap();
        tracing::info!(scenario = "SSP2-4.5", "Configuration resolved.");

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Configuration resolved."));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_reported_before_installing() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
