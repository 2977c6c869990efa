use base::logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};
use log::Log;
use std::fs;

fn log_at(logger: &dyn Log, level: log::Level, line: u32) {
    logger.log(
        &log::RecordBuilder::new()
            .level(level)
            .target("test")
            .file(Some("test.rs"))
            .line(Some(line))
            .args(format_args!("test message"))
            .build(),
    );
}

#[test]
fn test_stdout_logger_implements_log_trait() {
    let logger = StdoutLogger;
    log_at(&logger, log::Level::Info, 42);
    logger.flush();
}

#[test]
fn test_file_logger_creates_directory() {
    let test_dir = std::env::temp_dir().join(format!("capture-log-test-{}-dir", std::process::id()));
    let _ = fs::remove_dir_all(&test_dir);

    let _logger = FileLogger::new(&test_dir).expect("Failed to create FileLogger");
    assert!(test_dir.is_dir());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn test_file_logger_writes_thread_name() {
    let test_dir =
        std::env::temp_dir().join(format!("capture-log-test-{}-write", std::process::id()));
    let _ = fs::remove_dir_all(&test_dir);

    let logger = FileLogger::new(&test_dir).expect("Failed to create FileLogger");
    log::set_max_level(log::LevelFilter::Trace);

    std::thread::Builder::new()
        .name("camera-owner".to_string())
        .spawn(move || {
            log_at(&logger, log::Level::Error, 100);
            logger.flush();
        })
        .unwrap()
        .join()
        .unwrap();

    let entries: Vec<_> = fs::read_dir(&test_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1, "Should have exactly one log file");

    let content = fs::read_to_string(entries[0].path()).unwrap();
    assert!(content.contains("[ERROR]"));
    assert!(content.contains("[camera-owner]"));
    assert!(content.contains("test.rs:100"));
    assert!(content.contains("test message"));

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn test_init_stdout_logger_sets_global_logger() {
    // only the first init per process takes effect
    init_stdout_logger();
    init_stdout_logger();
    log::info!("Test message from global logger");
}

#[test]
fn test_init_file_logger_invalid_dir_returns_error() {
    let result = init_file_logger("/proc/nonexistent/path");
    assert!(result.is_err());
}
