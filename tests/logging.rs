use std::{fs, thread::sleep, time::Duration};

use tempfile::tempdir;

// The subscriber is process-wide, so the whole lifecycle lives in one test.
#[test]
fn file_logging_lifecycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("nested").join("padboard.log");
    std::env::set_var("RUST_LOG", "trace");

    padboard::logging::init(false, Some(path.clone()));
    tracing::debug!("below the info level");
    tracing::info!("first session line");

    let other = dir.path().join("second").join("padboard.log");
    padboard::logging::init(true, Some(other.clone()));
    tracing::debug!("debug after second init");
    tracing::info!("still the first subscriber");

    sleep(Duration::from_millis(200));

    assert!(path.exists(), "missing log directories were not created");
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("first session line"));
    assert!(contents.contains("still the first subscriber"));
    assert!(!contents.contains("below the info level"));
    assert!(!contents.contains("debug after second init"));

    let second = fs::read_to_string(&other).unwrap_or_default();
    assert!(!second.contains("still the first subscriber"));
}
