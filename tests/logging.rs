use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file_and_ignores_second_init() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("widget_sketch.log");
    let other = dir.path().join("other.log");

    widget_sketch::logging::init(true, Some(path.clone()));
    tracing::info!("template library ready");

    widget_sketch::logging::init(false, Some(other.clone()));
    tracing::info!("after second init");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("template library ready"));
    assert!(contents.contains("after second init"));
    assert!(!other.exists(), "second init should not open another log file");
}
