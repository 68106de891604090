use std::fs;

use extractor_client::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn repeated_download_replaces_previous_copy() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("result.xlsx", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "result.xlsx");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("result.xlsx", "<p>second</p>").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "<p>second</p>");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("preview.html", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("preview.html").exists());
}
