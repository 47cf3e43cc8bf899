use super::*;
use serde_json::json;
use tempfile::TempDir;

fn write_input(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("input.json");
    fs::write(&path, contents).expect("can write test input");
    path
}

#[test]
fn loads_one_record_per_valid_line() {
    let dir = TempDir::new().expect("can create temp dir");
    let path = write_input(
        &dir,
        "{\"reviewText\": \"great\"}\n\n{\"reviewText\": \"bad\", \"overall\": 1}\n",
    );

    let records = load_json_lines(&path).expect("load succeeds");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["reviewText"], json!("great"));
    assert_eq!(records[1]["overall"], json!(1));
}

#[test]
fn malformed_lines_are_skipped_not_fatal() {
    let dir = TempDir::new().expect("can create temp dir");
    let path = write_input(
        &dir,
        "{\"ok\": 1}\nnot json at all\n{\"ok\": 2}\n[1, 2, 3]\n\"bare string\"\n",
    );

    let records = load_json_lines(&path).expect("load succeeds");
    // Arrays and bare strings are not records either.
    assert_eq!(records.len(), 2);
}

#[test]
fn empty_file_yields_empty_dataset() {
    let dir = TempDir::new().expect("can create temp dir");
    let path = write_input(&dir, "");

    let records = load_json_lines(&path).expect("load succeeds");
    assert!(records.is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("can create temp dir");
    let result = load_json_lines(&dir.path().join("does-not-exist.json"));
    assert!(matches!(result, Err(crate::VisionflowError::Io(_))));
}

#[test]
fn save_creates_missing_directories() {
    let dir = TempDir::new().expect("can create temp dir");
    let path = dir.path().join("nested").join("deep").join("out.json");

    let mut record = Record::new();
    record.insert("id".to_string(), json!("0"));
    save_json_lines(&path, &[record]).expect("save succeeds");

    assert!(path.exists());
}

#[test]
fn save_preserves_non_ascii_literally() {
    let dir = TempDir::new().expect("can create temp dir");
    let path = dir.path().join("out.json");

    let mut record = Record::new();
    record.insert("reviewText".to_string(), json!("훌륭한 제품 — très bien"));
    save_json_lines(&path, &[record]).expect("save succeeds");

    let written = fs::read_to_string(&path).expect("can read output");
    assert!(written.contains("훌륭한 제품 — très bien"));
    assert!(!written.contains("\\u"));
}

#[test]
fn round_trip_retains_all_fields() {
    let dir = TempDir::new().expect("can create temp dir");
    let path = dir.path().join("out.json");

    let mut record = Record::new();
    record.insert("reviewText".to_string(), json!("nice"));
    record.insert("overall".to_string(), json!(5.0));
    record.insert("style".to_string(), json!({"Size:": " 7.5 oz"}));
    save_json_lines(&path, std::slice::from_ref(&record)).expect("save succeeds");

    let reloaded = load_json_lines(&path).expect("load succeeds");
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0], record);
}

#[test]
fn checkpoint_path_inserts_count_before_extension() {
    let path = checkpoint_path(Path::new("./data/out.json"), 10);
    assert_eq!(path, Path::new("./data/out_temp_10.json"));
}

#[test]
fn checkpoint_path_without_extension_appends_suffix() {
    let path = checkpoint_path(Path::new("output"), 20);
    assert_eq!(path, Path::new("output_temp_20"));
}
