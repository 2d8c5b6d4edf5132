//! Integration tests for parsing object storage listings.
//!
//! Container and object listings are requested with `format=json` and come
//! back as bare arrays.

use conoha_object_storage::models::{Container, ObjectEntry};
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_container_list() {
    let json_data = load_fixture("containers.json");
    let containers: Vec<Container> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize containers: {}\nJSON: {}", e, json_data));

    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].name, "backups");
    assert_eq!(containers[0].count, 12);
    assert_eq!(containers[0].bytes, 734_003_200);
    assert_eq!(containers[1].count, 0);
}

#[test]
fn test_delimited_object_list() {
    let objects: Vec<ObjectEntry> =
        serde_json::from_str(&load_fixture("objects_delimited.json")).unwrap();

    assert_eq!(objects.len(), 3);

    let dirs: Vec<_> = objects.iter().filter(|o| o.is_subdir()).collect();
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].subdir.as_deref(), Some("logs/2024/"));
    assert!(dirs[0].name.is_none());

    let latest = &objects[1];
    assert_eq!(latest.name.as_deref(), Some("logs/latest.log"));
    assert_eq!(latest.bytes, Some(20_480));
    assert_eq!(latest.content_type.as_deref(), Some("text/plain"));
}

#[test]
fn test_object_sizes_sum() {
    let objects: Vec<ObjectEntry> =
        serde_json::from_str(&load_fixture("objects_delimited.json")).unwrap();

    let total: u64 = objects.iter().filter_map(|o| o.bytes).sum();
    assert_eq!(total, 20_480 + 1_048_576);
}
