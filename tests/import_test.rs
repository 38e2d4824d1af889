/// Integration tests for importing the original app's group documents
mod common;

use common::{DataDirBuilder, LegacyGroupBuilder, fixed_now};
use momento::parsers::{import_legacy_file, parse_legacy_file};
use momento::store::CapsuleStore;

#[test]
fn test_import_realistic_export() {
    let data_dir = DataDirBuilder::new().with_import_file(
        "export.jsonl",
        &[
            LegacyGroupBuilder::new("1717243200000")
                .name("Graduation")
                .member("ana@example.com")
                .member("ben@example.com")
                .unlock_date("2025-06-01T00:00:00.000Z")
                .unlocked()
                .photo("file:///cap.jpg")
                .video("file:///speech.mp4"),
            LegacyGroupBuilder::new("1717243200001")
                .name("Newborn")
                .unlock_date("2044-03-01T00:00:00.000Z")
                .photo("file:///first.jpg"),
        ],
    );

    let mut store = CapsuleStore::new();
    let summary =
        import_legacy_file(&mut store, &data_dir.file("export.jsonl"), fixed_now()).unwrap();

    assert_eq!(summary.imported.len(), 2);
    assert_eq!(summary.skipped, 0);

    let graduation = &store.unlocked_groups()[0];
    assert_eq!(graduation.name, "Graduation");
    assert_eq!(graduation.members, vec!["ana@example.com", "ben@example.com"]);
    assert_eq!(graduation.photo_count(), 1);
    assert_eq!(graduation.video_count(), 1);

    let newborn = &store.locked_groups()[0];
    assert_eq!(newborn.name, "Newborn");
    assert!(newborn.media.iter().all(|m| m.locked));
    store.verify_invariants().unwrap();
}

#[test]
fn test_import_comma_separated_members_and_millis_dates() {
    let content = r#"{"id":1717243200000,"name":"Camp","members":"ana, ben","unlockDate":1893456000000,"media":[],"photoCount":0,"isLocked":true}"#;
    let data_dir = DataDirBuilder::new().with_raw_file("export.jsonl", content);

    let groups = parse_legacy_file(&data_dir.file("export.jsonl")).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec!["ana", "ben"]);
    assert_eq!(groups[0].unlock_date.to_rfc3339(), "2030-01-01T00:00:00+00:00");
}

#[test]
fn test_import_rejects_mostly_corrupted_file() {
    let content = "garbage\n{\"broken\": true}\n{\"id\":\"1\",\"name\":\"ok\",\"unlockDate\":0}";
    let data_dir = DataDirBuilder::new().with_raw_file("export.jsonl", content);

    let mut store = CapsuleStore::new();
    let result = import_legacy_file(&mut store, &data_dir.file("export.jsonl"), fixed_now());
    assert!(result.is_err());
    assert!(store.is_empty(), "a rejected file must not add anything");
}

#[test]
fn test_import_empty_file() {
    let data_dir = DataDirBuilder::new().with_raw_file("export.jsonl", "\n\n");
    let mut store = CapsuleStore::new();
    let summary =
        import_legacy_file(&mut store, &data_dir.file("export.jsonl"), fixed_now()).unwrap();
    assert!(summary.imported.is_empty());
    assert_eq!(summary.skipped, 0);
}
