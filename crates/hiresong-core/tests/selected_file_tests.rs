//! Tests loading selections from disk and fingerprint stability.

use std::io::Write;

use hiresong_core::{FileCategory, Genre, SelectedFile};

#[test]
fn selected_file_tests_loads_pdf_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("Resume.PDF");
    let mut file = std::fs::File::create(&path).expect("create");
    file.write_all(b"%PDF-1.7 fake").expect("write");

    let selected = SelectedFile::from_path(&path).expect("pdf should load");
    assert_eq!(selected.name(), "Resume.PDF");
    assert_eq!(selected.mime_type(), "application/pdf");
    assert_eq!(selected.category(), FileCategory::Pdf);
    assert_eq!(selected.size_bytes(), 13);
}

#[test]
fn selected_file_tests_fingerprint_tracks_name_and_content() {
    let a = SelectedFile::new("a.png", "image/png", vec![1, 2, 3]).expect("a");
    let same = SelectedFile::new("a.png", "image/png", vec![1, 2, 3]).expect("same");
    let renamed = SelectedFile::new("b.png", "image/png", vec![1, 2, 3]).expect("renamed");

    assert_eq!(a.fingerprint(), same.fingerprint());
    assert_ne!(a.fingerprint(), renamed.fingerprint());
    assert_eq!(a.fingerprint().len(), 64);
}

#[test]
fn selected_file_tests_genre_serializes_as_wire_value() {
    let encoded = serde_json::to_string(&Genre::RnB).expect("encode");
    assert_eq!(encoded, "\"R&B\"");
    let decoded: Genre = serde_json::from_str("\"Surprise Me\"").expect("decode");
    assert_eq!(decoded, Genre::SurpriseMe);
}
