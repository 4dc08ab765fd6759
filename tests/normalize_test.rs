//! Integration tests for the Arabic normalizer and correction tables.

use std::io::Write;

use arextract::normalize::normalize_text;
use arextract::{ArabicNormalizer, CorrectionTable, ErrorKind, NormalizeOptions};

#[test]
fn test_default_pipeline() {
    let input = "  حتليل\u{00A0}\u{00A0}النص\t\tيف\n\n\n\nرتكييب اجلوانب  ";
    assert_eq!(normalize_text(input).unwrap(), "تحليل النص في\n\nتركيب الجوانب");
}

#[test]
fn test_idempotent_on_every_default_artifact() {
    let normalizer = ArabicNormalizer::new(NormalizeOptions::default()).unwrap();
    for correction in CorrectionTable::default().iter() {
        let input = format!("قبل {} بعد", correction.find);
        let once = normalizer.normalize(&input);
        assert_eq!(normalizer.normalize(&once), once);
        assert!(once.contains(&correction.replace), "{:?}", once);
    }
}

#[test]
fn test_custom_table_from_file_extends_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"find": "اجلامعة", "replace": "الجامعة"}}, {{"find": "مل", "replace": "لم", "whole_word": true}}]"#
    )
    .unwrap();

    let mut table = CorrectionTable::default();
    table.extend(CorrectionTable::from_json_file(file.path()).unwrap());
    let normalizer =
        ArabicNormalizer::new(NormalizeOptions::new().with_corrections(table)).unwrap();

    assert_eq!(
        normalizer.normalize("مل يذهب يف اجلامعة"),
        "لم يذهب في الجامعة"
    );
    // Whole-word entries leave longer words alone.
    assert_eq!(normalizer.normalize("عمل"), "عمل");
}

#[test]
fn test_malformed_table_is_config_error() {
    let err = CorrectionTable::from_json_str("{not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let missing = CorrectionTable::from_json_file("/nonexistent/corrections.json").unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Io);
}
