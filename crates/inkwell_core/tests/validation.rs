use inkwell_core::{
    screen_files, validate_file, FileRef, Rejection, UploadLimits, DEFAULT_MAX_UPLOAD_BYTES,
};

fn sized(name: &str, mime: &str, size: u64) -> FileRef {
    FileRef::from_path(format!("/uploads/{name}"), mime, size)
}

#[test]
fn allow_listed_images_within_limit_pass() {
    let limits = UploadLimits::default();
    for mime in ["image/jpeg", "image/png", "image/gif", "image/webp"] {
        let file = sized("ok", mime, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(validate_file(&file, &limits), Ok(()), "{mime}");
    }
}

#[test]
fn oversized_file_names_the_size_constraint() {
    let limits = UploadLimits::default();
    let file = sized("huge.png", "image/png", DEFAULT_MAX_UPLOAD_BYTES + 1);

    let err = validate_file(&file, &limits).unwrap_err();
    assert_eq!(
        err,
        Rejection::TooLarge {
            size: DEFAULT_MAX_UPLOAD_BYTES + 1,
            max: DEFAULT_MAX_UPLOAD_BYTES
        }
    );
    assert!(err.to_string().contains("too large"));
    assert!(err.to_string().contains("10485761 bytes, limit 10485760 bytes"));
}

#[test]
fn clearly_oversized_file_reports_readable_sizes() {
    let file = sized("poster.png", "image/png", 12 * 1024 * 1024);

    let err = validate_file(&file, &UploadLimits::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "file is too large (12.0 MB, limit 10.0 MB)"
    );
}

#[test]
fn unsupported_mime_names_the_type_constraint() {
    let limits = UploadLimits::default();
    let err = validate_file(&sized("doc.pdf", "application/pdf", 10), &limits).unwrap_err();
    assert_eq!(
        err,
        Rejection::UnsupportedType {
            mime: "application/pdf".to_string()
        }
    );
    assert!(err.to_string().contains("unsupported file type application/pdf"));

    let err = validate_file(&sized("blob", "", 10), &limits).unwrap_err();
    assert!(err.to_string().contains("unknown"));
}

#[test]
fn custom_limits_are_honoured() {
    let limits = UploadLimits {
        max_bytes: 100,
        allowed_mime_types: vec!["image/avif".to_string()],
    };
    assert!(validate_file(&sized("a.avif", "image/avif", 100), &limits).is_ok());
    assert!(validate_file(&sized("a.png", "image/png", 10), &limits).is_err());
    assert!(validate_file(&sized("b.avif", "image/avif", 101), &limits).is_err());
}

#[test]
fn screening_keeps_input_order_and_combines_reasons() {
    let limits = UploadLimits::default();
    let screening = screen_files(
        vec![
            sized("a.jpg", "image/jpeg", 10),
            sized("b.bmp", "image/bmp", 10),
            sized("c.png", "image/png", 10),
            sized("d.png", "image/png", DEFAULT_MAX_UPLOAD_BYTES * 2),
        ],
        &limits,
    );

    let accepted: Vec<_> = screening.accepted.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(accepted, vec!["a.jpg", "c.png"]);

    let message = screening.combined_message().expect("message");
    assert!(message.starts_with("2 file(s) skipped: "));
    assert!(message.contains("b.bmp: unsupported file type image/bmp"));
    assert!(message.contains("d.png: file is too large"));
}

#[test]
fn clean_screening_has_no_message() {
    let screening = screen_files(vec![sized("a.jpg", "image/jpeg", 1)], &UploadLimits::default());
    assert!(screening.combined_message().is_none());
}
