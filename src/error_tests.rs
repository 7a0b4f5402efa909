use super::*;

#[test]
fn display_formatting() {
    assert_eq!(
        JsopError::missing_record("(k/a/v)").to_string(),
        "missing record at (k/a/v)"
    );
    assert_eq!(JsopError::missing_key("name").to_string(), "missing key 'name'");
    assert_eq!(
        JsopError::out_of_range(-4, 3).to_string(),
        "index -4 out of range for length 3"
    );
    assert_eq!(
        JsopError::not_writable("store is open read-only").to_string(),
        "not writable: store is open read-only"
    );
    assert_eq!(
        JsopError::unsupported("format name mismatch").to_string(),
        "unsupported format: format name mismatch"
    );
}

#[test]
fn json_error_maps_to_corrupt() {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    match JsopError::from(err) {
        JsopError::Corrupt { message } => assert!(message.contains("not valid JSON")),
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn io_error_maps_to_io() {
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    match JsopError::from(err) {
        JsopError::Io { message } => assert!(message.contains("gone")),
        other => panic!("expected Io, got {:?}", other),
    }
}

#[test]
fn serializes_with_type_tag() {
    let err = JsopError::missing_key("x");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["type"], "missing_key");
    assert_eq!(json["key"], "x");
}
