//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::document_request::DocumentResult;
use crate::error::InternalErrorCode;
use crate::response::*;
use serde_json::json;

#[test]
fn accepted_status_returns_json() {
    let resp = ResponseEnvelope::json(201, &json!({"id": "123456", "rev": "1-abc"}));
    let body = decode(&resp, ACCEPT_WRITE, None, None).unwrap();
    assert_eq!(body, ResponseBody::Json(json!({"id": "123456", "rev": "1-abc"})));

    let res = DocumentResult::from_response(Some(body), None);
    assert_eq!(res.id(), Some("123456"));
    assert_eq!(res.revision(), Some("1-abc"));
}

#[test]
fn error_body_builds_description() {
    let resp = ResponseEnvelope::json(404, &json!({"error": "not_found", "reason": "missing"}));
    let e = decode(&resp, ACCEPT_READ, Some("missing"), None).unwrap_err();
    assert_eq!(e.code, 404);
    assert_eq!(e.description, "Error: not_found, reason: missing");
    assert_eq!(e.document_id.as_deref(), Some("missing"));
    assert_eq!(e.revision, None);
}

#[test]
fn status_text_when_body_has_no_reason() {
    let resp = ResponseEnvelope::json(409, &json!({"error": "conflict"}));
    let e = decode(&resp, ACCEPT_WRITE, Some("d"), Some("1-a")).unwrap_err();
    assert_eq!(e.code, 409);
    assert_eq!(e.description, "Conflict");
    assert_eq!(e.revision.as_deref(), Some("1-a"));

    let e = decode(&ResponseEnvelope::new(503), ACCEPT_READ, None, None).unwrap_err();
    assert_eq!(e.description, "Service Unavailable");

    let e = decode(&ResponseEnvelope::new(599), ACCEPT_READ, None, None).unwrap_err();
    assert_eq!(e.description, "HTTP status 599");
}

#[test]
fn unexpected_status_is_never_success() {
    // a perfectly good write response, but a read only accepts 200
    let resp = ResponseEnvelope::json(201, &json!({"ok": true, "id": "a", "rev": "1-x"}));
    let e = decode(&resp, ACCEPT_READ, None, None).unwrap_err();
    assert_eq!(e.code, 201);

    let resp = ResponseEnvelope::json(200, &json!({"ok": true}));
    assert!(decode(&resp, ACCEPT_WRITE, None, None).is_err());
}

#[test]
fn error_context_comes_from_call_site() {
    let resp = ResponseEnvelope::json(
        409,
        &json!({"error": "conflict", "reason": "Document update conflict.", "id": "other"}),
    );
    let e = decode(&resp, ACCEPT_WRITE, Some("mine"), Some("2-b")).unwrap_err();
    assert_eq!(e.document_id.as_deref(), Some("mine"));
    assert_eq!(e.revision.as_deref(), Some("2-b"));
}

#[test]
fn non_json_body_is_raw() {
    let resp = ResponseEnvelope::new(200)
        .with_header("Content-Type", "image/png")
        .with_body(vec![1u8, 2, 3]);
    match decode(&resp, ACCEPT_READ, None, None).unwrap() {
        ResponseBody::Raw { content_type, data } => {
            assert_eq!(content_type.as_deref(), Some("image/png"));
            assert_eq!(&data[..], &[1, 2, 3]);
        }
        other => panic!("expected raw body, got {:?}", other),
    }
}

#[test]
fn empty_body() {
    let body = decode(&ResponseEnvelope::new(200), ACCEPT_READ, None, None).unwrap();
    assert_eq!(body, ResponseBody::Empty);
}

#[test]
fn invalid_json_on_success_is_bad_response() {
    let resp = ResponseEnvelope::new(200)
        .with_header("Content-Type", "application/json; charset=utf-8")
        .with_body("{not json");
    let e = decode(&resp, ACCEPT_READ, Some("d"), None).unwrap_err();
    assert_eq!(e.internal_code(), Some(InternalErrorCode::BadResponse));
    assert_eq!(e.document_id.as_deref(), Some("d"));
}

#[test]
fn invalid_json_on_failure_still_reports_status() {
    let resp = ResponseEnvelope::new(500)
        .with_header("Content-Type", "application/json")
        .with_body("<html>");
    let e = decode(&resp, ACCEPT_READ, None, None).unwrap_err();
    assert_eq!(e.code, 500);
    assert_eq!(e.description, "Internal Server Error");
}

#[test]
fn not_found_tolerance() {
    let resp = ResponseEnvelope::json(404, &json!({"error": "not_found", "reason": "deleted"}));
    assert_eq!(
        decode_tolerant(&resp, ACCEPT_DELETE, false, Some("d"), Some("1-a")).unwrap(),
        None
    );
    let e = decode_tolerant(&resp, ACCEPT_DELETE, true, Some("d"), Some("1-a")).unwrap_err();
    assert_eq!(e.code, 404);
    assert_eq!(e.description, "Error: not_found, reason: deleted");

    let ok = ResponseEnvelope::json(200, &json!({"ok": true, "id": "d", "rev": "2-b"}));
    let res = DocumentResult::from_response(
        decode_tolerant(&ok, ACCEPT_DELETE, false, Some("d"), Some("1-a")).unwrap(),
        Some("d"),
    );
    assert_eq!(res.revision(), Some("2-b"));

    let res = DocumentResult::from_response(None, Some("d"));
    assert_eq!(res.id(), Some("d"));
    assert_eq!(res.revision(), None);
}

#[test]
fn decode_is_idempotent() {
    let resp = ResponseEnvelope::json(200, &json!({"rows": [{"id": "a", "key": 1, "value": null}]}));
    assert_eq!(
        decode(&resp, ACCEPT_READ, None, None),
        decode(&resp, ACCEPT_READ, None, None)
    );
    let bad = ResponseEnvelope::json(412, &json!({"error": "file_exists", "reason": "exists"}));
    assert_eq!(
        decode(&bad, ACCEPT_WRITE, None, None),
        decode(&bad, ACCEPT_WRITE, None, None)
    );
}

#[test]
fn header_lookup_ignores_case() {
    let resp = ResponseEnvelope::new(200).with_header("ETag", "\"1-abc\"");
    assert_eq!(resp.header("etag"), Some("\"1-abc\""));
    assert_eq!(resp.header("ETAG"), Some("\"1-abc\""));
}
