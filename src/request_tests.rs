//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::connection::ConnectionDescriptor;
use crate::error::{CouchError, InternalErrorCode};
use crate::request::{doc_path, percent_escape, prepare, RequestBody, RequestDescriptor};
use crate::response::ResponseEnvelope;
use crate::transport::Transport;
use crate::*;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;

// Builds requests only; never asked to send.
#[derive(Debug)]
struct Unreachable;

#[async_trait]
impl Transport for Unreachable {
    async fn send(&self, _req: &RequestDescriptor) -> Result<ResponseEnvelope, CouchError> {
        Err(CouchError::internal(InternalErrorCode::InternalError))
    }
}

fn handle() -> Handle {
    Handle::with_transport(
        ConnectionDescriptor::with_credentials("db.local", 5984, false, "admin", "pw"),
        Arc::new(Unreachable),
    )
}

fn body_json(req: &RequestDescriptor) -> serde_json::Value {
    match &req.body {
        Some(RequestBody::Json(v)) => v.clone(),
        other => panic!("expected JSON body, got {:?}", other),
    }
}

#[test]
fn prepare_without_body() {
    let cd = ConnectionDescriptor::new("localhost", 5984, false);
    let req = prepare(&cd, Method::GET, "/db/doc", false, None);
    assert_eq!(req.header("Accept"), Some("application/json"));
    assert!(req.header("Content-Type").is_none());
    assert!(req.header("User-Agent").is_some());
    assert!(!req.has_body);
    assert!(req.credentials.is_none());
    assert_eq!(req.url(), "http://localhost:5984/db/doc");
}

#[test]
fn prepare_with_body_defaults_to_json() {
    let cd = ConnectionDescriptor::with_credentials("h", 6984, true, "u", "p");
    let req = prepare(&cd, Method::PUT, "/db", true, None);
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.url(), "https://h:6984/db");
    assert_eq!(req.credentials.as_ref().map(|c| c.username()), Some("u"));

    let req = prepare(&cd, Method::PUT, "/db/d/a.png", true, Some("image/png"));
    assert_eq!(req.header("Content-Type"), Some("image/png"));
    assert_eq!(req.header("Accept"), Some("application/json"));
}

#[test]
fn escaping_and_paths() {
    assert_eq!(percent_escape("abc-._*09"), "abc-._*09");
    assert_eq!(percent_escape("a b"), "a%20b");
    assert_eq!(percent_escape("a+b"), "a%2Bb");
    assert_eq!(percent_escape("x/y?z"), "x%2Fy%3Fz");
    assert_eq!(doc_path("db", "a/b"), "/db/a%2Fb");
    assert_eq!(doc_path("db", "_design/app"), "/db/_design/app");
    assert_eq!(doc_path("db", "_local/ck pt"), "/db/_local/ck%20pt");
}

#[test]
fn create_without_id_posts_to_database() {
    let h = handle();
    let req = PutDocumentRequest::create("inventory")
        .document(&json!({"value": "v1"}))
        .unwrap()
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/inventory");
    assert!(req.has_body);
    assert_eq!(body_json(&req), json!({"value": "v1"}));
}

#[test]
fn create_with_id_puts_document() {
    let h = handle();
    let req = PutDocumentRequest::create("inventory")
        .document(&json!({"_id": "apple", "n": 1}))
        .unwrap()
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.path, "/inventory/apple");
}

#[test]
fn update_adds_revision_to_body() {
    let h = handle();
    let req = PutDocumentRequest::update("inventory", "apple", "1-abc")
        .document(&json!({"n": 2}))
        .unwrap()
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(body_json(&req), json!({"n": 2, "_rev": "1-abc"}));
}

#[test]
fn non_object_document_is_invalid() {
    let e = PutDocumentRequest::create("inventory")
        .document(&json!([1, 2, 3]))
        .unwrap_err();
    assert_eq!(e.internal_code(), Some(InternalErrorCode::InvalidDocument));
    assert_eq!(e.http_status(), None);
}

#[test]
fn get_document_query_parameters() {
    let h = handle();
    let req = GetDocumentRequest::new("db", "doc 1")
        .rev("2-x")
        .conflicts(true)
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/db/doc%201?rev=2-x&conflicts=true");
    assert!(req.body.is_none());
}

#[test]
fn delete_document_sends_revision() {
    let h = handle();
    let req = DeleteDocumentRequest::new("db", "doc", "3-y").build(&h).unwrap();
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.path, "/db/doc?rev=3-y");
    assert!(req.header("Content-Type").is_none());
}

#[test]
fn empty_names_are_rejected() {
    let h = handle();
    let e = GetDocumentRequest::new("", "doc").build(&h).unwrap_err();
    assert_eq!(e.internal_code(), Some(InternalErrorCode::IllegalArgument));
    assert!(BulkDocsRequest::new("db").build(&h).is_err());
    assert!(CreateDatabaseRequest::new("Bad").build(&h).is_err());
    assert!(UuidsRequest::new().count(0).build(&h).is_err());
    assert!(GetConfigRequest { section: None, key: Some("k".into()) }.build(&h).is_err());
}

#[test]
fn bulk_body_keeps_document_order() {
    let h = handle();
    let req = BulkDocsRequest::new("db")
        .document(&json!({"_id": "a"}))
        .unwrap()
        .document(&json!({"x": 1}))
        .unwrap()
        .delete("c", "1-c")
        .all_or_nothing(true)
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/db/_bulk_docs");
    assert_eq!(
        body_json(&req),
        json!({
            "docs": [
                {"_id": "a"},
                {"x": 1},
                {"_id": "c", "_rev": "1-c", "_deleted": true}
            ],
            "all_or_nothing": true
        })
    );
}

#[test]
fn attachment_upload_uses_caller_content_type() {
    let h = handle();
    let req = PutAttachmentRequest::new("db", "doc", "logo.png")
        .rev("1-a")
        .data(vec![0x89u8, 0x50, 0x4e, 0x47], "image/png")
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.path, "/db/doc/logo.png?rev=1-a");
    assert_eq!(req.header("Content-Type"), Some("image/png"));
    assert_eq!(
        req.body,
        Some(RequestBody::Bytes(bytes::Bytes::from_static(&[0x89, 0x50, 0x4e, 0x47])))
    );
}

#[test]
fn view_path_and_method_follow_encoder() {
    let h = handle();
    let req = ViewRequest::new("db", "app", "by name")
        .limit(5)
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/db/_design/app/_view/by%20name?limit=5");
    assert!(!req.has_body);

    let req = ViewRequest::new("db", "_design/app", "v")
        .keys(vec![json!("a"), json!("b")])
        .build(&h)
        .unwrap();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/db/_design/app/_view/v");
    assert!(req.has_body);
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(body_json(&req), json!({"keys": ["a", "b"]}));
}

#[test]
fn all_docs_path() {
    let h = handle();
    let req = AllDocsRequest::new("db")
        .include_docs(true)
        .build(&h)
        .unwrap();
    assert_eq!(req.path, "/db/_all_docs?include_docs=true");
}

#[test]
fn design_document_body() {
    let h = handle();
    let req = PutDesignRequest::new("db", "app")
        .view("by_color", ViewDefinition::new("function(doc){emit(doc.color,1)}").reduce("_count"))
        .build(&h)
        .unwrap();
    assert_eq!(req.path, "/db/_design/app");
    assert_eq!(
        body_json(&req),
        json!({
            "_id": "_design/app",
            "language": "javascript",
            "views": {
                "by_color": {"map": "function(doc){emit(doc.color,1)}", "reduce": "_count"}
            }
        })
    );
}

#[test]
fn user_and_server_paths() {
    let h = handle();
    let req = PutUserRequest::new("jan", "secret").roles(&["reader"]).build(&h).unwrap();
    assert_eq!(req.path, "/_users/org.couchdb.user%3Ajan");
    assert_eq!(body_json(&req)["type"], json!("user"));
    assert_eq!(UuidsRequest::new().count(3).build(&h).unwrap().path, "/_uuids?count=3");
    assert_eq!(ListDatabasesRequest::new().build(&h).unwrap().path, "/_all_dbs");
    assert_eq!(
        GetConfigRequest::new().section("log").key("level").build(&h).unwrap().path,
        "/_config/log/level"
    );
    let req = SetConfigRequest::new("log", "level", "debug").build(&h).unwrap();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(body_json(&req), json!("debug"));
}
