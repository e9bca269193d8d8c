//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError, InternalErrorCode};
use crate::handle::Handle;
use crate::request::{doc_path, path_of, percent_escape, rev_query, RequestDescriptor};
use crate::response::{decode, decode_tolerant, from_body, ResponseBody};
use crate::response::{ACCEPT_DELETE, ACCEPT_READ, ACCEPT_WRITE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::result::Result;

/// Struct representing the result of a document write (create, update or
/// delete).
///
/// `revision` is `Some` exactly when the server accepted the write. A delete
/// of a missing document, when tolerated, yields a result with no revision.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DocumentResult {
    pub(crate) id: Option<String>,
    pub(crate) revision: Option<String>,
    pub(crate) raw: Option<Value>,
}

impl DocumentResult {
    /// Get the id of the document written.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    /// Get the new revision of the document.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
    /// Get the full JSON response body.
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    // Build from a decoded write response. `None` means a tolerated 404.
    pub(crate) fn from_response(body: Option<ResponseBody>, expected_id: Option<&str>) -> Self {
        match body {
            Some(b) => DocumentResult {
                id: b.str_field("id").or_else(|| expected_id.map(str::to_string)),
                revision: b.str_field("rev"),
                raw: b.as_json().cloned(),
            },
            None => DocumentResult {
                id: expected_id.map(str::to_string),
                ..Default::default()
            },
        }
    }
}

/// Serialize `doc` into a JSON object.
///
/// Anything that fails to serialize, or serializes to something other than
/// an object, is an `InvalidDocument` error.
pub(crate) fn document_object<T: Serialize + ?Sized>(
    doc: &T,
) -> Result<Map<String, Value>, CouchError> {
    match serde_json::to_value(doc) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(other) => Err(CouchError::internal_with_detail(
            InternalErrorCode::InvalidDocument,
            &format!("document must be a JSON object, got {}", json_type_name(&other)),
        )),
        Err(e) => Err(CouchError::internal_with_detail(
            InternalErrorCode::InvalidDocument,
            &e.to_string(),
        )),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Struct used for creating or updating a single document.
///
/// Without an id the document is created with `POST /{db}` and the server
/// assigns the id. With an id it is written with `PUT /{db}/{id}`; adding a
/// revision makes it an update of that revision.
#[derive(Default, Debug)]
pub struct PutDocumentRequest {
    pub(crate) db: String,
    pub(crate) id: Option<String>,
    pub(crate) rev: Option<String>,
    pub(crate) document: Map<String, Value>,
    pub(crate) batch: bool,
}

impl PutDocumentRequest {
    /// Create a new document in `db`.
    pub fn create(db: &str) -> PutDocumentRequest {
        PutDocumentRequest {
            db: db.to_string(),
            ..Default::default()
        }
    }

    /// Update revision `rev` of document `id` in `db`.
    pub fn update(db: &str, id: &str, rev: &str) -> PutDocumentRequest {
        PutDocumentRequest {
            db: db.to_string(),
            id: Some(id.to_string()),
            rev: Some(rev.to_string()),
            ..Default::default()
        }
    }

    /// Set the document id. If not set, the document's own `_id` is used, if any.
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Set the revision being updated. If not set, the document's own `_rev` is used, if any.
    pub fn rev(mut self, rev: &str) -> Self {
        self.rev = Some(rev.to_string());
        self
    }

    /// Set the document content from any value that serializes to a JSON object.
    pub fn document<T: Serialize + ?Sized>(mut self, doc: &T) -> Result<Self, CouchError> {
        self.document = document_object(doc)
            .map_err(|e| e.with_context(self.id.as_deref(), self.rev.as_deref()))?;
        Ok(self)
    }

    /// Ask the server to accept the write into memory and flush it later
    /// (`batch=ok`). The server answers 202 and the revision may be absent.
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    fn doc_id(&self) -> Option<String> {
        self.id.clone().or_else(|| {
            self.document
                .get("_id")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    fn doc_rev(&self) -> Option<String> {
        self.rev.clone().or_else(|| {
            self.document
                .get("_rev")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() {
            return ia_err!("database name must be non-empty");
        }
        let mut body = self.document.clone();
        if let Some(rev) = self.doc_rev() {
            body.insert("_rev".to_string(), Value::String(rev));
        }
        let (method, mut path) = match self.doc_id() {
            Some(id) => (Method::PUT, doc_path(&self.db, &id)),
            None => (Method::POST, path_of(&[&self.db])),
        };
        if self.batch {
            path.push_str("?batch=ok");
        }
        Ok(h.prepare(method, &path, true, None)
            .json_body(Value::Object(body)))
    }

    /// Execute the request, returning a [`DocumentResult`] with the new revision.
    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let id = self.doc_id();
        let rev = self.doc_rev();
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(id.as_deref(), rev.as_deref()))?;
        let body = decode(&resp, ACCEPT_WRITE, id.as_deref(), rev.as_deref())?;
        Ok(DocumentResult::from_response(Some(body), id.as_deref()))
    }
}

/// Struct used for retrieving a single document.
#[derive(Default, Debug)]
pub struct GetDocumentRequest {
    pub(crate) db: String,
    pub(crate) id: String,
    pub(crate) rev: Option<String>,
    pub(crate) conflicts: bool,
    pub(crate) attachments: bool,
}

impl GetDocumentRequest {
    pub fn new(db: &str, id: &str) -> GetDocumentRequest {
        GetDocumentRequest {
            db: db.to_string(),
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Retrieve a specific revision instead of the current one.
    pub fn rev(mut self, rev: &str) -> Self {
        self.rev = Some(rev.to_string());
        self
    }

    /// Include `_conflicts` in the returned document.
    pub fn conflicts(mut self, conflicts: bool) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Include attachment bodies (base64) in the returned document.
    pub fn attachments(mut self, attachments: bool) -> Self {
        self.attachments = attachments;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() || self.id.is_empty() {
            return ia_err!("database name and document id must be non-empty");
        }
        let mut params: Vec<String> = Vec::new();
        if let Some(r) = &self.rev {
            params.push(format!("rev={}", percent_escape(r)));
        }
        if self.conflicts {
            params.push("conflicts=true".to_string());
        }
        if self.attachments {
            params.push("attachments=true".to_string());
        }
        let mut path = doc_path(&self.db, &self.id);
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.join("&"));
        }
        Ok(h.prepare(Method::GET, &path, false, None))
    }

    /// Execute the request, returning the document as JSON.
    pub async fn execute(&self, h: &Handle) -> Result<Value, CouchError> {
        let req = self.build(h)?;
        let ctx_rev = self.rev.as_deref();
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.id), ctx_rev))?;
        let body = decode(&resp, ACCEPT_READ, Some(&self.id), ctx_rev)?;
        from_body(body, Some(&self.id))
    }

    /// Execute the request, deserializing the document into `T`.
    pub async fn execute_into<T: DeserializeOwned>(&self, h: &Handle) -> Result<T, CouchError> {
        let v = self.execute(h).await?;
        from_body(ResponseBody::Json(v), Some(&self.id))
    }
}

/// Struct used for deleting a single document.
///
/// A missing document is not an error unless
/// [`fail_on_not_found(true)`](DeleteDocumentRequest::fail_on_not_found()) is set.
#[derive(Default, Debug)]
pub struct DeleteDocumentRequest {
    pub(crate) db: String,
    pub(crate) id: String,
    pub(crate) rev: String,
    pub(crate) fail_on_not_found: bool,
}

impl DeleteDocumentRequest {
    pub fn new(db: &str, id: &str, rev: &str) -> DeleteDocumentRequest {
        DeleteDocumentRequest {
            db: db.to_string(),
            id: id.to_string(),
            rev: rev.to_string(),
            ..Default::default()
        }
    }

    /// Return an error with code 404 if the document does not exist.
    pub fn fail_on_not_found(mut self, val: bool) -> Self {
        self.fail_on_not_found = val;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() || self.id.is_empty() {
            return ia_err!("database name and document id must be non-empty");
        }
        let path = format!("{}{}", doc_path(&self.db, &self.id), rev_query(Some(self.rev.as_str())));
        Ok(h.prepare(Method::DELETE, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.id), Some(&self.rev)))?;
        let body = decode_tolerant(
            &resp,
            ACCEPT_DELETE,
            self.fail_on_not_found,
            Some(&self.id),
            Some(&self.rev),
        )?;
        Ok(DocumentResult::from_response(body, Some(&self.id)))
    }
}
