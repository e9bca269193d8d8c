//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::document_request::document_object;
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::{path_of, RequestDescriptor};
use crate::response::{decode, from_body, ACCEPT_WRITE};
use reqwest::Method;
use serde::Serialize;
use serde_derive::Deserialize;
use serde_json::{json, Map, Value};
use std::result::Result;
use tracing::warn;

/// Struct used for writing many documents in one `_bulk_docs` call.
///
/// Documents may be a mix of creates, updates and deletes. Each is accepted or
/// rejected on its own; a rejected document does not fail the request. Check
/// each [`BulkItemResult`] in the returned [`BulkResult`].
///
/// Example:
/// ```no_run
/// use couchdb_rust_sdk::BulkDocsRequest;
/// use serde_json::json;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let handle = couchdb_rust_sdk::Handle::builder().endpoint("http://localhost:5984")?.build()?;
/// let res = BulkDocsRequest::new("inventory")
///     .document(&json!({"_id": "apple", "count": 4}))?
///     .document(&json!({"_id": "pear", "count": 9}))?
///     .delete("plum", "3-5d2c")
///     .execute(&handle)
///     .await?;
/// for item in res.results() {
///     if !item.is_success() {
///         println!("failed: {} {:?}", item.id(), item.reason());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct BulkDocsRequest {
    pub(crate) db: String,
    pub(crate) docs: Vec<Map<String, Value>>,
    pub(crate) all_or_nothing: bool,
    pub(crate) new_edits: Option<bool>,
}

/// Outcome of one document in a [`BulkDocsRequest`].
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct BulkItemResult {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) rev: Option<String>,
    #[serde(default)]
    pub(crate) ok: Option<bool>,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

impl BulkItemResult {
    pub fn id(&self) -> &str {
        &self.id
    }
    /// The new revision, if the document was written.
    pub fn rev(&self) -> Option<&str> {
        self.rev.as_deref()
    }
    /// Error name, such as `conflict` or `forbidden`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (self.ok == Some(true) || self.rev.is_some())
    }
}

/// Struct representing the result of a [`BulkDocsRequest`] operation.
///
/// Results are in the same order as the documents in the request.
#[derive(Default, Debug)]
pub struct BulkResult {
    pub(crate) results: Vec<BulkItemResult>,
}

impl BulkResult {
    /// Get a reference to the per-document results.
    pub fn results(&self) -> &Vec<BulkItemResult> {
        &self.results
    }
    /// Take the per-document results, leaving an empty vector.
    pub fn take_results(&mut self) -> Vec<BulkItemResult> {
        std::mem::take(&mut self.results)
    }
    /// Number of documents that were not written.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

impl BulkDocsRequest {
    pub fn new(db: &str) -> BulkDocsRequest {
        BulkDocsRequest {
            db: db.to_string(),
            ..Default::default()
        }
    }

    /// Add a document to create or update. Updates must carry `_id` and `_rev`.
    pub fn document<T: Serialize + ?Sized>(mut self, doc: &T) -> Result<Self, CouchError> {
        let id = self.docs.len();
        self.docs.push(document_object(doc).map_err(|e| {
            e.with_context(Some(&format!("<bulk item {}>", id)), None)
        })?);
        Ok(self)
    }

    /// Add several documents.
    pub fn documents<T: Serialize>(mut self, docs: &[T]) -> Result<Self, CouchError> {
        for d in docs {
            self = self.document(d)?;
        }
        Ok(self)
    }

    /// Add a deletion of revision `rev` of document `id`.
    pub fn delete(mut self, id: &str, rev: &str) -> Self {
        let mut m = Map::new();
        m.insert("_id".to_string(), Value::String(id.to_string()));
        m.insert("_rev".to_string(), Value::String(rev.to_string()));
        m.insert("_deleted".to_string(), Value::Bool(true));
        self.docs.push(m);
        self
    }

    /// Commit all documents or none of them.
    pub fn all_or_nothing(mut self, val: bool) -> Self {
        self.all_or_nothing = val;
        self
    }

    /// Set `new_edits=false` to store revisions as given, for replication-style writes.
    pub fn new_edits(mut self, val: bool) -> Self {
        self.new_edits = Some(val);
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() {
            return ia_err!("database name must be non-empty");
        }
        if self.docs.is_empty() {
            return ia_err!("bulk request must contain at least one document");
        }
        let mut body = json!({ "docs": self.docs });
        if self.all_or_nothing {
            body["all_or_nothing"] = Value::Bool(true);
        }
        if let Some(ne) = self.new_edits {
            body["new_edits"] = Value::Bool(ne);
        }
        let path = format!("{}/_bulk_docs", path_of(&[&self.db]));
        Ok(h.prepare(Method::POST, &path, true, None).json_body(body))
    }

    pub async fn execute(&self, h: &Handle) -> Result<BulkResult, CouchError> {
        let req = self.build(h)?;
        let resp = h.send(&req).await?;
        let body = decode(&resp, ACCEPT_WRITE, None, None)?;
        let results: Vec<BulkItemResult> = from_body(body, None)?;
        if results.len() != self.docs.len() {
            warn!(
                "bulk write to {} sent {} documents but got {} results",
                self.db,
                self.docs.len(),
                results.len()
            );
        }
        Ok(BulkResult { results })
    }
}
