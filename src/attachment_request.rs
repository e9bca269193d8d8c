//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::document_request::DocumentResult;
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::{doc_path, percent_escape, rev_query, RequestDescriptor};
use crate::response::{decode, decode_tolerant, reject};
use crate::response::{ACCEPT_DELETE, ACCEPT_READ, ACCEPT_WRITE};
use bytes::Bytes;
use reqwest::Method;
use std::result::Result;

fn attachment_path(db: &str, doc_id: &str, name: &str) -> Result<String, CouchError> {
    if db.is_empty() || doc_id.is_empty() || name.is_empty() {
        return ia_err!("database name, document id and attachment name must be non-empty");
    }
    Ok(format!("{}/{}", doc_path(db, doc_id), percent_escape(name)))
}

/// Struct used for adding or replacing an attachment on a document.
///
/// The attachment body is sent as-is with the given content type. If the
/// document does not exist yet it is created and `rev` must be omitted.
#[derive(Default, Debug)]
pub struct PutAttachmentRequest {
    pub(crate) db: String,
    pub(crate) doc_id: String,
    pub(crate) name: String,
    pub(crate) rev: Option<String>,
    pub(crate) content_type: String,
    pub(crate) data: Bytes,
}

impl PutAttachmentRequest {
    pub fn new(db: &str, doc_id: &str, name: &str) -> PutAttachmentRequest {
        PutAttachmentRequest {
            db: db.to_string(),
            doc_id: doc_id.to_string(),
            name: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            ..Default::default()
        }
    }

    /// Current revision of the document the attachment is added to.
    pub fn rev(mut self, rev: &str) -> Self {
        self.rev = Some(rev.to_string());
        self
    }

    /// Set the attachment body and its MIME type.
    pub fn data(mut self, data: impl Into<Bytes>, content_type: &str) -> Self {
        self.data = data.into();
        self.content_type = content_type.to_string();
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = format!(
            "{}{}",
            attachment_path(&self.db, &self.doc_id, &self.name)?,
            rev_query(self.rev.as_deref())
        );
        Ok(h.prepare(Method::PUT, &path, true, Some(&self.content_type))
            .bytes_body(self.data.clone()))
    }

    /// Execute the request, returning the document's new revision.
    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let req = self.build(h)?;
        let ctx_rev = self.rev.as_deref();
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.doc_id), ctx_rev))?;
        let body = decode(&resp, ACCEPT_WRITE, Some(&self.doc_id), ctx_rev)?;
        Ok(DocumentResult::from_response(Some(body), Some(&self.doc_id)))
    }
}

/// An attachment body and its content type.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Attachment {
    pub(crate) content_type: Option<String>,
    pub(crate) data: Bytes,
}

impl Attachment {
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
    pub fn data(&self) -> &Bytes {
        &self.data
    }
    /// Take the attachment body.
    pub fn take_data(&mut self) -> Bytes {
        std::mem::take(&mut self.data)
    }
}

/// Struct used for fetching an attachment.
#[derive(Default, Debug)]
pub struct GetAttachmentRequest {
    pub(crate) db: String,
    pub(crate) doc_id: String,
    pub(crate) name: String,
    pub(crate) rev: Option<String>,
}

impl GetAttachmentRequest {
    pub fn new(db: &str, doc_id: &str, name: &str) -> GetAttachmentRequest {
        GetAttachmentRequest {
            db: db.to_string(),
            doc_id: doc_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Fetch the attachment as of a specific document revision.
    pub fn rev(mut self, rev: &str) -> Self {
        self.rev = Some(rev.to_string());
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = format!(
            "{}{}",
            attachment_path(&self.db, &self.doc_id, &self.name)?,
            rev_query(self.rev.as_deref())
        );
        Ok(h.prepare(Method::GET, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<Attachment, CouchError> {
        let req = self.build(h)?;
        let ctx_rev = self.rev.as_deref();
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.doc_id), ctx_rev))?;
        if !ACCEPT_READ.contains(&resp.status) {
            return Err(reject(&resp, Some(&self.doc_id), ctx_rev));
        }
        // the body is returned untouched, even when it happens to be JSON
        Ok(Attachment {
            content_type: resp.content_type().map(str::to_string),
            data: resp.body.clone().unwrap_or_default(),
        })
    }
}

/// Struct used for removing an attachment from a document.
///
/// A missing document or attachment is not an error unless
/// [`fail_on_not_found(true)`](DeleteAttachmentRequest::fail_on_not_found()) is set.
#[derive(Default, Debug)]
pub struct DeleteAttachmentRequest {
    pub(crate) db: String,
    pub(crate) doc_id: String,
    pub(crate) name: String,
    pub(crate) rev: String,
    pub(crate) fail_on_not_found: bool,
}

impl DeleteAttachmentRequest {
    pub fn new(db: &str, doc_id: &str, name: &str, rev: &str) -> DeleteAttachmentRequest {
        DeleteAttachmentRequest {
            db: db.to_string(),
            doc_id: doc_id.to_string(),
            name: name.to_string(),
            rev: rev.to_string(),
            ..Default::default()
        }
    }

    pub fn fail_on_not_found(mut self, val: bool) -> Self {
        self.fail_on_not_found = val;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = format!(
            "{}{}",
            attachment_path(&self.db, &self.doc_id, &self.name)?,
            rev_query(Some(self.rev.as_str()))
        );
        Ok(h.prepare(Method::DELETE, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.doc_id), Some(&self.rev)))?;
        let body = decode_tolerant(
            &resp,
            ACCEPT_DELETE,
            self.fail_on_not_found,
            Some(&self.doc_id),
            Some(&self.rev),
        )?;
        Ok(DocumentResult::from_response(body, Some(&self.doc_id)))
    }
}
