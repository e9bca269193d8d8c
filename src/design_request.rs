//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::document_request::{document_object, DocumentResult};
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::{percent_escape, rev_query, RequestDescriptor};
use crate::response::{decode, decode_tolerant, from_body};
use crate::response::{ACCEPT_DELETE, ACCEPT_READ, ACCEPT_WRITE};
use reqwest::Method;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::result::Result;

const DESIGN_PREFIX: &str = "_design/";

fn default_language() -> String {
    "javascript".to_string()
}

/// A map function and optional reduce function.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

impl ViewDefinition {
    pub fn new(map: &str) -> ViewDefinition {
        ViewDefinition {
            map: map.to_string(),
            reduce: None,
        }
    }

    /// Set the reduce function, for example `_count` or `_sum`.
    pub fn reduce(mut self, reduce: &str) -> Self {
        self.reduce = Some(reduce.to_string());
        self
    }
}

/// A design document: a named set of views stored at `/{db}/_design/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub views: BTreeMap<String, ViewDefinition>,
    /// Other design document members (`validate_doc_update`, `filters`, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl DesignDocument {
    /// The design document name, without the `_design/` prefix.
    pub fn name(&self) -> &str {
        self.id.strip_prefix(DESIGN_PREFIX).unwrap_or(&self.id)
    }
}

fn design_path(db: &str, name: &str) -> Result<String, CouchError> {
    if db.is_empty() || name.is_empty() {
        return ia_err!("database name and design document name must be non-empty");
    }
    let name = name.strip_prefix(DESIGN_PREFIX).unwrap_or(name);
    Ok(format!(
        "/{}/{}{}",
        percent_escape(db),
        DESIGN_PREFIX,
        percent_escape(name)
    ))
}

/// Struct used for creating or replacing a design document.
#[derive(Default, Debug)]
pub struct PutDesignRequest {
    pub(crate) db: String,
    pub(crate) name: String,
    pub(crate) rev: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) views: BTreeMap<String, ViewDefinition>,
    pub(crate) other: Map<String, Value>,
}

impl PutDesignRequest {
    /// `name` may be given with or without the `_design/` prefix.
    pub fn new(db: &str, name: &str) -> PutDesignRequest {
        PutDesignRequest {
            db: db.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Start from an existing design document, keeping its revision.
    pub fn from_document(db: &str, doc: &DesignDocument) -> PutDesignRequest {
        PutDesignRequest {
            db: db.to_string(),
            name: doc.name().to_string(),
            rev: doc.rev.clone(),
            language: Some(doc.language.clone()),
            views: doc.views.clone(),
            other: doc.other.clone(),
        }
    }

    /// Revision being replaced.
    pub fn rev(mut self, rev: &str) -> Self {
        self.rev = Some(rev.to_string());
        self
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Add or replace a view.
    pub fn view(mut self, name: &str, view: ViewDefinition) -> Self {
        self.views.insert(name.to_string(), view);
        self
    }

    /// Set any other top-level member of the design document.
    pub fn member<T: serde::Serialize + ?Sized>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, CouchError> {
        let wrapped = document_object(&BTreeMap::from([(key, value)]))?;
        self.other.extend(wrapped);
        Ok(self)
    }

    fn document(&self) -> DesignDocument {
        let name = self.name.strip_prefix(DESIGN_PREFIX).unwrap_or(&self.name);
        DesignDocument {
            id: format!("{}{}", DESIGN_PREFIX, name),
            rev: self.rev.clone(),
            language: self.language.clone().unwrap_or_else(default_language),
            views: self.views.clone(),
            other: self.other.clone(),
        }
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = design_path(&self.db, &self.name)?;
        let body = Value::Object(document_object(&self.document())?);
        Ok(h.prepare(Method::PUT, &path, true, None).json_body(body))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let id = self.document().id;
        let ctx_rev = self.rev.as_deref();
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&id), ctx_rev))?;
        let body = decode(&resp, ACCEPT_WRITE, Some(&id), ctx_rev)?;
        Ok(DocumentResult::from_response(Some(body), Some(&id)))
    }
}

/// Struct used for fetching a design document.
#[derive(Default, Debug)]
pub struct GetDesignRequest {
    pub(crate) db: String,
    pub(crate) name: String,
}

impl GetDesignRequest {
    pub fn new(db: &str, name: &str) -> GetDesignRequest {
        GetDesignRequest {
            db: db.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        Ok(h.prepare(Method::GET, &design_path(&self.db, &self.name)?, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DesignDocument, CouchError> {
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.name), None))?;
        let body = decode(&resp, ACCEPT_READ, Some(&self.name), None)?;
        from_body(body, Some(&self.name))
    }
}

/// Struct used for deleting a design document.
#[derive(Default, Debug)]
pub struct DeleteDesignRequest {
    pub(crate) db: String,
    pub(crate) name: String,
    pub(crate) rev: String,
    pub(crate) fail_on_not_found: bool,
}

impl DeleteDesignRequest {
    pub fn new(db: &str, name: &str, rev: &str) -> DeleteDesignRequest {
        DeleteDesignRequest {
            db: db.to_string(),
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
            design_path(&self.db, &self.name)?,
            rev_query(Some(self.rev.as_str()))
        );
        Ok(h.prepare(Method::DELETE, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&self.name), Some(&self.rev)))?;
        let body = decode_tolerant(
            &resp,
            ACCEPT_DELETE,
            self.fail_on_not_found,
            Some(&self.name),
            Some(&self.rev),
        )?;
        Ok(DocumentResult::from_response(body, Some(&self.name)))
    }
}
