//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::document_request::DocumentResult;
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::{path_of, rev_query, RequestDescriptor};
use crate::response::{decode, decode_tolerant, from_body};
use crate::response::{ACCEPT_DELETE, ACCEPT_READ, ACCEPT_WRITE};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::{json, Map, Value};
use std::result::Result;

/// Name of the server's user database.
pub const USERS_DB: &str = "_users";
/// Prefix of every user document id.
pub const USER_ID_PREFIX: &str = "org.couchdb.user:";

fn user_id(name: &str) -> Result<String, CouchError> {
    if name.is_empty() {
        return ia_err!("user name must be non-empty");
    }
    Ok(format!("{}{}", USER_ID_PREFIX, name))
}

/// A user document as stored in `_users`. The password is never returned.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default)]
    pub rev: Option<String>,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Struct used for creating or updating a user.
#[derive(Default, Debug)]
pub struct PutUserRequest {
    pub(crate) name: String,
    pub(crate) password: String,
    pub(crate) roles: Vec<String>,
    pub(crate) rev: Option<String>,
}

impl PutUserRequest {
    pub fn new(name: &str, password: &str) -> PutUserRequest {
        PutUserRequest {
            name: name.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Revision of the existing user document, when updating.
    pub fn rev(mut self, rev: &str) -> Self {
        self.rev = Some(rev.to_string());
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let id = user_id(&self.name)?;
        let mut body = json!({
            "_id": id,
            "name": self.name,
            "password": self.password,
            "roles": self.roles,
            "type": "user",
        });
        if let Some(rev) = &self.rev {
            body["_rev"] = Value::String(rev.clone());
        }
        Ok(h.prepare(Method::PUT, &path_of(&[USERS_DB, &id]), true, None)
            .json_body(body))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let id = user_id(&self.name)?;
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

/// Struct used for fetching a user document.
#[derive(Default, Debug)]
pub struct GetUserRequest {
    pub(crate) name: String,
}

impl GetUserRequest {
    pub fn new(name: &str) -> GetUserRequest {
        GetUserRequest {
            name: name.to_string(),
        }
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let id = user_id(&self.name)?;
        Ok(h.prepare(Method::GET, &path_of(&[USERS_DB, &id]), false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<UserDocument, CouchError> {
        let id = user_id(&self.name)?;
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&id), None))?;
        from_body(decode(&resp, ACCEPT_READ, Some(&id), None)?, Some(&id))
    }
}

/// Struct used for deleting a user.
#[derive(Default, Debug)]
pub struct DeleteUserRequest {
    pub(crate) name: String,
    pub(crate) rev: String,
    pub(crate) fail_on_not_found: bool,
}

impl DeleteUserRequest {
    pub fn new(name: &str, rev: &str) -> DeleteUserRequest {
        DeleteUserRequest {
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
        let id = user_id(&self.name)?;
        let path = format!(
            "{}{}",
            path_of(&[USERS_DB, &id]),
            rev_query(Some(self.rev.as_str()))
        );
        Ok(h.prepare(Method::DELETE, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DocumentResult, CouchError> {
        let id = user_id(&self.name)?;
        let req = self.build(h)?;
        let resp = h
            .send(&req)
            .await
            .map_err(|e| e.with_context(Some(&id), Some(&self.rev)))?;
        let body = decode_tolerant(
            &resp,
            ACCEPT_DELETE,
            self.fail_on_not_found,
            Some(&id),
            Some(&self.rev),
        )?;
        Ok(DocumentResult::from_response(body, Some(&id)))
    }
}
