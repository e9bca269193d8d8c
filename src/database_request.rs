//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::{path_of, RequestDescriptor};
use crate::response::{decode, decode_tolerant, from_body};
use crate::response::{ACCEPT_DELETE, ACCEPT_READ, ACCEPT_WRITE};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::{Map, Value};
use std::result::Result;
use tracing::debug;

// Database names: a lowercase letter, then lowercase letters, digits and _$()+-/
fn check_db_name(name: &str) -> Result<(), CouchError> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return ia_err!("invalid database name '{}': must start with a lowercase letter", name),
    }
    if let Some(c) = chars.find(|c| {
        !(c.is_ascii_lowercase() || c.is_ascii_digit() || "_$()+-/".contains(*c))
    }) {
        return ia_err!("invalid database name '{}': illegal character '{}'", name, c);
    }
    Ok(())
}

/// Struct used for creating a database.
#[derive(Default, Debug)]
pub struct CreateDatabaseRequest {
    pub(crate) db: String,
    pub(crate) partitioned: bool,
}

impl CreateDatabaseRequest {
    pub fn new(db: &str) -> CreateDatabaseRequest {
        CreateDatabaseRequest {
            db: db.to_string(),
            ..Default::default()
        }
    }

    /// Create a partitioned database.
    pub fn partitioned(mut self, val: bool) -> Self {
        self.partitioned = val;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        check_db_name(&self.db)?;
        let mut path = path_of(&[&self.db]);
        if self.partitioned {
            path.push_str("?partitioned=true");
        }
        Ok(h.prepare(Method::PUT, &path, false, None))
    }

    /// Execute the request. An existing database is an error with code 412.
    pub async fn execute(&self, h: &Handle) -> Result<(), CouchError> {
        let req = self.build(h)?;
        let resp = h.send(&req).await?;
        decode(&resp, ACCEPT_WRITE, None, None)?;
        debug!("created database {}", self.db);
        Ok(())
    }
}

/// Information about a database, as returned by [`GetDatabaseRequest`].
#[derive(Default, Debug, Clone, Deserialize)]
pub struct DatabaseInfo {
    pub db_name: String,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub doc_del_count: u64,
    /// Opaque sequence value; a number or a string depending on the server.
    #[serde(default)]
    pub update_seq: Value,
    #[serde(default)]
    pub instance_start_time: Option<String>,
    #[serde(default)]
    pub sizes: Option<DatabaseSizes>,
    /// Any other fields the server reported.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Default, Debug, Clone, Deserialize)]
pub struct DatabaseSizes {
    #[serde(default)]
    pub file: u64,
    #[serde(default)]
    pub external: u64,
    #[serde(default)]
    pub active: u64,
}

/// Struct used for getting information about a database.
#[derive(Default, Debug)]
pub struct GetDatabaseRequest {
    pub(crate) db: String,
}

impl GetDatabaseRequest {
    pub fn new(db: &str) -> GetDatabaseRequest {
        GetDatabaseRequest { db: db.to_string() }
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() {
            return ia_err!("database name must be non-empty");
        }
        Ok(h.prepare(Method::GET, &path_of(&[&self.db]), false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<DatabaseInfo, CouchError> {
        let req = self.build(h)?;
        let resp = h.send(&req).await?;
        from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
    }
}

/// Struct used for deleting a database.
///
/// A missing database is not an error unless
/// [`fail_on_not_found(true)`](DeleteDatabaseRequest::fail_on_not_found()) is set.
#[derive(Default, Debug)]
pub struct DeleteDatabaseRequest {
    pub(crate) db: String,
    pub(crate) fail_on_not_found: bool,
}

impl DeleteDatabaseRequest {
    pub fn new(db: &str) -> DeleteDatabaseRequest {
        DeleteDatabaseRequest {
            db: db.to_string(),
            ..Default::default()
        }
    }

    pub fn fail_on_not_found(mut self, val: bool) -> Self {
        self.fail_on_not_found = val;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.db.is_empty() {
            return ia_err!("database name must be non-empty");
        }
        Ok(h.prepare(Method::DELETE, &path_of(&[&self.db]), false, None))
    }

    /// Execute the request. Returns `true` if the database was deleted,
    /// `false` if it did not exist.
    pub async fn execute(&self, h: &Handle) -> Result<bool, CouchError> {
        let req = self.build(h)?;
        let resp = h.send(&req).await?;
        let body = decode_tolerant(&resp, ACCEPT_DELETE, self.fail_on_not_found, None, None)?;
        Ok(body.is_some())
    }
}
