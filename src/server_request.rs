//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::RequestDescriptor;
use crate::response::{decode, from_body, ACCEPT_READ};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::Value;
use std::result::Result;

/// Server welcome information returned by `GET /`.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub couchdb: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub vendor: Option<Value>,
}

/// Struct used for fetching server information.
#[derive(Default, Debug)]
pub struct ServerInfoRequest {}

impl ServerInfoRequest {
    pub fn new() -> ServerInfoRequest {
        ServerInfoRequest {}
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        Ok(h.prepare(Method::GET, "/", false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<ServerInfo, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
    }
}

/// Struct used for listing all database names.
#[derive(Default, Debug)]
pub struct ListDatabasesRequest {}

impl ListDatabasesRequest {
    pub fn new() -> ListDatabasesRequest {
        ListDatabasesRequest {}
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        Ok(h.prepare(Method::GET, "/_all_dbs", false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<Vec<String>, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
    }
}

#[derive(Deserialize)]
struct UuidsBody {
    uuids: Vec<String>,
}

/// Struct used for fetching server-generated UUIDs.
#[derive(Debug)]
pub struct UuidsRequest {
    pub(crate) count: u32,
}

impl Default for UuidsRequest {
    fn default() -> Self {
        UuidsRequest { count: 1 }
    }
}

impl UuidsRequest {
    pub fn new() -> UuidsRequest {
        UuidsRequest::default()
    }

    /// Number of UUIDs to fetch. The default is 1.
    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.count == 0 {
            return ia_err!("uuid count must be greater than zero");
        }
        let path = format!("/_uuids?count={}", self.count);
        Ok(h.prepare(Method::GET, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<Vec<String>, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        let body: UuidsBody = from_body(decode(&resp, ACCEPT_READ, None, None)?, None)?;
        Ok(body.uuids)
    }
}
