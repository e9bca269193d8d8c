//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::{path_of, RequestDescriptor};
use crate::response::{decode, decode_tolerant, from_body, ACCEPT_READ};
use reqwest::Method;
use serde_json::Value;
use std::result::Result;

const CONFIG_ROOT: &str = "_config";

/// Struct used for reading server configuration.
///
/// With no section the whole configuration is returned; with a section and
/// no key, that section; with both, the single value as a JSON string.
#[derive(Default, Debug)]
pub struct GetConfigRequest {
    pub(crate) section: Option<String>,
    pub(crate) key: Option<String>,
}

impl GetConfigRequest {
    pub fn new() -> GetConfigRequest {
        GetConfigRequest::default()
    }

    pub fn section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = match (&self.section, &self.key) {
            (None, None) => path_of(&[CONFIG_ROOT]),
            (Some(s), None) => path_of(&[CONFIG_ROOT, s]),
            (Some(s), Some(k)) => path_of(&[CONFIG_ROOT, s, k]),
            (None, Some(_)) => return ia_err!("config key given without a section"),
        };
        Ok(h.prepare(Method::GET, &path, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<Value, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
    }
}

fn config_key_path(section: &str, key: &str) -> Result<String, CouchError> {
    if section.is_empty() || key.is_empty() {
        return ia_err!("config section and key must be non-empty");
    }
    Ok(path_of(&[CONFIG_ROOT, section, key]))
}

/// Struct used for setting one configuration value.
#[derive(Default, Debug)]
pub struct SetConfigRequest {
    pub(crate) section: String,
    pub(crate) key: String,
    pub(crate) value: String,
}

impl SetConfigRequest {
    pub fn new(section: &str, key: &str, value: &str) -> SetConfigRequest {
        SetConfigRequest {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = config_key_path(&self.section, &self.key)?;
        Ok(h.prepare(Method::PUT, &path, true, None)
            .json_body(Value::String(self.value.clone())))
    }

    /// Execute the request, returning the previous value.
    pub async fn execute(&self, h: &Handle) -> Result<String, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
    }
}

/// Struct used for removing one configuration value.
#[derive(Default, Debug)]
pub struct DeleteConfigRequest {
    pub(crate) section: String,
    pub(crate) key: String,
    pub(crate) fail_on_not_found: bool,
}

impl DeleteConfigRequest {
    pub fn new(section: &str, key: &str) -> DeleteConfigRequest {
        DeleteConfigRequest {
            section: section.to_string(),
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn fail_on_not_found(mut self, val: bool) -> Self {
        self.fail_on_not_found = val;
        self
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        let path = config_key_path(&self.section, &self.key)?;
        Ok(h.prepare(Method::DELETE, &path, false, None))
    }

    /// Execute the request, returning the removed value, or `None` if the
    /// key did not exist.
    pub async fn execute(&self, h: &Handle) -> Result<Option<String>, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        match decode_tolerant(&resp, ACCEPT_READ, self.fail_on_not_found, None, None)? {
            Some(body) => Ok(Some(from_body(body, None)?)),
            None => Ok(None),
        }
    }
}
