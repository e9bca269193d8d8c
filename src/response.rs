//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Response envelopes and the decoder that turns them into values or errors.
//!
//! Success is decided purely by the status code against the set of codes the
//! calling operation accepts. The body never turns a failure into a success.
//!
use crate::error::{CouchError, InternalErrorCode};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Status codes accepted by read operations.
pub const ACCEPT_READ: &[u16] = &[200];
/// Status codes accepted by create/update operations (PUT or POST).
pub const ACCEPT_WRITE: &[u16] = &[201, 202];
/// Status codes accepted by delete operations.
pub const ACCEPT_DELETE: &[u16] = &[200, 202];

/// A response received from the transport, as plain data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    /// Header names are stored lowercased. A repeated header keeps every
    /// value, in the order received.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Option<Bytes>,
}

impl ResponseEnvelope {
    pub fn new(status: u16) -> ResponseEnvelope {
        ResponseEnvelope {
            status,
            ..Default::default()
        }
    }

    /// Convenience constructor for a JSON response.
    pub fn json(status: u16, body: &Value) -> ResponseEnvelope {
        ResponseEnvelope::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body.to_string())
    }

    /// Add a header value. Calling this again with the same name adds
    /// another value rather than replacing the first.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The first value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// Every value of a header, such as each `Set-Cookie` line.
    pub fn header_values(&self, name: &str) -> impl Iterator<Item = &str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// `true` if the content type says the body is JSON.
    pub fn is_json(&self) -> bool {
        match self.content_type() {
            Some(ct) => ct.to_ascii_lowercase().contains("json"),
            None => false,
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw {
        content_type: Option<String>,
        data: Bytes,
    },
    Empty,
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn str_field(&self, name: &str) -> Option<String> {
        self.as_json()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Decode a response.
///
/// Returns the parsed body if `response.status` is in `accepted`, otherwise an
/// error whose code is the status and whose description comes from the
/// body's `error`/`reason` fields or the status code's standard text.
/// `document_id` and `revision` are attached to any error returned.
pub fn decode(
    response: &ResponseEnvelope,
    accepted: &[u16],
    document_id: Option<&str>,
    revision: Option<&str>,
) -> Result<ResponseBody, CouchError> {
    if accepted.contains(&response.status) {
        return parse_body(response).map_err(|e| e.with_context(document_id, revision));
    }
    Err(reject(response, document_id, revision))
}

/// The error for a response whose status the caller does not accept.
///
/// A body that cannot be parsed does not hide the status: the description
/// then falls back to the status text.
pub(crate) fn reject(
    response: &ResponseEnvelope,
    document_id: Option<&str>,
    revision: Option<&str>,
) -> CouchError {
    let body = parse_body(response).unwrap_or(ResponseBody::Empty);
    error_from_status(response.status, &body).with_context(document_id, revision)
}

/// Like [`decode()`], but a 404 is a successful no-op (`Ok(None)`) unless
/// `fail_on_not_found` is set.
pub fn decode_tolerant(
    response: &ResponseEnvelope,
    accepted: &[u16],
    fail_on_not_found: bool,
    document_id: Option<&str>,
    revision: Option<&str>,
) -> Result<Option<ResponseBody>, CouchError> {
    if response.status == 404 && !fail_on_not_found {
        return Ok(None);
    }
    decode(response, accepted, document_id, revision).map(Some)
}

/// Build the error for a non-accepted status code.
pub fn error_from_status(status: u16, body: &ResponseBody) -> CouchError {
    let description = match (body.str_field("error"), body.str_field("reason")) {
        (Some(error), Some(reason)) => format!("Error: {}, reason: {}", error, reason),
        _ => status_description(status),
    };
    CouchError::new(status as i32, &description)
}

/// The standard reason phrase for an HTTP status code.
pub fn status_description(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP status {}", status))
}

fn parse_body(response: &ResponseEnvelope) -> Result<ResponseBody, CouchError> {
    let data = match &response.body {
        Some(b) if !b.is_empty() => b,
        _ => return Ok(ResponseBody::Empty),
    };
    if !response.is_json() {
        return Ok(ResponseBody::Raw {
            content_type: response.content_type().map(str::to_string),
            data: data.clone(),
        });
    }
    match serde_json::from_slice::<Value>(data) {
        Ok(v) => Ok(ResponseBody::Json(v)),
        Err(e) => Err(CouchError::internal_with_detail(
            InternalErrorCode::BadResponse,
            &format!("invalid JSON in response body: {}", e),
        )),
    }
}

/// Deserialize a decoded JSON body into a typed result.
pub(crate) fn from_body<T: DeserializeOwned>(
    body: ResponseBody,
    document_id: Option<&str>,
) -> Result<T, CouchError> {
    let v = match body {
        ResponseBody::Json(v) => v,
        _ => {
            return Err(CouchError::internal_with_detail(
                InternalErrorCode::BadResponse,
                "expected a JSON response body",
            )
            .with_context(document_id, None))
        }
    };
    serde_json::from_value(v).map_err(|e| {
        CouchError::internal_with_detail(InternalErrorCode::BadResponse, &e.to_string())
            .with_context(document_id, None)
    })
}
