//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Request descriptors handed to a [`Transport`](crate::Transport).
//!
use crate::connection::{ConnectionDescriptor, Credentials};
use crate::error::user_agent;
use bytes::Bytes;
use reqwest::Method;
use std::collections::BTreeMap;

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_AGENT: &str = "User-Agent";
pub const APPLICATION_JSON: &str = "application/json";

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes(Bytes),
}

impl RequestBody {
    /// The bytes to put on the wire.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Json(v) => Bytes::from(v.to_string()),
            RequestBody::Bytes(b) => b.clone(),
        }
    }
}

/// A single HTTP request, described as plain data.
///
/// Built fresh for every operation by [`prepare()`] and never reused. The
/// transport is responsible for turning it into an actual network call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path and query string, relative to the base URL. Always starts with `/`.
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub has_body: bool,
    pub body: Option<RequestBody>,
    pub credentials: Option<Credentials>,
    pub(crate) base_url: String,
}

impl RequestDescriptor {
    /// The full URL of this request.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub(crate) fn json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub(crate) fn bytes_body(mut self, body: Bytes) -> Self {
        self.body = Some(RequestBody::Bytes(body));
        self
    }
}

/// Assemble the headers and options for one request.
///
/// `Accept: application/json` is always set. `Content-Type` is set only when
/// `has_body` is true, to `content_type` or `application/json` if none is
/// given. Credentials from the descriptor are copied onto the request.
pub fn prepare(
    cd: &ConnectionDescriptor,
    method: Method,
    path: &str,
    has_body: bool,
    content_type: Option<&str>,
) -> RequestDescriptor {
    let mut headers = BTreeMap::new();
    headers.insert(ACCEPT.to_string(), APPLICATION_JSON.to_string());
    headers.insert(USER_AGENT.to_string(), user_agent().to_string());
    if has_body {
        headers.insert(
            CONTENT_TYPE.to_string(),
            content_type.unwrap_or(APPLICATION_JSON).to_string(),
        );
    }
    RequestDescriptor {
        method,
        path: path.to_string(),
        headers,
        has_body,
        body: None,
        credentials: cd.credentials().cloned(),
        base_url: cd.base_url().to_string(),
    }
}

/// Percent-escape a value for use in a URL path segment or query value.
///
/// Everything except ASCII alphanumerics and `*-._` is escaped; spaces become
/// `%20`.
pub fn percent_escape(s: &str) -> String {
    // byte_serialize escapes a literal '+' as %2B, so any '+' left is a space
    url::form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

// Join escaped path segments into "/a/b/c".
pub(crate) fn path_of(segments: &[&str]) -> String {
    let mut p = String::new();
    for s in segments {
        p.push('/');
        p.push_str(&percent_escape(s));
    }
    p
}

// Path of a document. Design and local document ids keep their literal '/'.
pub(crate) fn doc_path(db: &str, id: &str) -> String {
    for prefix in ["_design/", "_local/"] {
        if let Some(rest) = id.strip_prefix(prefix) {
            return format!("/{}/{}{}", percent_escape(db), prefix, percent_escape(rest));
        }
    }
    path_of(&[db, id])
}

// "?rev=..." or an empty string.
pub(crate) fn rev_query(rev: Option<&str>) -> String {
    match rev {
        Some(r) if !r.is_empty() => format!("?rev={}", percent_escape(r)),
        _ => String::new(),
    }
}
