//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Encoding of view query options into the server's wire format.
//!
//! The rendering here must match the server byte-for-byte. Options are
//! emitted in the order given, as `name=value` pairs joined by `&`. The one
//! exception is [`QueryOption::Keys`] with more than one key, which moves the
//! request to `POST` with a `{"keys": [...]}` JSON body.
//!
use crate::request::percent_escape;
use reqwest::Method;
use serde_json::Value;

/// A key used in view queries: a JSON scalar or an array of scalars.
pub type ViewKey = Value;

/// Freshness trade-off for view queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stale {
    /// Serve possibly stale index data immediately.
    Ok,
    /// Serve stale data, then trigger an index refresh.
    UpdateAfter,
}

impl Stale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stale::Ok => "ok",
            Stale::UpdateAfter => "update_after",
        }
    }
}

/// A single view query option.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOption {
    Conflicts(bool),
    Descending(bool),
    EndKey(ViewKey),
    EndKeyDocId(String),
    Group(bool),
    GroupLevel(i64),
    IncludeDocs(bool),
    Attachments(bool),
    AttachmentEncodingInfo(bool),
    InclusiveEnd(bool),
    Limit(i64),
    Reduce(bool),
    Skip(i64),
    Stale(Stale),
    StartKey(ViewKey),
    StartKeyDocId(String),
    UpdateSequence(bool),
    /// One key is sent as a `key=` parameter; more than one switches the
    /// request to `POST` with a `keys` body. An empty list is ignored.
    Keys(Vec<ViewKey>),
}

impl QueryOption {
    /// The query parameter name for this option.
    pub fn name(&self) -> &'static str {
        match self {
            QueryOption::Conflicts(_) => "conflicts",
            QueryOption::Descending(_) => "descending",
            QueryOption::EndKey(_) => "endkey",
            QueryOption::EndKeyDocId(_) => "endkey_docid",
            QueryOption::Group(_) => "group",
            QueryOption::GroupLevel(_) => "group_level",
            QueryOption::IncludeDocs(_) => "include_docs",
            QueryOption::Attachments(_) => "attachments",
            QueryOption::AttachmentEncodingInfo(_) => "att_encoding_info",
            QueryOption::InclusiveEnd(_) => "inclusive_end",
            QueryOption::Limit(_) => "limit",
            QueryOption::Reduce(_) => "reduce",
            QueryOption::Skip(_) => "skip",
            QueryOption::Stale(_) => "stale",
            QueryOption::StartKey(_) => "startkey",
            QueryOption::StartKeyDocId(_) => "startkey_docid",
            QueryOption::UpdateSequence(_) => "update_seq",
            QueryOption::Keys(_) => "key",
        }
    }
}

/// Output of [`encode()`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedQuery {
    /// Either empty, or `?` followed by `&`-joined parameters.
    pub query_string: String,
    /// `GET`, or `POST` when a `keys` body is present.
    pub method: Method,
    /// `{"keys": [...]}` when more than one key was requested.
    pub body: Option<Value>,
}

impl EncodedQuery {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// Encode view query options.
///
/// This never fails: every option is well-typed by construction.
pub fn encode(options: &[QueryOption]) -> EncodedQuery {
    let mut qs = String::new();
    let mut method = Method::GET;
    let mut body: Option<Value> = None;

    for opt in options {
        let value = match opt {
            QueryOption::Conflicts(b)
            | QueryOption::Descending(b)
            | QueryOption::Group(b)
            | QueryOption::IncludeDocs(b)
            | QueryOption::Attachments(b)
            | QueryOption::AttachmentEncodingInfo(b)
            | QueryOption::InclusiveEnd(b)
            | QueryOption::Reduce(b)
            | QueryOption::UpdateSequence(b) => b.to_string(),
            QueryOption::GroupLevel(i) | QueryOption::Limit(i) | QueryOption::Skip(i) => {
                i.to_string()
            }
            QueryOption::StartKey(k) | QueryOption::EndKey(k) => render_key(k),
            QueryOption::StartKeyDocId(s) | QueryOption::EndKeyDocId(s) => {
                quote(&percent_escape(s))
            }
            QueryOption::Stale(s) => quote(s.as_str()),
            QueryOption::Keys(keys) => match keys.len() {
                0 => continue,
                1 => render_key(&keys[0]),
                _ => {
                    method = Method::POST;
                    body = Some(serde_json::json!({ "keys": keys }));
                    continue;
                }
            },
        };
        qs.push_str(opt.name());
        qs.push('=');
        qs.push_str(&value);
        qs.push('&');
    }

    let trimmed = qs.trim_end_matches('&');
    let query_string = if trimmed.is_empty() {
        String::new()
    } else {
        format!("?{}", trimmed)
    };
    EncodedQuery {
        query_string,
        method,
        body,
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

// Strings are escaped and quoted. Arrays are bracketed and comma-joined,
// with elements in plain text (no quoting, no escaping).
fn render_key(k: &ViewKey) -> String {
    match k {
        Value::String(s) => quote(&percent_escape(s)),
        Value::Array(a) => {
            let elems: Vec<String> = a.iter().map(element_text).collect();
            format!("[{}]", elems.join(","))
        }
        Value::Object(_) => percent_escape(&k.to_string()),
        Value::Number(_) | Value::Bool(_) | Value::Null => k.to_string(),
    }
}

fn element_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
