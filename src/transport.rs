//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! The HTTP transport seam.
//!
//! Everything network-related (connections, TLS, pooling, timeouts) lives
//! behind [`Transport`]. The SDK calls [`Transport::send()`] exactly once per
//! operation and never retries.
//!
use crate::error::{ia_error, CouchError};
use crate::handle_builder::HandleBuilder;
use crate::request::RequestDescriptor;
use crate::response::ResponseEnvelope;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use std::fmt::Debug;
use std::time::Duration;
use tracing::trace;

/// Trait implemented by anything that can execute a [`RequestDescriptor`].
///
/// An `Err` return means no response was obtained at all; implementations
/// should use [`InternalErrorCode::InternalError`](crate::InternalErrorCode::InternalError)
/// for it. Any response the server sent, whatever its status, is an `Ok`.
///
/// The one exception is a request that cannot be put on the wire, such as a
/// header name or value that is not valid HTTP. That is reported as
/// [`InternalErrorCode::IllegalArgument`](crate::InternalErrorCode::IllegalArgument)
/// before any connection is attempted.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, CouchError>;
}

/// Default [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing [`reqwest::Client`].
    pub fn new(client: reqwest::Client) -> ReqwestTransport {
        ReqwestTransport { client }
    }

    pub(crate) fn from_builder(b: &HandleBuilder) -> Result<ReqwestTransport, CouchError> {
        if let Some(c) = &b.client {
            return Ok(ReqwestTransport::new(c.clone()));
        }
        // default timeout to 30 seconds
        let timeout = b.timeout.unwrap_or(Duration::new(30, 0));
        let mut cb = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout);
        if let Some(cert) = &b.add_cert {
            cb = cb.add_root_certificate(cert.clone());
        }
        if b.accept_invalid_certs {
            cb = cb.danger_accept_invalid_certs(true);
        }
        Ok(ReqwestTransport::new(cb.build()?))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, CouchError> {
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| ia_error!("invalid header name '{}': {}", k, e))?;
            headers.insert(name, HeaderValue::from_str(v)?);
        }
        if let Some(c) = &request.credentials {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&c.basic_auth_header())?);
        }

        let mut rb = self
            .client
            .request(request.method.clone(), request.url())
            .headers(headers);
        if let Some(body) = &request.body {
            rb = rb.body(body.to_bytes());
        }
        let resp = rb.send().await?;

        let mut envelope = ResponseEnvelope::new(resp.status().as_u16());
        // iter() yields one entry per value, so repeated names are all kept
        for (key, value) in resp.headers().iter() {
            if let Ok(v) = value.to_str() {
                envelope = envelope.with_header(key.as_str(), v);
            }
        }
        let body = resp.bytes().await?;
        trace!(
            "{} {} -> status={} bytes={}",
            request.method,
            request.path,
            envelope.status,
            body.len()
        );
        Ok(envelope.with_body(body))
    }
}
