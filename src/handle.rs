//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::connection::ConnectionDescriptor;
use crate::error::CouchError;
use crate::handle_builder::HandleBuilder;
use crate::request::{prepare, RequestDescriptor};
use crate::response::ResponseEnvelope;
use crate::transport::{ReqwestTransport, Transport};
use reqwest::Method;

use std::result::Result;
use std::sync::Arc;
use tracing::{debug, trace};

/// **The main database handle**.
///
/// This should be created once and used
/// throughout the application lifetime, across all threads.
///
/// Note: there is no need to enclose this struct in an `Rc` or [`Arc`], as it uses an
/// [`Arc`] internally, so calling `.clone()` on this struct will always return the
/// same underlying handle.
///
/// The handle holds no mutable state: every operation builds its own request
/// and gets its own response.
#[derive(Clone, Debug)]
pub struct Handle {
    pub(crate) inner: Arc<HandleRef>,
}

#[derive(Debug)]
pub(crate) struct HandleRef {
    pub(crate) descriptor: ConnectionDescriptor,
    pub(crate) transport: Arc<dyn Transport>,
}

impl Handle {
    /// Create a new [`HandleBuilder`].
    pub fn builder() -> HandleBuilder {
        HandleBuilder::new()
    }

    /// Create a handle directly from a descriptor and a transport.
    pub fn with_transport(descriptor: ConnectionDescriptor, transport: Arc<dyn Transport>) -> Handle {
        debug!("Creating new Handle: base_url={}", descriptor.base_url());
        Handle {
            inner: Arc::new(HandleRef {
                descriptor,
                transport,
            }),
        }
    }

    // Create the new Handle based on builder configuration
    pub(crate) fn new(b: &HandleBuilder) -> Result<Handle, CouchError> {
        let descriptor = b.descriptor()?;
        let transport: Arc<dyn Transport> = match &b.transport {
            Some(t) => t.clone(),
            None => Arc::new(ReqwestTransport::from_builder(b)?),
        };
        Ok(Handle::with_transport(descriptor, transport))
    }

    /// The connection descriptor this handle was built from.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.inner.descriptor
    }

    pub(crate) fn prepare(
        &self,
        method: Method,
        path: &str,
        has_body: bool,
        content_type: Option<&str>,
    ) -> RequestDescriptor {
        prepare(&self.inner.descriptor, method, path, has_body, content_type)
    }

    // Issue exactly one request. No retries.
    pub(crate) async fn send(&self, req: &RequestDescriptor) -> Result<ResponseEnvelope, CouchError> {
        trace!("sending {} {}", req.method, req.path);
        let resp = self.inner.transport.send(req).await?;
        trace!("received status {} for {} {}", resp.status, req.method, req.path);
        Ok(resp)
    }
}
