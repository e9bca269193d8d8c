//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! CouchDB Rust SDK
//!
//! This is a Rust SDK for document databases that speak the CouchDB HTTP API
//! (Apache CouchDB, Cloudant and compatible servers). It covers database
//! lifecycle, document CRUD, bulk writes, attachments, design documents and
//! views, users, cookie sessions and server configuration.
//!
//! This SDK supplies and uses Rust `async` methods throughout. It does not start
//! or require a particular runtime itself; the default transport uses
//! [reqwest](https://crates.io/crates/reqwest), which runs on [tokio](https://crates.io/crates/tokio).
//! There is currently no blocking support.
//!
//! The general flow for an application is:
//! - Create a [`HandleBuilder`] with all needed parameters
//! - Create a [`Handle`] from the [`HandleBuilder`] that will be used throughout the application, across all threads
//! - Interact with the database using the [`Handle`] and Request structs such as [`PutDocumentRequest`], [`GetDocumentRequest`], [`ViewRequest`], etc.
//!
//! ## Simple Example
//! The following code creates a [`Handle`] from values in the current environment, then
//! stores and reads back a single document.
//! ```no_run
//! use couchdb_rust_sdk::{GetDocumentRequest, Handle, PutDocumentRequest};
//! use serde_json::json;
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let handle = Handle::builder()
//!         .endpoint("http://localhost:5984")?
//!         .from_environment()?
//!         .build()?;
//!     let res = PutDocumentRequest::create("inventory")
//!         .id("apple")
//!         .document(&json!({"color": "red", "count": 4}))?
//!         .execute(&handle)
//!         .await?;
//!     println!("stored apple at revision {:?}", res.revision());
//!     let doc = GetDocumentRequest::new("inventory", "apple")
//!         .execute(&handle)
//!         .await?;
//!     println!("doc={}", doc);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//! A [`HandleBuilder`] can be configured in code, from a profile in an INI-style
//! file ([`HandleBuilder::from_config_file()`]) or from `COUCHDB_*` environment
//! variables ([`HandleBuilder::from_environment()`]). Later settings override
//! earlier ones.
//!
//! ## Errors
//! Every operation returns `Result<T, CouchError>`. A [`CouchError`] carries
//! either the HTTP status the server answered with, or a negative
//! [`InternalErrorCode`] for failures detected locally (no response at all,
//! a document that could not be serialized, an illegal argument). Operations are
//! never retried; the caller decides whether to reissue a call.
//!
//! Delete-style operations treat a 404 as a successful no-op unless
//! `fail_on_not_found(true)` is set on the request.
//!
//! ## Logging
//! This SDK emits [tracing](https://crates.io/crates/tracing) events. To see
//! them, install a subscriber in the application, for example:
//! ```no_run
//! tracing_subscriber::fmt()
//!     .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
//!     .compact()
//!     .init();
//! ```
//! and run with `RUST_LOG=couchdb_rust_sdk=debug`.
//!
//! ## Testing without a server
//! All network access goes through the [`Transport`] trait. Supplying a custom
//! implementation with [`HandleBuilder::transport()`] allows every operation to be
//! exercised against scripted responses.

pub(crate) mod attachment_request;
pub use crate::attachment_request::{
    Attachment, DeleteAttachmentRequest, GetAttachmentRequest, PutAttachmentRequest,
};

pub(crate) mod bulk_request;
pub use crate::bulk_request::{BulkDocsRequest, BulkItemResult, BulkResult};

pub(crate) mod config_request;
pub use crate::config_request::{DeleteConfigRequest, GetConfigRequest, SetConfigRequest};

pub(crate) mod connection;
pub use crate::connection::{ConnectionDescriptor, Credentials};

pub(crate) mod database_request;
pub use crate::database_request::{
    CreateDatabaseRequest, DatabaseInfo, DatabaseSizes, DeleteDatabaseRequest, GetDatabaseRequest,
};

pub(crate) mod design_request;
pub use crate::design_request::{
    DeleteDesignRequest, DesignDocument, GetDesignRequest, PutDesignRequest, ViewDefinition,
};

pub(crate) mod document_request;
pub use crate::document_request::{
    DeleteDocumentRequest, DocumentResult, GetDocumentRequest, PutDocumentRequest,
};

pub(crate) mod error;
pub use crate::error::{CouchError, InternalErrorCode};

pub(crate) mod file_utils;

pub(crate) mod handle;
pub use crate::handle::Handle;

pub(crate) mod handle_builder;
pub use crate::handle_builder::{HandleBuilder, DEFAULT_PORT};

pub mod query;
pub use crate::query::{encode, EncodedQuery, QueryOption, Stale, ViewKey};

#[cfg(test)]
pub(crate) mod query_tests;

pub mod request;
pub use crate::request::{prepare, RequestBody, RequestDescriptor};

#[cfg(test)]
pub(crate) mod request_tests;

pub mod response;
pub use crate::response::{decode, decode_tolerant, ResponseBody, ResponseEnvelope};

#[cfg(test)]
pub(crate) mod response_tests;

pub(crate) mod server_request;
pub use crate::server_request::{ListDatabasesRequest, ServerInfo, ServerInfoRequest, UuidsRequest};

pub(crate) mod session_request;
pub use crate::session_request::{
    GetSessionRequest, LoginRequest, LoginResult, LogoutRequest, SessionDetails, SessionInfo,
    UserContext,
};

pub(crate) mod transport;
pub use crate::transport::{ReqwestTransport, Transport};

pub(crate) mod user_request;
pub use crate::user_request::{
    DeleteUserRequest, GetUserRequest, PutUserRequest, UserDocument, USERS_DB, USER_ID_PREFIX,
};

pub(crate) mod view_request;
pub use crate::view_request::{AllDocsRequest, ViewRequest, ViewResult, ViewRow};
