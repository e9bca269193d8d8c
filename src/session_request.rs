//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, CouchError};
use crate::handle::Handle;
use crate::request::RequestDescriptor;
use crate::response::{decode, from_body, ResponseEnvelope, ACCEPT_READ};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::json;
use std::result::Result;
use tracing::debug;

const SESSION_PATH: &str = "/_session";
const AUTH_COOKIE: &str = "AuthSession";

/// Struct representing the result of a [`LoginRequest`].
#[derive(Default, Debug, Clone, Deserialize)]
pub struct LoginResult {
    #[serde(default)]
    pub(crate) ok: bool,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) roles: Vec<String>,
    #[serde(skip)]
    pub(crate) cookie: Option<String>,
}

impl LoginResult {
    pub fn ok(&self) -> bool {
        self.ok
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn roles(&self) -> &Vec<String> {
        &self.roles
    }
    /// Value of the `AuthSession` cookie set by the server, if any.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }
}

// Pull "AuthSession=<value>" out of the Set-Cookie headers. Only the
// leading name=value pair of each header is a cookie; the rest are attributes.
pub(crate) fn auth_cookie(resp: &ResponseEnvelope) -> Option<String> {
    resp.header_values("set-cookie").find_map(|header| {
        let pair = header.split(';').next()?;
        let (k, v) = pair.trim().split_once('=')?;
        if k == AUTH_COOKIE && !v.is_empty() {
            Some(v.to_string())
        } else {
            None
        }
    })
}

/// Struct used for starting a cookie session with a name and password.
#[derive(Default, Debug)]
pub struct LoginRequest {
    pub(crate) name: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub fn new(name: &str, password: &str) -> LoginRequest {
        LoginRequest {
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        if self.name.is_empty() {
            return ia_err!("user name must be non-empty");
        }
        let body = json!({ "name": self.name, "password": self.password });
        Ok(h.prepare(Method::POST, SESSION_PATH, true, None).json_body(body))
    }

    pub async fn execute(&self, h: &Handle) -> Result<LoginResult, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        let mut res: LoginResult = from_body(decode(&resp, ACCEPT_READ, None, None)?, None)?;
        res.cookie = auth_cookie(&resp);
        debug!("session started for {}", self.name);
        Ok(res)
    }
}

/// The authenticated user, as reported by [`GetSessionRequest`].
#[derive(Default, Debug, Clone, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Default, Debug, Clone, Deserialize)]
pub struct SessionDetails {
    #[serde(default)]
    pub authenticated: Option<String>,
    #[serde(default)]
    pub authentication_db: Option<String>,
    #[serde(default)]
    pub authentication_handlers: Vec<String>,
}

/// Struct representing the result of a [`GetSessionRequest`].
#[derive(Default, Debug, Clone, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub ok: bool,
    #[serde(rename = "userCtx", default)]
    pub user_ctx: UserContext,
    #[serde(default)]
    pub info: SessionDetails,
}

/// Struct used for fetching the current session.
#[derive(Default, Debug)]
pub struct GetSessionRequest {}

impl GetSessionRequest {
    pub fn new() -> GetSessionRequest {
        GetSessionRequest {}
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        Ok(h.prepare(Method::GET, SESSION_PATH, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<SessionInfo, CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        from_body(decode(&resp, ACCEPT_READ, None, None)?, None)
    }
}

/// Struct used for ending the current cookie session.
#[derive(Default, Debug)]
pub struct LogoutRequest {}

impl LogoutRequest {
    pub fn new() -> LogoutRequest {
        LogoutRequest {}
    }

    pub(crate) fn build(&self, h: &Handle) -> Result<RequestDescriptor, CouchError> {
        Ok(h.prepare(Method::DELETE, SESSION_PATH, false, None))
    }

    pub async fn execute(&self, h: &Handle) -> Result<(), CouchError> {
        let resp = h.send(&self.build(h)?).await?;
        decode(&resp, ACCEPT_READ, None, None)?;
        Ok(())
    }
}
