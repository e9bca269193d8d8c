//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Builder for creating a [`Handle`](crate::Handle)
//!
use std::default::Default;
use std::env;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::connection::{ConnectionDescriptor, Credentials, CLOUDANT_DOMAIN};
use crate::error::{ia_err, CouchError};
use crate::file_utils::{expand_user_home, file_to_string};
use crate::handle::Handle;
use crate::transport::Transport;
use ini::Ini;
use percent_encoding::percent_decode_str;
use reqwest::{Certificate, Client};
use url::Url;

// Url keeps userinfo percent-encoded.
fn decode_userinfo(s: &str) -> Result<String, CouchError> {
    match percent_decode_str(s).decode_utf8() {
        Ok(v) => Ok(v.into_owned()),
        Err(e) => ia_err!("invalid credentials in endpoint: {}", e),
    }
}

/// Port used when a host is given without one.
pub const DEFAULT_PORT: u16 = 5984;

/// Builder used to set all the parameters to create a [`Handle`](crate::Handle).
///
/// Later calls override earlier ones, so defaults can be set in code and then
/// overridden with [`from_environment()`](HandleBuilder::from_environment()).
#[derive(Default, Debug, Clone)]
pub struct HandleBuilder {
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
    pub(crate) use_https: bool,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) add_cert: Option<Certificate>,
    pub(crate) client: Option<Client>,
    pub(crate) accept_invalid_certs: bool,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    // For error messaging
    pub(crate) from_environment: bool,
}

impl HandleBuilder {
    /// Create a new HandleBuilder struct.
    pub fn new() -> Self {
        HandleBuilder {
            ..Default::default()
        }
    }
    /// Build a new [`Handle`].
    ///
    /// Unless a [`Transport`] was given with [`transport()`](HandleBuilder::transport()),
    /// a [`ReqwestTransport`](crate::ReqwestTransport) is created from the
    /// timeout and certificate settings of this builder.
    pub fn build(self) -> Result<Handle, CouchError> {
        Handle::new(&self)
    }
    /// Gather configuration settings from the current environment.
    ///
    /// The following environment variables are used:
    ///
    /// | variable | description |
    /// | -------- | ----------- |
    /// | `COUCHDB_URL` | The server URL. See [`HandleBuilder::endpoint()`]. |
    /// | `COUCHDB_USERNAME` | Username for Basic authentication. |
    /// | `COUCHDB_PASSWORD` | Password for Basic authentication. |
    /// | `COUCHDB_AUTH_FILE` | Path to a username/password file (see [`HandleBuilder::credentials_from_file()`]). |
    /// | `COUCHDB_CA_CERT` | Path to a certificate file in `pem` format (see [`HandleBuilder::add_cert_from_pemfile()`]). |
    /// | `COUCHDB_ACCEPT_INVALID_CERTS` | If `1` or `true`, do not check certificates. |
    ///
    pub fn from_environment(mut self) -> Result<Self, CouchError> {
        self.from_environment = true;
        if let Ok(val) = env::var("COUCHDB_URL") {
            self = self.endpoint(&val)?;
        }
        if let Ok(val) = env::var("COUCHDB_AUTH_FILE") {
            self = self.credentials_from_file(&val)?;
        }
        if let Ok(user) = env::var("COUCHDB_USERNAME") {
            let pass = env::var("COUCHDB_PASSWORD").unwrap_or_default();
            self = self.credentials(&user, &pass)?;
        }
        if let Ok(val) = env::var("COUCHDB_CA_CERT") {
            self = self.add_cert_from_pemfile(&val)?;
        }
        if let Ok(val) = env::var("COUCHDB_ACCEPT_INVALID_CERTS") {
            let lv = val.to_lowercase();
            if lv == "true" || lv == "1" {
                self = self.danger_accept_invalid_certs(true)?;
            }
        }
        Ok(self)
    }
    /// Set the server URL, for example `http://localhost:5984` or
    /// `https://db.example.com`.
    ///
    /// If the URL has no port, the scheme's default (80 or 443) is used.
    /// Any path in the URL is ignored.
    pub fn endpoint(mut self, endpoint: &str) -> Result<Self, CouchError> {
        let u = Url::parse(endpoint)?;
        match u.scheme() {
            "https" => self.use_https = true,
            "http" => self.use_https = false,
            s => return ia_err!("unsupported scheme '{}' in endpoint {}", s, endpoint),
        }
        match u.host_str() {
            Some(h) if !h.is_empty() => self.host = h.to_string(),
            _ => return ia_err!("no host in endpoint {}", endpoint),
        }
        self.port = u.port_or_known_default();
        if !u.username().is_empty() {
            let user = decode_userinfo(u.username())?;
            let pass = decode_userinfo(u.password().unwrap_or(""))?;
            self = self.credentials(&user, &pass)?;
        }
        Ok(self)
    }
    /// Set the server host name.
    pub fn host(mut self, host: &str) -> Result<Self, CouchError> {
        self.host = host.to_string();
        Ok(self)
    }
    /// Set the server port. The default is [`DEFAULT_PORT`].
    pub fn port(mut self, port: u16) -> Result<Self, CouchError> {
        self.port = Some(port);
        Ok(self)
    }
    /// Use https (`true`) or http (`false`).
    pub fn secured(mut self, secured: bool) -> Result<Self, CouchError> {
        self.use_https = secured;
        Ok(self)
    }
    /// Set username and password for Basic authentication.
    ///
    /// An empty username removes any credentials.
    pub fn credentials(mut self, username: &str, password: &str) -> Result<Self, CouchError> {
        if username.is_empty() {
            self.credentials = None;
        } else {
            self.credentials = Some(Credentials::new(username, password));
        }
        Ok(self)
    }
    /// Connect to a hosted account at `https://{username}.cloudant.com`.
    pub fn cloudant(mut self, username: &str, password: &str) -> Result<Self, CouchError> {
        if username.is_empty() {
            return ia_err!("cloudant account username must be non-empty");
        }
        self.host = format!("{}.{}", username, CLOUDANT_DOMAIN);
        self.port = Some(443);
        self.use_https = true;
        self.credentials(username, password)
    }
    /// Read credentials from a local file.
    ///
    /// The format of the file is one value per line, using a `key=value`
    /// syntax:
    ///```text
    /// username=admin
    /// password=1234567
    ///```
    pub fn credentials_from_file(self, filename: &str) -> Result<Self, CouchError> {
        let mut user = "".to_string();
        let mut pass = "".to_string();
        let data = file_to_string(filename)?;
        for line in data.lines() {
            if let Some((k, v)) = line.split_once('=') {
                match k.trim() {
                    "username" => user = v.trim().to_string(),
                    "password" => pass = v.trim().to_string(),
                    _ => {}
                }
            }
        }
        if user.is_empty() {
            return ia_err!("username field missing from credentials file {}", filename);
        }
        self.credentials(&user, &pass)
    }
    /// Read connection settings from a profile in an INI-style file:
    ///```ini
    /// [DEFAULT]
    /// url=https://db.example.com:6984
    /// username=admin
    /// password=1234567
    ///```
    /// All keys are optional.
    pub fn from_config_file(mut self, filename: &str, profile: &str) -> Result<Self, CouchError> {
        let path = expand_user_home(filename);
        tracing::debug!("Reading connection config from {} profile {}", path, profile);
        let config = Ini::load_from_file(&path)?;
        let props = match config.section(Some(profile)) {
            Some(p) => p,
            None => {
                return ia_err!("error reading config file '{}': missing profile '{}'", path, profile)
            }
        };
        if let Some(u) = props.get("url") {
            self = self.endpoint(u)?;
        }
        if let Some(user) = props.get("username") {
            let pass = props.get("password").unwrap_or("");
            self = self.credentials(user, pass)?;
        }
        Ok(self)
    }
    /// Add a certificate to use for https connections from a file.
    ///
    /// The file must contain an x509 certificate in `PEM` file format.
    pub fn add_cert_from_pemfile(self, pemfile: &str) -> Result<Self, CouchError> {
        let buf = file_to_string(pemfile)?.into_bytes();
        match reqwest::Certificate::from_pem(&buf) {
            Ok(cert) => self.add_cert(cert),
            Err(e) => ia_err!("error getting certificate from pemfile {}: {}", pemfile, e),
        }
    }
    /// Add a certificate to use for https connections.
    pub fn add_cert(mut self, cert: Certificate) -> Result<Self, CouchError> {
        self.add_cert = Some(cert);
        Ok(self)
    }
    /// Allow https connection without validating certificates.
    ///
    /// **Warning:** This is only recommended for local testing purposes. See [`reqwest::ClientBuilder::danger_accept_invalid_certs()`] for details.
    pub fn danger_accept_invalid_certs(mut self, accept_invalid_certs: bool) -> Result<Self, CouchError> {
        self.accept_invalid_certs = accept_invalid_certs;
        Ok(self)
    }
    /// Specify a [`reqwest::Client`] to use for all http/s connections.
    pub fn reqwest_client(mut self, client: &Client) -> Result<Self, CouchError> {
        self.client = Some(client.clone());
        Ok(self)
    }
    /// Specify the timeout used by the default transport, for both connecting
    /// and whole requests. The default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, CouchError> {
        if timeout.is_zero() {
            return ia_err!("timeout must be greater than zero");
        }
        self.timeout = Some(timeout);
        Ok(self)
    }
    /// Use a custom [`Transport`] instead of the default reqwest-based one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Result<Self, CouchError> {
        self.transport = Some(transport);
        Ok(self)
    }

    pub(crate) fn descriptor(&self) -> Result<ConnectionDescriptor, CouchError> {
        if self.host.is_empty() {
            if self.from_environment {
                return ia_err!("can't determine server host: set COUCHDB_URL");
            }
            return ia_err!("can't determine server host: call HandleBuilder::endpoint() or HandleBuilder::host()");
        }
        let port = self.port.unwrap_or(DEFAULT_PORT);
        Ok(match &self.credentials {
            Some(c) => ConnectionDescriptor::with_credentials(
                &self.host,
                port,
                self.use_https,
                &c.username,
                &c.password,
            ),
            None => ConnectionDescriptor::new(&self.host, port, self.use_https),
        })
    }
}
