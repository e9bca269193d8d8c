//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use base64::prelude::{Engine as _, BASE64_STANDARD};

/// Domain suffix used by [`ConnectionDescriptor::cloudant()`].
pub const CLOUDANT_DOMAIN: &str = "cloudant.com";

/// Username and password for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

// Never print the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn password(&self) -> &str {
        &self.password
    }
    /// The value of an `Authorization` header for these credentials.
    pub fn basic_auth_header(&self) -> String {
        let up = format!("{}:{}", self.username, self.password);
        format!("Basic {}", BASE64_STANDARD.encode(up))
    }
}

/// Immutable description of where the database server lives and how to
/// authenticate to it.
///
/// Credentials are either fully present or absent; there is no way to set a
/// username without a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    host: String,
    port: u16,
    secured: bool,
    credentials: Option<Credentials>,
    base_url: String,
}

impl ConnectionDescriptor {
    /// Create a descriptor without credentials.
    pub fn new(host: &str, port: u16, secured: bool) -> ConnectionDescriptor {
        let base_url = format!(
            "{}://{}:{}",
            if secured { "https" } else { "http" },
            host,
            port
        );
        ConnectionDescriptor {
            host: host.to_string(),
            port,
            secured,
            credentials: None,
            base_url,
        }
    }

    /// Create a descriptor that authenticates with `username` and `password`.
    pub fn with_credentials(
        host: &str,
        port: u16,
        secured: bool,
        username: &str,
        password: &str,
    ) -> ConnectionDescriptor {
        let mut cd = ConnectionDescriptor::new(host, port, secured);
        cd.credentials = Some(Credentials::new(username, password));
        cd
    }

    /// Shorthand for a hosted account: connects to
    /// `https://{username}.cloudant.com:443` with the given credentials.
    pub fn cloudant(username: &str, password: &str) -> ConnectionDescriptor {
        let host = format!("{}.{}", username, CLOUDANT_DOMAIN);
        ConnectionDescriptor::with_credentials(&host, 443, true, username, password)
    }

    pub fn host(&self) -> &str {
        &self.host
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub fn secured(&self) -> bool {
        self.secured
    }
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    /// `http[s]://{host}:{port}`, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_unsecured() {
        let cd = ConnectionDescriptor::new("localhost", 5984, false);
        assert_eq!(cd.base_url(), "http://localhost:5984");
        assert!(cd.credentials().is_none());
    }

    #[test]
    fn base_url_secured_with_credentials() {
        let cd = ConnectionDescriptor::with_credentials("db.example.com", 6984, true, "admin", "pw");
        assert_eq!(cd.base_url(), "https://db.example.com:6984");
        assert_eq!(cd.username(), Some("admin"));
    }

    #[test]
    fn cloudant_shorthand() {
        let cd = ConnectionDescriptor::cloudant("acme", "secret");
        assert_eq!(cd.host(), "acme.cloudant.com");
        assert_eq!(cd.port(), 443);
        assert!(cd.secured());
        assert_eq!(cd.base_url(), "https://acme.cloudant.com:443");
    }

    #[test]
    fn basic_auth_header() {
        let c = Credentials::new("Aladdin", "open sesame");
        assert_eq!(c.basic_auth_header(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
        assert!(!format!("{:?}", c).contains("open sesame"));
    }
}
