//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use num_enum::TryFromPrimitive;

include!(concat!(env!("OUT_DIR"), "/ua.rs"));

pub(crate) fn sdk_version() -> &'static str {
    SDK_VERSION
}

pub(crate) fn user_agent() -> &'static str {
    USER_AGENT
}

/// The error value returned by every operation in this library.
///
/// `code` is either an HTTP status code (for failures reported by the
/// server) or one of the negative [`InternalErrorCode`] values (for failures
/// detected locally, such as no response at all or a document that could not
/// be serialized).
///
/// `document_id` and `revision` are copied from the call that failed, not
/// from the response body, so callers can correlate failures with their own
/// inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchError {
    pub code: i32,
    pub description: String,
    pub document_id: Option<String>,
    pub revision: Option<String>,
}

impl std::error::Error for CouchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for CouchError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "code={} description=\"{}\"", self.code, self.description)?;
        if let Some(id) = &self.document_id {
            write!(f, " id={}", id)?;
        }
        if let Some(rev) = &self.revision {
            write!(f, " rev={}", rev)?;
        }
        Ok(())
    }
}

impl CouchError {
    pub fn new(code: i32, description: &str) -> CouchError {
        CouchError {
            code,
            description: description.to_string(),
            document_id: None,
            revision: None,
        }
    }

    /// Create an error for a library-owned condition, using the standard
    /// description for that code.
    pub fn internal(code: InternalErrorCode) -> CouchError {
        CouchError::new(code as i32, code.description())
    }

    pub(crate) fn internal_with_detail(code: InternalErrorCode, detail: &str) -> CouchError {
        CouchError::new(
            code as i32,
            &format!("{}: {} ({})", code.description(), detail, sdk_version()),
        )
    }

    /// Attach the call-site document id and revision.
    pub(crate) fn with_context(mut self, document_id: Option<&str>, revision: Option<&str>) -> Self {
        self.document_id = document_id.map(str::to_string);
        self.revision = revision.map(str::to_string);
        self
    }

    /// The HTTP status code, if this error was reported by the server.
    pub fn http_status(&self) -> Option<u16> {
        if (100..=599).contains(&self.code) {
            return Some(self.code as u16);
        }
        None
    }

    /// The library-owned code, if this error was detected locally.
    pub fn internal_code(&self) -> Option<InternalErrorCode> {
        InternalErrorCode::try_from(self.code).ok()
    }

    /// `true` if the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }

    /// `true` if the server answered 409 (revision conflict).
    pub fn is_conflict(&self) -> bool {
        self.code == 409
    }
}

macro_rules! ia_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        CouchError::new(
            crate::error::InternalErrorCode::IllegalArgument as i32,
            &format!("{} ({})", m, crate::error::sdk_version()),
        )
    }};
}

pub(crate) use ia_error;

macro_rules! ia_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(CouchError::new(
            crate::error::InternalErrorCode::IllegalArgument as i32,
            &format!("{} ({})", m, crate::error::sdk_version()),
        ))
    }};
}

pub(crate) use ia_err;

impl From<reqwest::Error> for CouchError {
    fn from(e: reqwest::Error) -> Self {
        let detail = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            format!("reqwest error: {}", e)
        };
        CouchError::internal_with_detail(InternalErrorCode::InternalError, &detail)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for CouchError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        ia_error!("invalid header value: {}", e)
    }
}

impl From<url::ParseError> for CouchError {
    fn from(e: url::ParseError) -> Self {
        ia_error!("error parsing url: {}", e)
    }
}

impl From<std::io::Error> for CouchError {
    fn from(e: std::io::Error) -> Self {
        ia_error!("i/o error: {}", e)
    }
}

impl From<ini::Error> for CouchError {
    fn from(e: ini::Error) -> Self {
        ia_error!("error reading config file: {}", e)
    }
}

// Library-owned error codes.
//
// These are negative so they can never be confused with an HTTP status code
// carried in the same `CouchError::code` field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub enum InternalErrorCode {
    /// No response was received from the server: the connection could not
    /// be established, was dropped, or timed out.
    InternalError = -1,

    /// A document could not be serialized into a request body. No request
    /// was sent.
    InvalidDocument = -2,

    /// The application passed an illegal argument, or the client
    /// configuration is incomplete.
    IllegalArgument = -3,

    /// The server answered with an accepted status code, but the body did not
    /// have the expected shape.
    BadResponse = -4,
}

impl InternalErrorCode {
    /// The standard description for this code.
    pub fn description(&self) -> &'static str {
        match self {
            InternalErrorCode::InternalError => "Internal error: no response received from server",
            InternalErrorCode::InvalidDocument => "Invalid document: could not be serialized",
            InternalErrorCode::IllegalArgument => "Illegal argument",
            InternalErrorCode::BadResponse => "Bad response: unexpected response body",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_codes_are_outside_http_range() {
        let e = CouchError::internal(InternalErrorCode::InternalError);
        assert_eq!(e.http_status(), None);
        assert_eq!(e.internal_code(), Some(InternalErrorCode::InternalError));
        assert_eq!(e.description, InternalErrorCode::InternalError.description());
    }

    #[test]
    fn http_codes_classify() {
        let e = CouchError::new(404, "Not Found");
        assert_eq!(e.http_status(), Some(404));
        assert_eq!(e.internal_code(), None);
        assert!(e.is_not_found());
        assert!(!e.is_conflict());
        assert!(CouchError::new(409, "Conflict").is_conflict());
    }

    #[test]
    fn context_is_shown_in_display() {
        let e = CouchError::new(409, "Error: conflict, reason: Document update conflict.")
            .with_context(Some("doc1"), Some("1-abc"));
        let s = e.to_string();
        assert!(s.contains("code=409"));
        assert!(s.contains("id=doc1"));
        assert!(s.contains("rev=1-abc"));
    }

    #[test]
    fn ia_err_uses_illegal_argument() {
        let r: Result<(), CouchError> = ia_err!("bad value {}", 7);
        let e = r.unwrap_err();
        assert_eq!(e.internal_code(), Some(InternalErrorCode::IllegalArgument));
        assert!(e.description.starts_with("bad value 7"));
    }
}
