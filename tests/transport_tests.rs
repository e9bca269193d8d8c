//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use couchdb_rust_sdk::*;
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::Duration;

// What the local server saw on the wire.
#[derive(Debug, Default)]
struct Captured {
    request_line: String,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

// Serve a single HTTP/1.1 exchange on a random local port, answering with
// the given raw response head and body. The join handle yields the request.
fn serve_once(head: &str, body: &str) -> Result<(String, JoinHandle<Captured>), Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let response = format!(
        "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        head,
        body.len(),
        body
    );
    let server = std::thread::spawn(move || {
        let mut cap = Captured::default();
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        reader.read_line(&mut cap.request_line).unwrap();
        cap.request_line = cap.request_line.trim_end().to_string();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                cap.headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
            }
        }
        let len: usize = cap
            .headers
            .get("content-length")
            .map(|v| v.parse().unwrap())
            .unwrap_or(0);
        cap.body = vec![0; len];
        reader.read_exact(&mut cap.body).unwrap();
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        cap
    });
    Ok((format!("http://{}", addr), server))
}

fn handle_for(endpoint: &str) -> Result<Handle, CouchError> {
    Handle::builder()
        .endpoint(endpoint)?
        .timeout(Duration::from_secs(5))?
        .build()
}

// An address nothing is listening on.
fn closed_endpoint() -> Result<String, Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn put_document_on_the_wire() -> Result<(), Box<dyn Error>> {
    let (url, server) = serve_once(
        "HTTP/1.1 201 Created\r\nContent-Type: application/json",
        r#"{"ok":true,"id":"doc1","rev":"1-a"}"#,
    )?;
    let endpoint = url.replace("http://", "http://ad%40min:p%3Aw@");
    let h = handle_for(&endpoint)?;

    let res = PutDocumentRequest::create("db")
        .id("doc1")
        .document(&json!({"color": "red"}))?
        .execute(&h)
        .await?;
    assert_eq!(res.revision(), Some("1-a"));

    let cap = server.join().unwrap();
    assert_eq!(cap.request_line, "PUT /db/doc1 HTTP/1.1");
    assert_eq!(
        cap.headers.get("authorization").map(String::as_str),
        Some(Credentials::new("ad@min", "p:w").basic_auth_header().as_str())
    );
    assert_eq!(cap.headers.get("content-type").map(String::as_str), Some("application/json"));
    assert_eq!(cap.headers.get("accept").map(String::as_str), Some("application/json"));
    let sent: serde_json::Value = serde_json::from_slice(&cap.body)?;
    assert_eq!(sent, json!({"color": "red"}));
    Ok(())
}

#[tokio::test]
async fn attachment_bytes_on_the_wire() -> Result<(), Box<dyn Error>> {
    let (url, server) = serve_once(
        "HTTP/1.1 201 Created\r\nContent-Type: application/json",
        r#"{"ok":true,"id":"doc1","rev":"2-b"}"#,
    )?;
    let h = handle_for(&url)?;

    let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x00, 0xff];
    let res = PutAttachmentRequest::new("db", "doc1", "logo.png")
        .rev("1-a")
        .data(png.to_vec(), "image/png")
        .execute(&h)
        .await?;
    assert_eq!(res.revision(), Some("2-b"));

    let cap = server.join().unwrap();
    assert_eq!(cap.request_line, "PUT /db/doc1/logo.png?rev=1-a HTTP/1.1");
    assert_eq!(cap.headers.get("content-type").map(String::as_str), Some("image/png"));
    assert!(!cap.headers.contains_key("authorization"));
    assert_eq!(cap.body, png);
    Ok(())
}

#[tokio::test]
async fn response_keeps_repeated_headers() -> Result<(), Box<dyn Error>> {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
         Set-Cookie: AuthSession=abc; Version=1; Path=/; HttpOnly\r\n\
         Set-Cookie: route=n2; Path=/",
        r#"{"ok":true,"name":"jan","roles":[]}"#,
    )?;
    let h = handle_for(&url)?;

    let login = LoginRequest::new("jan", "pw").execute(&h).await?;
    assert_eq!(login.cookie(), Some("abc"));

    let cap = server.join().unwrap();
    assert_eq!(cap.request_line, "POST /_session HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_slice(&cap.body)?;
    assert_eq!(sent, json!({"name": "jan", "password": "pw"}));
    Ok(())
}

#[tokio::test]
async fn error_status_is_not_a_transport_failure() -> Result<(), Box<dyn Error>> {
    let (url, server) = serve_once(
        "HTTP/1.1 404 Object Not Found\r\nContent-Type: application/json",
        r#"{"error":"not_found","reason":"missing"}"#,
    )?;
    let h = handle_for(&url)?;

    let e = GetAttachmentRequest::new("db", "doc1", "logo.png")
        .execute(&h)
        .await
        .unwrap_err();
    assert_eq!(e.http_status(), Some(404));
    assert_eq!(e.document_id.as_deref(), Some("doc1"));
    server.join().unwrap();
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_internal_error() -> Result<(), Box<dyn Error>> {
    let h = handle_for(&closed_endpoint()?)?;
    let e = ServerInfoRequest::new().execute(&h).await.unwrap_err();
    assert_eq!(e.internal_code(), Some(InternalErrorCode::InternalError));
    Ok(())
}

#[tokio::test]
async fn invalid_header_value_is_illegal_argument() -> Result<(), Box<dyn Error>> {
    // rejected before any connection is attempted
    let h = handle_for(&closed_endpoint()?)?;
    let e = PutAttachmentRequest::new("db", "doc1", "note.txt")
        .data("hello", "text/plain\r\nX-Injected: 1")
        .execute(&h)
        .await
        .unwrap_err();
    assert_eq!(e.internal_code(), Some(InternalErrorCode::IllegalArgument));
    assert_eq!(e.document_id.as_deref(), Some("doc1"));
    Ok(())
}
