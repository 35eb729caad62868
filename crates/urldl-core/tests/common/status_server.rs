//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed responses per request path. Unknown paths get 404. A route can
//! announce a longer `Content-Length` than it sends to simulate a connection
//! that drops mid-body, or hold the connection open without sending more.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u32,
    pub body: Vec<u8>,
    /// Overrides the `Content-Length` header (body is still sent as-is).
    pub declared_len: Option<usize>,
    pub location: Option<String>,
    /// Keeps the connection open this long after the body is sent.
    pub stall: Option<Duration>,
}

impl Route {
    pub fn ok(body: &[u8]) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u32, body: &[u8]) -> Self {
        Self {
            status,
            body: body.to_vec(),
            declared_len: None,
            location: None,
            stall: None,
        }
    }

    pub fn truncated(body: &[u8], declared_len: usize) -> Self {
        Self {
            declared_len: Some(declared_len),
            ..Self::ok(body)
        }
    }

    /// Sends `body` of a `declared_len` response, then goes silent for `stall`.
    pub fn stalled(body: &[u8], declared_len: usize, stall: Duration) -> Self {
        Self {
            stall: Some(stall),
            ..Self::truncated(body, declared_len)
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Self::status(302, b"")
        }
    }
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| (path.to_string(), route))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/file.txt", port)
}

fn reason(status: u32) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    // Routes are keyed by path only; the query string is ignored.
    let path = path.split('?').next().unwrap_or(path);

    let not_found = Route::status(404, b"not found");
    let route = routes.get(path).unwrap_or(&not_found);
    let location = route
        .location
        .as_deref()
        .map(|l| format!("Location: {}\r\n", l))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        route.status,
        reason(route.status),
        route.declared_len.unwrap_or(route.body.len()),
        location
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&route.body);
    let _ = stream.flush();
    if let Some(stall) = route.stall {
        thread::sleep(stall);
    }
}
