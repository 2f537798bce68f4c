//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies by path. A route can drop its first N connections
//! without answering (curl reports an empty reply), and every request's
//! headers are recorded.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u32,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Connections to drop before answering.
    pub drop_first: u32,
    /// `Location` header, for redirects.
    pub location: Option<String>,
}

impl Route {
    pub fn ok(content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.to_vec(),
            drop_first: 0,
            location: None,
        }
    }

    /// 302 to `location` (a path on the same server).
    pub fn redirect(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Self::status(302)
        }
    }

    pub fn status(status: u32) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: b"nope".to_vec(),
            drop_first: 0,
            location: None,
        }
    }

    pub fn flaky(mut self, drop_first: u32) -> Self {
        self.drop_first = drop_first;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Route>,
    hits: HashMap<String, u32>,
    requests: Vec<Request>,
}

pub struct ImageServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl ImageServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start<S: Into<String>>(routes: impl IntoIterator<Item = (S, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            routes: routes
                .into_iter()
                .map(|(p, r)| (p.into(), r))
                .collect(),
            ..State::default()
        }));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .hits
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn reason(status: u32) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => parse_request(s),
        Err(_) => return,
    };

    let route = {
        let mut state = state.lock().unwrap();
        let hit = {
            let n = state.hits.entry(request.path.clone()).or_insert(0);
            *n += 1;
            *n
        };
        state.requests.push(request.clone());
        match state.routes.get(&request.path) {
            Some(route) if hit <= route.drop_first => return,
            Some(route) => route.clone(),
            None => Route::status(404),
        }
    };

    let location = route
        .location
        .as_deref()
        .map(|l| format!("Location: {l}\r\n"))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.content_type,
        route.body.len(),
        location
    );
    let _ = stream.write_all(head.as_bytes());
    if !request.method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(&route.body);
    }
}

fn parse_request(raw: &str) -> Request {
    let mut lines = raw.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let path = first.next().unwrap_or("/").to_string();
    let headers = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    Request {
        method,
        path,
        headers,
    }
}
