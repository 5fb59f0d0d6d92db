//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths. GET honours `Range: bytes=N-` with 206 unless
//! ranges are disabled or misaligned; paths can be told to answer 500 a number
//! of times before succeeding, or to stall before every response. Every
//! request is counted per path along with the range offset it asked for.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Route {
    body: Vec<u8>,
    content_type: &'static str,
    /// Remaining 500 responses before the body is served.
    failures: u32,
    /// Stall before answering each GET.
    delay: Duration,
}

impl Route {
    fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: "application/octet-stream",
            failures: 0,
            delay: Duration::ZERO,
        }
    }
}

/// How GET answers a `Range` request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RangeMode {
    #[default]
    Honour,
    /// 200 with the full body.
    Ignore,
    /// 206 with the full body and `Content-Range: bytes 0-…`.
    FromZero,
}

#[derive(Debug, Default)]
struct State {
    routes: Mutex<HashMap<String, Route>>,
    /// Per path: range start of every GET (0 when no Range header).
    gets: Mutex<HashMap<String, Vec<u64>>>,
    range_mode: RangeMode,
}

#[derive(Debug, Default)]
pub struct Builder {
    routes: HashMap<String, Route>,
    range_mode: RangeMode,
}

impl Builder {
    pub fn route(mut self, path: &str, body: Vec<u8>) -> Self {
        self.routes.insert(path.to_string(), Route::new(body));
        self
    }

    pub fn typed_route(mut self, path: &str, body: Vec<u8>, content_type: &'static str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                content_type,
                ..Route::new(body)
            },
        );
        self
    }

    /// Answer 500 for the first `failures` GETs of `path`.
    pub fn flaky_route(mut self, path: &str, body: Vec<u8>, failures: u32) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                failures,
                ..Route::new(body)
            },
        );
        self
    }

    /// Wait `delay` before answering each GET of `path`; the first
    /// `failures` answers are 500s.
    pub fn slow_route(mut self, path: &str, body: Vec<u8>, delay: Duration, failures: u32) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                failures,
                delay,
                ..Route::new(body)
            },
        );
        self
    }

    /// Always answer 200 with the full body, whatever the Range header says.
    pub fn ignore_ranges(mut self) -> Self {
        self.range_mode = RangeMode::Ignore;
        self
    }

    /// Answer Range requests with 206 but send the whole body from byte 0.
    pub fn ranges_from_zero(mut self) -> Self {
        self.range_mode = RangeMode::FromZero;
        self
    }

    /// Start serving in a background thread. Runs until the process exits.
    pub fn start(self) -> SegmentServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State {
            routes: Mutex::new(self.routes),
            gets: Mutex::new(HashMap::new()),
            range_mode: self.range_mode,
        });
        let server_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&server_state);
                thread::spawn(move || handle(stream, &state));
            }
        });
        SegmentServer {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }
}

pub struct SegmentServer {
    base: String,
    state: Arc<State>,
}

impl SegmentServer {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Absolute URL of `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of GET requests received for `path`.
    pub fn gets(&self, path: &str) -> usize {
        self.range_starts(path).len()
    }

    /// Range start of each GET for `path`, in arrival order.
    pub fn range_starts(&self, path: &str) -> Vec<u64> {
        self.state
            .gets
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, range_start) = parse_request(request);

    let (route, delay) = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(route) if method == "GET" && route.failures > 0 => {
                route.failures -= 1;
                (None, route.delay)
            }
            Some(route) => (Some(route.clone()), route.delay),
            None => {
                let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                return;
            }
        }
    };
    if method == "GET" {
        state
            .gets
            .lock()
            .unwrap()
            .entry(path.clone())
            .or_default()
            .push(range_start.unwrap_or(0));
    }
    if method == "GET" && !delay.is_zero() {
        thread::sleep(delay);
    }
    let Some(route) = route else {
        let _ = stream.write_all(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    };

    let total = route.body.len() as u64;
    let accept = if state.range_mode == RangeMode::Ignore {
        ""
    } else {
        "Accept-Ranges: bytes\r\n"
    };
    if method == "HEAD" {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: {}\r\n{}Connection: close\r\n\r\n",
            total, route.content_type, accept
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let (status, extra, slice) = match range_start.filter(|_| state.range_mode != RangeMode::Ignore) {
        Some(_) if state.range_mode == RangeMode::FromZero => (
            "206 Partial Content",
            format!("Content-Range: bytes 0-{}/{}\r\n", total.saturating_sub(1), total),
            &route.body[..],
        ),
        Some(start) if start >= total => (
            "416 Range Not Satisfiable",
            format!("Content-Range: bytes */{}\r\n", total),
            &route.body[0..0],
        ),
        Some(start) => (
            "206 Partial Content",
            format!("Content-Range: bytes {}-{}/{}\r\n", start, total - 1, total),
            &route.body[start as usize..],
        ),
        None => ("200 OK", String::new(), &route.body[..]),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: {}\r\n{}{}Connection: close\r\n\r\n",
        status,
        slice.len(),
        route.content_type,
        extra,
        accept
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

/// Returns (method, path, start of `Range: bytes=N-`).
fn parse_request(request: &str) -> (String, String, Option<u64>) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_ascii_uppercase();
    let path = first.next().unwrap_or("/").to_string();
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = value
                    .trim()
                    .strip_prefix("bytes=")
                    .and_then(|v| v.split_once('-'))
                    .and_then(|(start, _)| start.trim().parse().ok());
            }
        }
    }
    (method, path, range)
}
