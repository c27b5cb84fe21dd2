//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust,no_run
//! use test_support::{init_tracing, MockServer};
//!
//! init_tracing();
//! let server = MockServer::start();
//! server.on("files/KEY", 200, r#"{"name":"Core"}"#);
//! let _base = server.api_base();
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::env;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

pub const BIN: &str = "figma-library-report";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// The CLI binary as a ready-to-run `assert_cmd::Command`.
pub fn cmd_bin() -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(BIN).expect("binary target not found")
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut prev = Vec::with_capacity(kv.len());
        for (k, v) in kv {
            let k_owned = k.to_string();
            prev.push((k_owned.clone(), env::var(k).ok()));
            env::set_var(k, v);
        }
        Self { prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, old) in self.prev.drain(..) {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

// --- Local HTTP stand-in for the Figma API ---

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string, e.g. `/v1/files/KEY?x=1`.
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        let (_, query) = self.target.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.replace("%3A", ":").replace("%2F", "/"))
    }
}

struct Route {
    needle: String,
    status: u16,
    body: String,
    sticky: bool,
}

#[derive(Default)]
struct State {
    routes: Vec<Route>,
    seen: Vec<RecordedRequest>,
}

/// Serves canned responses on 127.0.0.1. Routes match when the request target
/// contains their needle; the first match wins. `once` routes are consumed,
/// `on` routes answer every time. Unmatched requests get a 404.
pub struct MockServer {
    addr: String,
    state: Arc<Mutex<State>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr").to_string();
        let state = Arc::new(Mutex::new(State::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let state = Arc::clone(&state);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        serve(stream, &state);
                    }
                }
            })
        };

        Self {
            addr,
            state,
            stop,
            handle: Some(handle),
        }
    }

    /// Value for `--api-base` / `FIGMA_API_BASE`.
    pub fn api_base(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn on(&self, needle: &str, status: u16, body: &str) -> &Self {
        self.push(needle, status, body, true)
    }

    pub fn once(&self, needle: &str, status: u16, body: &str) -> &Self {
        self.push(needle, status, body, false)
    }

    pub fn on_json(&self, needle: &str, body: serde_json::Value) -> &Self {
        self.on(needle, 200, &body.to_string())
    }

    pub fn once_json(&self, needle: &str, body: serde_json::Value) -> &Self {
        self.once(needle, 200, &body.to_string())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().seen.clone()
    }

    fn push(&self, needle: &str, status: u16, body: &str, sticky: bool) -> &Self {
        self.state.lock().unwrap().routes.push(Route {
            needle: needle.to_string(),
            status,
            body: body.to_string(),
            sticky,
        });
        self
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // Wake the accept loop so it can observe the stop flag.
        let _ = TcpStream::connect(&self.addr);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn serve(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }

    let text = String::from_utf8_lossy(&raw).to_string();
    let mut lines = text.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    if method.is_empty() {
        return;
    }

    tracing::debug!(%method, %target, "mock request");

    let (status, body) = {
        let mut st = state.lock().unwrap();
        st.seen.push(RecordedRequest {
            method,
            target: target.clone(),
            headers,
        });

        match st.routes.iter().position(|r| target.contains(&r.needle)) {
            Some(i) if st.routes[i].sticky => (st.routes[i].status, st.routes[i].body.clone()),
            Some(i) => {
                let r = st.routes.remove(i);
                (r.status, r.body)
            }
            None => (404, r#"{"status":404,"err":"Not found"}"#.to_string()),
        }
    };

    let reason = match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    let resp = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(resp.as_bytes());
    let _ = stream.flush();
}
