#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use rtimetracker::core::clock::FixedClock;
use rtimetracker::core::tracker::Tracker;
use rtimetracker::db::SqliteGateway;
use rtimetracker::models::settings::Settings;
use rtimetracker::server::{AppState, SessionStore, router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn rti() -> Command {
    cargo_bin_cmd!("rtimetracker")
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
}

/// Temporary directory holding a fresh database path.
pub fn temp_db() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir
        .path()
        .join("rtimetracker.sqlite")
        .to_string_lossy()
        .to_string();
    (dir, db_path)
}

pub fn temp_out(dir: &TempDir, name: &str) -> String {
    let p: PathBuf = dir.path().join(name);
    p.to_string_lossy().to_string()
}

/// A tracker over a temporary SQLite database, driven by a fixed clock.
pub struct TestEnv {
    pub dir: TempDir,
    pub db_path: String,
    pub clock: Arc<FixedClock>,
    pub gateway: Arc<SqliteGateway>,
    pub tracker: Arc<Tracker>,
}

pub fn test_env(now: DateTime<Utc>) -> TestEnv {
    test_env_in(now, Tz::UTC)
}

pub fn test_env_in(now: DateTime<Utc>, tz: Tz) -> TestEnv {
    let (dir, db_path) = temp_db();
    let gateway =
        Arc::new(SqliteGateway::open(&db_path, Settings::default(), "admin", tz).expect("open db"));
    let clock = Arc::new(FixedClock::new(now, tz));
    let tracker = Arc::new(Tracker::new(gateway.clone(), clock.clone()));

    TestEnv {
        dir,
        db_path,
        clock,
        gateway,
        tracker,
    }
}

impl TestEnv {
    pub fn app_state(&self) -> AppState {
        AppState::new(self.tracker.clone(), SessionStore::new(Duration::hours(12)))
    }
}

// ---------------------------
// HTTP helpers
// ---------------------------

pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    addr
}

pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head
            .lines()
            .find(|l| l.to_ascii_lowercase().starts_with(&prefix))
            .map(|l| l[prefix.len()..].trim().to_string())
    }

    /// `name=value` of the session cookie set by this response.
    pub fn session_cookie(&self) -> Option<String> {
        let raw = self.header("set-cookie")?;
        raw.split(';').next().map(|s| s.trim().to_string())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

pub async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<&str>,
) -> RawResponse {
    let mut request = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(c) = cookie {
        request.push_str(&format!("Cookie: {c}\r\n"));
    }
    let payload = body.unwrap_or("");
    if body.is_some() {
        request.push_str("Content-Type: application/json\r\n");
    }
    request.push_str(&format!("Content-Length: {}\r\n\r\n{payload}", payload.len()));

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.expect("read");
    let text = String::from_utf8_lossy(&buf).to_string();

    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status code");

    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

pub async fn login(addr: SocketAddr, user: &str, password: &str) -> String {
    let body = format!(r#"{{"username":"{user}","password":"{password}"}}"#);
    let resp = send(addr, "POST", "/login", None, Some(&body)).await;
    assert_eq!(resp.status, 200, "login failed: {}", resp.body);
    resp.session_cookie().expect("session cookie")
}
