//! Stand-ins for the external fingerprinting tool and the AcoustID API

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Write an executable script that prints `stdout` and exits with `exit_code`
#[cfg(unix)]
pub fn fake_fpcalc(dir: &Path, stdout: &str, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-fpcalc.sh");
    let script = format!("#!/bin/sh\ncat <<'JSON'\n{}\nJSON\nexit {}\n", stdout, exit_code);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Running mock AcoustID lookup endpoint
pub struct MockAcoustId {
    pub addr: SocketAddr,
    /// Query strings received, in arrival order
    pub requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl MockAcoustId {
    pub fn lookup_url(&self) -> String {
        format!("http://{}/v2/lookup", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct MockState {
    body: Value,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn lookup_handler(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.requests.lock().unwrap().push(params);
    Json(state.body.clone())
}

/// Serve `body` for every lookup on an ephemeral local port
pub async fn spawn_mock_acoustid(body: Value) -> MockAcoustId {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        body,
        requests: requests.clone(),
    };

    let app = Router::new()
        .route("/v2/lookup", get(lookup_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockAcoustId { addr, requests }
}

/// A successful lookup response with one recording
pub fn single_match_body(title: &str, artists: &[&str], album: &str) -> Value {
    json!({
        "status": "ok",
        "results": [{
            "id": "9ff43b6a-4f16-427c-93c2-92307ca505e0",
            "score": 0.97,
            "recordings": [{
                "id": "cd2e7c47-16f5-46c6-a37c-a1eb7bf599ff",
                "title": title,
                "artists": artists.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
                "releases": [{ "title": album }]
            }]
        }]
    })
}
