//! 测试用文件服务器
//!
//! 只实现客户端依赖的接口：按约定解码上传载荷、按状态码响应删除。

#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use fszrun_core::transfer::decode_payload;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct StubState {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub requests: Mutex<Vec<Recorded>>,
    pub protected: Mutex<HashSet<String>>,
    /// 上传返回的状态码，默认 200
    pub upload_status: Mutex<Option<u16>>,
    /// 删除返回的状态码，覆盖正常逻辑
    pub delete_status: Mutex<Option<u16>>,
    /// 上传请求到达后等待 `release`
    pub hold: AtomicBool,
    pub arrived: Notify,
    pub release: Notify,
}

impl StubState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn record(&self, method: &'static str, path: String, body: Vec<u8>) {
        self.requests.lock().unwrap().push(Recorded { method, path, body });
    }
}

pub struct StubServer {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
}

impl StubServer {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());

        let app = Router::new()
            .route("/f/", get(|| async { "index" }))
            .route(
                "/f/*path",
                post(handle_upload).delete(handle_delete).get(handle_view),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn handle_upload(
    Path(path): Path<String>,
    State(state): State<Arc<StubState>>,
    body: Bytes,
) -> StatusCode {
    let full = format!("/f/{path}");
    state.record("POST", full.clone(), body.to_vec());

    if state.hold.load(Ordering::SeqCst) {
        state.arrived.notify_one();
        state.release.notified().await;
    }

    let data = match decode_payload(&body) {
        Ok(data) => data,
        Err(_) => return StatusCode::BAD_REQUEST,
    };

    let status = state.upload_status.lock().unwrap().unwrap_or(200);
    if status == 200 {
        state.files.lock().unwrap().insert(full, data);
    }
    StatusCode::from_u16(status).unwrap()
}

async fn handle_delete(
    Path(path): Path<String>,
    State(state): State<Arc<StubState>>,
) -> StatusCode {
    let full = format!("/f/{path}");
    state.record("DELETE", full.clone(), Vec::new());

    if let Some(status) = *state.delete_status.lock().unwrap() {
        return StatusCode::from_u16(status).unwrap();
    }
    if state.protected.lock().unwrap().contains(&full) {
        return StatusCode::FORBIDDEN;
    }
    match state.files.lock().unwrap().remove(&full) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn handle_view(Path(path): Path<String>, State(state): State<Arc<StubState>>) -> String {
    state.record("GET", format!("/f/{path}"), Vec::new());
    format!("listing of {path}")
}
