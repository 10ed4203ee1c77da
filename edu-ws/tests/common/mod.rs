//! A fake Moodle web service endpoint.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

pub type Call = HashMap<String, String>;

#[derive(Clone, Default)]
struct Shared {
    replies: Arc<Mutex<HashMap<String, (StatusCode, Value)>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

pub struct FakeMoodle {
    addr: SocketAddr,
    shared: Shared,
}

impl FakeMoodle {
    pub async fn start() -> Self {
        let shared = Shared::default();
        let app = Router::new()
            .route("/webservice/rest/server.php", post(handle))
            .with_state(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Self { addr, shared }
    }

    pub fn site_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn reply(&self, function: &str, body: Value) {
        self.reply_with_status(function, StatusCode::OK, body);
    }

    pub fn reply_with_status(&self, function: &str, status: StatusCode, body: Value) {
        self.shared
            .replies
            .lock()
            .unwrap()
            .insert(function.to_string(), (status, body));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().unwrap().clone()
    }

    pub fn functions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.get("wsfunction").cloned().unwrap_or_default())
            .collect()
    }
}

async fn handle(State(shared): State<Shared>, Form(form): Form<Call>) -> Response {
    let function = form.get("wsfunction").cloned().unwrap_or_default();
    shared.calls.lock().unwrap().push(form);
    let reply = shared.replies.lock().unwrap().get(&function).cloned();
    match reply {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, "no reply configured").into_response(),
    }
}
