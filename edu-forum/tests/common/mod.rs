//! A fake Moodle site with an OpenAI-compatible completion endpoint.

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
use edu_forum::{
    config::{AiConfig, Config, Token},
    ForumTools,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TOKEN: &str = "6191f7ea9da0a4aed1cc9ddb23bf4aa7";

type Call = HashMap<String, String>;

#[derive(Clone)]
struct Shared {
    replies: Arc<Mutex<HashMap<String, (StatusCode, Value)>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    completion: Arc<Mutex<(StatusCode, Value)>>,
    completion_requests: Arc<Mutex<Vec<Value>>>,
}

pub struct FakeSite {
    addr: SocketAddr,
    shared: Shared,
}

impl FakeSite {
    pub async fn start() -> Self {
        let shared = Shared {
            replies: Arc::default(),
            calls: Arc::default(),
            completion: Arc::new(Mutex::new((StatusCode::OK, json!({})))),
            completion_requests: Arc::default(),
        };
        let app = Router::new()
            .route("/webservice/rest/server.php", post(web_service))
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Self { addr, shared }
    }

    pub fn config(&self) -> Config {
        Config::new(format!("http://{}", self.addr), Token::new(TOKEN))
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            api_key: "sk-test".to_string(),
            model: "test-model".to_string(),
            base_url: format!("http://{}/v1/", self.addr),
        }
    }

    pub fn tools(&self) -> ForumTools {
        ForumTools::new(self.config())
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

    pub fn complete_with(&self, status: StatusCode, body: Value) {
        *self.shared.completion.lock().unwrap() = (status, body);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().unwrap().clone()
    }

    /// The web service functions called so far, in order.
    pub fn functions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.get("wsfunction").cloned().unwrap_or_default())
            .collect()
    }

    pub fn completion_requests(&self) -> Vec<Value> {
        self.shared.completion_requests.lock().unwrap().clone()
    }
}

async fn web_service(State(shared): State<Shared>, Form(form): Form<Call>) -> Response {
    let function = form.get("wsfunction").cloned().unwrap_or_default();
    shared.calls.lock().unwrap().push(form);
    let reply = shared.replies.lock().unwrap().get(&function).cloned();
    match reply {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => Json(json!({
            "exception": "dml_missing_record_exception",
            "errorcode": "invalidrecord",
            "message": format!("No reply configured for {function}")
        }))
        .into_response(),
    }
}

async fn chat_completions(State(shared): State<Shared>, Json(request): Json<Value>) -> Response {
    shared.completion_requests.lock().unwrap().push(request);
    let (status, body) = shared.completion.lock().unwrap().clone();
    (status, Json(body)).into_response()
}

pub fn course_json(id: u64) -> Value {
    json!({
        "id": id,
        "fullname": "Biology &amp; Ecology",
        "displayname": "Biology & Ecology",
        "shortname": "BIO",
        "categoryid": 2,
        "categoryname": "Science",
        "visible": 1,
        "startdate": 1725148800,
        "enddate": 0,
        "summary": "<p>Cells, <b>plants</b> and animals.</p>",
        "summaryformat": 1,
        "format": "topics",
        "lang": "en",
        "enrollmentmethods": ["manual", "self"]
    })
}

pub fn post_json(id: u64, author: &str, message: &str) -> Value {
    json!({
        "id": id,
        "discussionid": 12,
        "subject": "Exam",
        "message": message,
        "author": { "id": 3, "fullname": author },
        "timecreated": 1029801600
    })
}
