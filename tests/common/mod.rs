#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Form, Json, Router};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use instagram_client::{Config, HttpRequest, InstagramError, Transport};
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub const TOKEN: &str = "TOKEN";

pub fn config(api_root: &str) -> Config {
    Config::builder()
        .access_token(TOKEN)
        .client_id("client")
        .api_root(api_root)
        .build()
}

type Reply = Result<String, InstagramError>;

/// In-memory transport. Requests whose URL contains a canned fragment are
/// answered at once; all others are held until the test completes them.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    canned: Vec<(String, String)>,
    sent: Vec<HttpRequest>,
    held: Vec<Option<oneshot::Sender<Reply>>>,
}

impl FakeTransport {
    pub fn reply(&self, url_fragment: &str, body: &str) {
        let mut state = self.state.lock().unwrap();
        state.canned.push((url_fragment.to_owned(), body.to_owned()));
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Completes the `index`-th held request.
    pub fn complete(&self, index: usize, body: &str) {
        self.finish(index, Ok(body.to_owned()));
    }

    pub fn fail(&self, index: usize, error: InstagramError) {
        self.finish(index, Err(error));
    }

    fn finish(&self, index: usize, reply: Reply) {
        let sender = self.state.lock().unwrap().held[index]
            .take()
            .expect("request already completed");
        let _ = sender.send(reply);
    }

    fn canned_for(&self, request: &HttpRequest) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(request.clone());
        state
            .canned
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, body)| body.clone())
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'static, Result<String, InstagramError>> {
        if let Some(body) = self.canned_for(&request) {
            return futures_util::future::ready(Ok(body)).boxed();
        }

        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().held.push(Some(tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(InstagramError::Network("request dropped".to_owned())))
        }
        .boxed()
    }

    fn send_blocking(&self, request: &HttpRequest) -> Result<String, InstagramError> {
        self.canned_for(request)
            .ok_or_else(|| InstagramError::Network(format!("no reply for {}", request.url)))
    }
}

/// Mock of the API on an ephemeral port. Returns the API root to configure.
pub fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, mock_api(addr)).await
        })
        .unwrap();
    });

    format!("http://{addr}/v1/")
}

type Params = Query<HashMap<String, String>>;

fn mock_api(addr: SocketAddr) -> Router {
    Router::new()
        .route("/v1/users/:who/", get(user))
        .route(
            "/v1/users/:who/relationship",
            get(relationship).post(change_relationship),
        )
        .route("/v1/media/popular", get(popular))
        .route("/v1/media/:id", get(media))
        .route("/v1/tags/:name", get(tag))
        .with_state(addr)
}

fn authorized(params: &HashMap<String, String>) -> Result<(), (StatusCode, Json<Value>)> {
    if params.get("access_token").map(String::as_str) == Some(TOKEN) {
        return Ok(());
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({
            "meta": {
                "error_type": "OAuthAccessTokenException",
                "code": 400,
                "error_message": "The access_token provided is invalid."
            }
        })),
    ))
}

async fn user(
    Path(who): Path<String>,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&params)?;
    let id = if who == "self" { "1574083" } else { who.as_str() };
    Ok(Json(json!({
        "meta": { "code": 200 },
        "data": {
            "id": id,
            "username": "snoopdogg",
            "full_name": "Snoop Dogg",
            "counts": { "media": 1320, "follows": 420, "followed_by": 3410 }
        }
    })))
}

async fn relationship(
    Path(_who): Path<String>,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&params)?;
    Ok(Json(json!({
        "meta": { "code": 200 },
        "data": { "outgoing_status": "none", "incoming_status": "requested_by" }
    })))
}

async fn change_relationship(
    Path(_who): Path<String>,
    Query(params): Params,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&params)?;
    let outgoing = match form.get("action").map(String::as_str) {
        Some("follow") => "follows",
        Some("block") => "blocked",
        _ => "none",
    };
    Ok(Json(json!({
        "meta": { "code": 200 },
        "data": { "outgoing_status": outgoing, "incoming_status": "none" }
    })))
}

async fn media(
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&params)?;
    Ok(Json(json!({
        "meta": { "code": 200 },
        "data": {
            "id": id,
            "type": "image",
            "images": { "thumbnail": { "url": "http://x", "width": 150, "height": 150 } }
        }
    })))
}

/// Two pages of two posts each.
async fn popular(
    State(addr): State<SocketAddr>,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&params)?;
    let body = match params.get("max_id").map(String::as_str) {
        None => json!({
            "meta": { "code": 200 },
            "pagination": {
                "next_max_id": "2",
                "next_url": format!("http://{addr}/v1/media/popular?access_token={TOKEN}&max_id=2")
            },
            "data": [ { "id": "p1", "type": "image" }, { "id": "p2", "type": "video" } ]
        }),
        Some(_) => json!({
            "meta": { "code": 200 },
            "pagination": {},
            "data": [ { "id": "p3" }, { "id": "p4" } ]
        }),
    };
    Ok(Json(body))
}

async fn tag(
    Path(name): Path<String>,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&params)?;
    Ok(Json(json!({
        "meta": { "code": 200 },
        "data": { "name": name, "media_count": 7 }
    })))
}
