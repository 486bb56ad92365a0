//! Loopback Engine.IO long-polling server for transport tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};

pub(crate) const POLLING_OPEN: &str =
    r#"0{"sid":"poll1","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000}"#;

#[derive(Clone)]
struct Shared {
    polls: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    posts: mpsc::UnboundedSender<String>,
}

/// Serves `/socket.io/` over plain HTTP. WebSocket upgrades are refused.
pub(crate) struct PollingServer {
    pub port: u16,

    /// Bodies handed out, in order, to long-polls that carry a session id
    polls: mpsc::UnboundedSender<String>,

    posts: mpsc::UnboundedReceiver<String>,
}

impl PollingServer {
    pub async fn start() -> Self {
        let (polls_tx, polls_rx) = mpsc::unbounded_channel();
        let (posts_tx, posts_rx) = mpsc::unbounded_channel();
        let shared = Shared {
            polls: Arc::new(Mutex::new(polls_rx)),
            posts: posts_tx,
        };

        let app = Router::new()
            .route("/socket.io/", get(poll).post(post))
            .with_state(shared);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            port,
            polls: polls_tx,
            posts: posts_rx,
        }
    }

    /// Queue a body for the next long-poll
    pub fn respond(&self, body: &str) {
        self.polls.send(body.to_string()).unwrap();
    }

    /// Next body the client POSTed
    pub async fn next_post(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.posts.recv())
            .await
            .expect("timed out waiting for a POST")
            .expect("server stopped")
    }
}

async fn poll(
    State(shared): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<String, StatusCode> {
    if query.get("transport").map(String::as_str) != Some("polling") {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !query.contains_key("sid") {
        return Ok(POLLING_OPEN.to_string());
    }

    let mut polls = shared.polls.lock().await;
    Ok(polls.recv().await.unwrap_or_else(|| "1".to_string()))
}

async fn post(State(shared): State<Shared>, body: String) -> &'static str {
    let _ = shared.posts.send(body);
    "ok"
}
