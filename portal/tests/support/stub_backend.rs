//! Scripted portal backend served by Actix on a local port.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Tests run their client code inside the
//! same `LocalSet` while the server's worker serves requests.

use std::future::Future;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use tokio::runtime::Builder;
use tokio::task::LocalSet;
use url::Url;

/// Canned reply for one endpoint.
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubReply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Request captured by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Replies per endpoint plus the request log.
#[derive(Debug)]
pub struct StubState {
    register: Mutex<StubReply>,
    login: Mutex<StubReply>,
    verify: Mutex<StubReply>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for StubState {
    fn default() -> Self {
        Self {
            register: Mutex::new(StubReply::json(201, r#"{"id":"member-1"}"#)),
            login: Mutex::new(StubReply::json(200, r#"{"token":"issued-token"}"#)),
            verify: Mutex::new(StubReply::json(200, r#"{"valid":true}"#)),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl StubState {
    pub fn reply_to_register(&self, reply: StubReply) {
        *self.register.lock().expect("register reply lock") = reply;
    }

    pub fn reply_to_login(&self, reply: StubReply) {
        *self.login.lock().expect("login reply lock") = reply;
    }

    pub fn reply_to_verify(&self, reply: StubReply) {
        *self.verify.lock().expect("verify reply lock") = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log lock").clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    fn reply_for(&self, path: &str) -> Option<StubReply> {
        let slot = match path {
            "/api/users/register" => &self.register,
            "/api/auth/login" => &self.login,
            "/api/auth/verify" => &self.verify,
            _ => return None,
        };
        Some(slot.lock().expect("reply lock").clone())
    }
}

/// Running stub server.
pub struct StubBackend {
    pub state: Arc<StubState>,
    base_url: Url,
    handle: ServerHandle,
}

impl StubBackend {
    /// Start serving on an ephemeral port. Must be called inside a `LocalSet`.
    pub fn start() -> Self {
        let state = Arc::new(StubState::default());
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");

        let data = web::Data::from(Arc::clone(&state));
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .app_data(web::PayloadConfig::new(4 * 1024 * 1024))
                .default_service(web::to(respond))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on stub socket")
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            state,
            base_url: Url::parse(&format!("http://{addr}/")).expect("stub url"),
            handle,
        }
    }

    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn respond(request: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let path = request.path().to_owned();
    state
        .requests
        .lock()
        .expect("request log lock")
        .push(RecordedRequest {
            method: request.method().to_string(),
            path: path.clone(),
            content_type: header("content-type"),
            authorization: header("authorization"),
            body: body.to_vec(),
        });

    let Some(reply) = state.reply_for(&path) else {
        return HttpResponse::NotFound().finish();
    };
    if !reply.delay.is_zero() {
        actix_web::rt::time::sleep(reply.delay).await;
    }
    let status = StatusCode::from_u16(reply.status).expect("valid stub status");
    HttpResponse::build(status)
        .content_type("application/json")
        .body(reply.body)
}

/// Run `test` on a current-thread runtime inside a `LocalSet`.
pub fn run_local<F, Fut>(test: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    local.block_on(&runtime, test());
}

/// Address nothing listens on.
pub fn unreachable_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    Url::parse(&format!("http://{addr}/")).expect("unreachable url")
}
