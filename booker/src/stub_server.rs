//! In-process stand-in for restful-booker, used by tests.

use crate::{
    booking::{Booking, Credentials},
    error::Error,
    util,
};
use hyper::{
    body,
    header::{AUTHORIZATION, CONTENT_TYPE, COOKIE},
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use serde_json::json;
use std::{
    collections::{hash_map::DefaultHasher, BTreeMap, HashSet},
    convert::Infallible,
    future::Future,
    hash::{Hash, Hasher},
    net::{SocketAddr, TcpListener},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
    time::SystemTime,
};
use tokio::{runtime::Runtime, sync::oneshot};
use tracing::{debug, error};

const ADMIN_BASIC_AUTH: &str = "Basic YWRtaW46cGFzc3dvcmQxMjM=";
const SEEDED_BOOKINGS: i64 = 10;

#[derive(Debug)]
struct StubState {
    credentials: Credentials,
    bookings: BTreeMap<i64, Booking>,
    next_id: i64,
    tokens: HashSet<String>,
    requests: usize,
}

impl StubState {
    fn seeded() -> Self {
        let bookings = (1..=SEEDED_BOOKINGS)
            .map(|id| (id, Booking::jim_brown()))
            .collect();

        Self {
            credentials: Credentials::default(),
            bookings,
            next_id: SEEDED_BOOKINGS + 1,
            tokens: HashSet::new(),
            requests: 0,
        }
    }

    fn issue_token(&mut self) -> String {
        let mut hasher = DefaultHasher::new();
        self.tokens.len().hash(&mut hasher);
        SystemTime::now().hash(&mut hasher);
        let token = format!("{:015x}", hasher.finish() & 0x0fff_ffff_ffff_ffff);

        self.tokens.insert(token.clone());
        token
    }

    fn is_authorized(&self, request: &Request<Body>) -> bool {
        let headers = request.headers();

        let by_cookie = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| util::cookie_value(value, "token"))
            .any(|token| self.tokens.contains(token));

        let by_basic_auth = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value == ADMIN_BASIC_AUTH);

        by_cookie || by_basic_auth
    }
}

/// A restful-booker look-alike listening on an ephemeral localhost port.
///
/// Ten bookings are seeded with ids 1 to 10. The server shuts down when dropped.
#[derive(Debug)]
pub struct StubServer {
    address: SocketAddr,
    state: Arc<Mutex<StubState>>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl StubServer {
    pub fn start() -> Result<Self, Error> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;

        let state = Arc::new(Mutex::new(StubState::seeded()));
        let server_state = state.clone();
        let (shutdown, shutdown_receiver) = oneshot::channel::<()>();
        let (ready, ready_receiver) = mpsc::channel::<Result<(), Error>>();

        let join_handle = thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = ready.send(Err(e.into()));
                    return;
                }
            };

            runtime.block_on(async move {
                let builder = match Server::from_tcp(listener) {
                    Ok(builder) => builder,
                    Err(e) => {
                        let _ = ready.send(Err(e.into()));
                        return;
                    }
                };

                let server = builder
                    .serve(make_service_fn(move |_| {
                        let state = server_state.clone();
                        async move {
                            Ok::<_, Infallible>(service_fn(move |request| {
                                handle_request(state.clone(), request)
                            }))
                        }
                    }))
                    .with_graceful_shutdown(async {
                        let _ = shutdown_receiver.await;
                    });

                let _ = ready.send(Ok(()));

                if let Err(e) = server.await {
                    error!("Stub booker server error: {}", e);
                }
            });
        });

        ready_receiver
            .recv()
            .map_err(|_| Error::InvalidConfiguration("stub server thread exited".into()))??;

        debug!("stub booker listening on {}", address);

        Ok(Self {
            address,
            state,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    pub fn booking(&self, id: i64) -> Result<Option<Booking>, Error> {
        Ok(self.state.lock()?.bookings.get(&id).cloned())
    }

    pub fn booking_count(&self) -> Result<usize, Error> {
        Ok(self.state.lock()?.bookings.len())
    }

    pub fn request_count(&self) -> Result<usize, Error> {
        Ok(self.state.lock()?.requests)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                error!("Couldn't gracefully shutdown the stub booker thread");
            }
        }
    }
}

/// Drives an async test body to completion on a fresh multi-threaded runtime.
pub fn run_test<F: Future<Output = ()>>(test: F) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| panic!("Couldn't start the test runtime: {}", e));

    runtime.block_on(test);
}

async fn handle_request(
    state: Arc<Mutex<StubState>>,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    match route(&state, request).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("stub booker failed to answer: {}", e);
            Ok(text(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn route(
    state: &Mutex<StubState>,
    mut request: Request<Body>,
) -> Result<Response<Body>, Error> {
    let body = body::to_bytes(request.body_mut())
        .await
        .map_err(|_| Error::InvalidBody)?;
    let body = String::from_utf8_lossy(&body).into_owned();

    let mut state = state.lock()?;
    state.requests += 1;

    let method = request.method().clone();
    let path = request.uri().path().trim_end_matches('/').to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    debug!("stub booker: {} {}", method, path);

    let response = match (&method, segments.as_slice()) {
        (&Method::GET, ["ping"]) => text(StatusCode::CREATED),

        (&Method::POST, ["auth"]) => match serde_json::from_str::<Credentials>(&body) {
            Ok(credentials) if credentials == state.credentials => {
                let token = state.issue_token();
                json_response(StatusCode::OK, &json!({ "token": token }))?
            }
            _ => json_response(StatusCode::OK, &json!({ "reason": "Bad credentials" }))?,
        },
        (_, ["auth"]) => text(StatusCode::NOT_FOUND),

        (&Method::GET, ["booking"]) => {
            let ids: Vec<_> = state
                .bookings
                .keys()
                .map(|id| json!({ "bookingid": id }))
                .collect();
            json_response(StatusCode::OK, &json!(ids))?
        }

        (&Method::POST, ["booking"]) => match serde_json::from_str::<Booking>(&body) {
            Ok(booking) => {
                let id = state.next_id;
                state.next_id += 1;
                state.bookings.insert(id, booking.clone());
                json_response(StatusCode::OK, &json!({ "bookingid": id, "booking": booking }))?
            }
            Err(_) => text(StatusCode::INTERNAL_SERVER_ERROR),
        },

        (&Method::GET, ["booking", id]) => {
            match parse_id(id).and_then(|id| state.bookings.get(&id)) {
                Some(booking) => json_response(StatusCode::OK, &json!(booking))?,
                None => text(StatusCode::NOT_FOUND),
            }
        }

        (&Method::PUT, ["booking", id]) => {
            if !state.is_authorized(&request) {
                text(StatusCode::FORBIDDEN)
            } else {
                match serde_json::from_str::<Booking>(&body) {
                    Err(_) => text(StatusCode::BAD_REQUEST),
                    Ok(booking) => match parse_id(id) {
                        Some(id) if state.bookings.contains_key(&id) => {
                            state.bookings.insert(id, booking.clone());
                            json_response(StatusCode::OK, &json!(booking))?
                        }
                        _ => text(StatusCode::METHOD_NOT_ALLOWED),
                    },
                }
            }
        }

        (&Method::DELETE, ["booking", id]) => {
            if !state.is_authorized(&request) {
                text(StatusCode::FORBIDDEN)
            } else {
                match parse_id(id) {
                    Some(id) if state.bookings.remove(&id).is_some() => text(StatusCode::CREATED),
                    _ => text(StatusCode::METHOD_NOT_ALLOWED),
                }
            }
        }

        _ => text(StatusCode::NOT_FOUND),
    };

    Ok(response)
}

fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

fn json_response(status: StatusCode, value: &serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(serde_json::to_string(value)?))?)
}

/// restful-booker answers most statuses with the canonical reason as plain text.
fn text(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(
        status.canonical_reason().unwrap_or_default().to_string(),
    ));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
