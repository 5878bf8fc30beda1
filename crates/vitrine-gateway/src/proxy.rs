use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri, Version};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http_body_util::BodyExt;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use vitrine_rules::{RouteTable, Upstream};

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub response: Duration,
}

#[derive(Clone)]
struct GatewayState {
    routes: Arc<RouteTable>,
    timeouts: Timeouts,
}

pub struct Gateway {
    listen_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("listen_addr", &self.listen_addr)
            .finish()
    }
}

impl Gateway {
    pub async fn start(
        listen: &str,
        routes: Arc<RouteTable>,
        timeouts: Timeouts,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(listen).await?;
        let listen_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let state = GatewayState { routes, timeouts };
        let app = Router::new().fallback(proxy_handler).with_state(state);

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(err) = server.await {
                error!("gateway server error: {err}");
            }
        });

        Ok(Self {
            listen_addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

async fn proxy_handler(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let matched = state.routes.resolve(parts.uri.path());
    let route = matched.rule.name();
    let upstream = matched.rule.upstream();

    let path_and_query = match matched.path_and_query(parts.uri.query()) {
        Ok(pq) => pq,
        Err(e) => {
            return gateway_error(
                StatusCode::BAD_REQUEST,
                format!("route '{route}' produced an invalid target path: {e}"),
            )
        }
    };

    debug!(
        method = %parts.method,
        path = parts.uri.path(),
        route,
        upstream = %upstream,
        forward = path_and_query.as_str(),
        "proxying request"
    );

    let mut headers = filter_headers(&parts.headers);
    match HeaderValue::from_str(upstream.authority()) {
        Ok(host) => {
            headers.insert(header::HOST, host);
        }
        Err(e) => {
            return gateway_error(
                StatusCode::BAD_GATEWAY,
                format!("route '{route}' upstream {upstream} has an invalid authority: {e}"),
            )
        }
    }

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = Uri::from(path_and_query);
    *outbound.version_mut() = Version::HTTP_11;
    *outbound.headers_mut() = headers;

    match forward_request(upstream, outbound, state.timeouts).await {
        Ok(response) => response,
        Err(err) => {
            let status = err.status();
            warn!(route, upstream = %upstream, status = status.as_u16(), "upstream failure: {err}");
            gateway_error(
                status,
                format!("route '{route}' upstream {upstream} failed: {err}"),
            )
        }
    }
}

#[derive(Debug, Error)]
enum ForwardError {
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("handshake failed: {0}")]
    Handshake(#[source] hyper::Error),
    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),
    #[error("no connection within {0:?}")]
    ConnectTimeout(Duration),
    #[error("no response within {0:?}")]
    ResponseTimeout(Duration),
}

impl ForwardError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ConnectTimeout(_) | Self::ResponseTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Aborts the upstream connection task when dropped.
///
/// Held by the handler until the response head arrives, then by the response
/// body, so a client that goes away tears the upstream connection down too.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn forward_request(
    upstream: &Upstream,
    request: Request<Body>,
    timeouts: Timeouts,
) -> Result<Response, ForwardError> {
    let connect = async {
        let stream = TcpStream::connect((upstream.host(), upstream.port()))
            .await
            .map_err(ForwardError::Connect)?;
        http1::handshake::<_, Body>(TokioIo::new(stream))
            .await
            .map_err(ForwardError::Handshake)
    };
    let (mut sender, connection) = tokio::time::timeout(timeouts.connect, connect)
        .await
        .map_err(|_| ForwardError::ConnectTimeout(timeouts.connect))??;

    let connection = AbortOnDrop(tokio::spawn(async move {
        if let Err(err) = connection.await {
            debug!("upstream connection error: {err}");
        }
    }));

    let response = tokio::time::timeout(timeouts.response, sender.send_request(request))
        .await
        .map_err(|_| ForwardError::ResponseTimeout(timeouts.response))?
        .map_err(ForwardError::Request)?;

    let (mut parts, body) = response.into_parts();
    parts.headers = filter_headers(&parts.headers);
    let body = body.map_frame(move |frame| {
        let _held = &connection;
        frame
    });

    Ok(Response::from_parts(parts, Body::new(body)))
}

fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if name == header::HOST || is_hop_by_hop(name) {
            continue;
        }
        filtered.append(name, value.clone());
    }
    filtered
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn gateway_error(status: StatusCode, message: String) -> Response {
    (status, message).into_response()
}
