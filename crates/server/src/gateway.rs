//! Request handling and the accept loop
//!
//! One task per connection; each request on a connection is handled in
//! turn and answered before the next is read.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use docgate_executor::Executor;

use crate::error::GatewayError;
use crate::http::{HttpCodec, HttpRequest, HttpResponse, Method};
use crate::query::parse_query;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// HTTP front end over an [`Executor`]
#[derive(Debug, Clone)]
pub struct Gateway {
    executor: Arc<Executor>,
    max_body_bytes: usize,
}

impl Gateway {
    /// Create a gateway refusing bodies above `max_body_bytes`
    pub fn new(executor: Arc<Executor>, max_body_bytes: usize) -> Self {
        Self {
            executor,
            max_body_bytes,
        }
    }

    /// Configured body cap
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Answer one request. Never fails: refusals become status codes.
    pub async fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let response = match &request.method {
            Method::Options => HttpResponse::new(204),
            Method::Get => {
                let payload = Value::Object(parse_query(request.query()));
                self.dispatch(payload).await
            }
            Method::Post => match serde_json::from_slice::<Value>(&request.body) {
                Ok(payload) => self.dispatch(payload).await,
                Err(e) => {
                    debug!(error = %e, "Unparseable request body");
                    HttpResponse::new(403)
                }
            },
            Method::Other(name) => {
                debug!(method = %name, "Method not allowed");
                HttpResponse::new(405).with_header("Allow", ALLOWED_METHODS)
            }
        };
        with_cors(response)
    }

    async fn dispatch(&self, payload: Value) -> HttpResponse {
        match self.executor.execute_payload(&payload).await {
            Ok(output) => match serde_json::to_vec(&output) {
                Ok(body) => HttpResponse::json(body),
                Err(e) => {
                    warn!(error = %e, "Failed to serialize result");
                    HttpResponse::new(403)
                }
            },
            Err(_) => HttpResponse::new(403),
        }
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let gateway = Arc::clone(&self);
                            tokio::spawn(async move {
                                gateway.serve_connection(stream, peer).await;
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Serve every request arriving on one connection.
    pub async fn serve_connection(&self, stream: TcpStream, peer: SocketAddr) {
        debug!(%peer, "Connection opened");
        let mut framed = Framed::new(stream, HttpCodec::new(self.max_body_bytes));

        while let Some(next) = framed.next().await {
            match next {
                Ok(request) => {
                    let keep_alive = request.keep_alive();
                    let mut response = self.handle(&request).await;
                    if !keep_alive {
                        response = response.with_header("Connection", "close");
                    }
                    if let Err(e) = framed.send(response).await {
                        debug!(%peer, error = %e, "Failed to write response");
                        break;
                    }
                    if !keep_alive {
                        break;
                    }
                }
                Err(e) => {
                    self.refuse_framing(&mut framed, peer, e).await;
                    break;
                }
            }
        }
        debug!(%peer, "Connection closed");
    }

    async fn refuse_framing(
        &self,
        framed: &mut Framed<TcpStream, HttpCodec>,
        peer: SocketAddr,
        error: GatewayError,
    ) {
        let Some(status) = error.status() else {
            debug!(%peer, error = %error, "Connection error");
            return;
        };
        debug!(%peer, status, error = %error, "Rejecting request");
        let response = with_cors(HttpResponse::new(status)).with_header("Connection", "close");
        if let Err(e) = framed.send(response).await {
            debug!(%peer, error = %e, "Failed to write rejection");
        }
    }
}

fn with_cors(response: HttpResponse) -> HttpResponse {
    response
        .with_header("Access-Control-Allow-Origin", "*")
        .with_header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .with_header("Access-Control-Allow-Headers", "Content-Type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use docgate_storage::{MemoryConnector, RetryPolicy, StoreConnection};
    use serde_json::json;

    async fn gateway() -> Gateway {
        let connection = Arc::new(StoreConnection::new(
            Arc::new(MemoryConnector::new()),
            RetryPolicy::default(),
        ));
        assert!(connection.connect().await);
        Gateway::new(Arc::new(Executor::new(connection, "datasets")), 1024)
    }

    fn get(target: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            target: target.to_string(),
            http11: true,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    fn post(body: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Post,
            target: "/".to_string(),
            http11: true,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    fn json_body(response: &HttpResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_set_then_get_by_query() {
        let gw = gateway().await;

        let set = gw.handle(&post(r#"{"set": {"key": "u1", "name": "Ann"}}"#)).await;
        assert_eq!(set.status, 200);
        assert_eq!(json_body(&set), json!("u1"));

        let got = gw.handle(&get("/?get=u1")).await;
        assert_eq!(got.status, 200);
        assert_eq!(
            got.header("content-type"),
            Some("application/json; charset=utf-8")
        );
        let record = json_body(&got);
        assert_eq!(record["key"], "u1");
        assert_eq!(record["name"], "Ann");
    }

    #[tokio::test]
    async fn test_filter_by_query_brackets() {
        let gw = gateway().await;
        gw.handle(&post(r#"{"set": {"key": "u1", "role": "admin"}}"#)).await;
        gw.handle(&post(r#"{"set": {"key": "u2", "role": "guest"}}"#)).await;

        let found = gw.handle(&get("/?get[role]=admin")).await;
        let records = json_body(&found);
        assert_eq!(records.as_array().unwrap().len(), 1);
        assert_eq!(records[0]["key"], "u1");
    }

    #[tokio::test]
    async fn test_refusals_are_empty_403() {
        let gw = gateway().await;
        for request in [
            get("/"),
            get("/?get=u1&del=u1"),
            get("/?get=bad%20key"),
            post("{not json"),
            post(r#"{"set": {"name": "no key"}}"#),
        ] {
            let response = gw.handle(&request).await;
            assert_eq!(response.status, 403, "{:?}", request.target);
            assert!(response.body.is_empty());
            assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        }
    }

    #[tokio::test]
    async fn test_missing_record_is_null() {
        let gw = gateway().await;
        let response = gw.handle(&get("/?get=nobody")).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"null");
    }

    #[tokio::test]
    async fn test_preflight() {
        let gw = gateway().await;
        let mut request = get("/");
        request.method = Method::Options;

        let response = gw.handle(&request).await;
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, POST, OPTIONS")
        );
        assert_eq!(
            response.header("Access-Control-Allow-Headers"),
            Some("Content-Type")
        );
    }

    #[tokio::test]
    async fn test_other_method_405() {
        let gw = gateway().await;
        let mut request = get("/?get=u1");
        request.method = Method::Other("PUT".into());

        let response = gw.handle(&request).await;
        assert_eq!(response.status, 405);
        assert_eq!(response.header("Allow"), Some("GET, POST, OPTIONS"));
    }
}
