use std::net::SocketAddr;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderName, CONNECTION, TRANSFER_ENCODING};
use hyper::{Request, StatusCode, Uri};
use hyper_util::client::legacy;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{error, info, instrument};
use crate::middleware::{self, Handler, ResponseSink};

const HOP_BY_HOP: [HeaderName; 3] = [
    CONNECTION,
    TRANSFER_ENCODING,
    HeaderName::from_static("keep-alive"),
];

/// 요청을 백엔드로 전달하고 그 응답을 싱크에 기록하는 핸들러
#[derive(Clone)]
pub struct ProxyHandler {
    backend: SocketAddr,
    client: legacy::Client<HttpConnector, Full<Bytes>>,
}

impl ProxyHandler {
    pub fn new(backend: SocketAddr) -> Self {
        let connector = HttpConnector::new();
        let client = legacy::Client::builder(TokioExecutor::new())
            .build::<_, Full<Bytes>>(connector);

        Self { backend, client }
    }

    async fn forward(&self, req: middleware::Request) -> Result<hyper::Response<Bytes>, String> {
        let proxied_req = build_proxied_request(self.backend, req)
            .map_err(|e| format!("Failed to build request: {}", e))?;

        let response = self.client.request(proxied_req).await
            .map_err(|e| format!("Backend request failed: {}", e))?;

        let (parts, body) = response.into_parts();
        let bytes = body.collect().await
            .map(|collected| collected.to_bytes())
            .map_err(|e| format!("Failed to collect response body: {}", e))?;

        info!(status = parts.status.as_u16(), bytes_size = bytes.len(), "Response body collected");
        Ok(hyper::Response::from_parts(parts, bytes))
    }
}

#[async_trait]
impl Handler for ProxyHandler {
    #[instrument(skip(self, sink, req), fields(backend = %self.backend))]
    async fn serve_http(&self, sink: &mut dyn ResponseSink, req: middleware::Request) {
        match self.forward(req).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                let headers = sink.headers();
                for (name, value) in parts.headers.iter() {
                    if !HOP_BY_HOP.contains(name) {
                        headers.append(name.clone(), value.clone());
                    }
                }
                sink.write_status(parts.status);
                if let Err(e) = sink.write(&body) {
                    error!(error = %e, "Failed to write backend body");
                }
            }
            Err(message) => {
                error!(error = %message, "Proxy request failed");
                sink.write_status(StatusCode::BAD_GATEWAY);
                if let Err(e) = sink.write(message.as_bytes()) {
                    error!(error = %e, "Failed to write error body");
                }
            }
        }
    }
}

fn build_proxied_request(
    address: SocketAddr,
    req: middleware::Request,
) -> Result<Request<Full<Bytes>>, hyper::http::Error> {
    let path_and_query = req.uri().path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri: Uri = format!("http://{}{}", address, path_and_query).parse()?;

    let (parts, body) = req.into_parts();
    let mut builder = Request::builder()
        .method(parts.method)
        .uri(uri);
    for (name, value) in parts.headers.iter() {
        if !HOP_BY_HOP.contains(name) {
            builder = builder.header(name, value);
        }
    }
    builder.body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_proxied_request() {
        let req = Request::builder()
            .method("PUT")
            .uri("/items/1?verbose=true")
            .header("x-trace", "abc")
            .header(CONNECTION, "keep-alive")
            .body(Full::new(Bytes::from("payload")))
            .unwrap();

        let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
        let proxied = build_proxied_request(addr, req).unwrap();

        assert_eq!(proxied.method(), "PUT");
        assert_eq!(proxied.uri(), "http://127.0.0.1:3000/items/1?verbose=true");
        assert_eq!(proxied.headers().get("x-trace").unwrap(), "abc");
        assert!(proxied.headers().get(CONNECTION).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_writes_bad_gateway() {
        // 포트 1은 연결이 거부된다
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let handler = ProxyHandler::new(addr);
        let mut sink = middleware::BufferedSink::new();

        handler.serve_http(&mut sink, Request::new(Full::new(Bytes::new()))).await;

        assert_eq!(sink.status(), StatusCode::BAD_GATEWAY);
        assert!(String::from_utf8_lossy(sink.body()).starts_with("Backend request failed"));
    }
}
