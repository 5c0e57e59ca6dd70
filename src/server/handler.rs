use std::sync::Arc;
use std::time::Instant;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use tracing::error;
use uuid::Uuid;
use crate::logging::{log_request, RequestLog};
use crate::middleware::{BufferedSink, Handler};

/// hyper 요청을 핸들러 체인에 연결합니다.
pub struct RequestHandler {
    handler: Arc<dyn Handler>,
}

impl RequestHandler {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    pub async fn handle_request(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
        let start_time = Instant::now();
        let mut log = RequestLog::new(Uuid::new_v4().to_string());
        log.with_request(&req);

        // 1. 요청 본문 수집
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                log.with_error(&e);
                log_request(&log);
                return Ok(Self::error_response(StatusCode::BAD_REQUEST, "Failed to read request body"));
            }
        };
        let req = Request::from_parts(parts, Full::new(body));

        // 2. 핸들러 체인 실행
        let mut sink = BufferedSink::new();
        self.handler.serve_http(&mut sink, req).await;

        log.with_response(sink.status());
        log.duration_ms = start_time.elapsed().as_millis() as u64;
        log_request(&log);

        Ok(sink.into_response())
    }

    fn error_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
        *response.status_mut() = status;
        response
    }

    pub async fn handle_connection<I>(&self, io: I) -> std::result::Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(
                io,
                service_fn(|req| self.handle_request(req)),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP 연결 처리 실패");
                e
            })
    }
}
