use bytes::{Bytes, BytesMut};
use http_body_util::Full;
use hyper::{HeaderMap, Response, StatusCode};
use tracing::debug;
use super::{Flusher, ResponseSink};

/// hyper 응답을 만들어 내는 버퍼 싱크
///
/// hyper의 HTTP/1 서비스는 1xx 응답을 직접 보낼 수 없으므로
/// 정보성 상태 코드는 기록만 해 둡니다.
#[derive(Debug, Default)]
pub struct BufferedSink {
    status: Option<StatusCode>,
    informational: Vec<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
    flushes: usize,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn informational(&self) -> &[StatusCode] {
        &self.informational
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// `Content-Length`가 없으면 hyper가 최종 본문 길이로 채웁니다.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedSink {
    fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_some() {
            return;
        }

        if status.is_informational() {
            debug!(status = status.as_u16(), "정보성 응답 기록");
            self.informational.push(status);
            return;
        }

        self.status = Some(status);
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.status.is_none() {
            self.write_status(StatusCode::OK);
        }

        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn as_flusher(&mut self) -> Option<&mut dyn Flusher> {
        Some(self)
    }
}

impl Flusher for BufferedSink {
    fn flush(&mut self) {
        self.flushes += 1;
    }
}
