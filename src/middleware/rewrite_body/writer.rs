use bytes::{Bytes, BytesMut};
use hyper::{header, HeaderMap, StatusCode};
use crate::middleware::{Flusher, HijackedIo, Hijacker, MiddlewareError, ResponseSink};
use super::middleware::ParsedResponse;

/// 실제 응답 싱크를 대신해 본문을 버퍼링하는 래퍼
///
/// 헤더는 최종 상태 코드가 기록될 때 실제 싱크로 복사되고,
/// 본문은 미들웨어가 재작성 여부를 결정할 때까지 내부 버퍼에만 쌓입니다.
pub(crate) struct InterceptingWriter<'a> {
    inner: &'a mut dyn ResponseSink,
    responses: &'a [ParsedResponse],
    header_map: HeaderMap,
    headers_sent: bool,
    code: StatusCode,
    buffer: BytesMut,
}

impl<'a> InterceptingWriter<'a> {
    pub(crate) fn new(inner: &'a mut dyn ResponseSink, responses: &'a [ParsedResponse]) -> Self {
        Self {
            inner,
            responses,
            header_map: HeaderMap::new(),
            headers_sent: false,
            code: StatusCode::OK,
            buffer: BytesMut::new(),
        }
    }

    /// 기록된 최종 상태 코드 (없으면 200)
    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.code
    }

    #[cfg(test)]
    pub(crate) fn is_committed(&self) -> bool {
        self.headers_sent
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// 래퍼를 해제하고 실제 싱크, 상태 코드, 버퍼된 본문을 돌려줍니다.
    ///
    /// 아무것도 기록되지 않았다면 암묵적으로 200을 커밋합니다.
    pub(crate) fn into_parts(mut self) -> (&'a mut dyn ResponseSink, StatusCode, Bytes) {
        if !self.headers_sent {
            self.write_status(StatusCode::OK);
        }
        (self.inner, self.code, self.buffer.freeze())
    }

    /// 누적된 헤더를 실제 싱크로 복사합니다.
    ///
    /// 1xx 응답에서 이미 복사된 값이 중복되지 않도록 이름별로 덮어씁니다.
    fn copy_headers(&mut self) {
        let target = self.inner.headers();
        for name in self.header_map.keys() {
            target.remove(name);
            for value in self.header_map.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }
    }

    fn matches_rule(&self, code: StatusCode) -> bool {
        self.responses.iter().any(|response| response.status.contains(code.as_u16()))
    }
}

impl ResponseSink for InterceptingWriter<'_> {
    fn headers(&mut self) -> &mut HeaderMap {
        if self.headers_sent {
            return self.inner.headers();
        }
        &mut self.header_map
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.headers_sent {
            return;
        }

        if status.is_informational() {
            self.copy_headers();
            self.inner.write_status(status);
            return;
        }

        self.code = status;
        self.copy_headers();

        // 재작성으로 길이가 바뀔 수 있으므로 최종 본문 기록 시점에 맡긴다
        if self.matches_rule(status) {
            self.inner.headers().remove(header::CONTENT_LENGTH);
        }

        self.inner.write_status(status);
        self.headers_sent = true;
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if !self.headers_sent {
            self.write_status(StatusCode::OK);
        }

        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn as_hijacker(&mut self) -> Option<&mut dyn Hijacker> {
        Some(self)
    }

    fn as_flusher(&mut self) -> Option<&mut dyn Flusher> {
        Some(self)
    }
}

impl Hijacker for InterceptingWriter<'_> {
    fn hijack(&mut self) -> Result<Box<dyn HijackedIo>, MiddlewareError> {
        match self.inner.as_hijacker() {
            Some(hijacker) => hijacker.hijack(),
            None => Err(MiddlewareError::CapabilityUnsupported { capability: "hijack" }),
        }
    }
}

impl Flusher for InterceptingWriter<'_> {
    /// 실제 싱크만 플러시합니다. 버퍼된 본문은 내보내지 않습니다.
    fn flush(&mut self) {
        if let Some(flusher) = self.inner.as_flusher() {
            flusher.flush();
        }
    }
}
