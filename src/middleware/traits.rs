use super::{MiddlewareError, Request};
use async_trait::async_trait;
use hyper::{HeaderMap, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite};

/// 응답 싱크 트레이트
///
/// 핸들러가 상태 코드, 헤더, 본문을 기록하는 대상입니다.
/// 하이재킹과 플러시는 선택 기능이며 `as_hijacker`/`as_flusher`로 조회합니다.
pub trait ResponseSink: Send {
    /// 응답 헤더를 반환합니다.
    fn headers(&mut self) -> &mut HeaderMap;

    /// 상태 코드를 기록합니다.
    fn write_status(&mut self, status: StatusCode);

    /// 본문 바이트를 기록합니다.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    /// 하이재킹 기능 조회
    fn as_hijacker(&mut self) -> Option<&mut dyn Hijacker> {
        None
    }

    /// 플러시 기능 조회
    fn as_flusher(&mut self) -> Option<&mut dyn Flusher> {
        None
    }
}

/// 하이재킹된 연결
pub trait HijackedIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> HijackedIo for T {}

/// 연결 하이재킹 기능 (프로토콜 업그레이드용)
pub trait Hijacker {
    fn hijack(&mut self) -> Result<Box<dyn HijackedIo>, MiddlewareError>;
}

/// 버퍼된 데이터를 클라이언트로 밀어내는 기능
pub trait Flusher {
    fn flush(&mut self);
}

/// 핸들러 트레이트
///
/// 요청 하나에 대해 응답 하나를 싱크에 기록합니다.
/// 미들웨어는 다음 핸들러를 감싸는 핸들러입니다.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve_http(&self, sink: &mut dyn ResponseSink, req: Request);
}
