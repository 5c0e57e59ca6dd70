use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use hyper_util::rt::TokioIo;
use tracing::{debug, error, info};
use super::handler::RequestHandler;
use super::Result;

pub struct ServerListener {
    http_listener: TcpListener,
}

impl ServerListener {
    pub async fn bind(port: u16) -> Result<Self> {
        let http_listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| {
                error!(error = %e, port, "HTTP 포트 바인딩 실패");
                e
            })?;

        info!(port, "HTTP 리스너 시작");
        Ok(Self::from_listener(http_listener))
    }

    pub fn from_listener(http_listener: TcpListener) -> Self {
        Self { http_listener }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.http_listener.local_addr()?)
    }

    pub async fn run(self, handler: Arc<RequestHandler>) -> Result<()> {
        loop {
            match self.http_listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(client = %addr, "연결 수락");
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        // 연결 에러는 handle_connection에서 기록된다
                        let _ = handler.handle_connection(io).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "연결 수락 실패");
                }
            }
        }
    }
}
