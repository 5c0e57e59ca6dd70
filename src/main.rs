use std::sync::Arc;
use response_body_rewrite::{
    logging,
    middleware::MiddlewareManager,
    proxy::ProxyHandler,
    server::{RequestHandler, ServerListener},
    settings::Settings,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("서버 실행 실패: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> response_body_rewrite::server::Result<()> {
    let settings = Settings::load().await?;
    let _guard = logging::init_logging(&settings.logging);

    let backend = settings.server.backend()?;
    info!(backend = %backend, "백엔드 설정");

    let manager = MiddlewareManager::new(&settings.middleware, Arc::new(ProxyHandler::new(backend)))
        .map_err(|e| {
            error!(error = %e, "미들웨어 생성 실패");
            e
        })?;

    let handler = Arc::new(RequestHandler::new(manager.handler()));
    let listener = ServerListener::bind(settings.server.http_port).await?;
    listener.run(handler).await
}
