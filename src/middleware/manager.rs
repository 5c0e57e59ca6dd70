use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, info};
use super::config::MiddlewareType;
use super::rewrite_body::parse_responses;
use super::{Handler, MiddlewareConfig, MiddlewareError, Request, ResponseSink, RewriteBody, RewriteBodyConfig};

/// 라벨의 평탄한 키 또는 `responses` 배열에서 재작성 설정을 디코딩합니다.
fn decode_rewrite_config(config: &MiddlewareConfig) -> Result<RewriteBodyConfig, MiddlewareError> {
    if config.settings.contains_key("responses") {
        return Ok(serde_json::from_value(serde_json::to_value(&config.settings)?)?);
    }

    // 라벨에서 온 평탄한 키
    let string_settings: HashMap<String, String> = config.settings.iter()
        .map(|(k, v)| {
            let string_value = v.as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| v.to_string());
            (k.clone(), string_value)
        })
        .collect();
    RewriteBodyConfig::from_flat_map(&string_settings)
}

/// 미들웨어를 실제로 만들지 않고 설정만 파싱해 봅니다.
pub fn check_middleware(config: &MiddlewareConfig) -> Result<(), MiddlewareError> {
    match config.middleware_type {
        MiddlewareType::ResponseBodyRewrite => {
            parse_responses(&decode_rewrite_config(config)?)?;
            Ok(())
        }
    }
}

/// 미들웨어 설정으로부터 다음 핸들러를 감싼 미들웨어를 생성합니다.
fn create_middleware(
    name: &str,
    config: &MiddlewareConfig,
    next: Arc<dyn Handler>,
) -> Result<Arc<dyn Handler>, MiddlewareError> {
    debug!("미들웨어 생성 시작: name={}, type={:?}", name, config.middleware_type);

    match config.middleware_type {
        MiddlewareType::ResponseBodyRewrite => {
            let rewrite_config = decode_rewrite_config(config)?;
            Ok(Arc::new(RewriteBody::new(next, &rewrite_config, name)?))
        }
    }
}

/// 활성화된 미들웨어를 순서대로 조립한 핸들러 체인
///
/// `order`가 낮은 미들웨어가 가장 바깥에 위치합니다.
#[derive(Clone)]
pub struct MiddlewareManager {
    handler: Arc<dyn Handler>,
    names: Vec<String>,
}

impl MiddlewareManager {
    /// 하나라도 생성에 실패하면 체인 전체가 만들어지지 않습니다.
    pub fn new(
        middleware_configs: &HashMap<String, MiddlewareConfig>,
        terminal: Arc<dyn Handler>,
    ) -> Result<Self, MiddlewareError> {
        // 정렬을 위해 Vec으로 변환
        let mut ordered_configs: Vec<_> = middleware_configs.iter()
            .filter(|(_, config)| config.enabled)
            .collect();
        ordered_configs.sort_by(|(a_name, a), (b_name, b)| {
            a.order.cmp(&b.order).then_with(|| a_name.cmp(b_name))
        });

        let mut handler = terminal;
        for (name, config) in ordered_configs.iter().rev() {
            handler = create_middleware(name, config, handler).map_err(|e| {
                MiddlewareError::Execution {
                    middleware: name.to_string(),
                    source: Box::new(e),
                }
            })?;
        }

        let names: Vec<String> = ordered_configs.into_iter()
            .map(|(name, _)| name.clone())
            .collect();
        info!(middlewares = ?names, "미들웨어 체인 구성 완료");

        Ok(Self { handler, names })
    }

    pub fn handler(&self) -> Arc<dyn Handler> {
        self.handler.clone()
    }

    /// 바깥쪽부터의 미들웨어 이름
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[async_trait]
impl Handler for MiddlewareManager {
    async fn serve_http(&self, sink: &mut dyn ResponseSink, req: Request) {
        self.handler.serve_http(sink, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::BufferedSink;
    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::StatusCode;
    use serde_json::json;

    struct Body(&'static str);

    #[async_trait]
    impl Handler for Body {
        async fn serve_http(&self, sink: &mut dyn ResponseSink, _req: Request) {
            sink.write_status(StatusCode::OK);
            sink.write(self.0.as_bytes()).unwrap();
        }
    }

    fn rewrite(order: i32, regex: &str, replacement: &str) -> MiddlewareConfig {
        let mut settings = HashMap::new();
        settings.insert(
            "responses".to_string(),
            json!([{ "status": "200", "rewrites": [{ "regex": regex, "replacement": replacement }] }]),
        );
        MiddlewareConfig {
            middleware_type: MiddlewareType::ResponseBodyRewrite,
            enabled: true,
            order,
            settings,
        }
    }

    async fn run(manager: &MiddlewareManager) -> String {
        let mut sink = BufferedSink::new();
        let req = hyper::Request::new(Full::new(Bytes::new()));
        manager.serve_http(&mut sink, req).await;
        String::from_utf8(sink.body().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_lower_order_is_outermost() {
        let mut configs = HashMap::new();
        configs.insert("outer".to_string(), rewrite(1, "a", "b"));
        configs.insert("inner".to_string(), rewrite(2, "b", "c"));

        let manager = MiddlewareManager::new(&configs, Arc::new(Body("a b"))).unwrap();
        assert_eq!(manager.names(), &["outer".to_string(), "inner".to_string()]);
        // inner가 먼저 본문을 재작성하고 outer가 그 결과를 받는다
        assert_eq!(run(&manager).await, "b c");
    }

    #[tokio::test]
    async fn test_disabled_middleware_is_skipped() {
        let mut disabled = rewrite(1, "a", "z");
        disabled.enabled = false;
        let mut configs = HashMap::new();
        configs.insert("disabled".to_string(), disabled);

        let manager = MiddlewareManager::new(&configs, Arc::new(Body("a"))).unwrap();
        assert!(manager.names().is_empty());
        assert_eq!(run(&manager).await, "a");
    }

    #[tokio::test]
    async fn test_flat_label_settings() {
        let mut settings = HashMap::new();
        settings.insert("responses[0].status".to_string(), json!("200-299"));
        settings.insert("responses[0].rewrites[0].regex".to_string(), json!("a"));
        settings.insert("responses[0].rewrites[0].replacement".to_string(), json!("x"));
        let mut configs = HashMap::new();
        configs.insert("labels".to_string(), MiddlewareConfig {
            middleware_type: MiddlewareType::ResponseBodyRewrite,
            enabled: true,
            order: 0,
            settings,
        });

        let manager = MiddlewareManager::new(&configs, Arc::new(Body("a a"))).unwrap();
        assert_eq!(run(&manager).await, "x x");
    }

    #[test]
    fn test_invalid_middleware_aborts_chain() {
        let mut configs = HashMap::new();
        configs.insert("good".to_string(), rewrite(1, "a", "b"));
        configs.insert("bad".to_string(), rewrite(2, "(", "b"));

        match MiddlewareManager::new(&configs, Arc::new(Body(""))) {
            Err(MiddlewareError::Execution { middleware, source }) => {
                assert_eq!(middleware, "bad");
                assert!(matches!(*source, MiddlewareError::InvalidRegex { .. }));
            }
            _ => panic!("expected construction failure"),
        }
    }

    #[test]
    fn test_check_middleware() {
        assert!(check_middleware(&rewrite(1, "a", "b")).is_ok());
        assert!(matches!(
            check_middleware(&rewrite(1, "*", "b")),
            Err(MiddlewareError::InvalidRegex { .. })
        ));

        let mut settings = HashMap::new();
        settings.insert("responses[0].status".to_string(), json!("abc"));
        settings.insert("responses[0].rewrites[0].regex".to_string(), json!("a"));
        let labels = MiddlewareConfig {
            middleware_type: MiddlewareType::ResponseBodyRewrite,
            enabled: true,
            order: 0,
            settings,
        };
        assert!(matches!(
            check_middleware(&labels),
            Err(MiddlewareError::InvalidStatus { .. })
        ));
    }
}
