//! 응답 본문 재작성 미들웨어
//!
//! 다음 핸들러가 쓴 응답 본문을 모두 버퍼링한 뒤, 상태 코드가 설정된
//! 범위에 들어가면 정규식 치환 규칙을 순서대로 적용해서 내보냅니다.
//!
//! # 주요 기능
//!
//! - 상태 코드 범위 매칭 (`"200-299,400,450-499"`)
//! - 순차 적용되는 정규식 치환 (앞 규칙의 결과를 다음 규칙이 봄)
//! - 압축된 응답(`Content-Encoding`)은 그대로 통과
//! - 1xx 응답, 하이재킹, 플러시 전달
//!
//! # 예제
//!
//! ```
//! use response_body_rewrite::middleware::rewrite_body::HttpCodeRanges;
//!
//! let ranges: HttpCodeRanges = "200-299,400".parse().unwrap();
//! assert!(ranges.contains(204));
//! assert!(ranges.contains(400));
//! assert!(!ranges.contains(404));
//! ```
//!
//! # 미들웨어 구성
//!
//! ```
//! use std::sync::Arc;
//! use response_body_rewrite::middleware::{RewriteBody, RewriteBodyConfig};
//! use response_body_rewrite::proxy::ProxyHandler;
//!
//! let config = RewriteBodyConfig::from_toml(r#"
//!     [[responses]]
//!     status = "200-299"
//!     rewrites = [{ regex = "foo", replacement = "bar" }]
//! "#).unwrap();
//!
//! let backend = Arc::new(ProxyHandler::new("127.0.0.1:3000".parse().unwrap()));
//! let middleware = RewriteBody::new(backend, &config, "rewrite").unwrap();
//! assert_eq!(middleware.name(), "rewrite");
//! ```

pub mod logging;
pub mod middleware;
pub mod proxy;
pub mod server;
pub mod settings;
