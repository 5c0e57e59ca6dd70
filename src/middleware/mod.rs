pub mod config;
pub mod error;
pub mod manager;
pub mod rewrite_body;
pub mod sink;
pub mod traits;

use bytes::Bytes;
use http_body_util::Full;

/// 핸들러 체인에 전달되는 요청 (본문은 미리 수집됨)
pub type Request = hyper::Request<Full<Bytes>>;

pub use config::{MiddlewareConfig, MiddlewareType};
pub use error::MiddlewareError;
pub use manager::MiddlewareManager;
pub use rewrite_body::{RewriteBody, RewriteBodyConfig};
pub use sink::BufferedSink;
pub use traits::{Flusher, Handler, HijackedIo, Hijacker, ResponseSink};
