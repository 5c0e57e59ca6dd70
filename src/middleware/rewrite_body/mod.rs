//! 응답 본문 재작성 미들웨어
//!
//! 상태 코드 범위별로 정규식 치환 규칙을 응답 본문에 적용합니다.

mod config;
mod middleware;
pub mod ranges;
mod writer;

pub use config::{ResponseRule, RewriteBodyConfig, RewriteRule};
pub use middleware::RewriteBody;
pub(crate) use middleware::parse_responses;
pub use ranges::{HttpCodeRanges, RangeParseError};
