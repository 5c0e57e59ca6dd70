use super::rewrite_body::RangeParseError;

#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("상태 코드 범위 {status:?} 파싱 실패: {source}")]
    InvalidStatus {
        status: String,
        #[source]
        source: RangeParseError,
    },

    #[error("정규식 {pattern:?} 컴파일 실패: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("미들웨어 {middleware} 생성 실패: {source}")]
    Execution {
        middleware: String,
        #[source]
        source: Box<MiddlewareError>,
    },

    #[error("응답 싱크가 {capability} 기능을 지원하지 않음")]
    CapabilityUnsupported {
        capability: &'static str,
    },

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}
