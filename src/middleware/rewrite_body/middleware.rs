use std::sync::Arc;
use async_trait::async_trait;
use hyper::header::CONTENT_ENCODING;
use hyper::HeaderMap;
use regex::bytes::Regex;
use tracing::{error, info, info_span, Span};
use crate::middleware::{Handler, MiddlewareError, Request, ResponseSink};
use super::config::RewriteBodyConfig;
use super::ranges::HttpCodeRanges;
use super::writer::InterceptingWriter;

/// 컴파일된 치환 규칙
#[derive(Debug)]
pub(crate) struct ParsedRewrite {
    pub(crate) regex: Regex,
    pub(crate) replacement: Vec<u8>,
}

/// 파싱된 상태 코드 범위와 치환 규칙
#[derive(Debug)]
pub(crate) struct ParsedResponse {
    pub(crate) status: HttpCodeRanges,
    pub(crate) rewrites: Vec<ParsedRewrite>,
}

impl ParsedResponse {
    fn apply(&self, body: &[u8]) -> Vec<u8> {
        let mut body = body.to_vec();
        for rewrite in &self.rewrites {
            body = rewrite.regex
                .replace_all(&body, rewrite.replacement.as_slice())
                .into_owned();
        }
        body
    }
}

/// 상태 코드 범위와 정규식을 모두 파싱합니다. 하나라도 잘못되면 전체가 실패합니다.
pub(crate) fn parse_responses(
    config: &RewriteBodyConfig,
) -> Result<Vec<ParsedResponse>, MiddlewareError> {
    config.responses.iter()
        .map(|response| {
            let status = HttpCodeRanges::new(&[response.status.as_str()])
                .map_err(|source| MiddlewareError::InvalidStatus {
                    status: response.status.clone(),
                    source,
                })?;

            let rewrites = response.rewrites.iter()
                .map(|rewrite| {
                    let regex = Regex::new(&rewrite.regex)
                        .map_err(|source| MiddlewareError::InvalidRegex {
                            pattern: rewrite.regex.clone(),
                            source,
                        })?;
                    Ok(ParsedRewrite {
                        regex,
                        replacement: rewrite.replacement.clone().into_bytes(),
                    })
                })
                .collect::<Result<Vec<_>, MiddlewareError>>()?;

            Ok(ParsedResponse { status, rewrites })
        })
        .collect()
}

/// 응답 본문 재작성 미들웨어
///
/// 다음 핸들러의 응답 본문을 모두 버퍼링한 뒤, 상태 코드와 처음 일치하는
/// 응답 규칙의 치환들을 순서대로 적용해서 실제 싱크에 기록합니다.
pub struct RewriteBody {
    next: Arc<dyn Handler>,
    name: String,
    responses: Arc<[ParsedResponse]>,
    span: Span,
}

impl RewriteBody {
    /// 설정을 파싱해 미들웨어를 생성합니다.
    ///
    /// 상태 코드 범위나 정규식 하나라도 잘못되면 전체 생성이 실패합니다.
    pub fn new(
        next: Arc<dyn Handler>,
        config: &RewriteBodyConfig,
        name: &str,
    ) -> Result<Self, MiddlewareError> {
        let span = info_span!("response_body_rewrite", middleware = %name);
        info!(parent: &span, responses = ?config.responses, "응답 재작성 설정 로드");

        let responses = parse_responses(config)?;

        Ok(Self {
            next,
            name: name.to_string(),
            responses: responses.into(),
            span,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 상태 코드에 처음 일치하는 규칙을 적용합니다. 일치하는 규칙이 없으면 `None`.
    fn rewrite(&self, status: u16, body: &[u8]) -> Option<Vec<u8>> {
        self.responses.iter()
            .find(|response| response.status.contains(status))
            .map(|response| response.apply(body))
    }
}

/// `Content-Encoding`이 비어 있거나 identity일 때만 본문을 텍스트로 다룰 수 있다.
fn is_identity_encoding(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_ENCODING) {
        None => true,
        Some(value) => match value.to_str() {
            Ok(encoding) => {
                let encoding = encoding.trim();
                encoding.is_empty() || encoding.eq_ignore_ascii_case("identity")
            }
            Err(_) => false,
        },
    }
}

#[async_trait]
impl Handler for RewriteBody {
    async fn serve_http(&self, sink: &mut dyn ResponseSink, req: Request) {
        let mut writer = InterceptingWriter::new(sink, &self.responses);
        self.next.serve_http(&mut writer, req).await;

        let (sink, status, body) = writer.into_parts();

        let rewritten = if is_identity_encoding(sink.headers()) {
            self.rewrite(status.as_u16(), &body)
        } else {
            None
        };

        let result = match &rewritten {
            Some(rewritten) => sink.write(rewritten),
            None => sink.write(&body),
        };

        if let Err(e) = result {
            error!(
                parent: &self.span,
                error = %e,
                status = status.as_u16(),
                rewritten = rewritten.is_some(),
                "응답 본문 기록 실패"
            );
        }
    }
}
