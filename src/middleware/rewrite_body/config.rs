use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use crate::middleware::MiddlewareError;

/// 본문 치환 규칙 하나
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RewriteRule {
    /// 정규식 패턴
    #[serde(default)]
    pub regex: String,

    /// 치환 문자열 (`$1`, `${name}` 캡처 참조 가능)
    #[serde(default)]
    pub replacement: String,
}

/// 상태 코드 범위와 그에 적용할 치환 규칙 목록
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ResponseRule {
    /// 예: "200", "200-299", "200-299,400,450-499"
    #[serde(default)]
    pub status: String,

    /// 순서대로 적용되는 치환 규칙
    #[serde(default)]
    pub rewrites: Vec<RewriteRule>,
}

/// 응답 본문 재작성 미들웨어 설정
///
/// # Docker 라벨 예시
/// ```yaml
/// labels:
///   - "rproxy.http.middlewares.my-rewrite.type=response-body-rewrite"
///   - "rproxy.http.middlewares.my-rewrite.responses[0].status=200-299"
///   - "rproxy.http.middlewares.my-rewrite.responses[0].rewrites[0].regex=foo"
///   - "rproxy.http.middlewares.my-rewrite.responses[0].rewrites[0].replacement=bar"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RewriteBodyConfig {
    #[serde(default)]
    pub responses: Vec<ResponseRule>,
}

impl RewriteBodyConfig {
    pub fn from_toml(config: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config)
    }

    pub fn from_json(config: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(config)
    }

    /// `responses[i].status`, `responses[i].rewrites[j].regex` 형태의 평탄한 키에서 설정을 만듭니다.
    ///
    /// 인덱스는 숫자 순으로 정렬되며 `responses`로 시작하지 않는 키는 무시합니다.
    pub fn from_flat_map(settings: &HashMap<String, String>) -> Result<Self, MiddlewareError> {
        let mut responses: BTreeMap<usize, FlatResponse> = BTreeMap::new();

        for (key, value) in settings {
            let Some(rest) = key.strip_prefix("responses") else {
                continue;
            };
            let (index, field) = split_index(rest)
                .ok_or_else(|| MiddlewareError::Config(format!("잘못된 설정 키: {}", key)))?;
            let response = responses.entry(index).or_default();

            if field == "status" {
                response.status = Some(value.clone());
                continue;
            }

            let rewrite_field = field.strip_prefix("rewrites").and_then(split_index);
            let rewrite = match rewrite_field {
                Some((rewrite_index, _)) => response.rewrites.entry(rewrite_index).or_default(),
                None => return Err(MiddlewareError::Config(format!("잘못된 설정 키: {}", key))),
            };
            match rewrite_field.map(|(_, name)| name) {
                Some("regex") => rewrite.regex = Some(value.clone()),
                Some("replacement") => rewrite.replacement = Some(value.clone()),
                _ => return Err(MiddlewareError::Config(format!("알 수 없는 치환 필드: {}", key))),
            }
        }

        let responses = responses
            .into_iter()
            .map(|(index, response)| response.into_rule(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { responses })
    }
}

#[derive(Default)]
struct FlatResponse {
    status: Option<String>,
    rewrites: BTreeMap<usize, FlatRewrite>,
}

#[derive(Default)]
struct FlatRewrite {
    regex: Option<String>,
    replacement: Option<String>,
}

impl FlatResponse {
    fn into_rule(self, index: usize) -> Result<ResponseRule, MiddlewareError> {
        let status = self.status.ok_or_else(|| {
            MiddlewareError::Config(format!("responses[{}].status 누락", index))
        })?;

        let rewrites = self.rewrites
            .into_iter()
            .map(|(rewrite_index, rewrite)| {
                let regex = rewrite.regex.ok_or_else(|| {
                    MiddlewareError::Config(format!(
                        "responses[{}].rewrites[{}].regex 누락",
                        index, rewrite_index
                    ))
                })?;
                Ok(RewriteRule {
                    regex,
                    replacement: rewrite.replacement.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, MiddlewareError>>()?;

        Ok(ResponseRule { status, rewrites })
    }
}

/// `[3].rest` 를 `(3, "rest")` 로 나눕니다.
fn split_index(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix('[')?;
    let (index, rest) = rest.split_once(']')?;
    let index = index.trim().parse().ok()?;
    let field = rest.strip_prefix('.').unwrap_or(rest);
    Some((index, field))
}
