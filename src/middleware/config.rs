use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 미들웨어 설정을 위한 공통 인터페이스
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum MiddlewareType {
    ResponseBodyRewrite,
}

impl std::str::FromStr for MiddlewareType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "response-body-rewrite" => Ok(MiddlewareType::ResponseBodyRewrite),
            _ => Err(format!("지원하지 않는 미들웨어 타입: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// 미들웨어 타입
    pub middleware_type: MiddlewareType,

    /// 미들웨어 활성화 여부
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 실행 순서 (낮은 숫자가 바깥쪽)
    #[serde(default)]
    pub order: i32,

    /// 미들웨어별 설정
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl MiddlewareConfig {
    /// Docker 라벨에서 미들웨어 설정을 파싱합니다.
    pub fn from_labels(labels: &HashMap<String, String>) -> Vec<(String, Self)> {
        let mut configs = Vec::new();
        let prefix = "rproxy.http.middlewares.";
        let mut middleware_groups: HashMap<String, HashMap<String, String>> = HashMap::new();

        for (key, value) in labels {
            if let Some(rest) = key.strip_prefix(prefix) {
                if let Some((name, setting)) = rest.split_once('.') {
                    middleware_groups
                        .entry(name.to_string())
                        .or_default()
                        .insert(setting.to_string(), value.clone());
                }
            }
        }

        for (name, settings) in middleware_groups {
            let Some(middleware_type) = settings.get("type").and_then(|t| t.parse().ok()) else {
                continue;
            };

            let config = MiddlewareConfig {
                middleware_type,
                enabled: settings.get("enabled")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(true),
                order: settings.get("order")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
                settings: settings.into_iter()
                    .filter(|(k, _)| k != "type" && k != "enabled" && k != "order")
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect(),
            };
            configs.push((name, config));
        }

        configs.sort_by(|a, b| a.0.cmp(&b.0));
        configs
    }

    /// TOML 설정에서 미들웨어 설정을 파싱합니다.
    pub fn from_toml(config: &str) -> Result<HashMap<String, Self>, toml::de::Error> {
        #[derive(Deserialize)]
        struct Config {
            #[serde(default)]
            middlewares: HashMap<String, MiddlewareConfig>,
        }

        let config: Config = toml::from_str(config)?;
        Ok(config.middlewares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_docker_labels() {
        let mut labels = HashMap::new();
        labels.insert(
            "rproxy.http.middlewares.my-rewrite.type".to_string(),
            "response-body-rewrite".to_string(),
        );
        labels.insert(
            "rproxy.http.middlewares.my-rewrite.order".to_string(),
            "3".to_string(),
        );
        labels.insert(
            "rproxy.http.middlewares.my-rewrite.responses[0].status".to_string(),
            "200-299".to_string(),
        );
        labels.insert(
            "rproxy.http.middlewares.unknown.type".to_string(),
            "basic-auth".to_string(),
        );

        let configs = MiddlewareConfig::from_labels(&labels);
        assert_eq!(configs.len(), 1);

        let (name, config) = &configs[0];
        assert_eq!(name, "my-rewrite");
        assert_eq!(config.middleware_type, MiddlewareType::ResponseBodyRewrite);
        assert!(config.enabled);
        assert_eq!(config.order, 3);
        assert_eq!(
            config.settings.get("responses[0].status"),
            Some(&serde_json::Value::String("200-299".to_string()))
        );
        assert!(!config.settings.contains_key("order"));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
            [middlewares.rewrite]
            middleware_type = "response-body-rewrite"
            enabled = true
            order = 1

            [[middlewares.rewrite.settings.responses]]
            status = "200-299"
            rewrites = [{ regex = "foo", replacement = "bar" }]
        "#;

        let configs = MiddlewareConfig::from_toml(toml_str).unwrap();
        assert_eq!(configs.len(), 1);

        let config = configs.get("rewrite").unwrap();
        assert_eq!(config.middleware_type, MiddlewareType::ResponseBodyRewrite);
        assert!(config.enabled);
        assert_eq!(config.order, 1);
        assert!(config.settings.contains_key("responses"));
    }
}
