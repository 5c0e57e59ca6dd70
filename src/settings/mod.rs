use std::{collections::HashMap, env, path::Path};
use serde::Deserialize;
use tracing::info;
use crate::middleware::config::{MiddlewareConfig, MiddlewareType};
use crate::middleware::manager::check_middleware;

mod server;
pub mod logging;
mod error;

pub use server::ServerSettings;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 미들웨어 설정
    #[serde(default)]
    pub middleware: HashMap<String, MiddlewareConfig>,
}

impl Settings {
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("PROXY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env().await
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate()?;
        info!(path = %path.as_ref().display(), "설정 파일 로드 완료");
        Ok(settings)
    }

    pub async fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            middleware: HashMap::new(),
        };

        // 설정 생성 시점에 바로 검증
        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;

        // 미들웨어 설정 검증
        for (name, middleware) in &self.middleware {
            if !middleware.enabled {
                continue;
            }
            match middleware.middleware_type {
                MiddlewareType::ResponseBodyRewrite => {
                    let has_responses = middleware.settings.keys()
                        .any(|key| key.starts_with("responses"));
                    if !has_responses {
                        return Err(SettingsError::InvalidConfig(
                            format!("{}.responses 설정이 없습니다", name)
                        ));
                    }
                    check_middleware(middleware).map_err(|e| {
                        SettingsError::InvalidConfig(format!("{} 미들웨어 설정 오류: {}", name, e))
                    })?;
                }
            }
        }

        Ok(())
    }

    pub fn add_middleware(&mut self, name: String, config: MiddlewareConfig) -> Result<()> {
        if self.middleware.contains_key(&name) {
            return Err(SettingsError::InvalidConfig(format!("중복된 미들웨어: {}", name)));
        }
        self.middleware.insert(name, config);
        Ok(())
    }

    /// Docker 라벨의 미들웨어 설정을 추가합니다.
    pub fn merge_labels(&mut self, labels: &HashMap<String, String>) -> Result<()> {
        for (name, config) in MiddlewareConfig::from_labels(labels) {
            self.add_middleware(name, config)?;
        }
        self.validate()
    }
}
