use response_body_rewrite::settings::{LogFormat, LogOutput, Settings, SettingsError};

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // 테스트 전후 환경변수 초기화를 위한 헬퍼 함수
    fn cleanup_env() {
        for var in [
            "PROXY_CONFIG_FILE",
            "PROXY_HTTP_PORT",
            "PROXY_BACKEND_ADDR",
            "PROXY_LOG_FORMAT",
            "PROXY_LOG_LEVEL",
            "PROXY_LOG_OUTPUT",
        ] {
            std::env::remove_var(var);
        }
    }

    // 테스트용 임시 TOML 파일 생성 헬퍼
    fn create_test_toml(content: &str) -> (String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");
        std::fs::write(&file_path, content).unwrap();
        (file_path.to_str().unwrap().to_string(), dir)
    }

    #[tokio::test]
    #[serial]
    async fn test_default_settings_from_env() {
        cleanup_env();

        let settings = Settings::from_env().await.unwrap();
        assert_eq!(settings.server.http_port, 8080);
        assert_eq!(settings.server.backend_addr, "127.0.0.1:3000");
        assert_eq!(settings.logging.format, LogFormat::Text);
        assert_eq!(settings.logging.output, LogOutput::Stdout);
        assert!(settings.middleware.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_settings_from_env() {
        cleanup_env();
        std::env::set_var("PROXY_HTTP_PORT", "9090");
        std::env::set_var("PROXY_BACKEND_ADDR", "10.0.0.2:8000");
        std::env::set_var("PROXY_LOG_FORMAT", "json");
        std::env::set_var("PROXY_LOG_OUTPUT", "/var/log/proxy.log");

        let settings = Settings::from_env().await.unwrap();
        assert_eq!(settings.server.http_port, 9090);
        assert_eq!(settings.server.backend().unwrap().to_string(), "10.0.0.2:8000");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.output, LogOutput::File("/var/log/proxy.log".to_string()));

        cleanup_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_settings_validation() {
        cleanup_env();

        // 1. 잘못된 포트 번호
        std::env::set_var("PROXY_HTTP_PORT", "99999");
        assert!(Settings::from_env().await.is_err());
        cleanup_env();

        // 2. 0번 포트
        std::env::set_var("PROXY_HTTP_PORT", "0");
        assert!(Settings::from_env().await.is_err());
        cleanup_env();

        // 3. 잘못된 로그 레벨
        std::env::set_var("PROXY_LOG_LEVEL", "invalid_level");
        assert!(Settings::from_env().await.is_err());
        cleanup_env();

        // 4. 잘못된 백엔드 주소
        std::env::set_var("PROXY_BACKEND_ADDR", "backend");
        assert!(matches!(
            Settings::from_env().await,
            Err(SettingsError::EnvVarInvalid { .. })
        ));
        cleanup_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_load_prefers_config_file() {
        cleanup_env();
        let (path, _dir) = create_test_toml(r#"
            [server]
            http_port = 7070

            [middleware.rewrite]
            middleware_type = "response-body-rewrite"

            [[middleware.rewrite.settings.responses]]
            status = "500-599"
            rewrites = [{ regex = "stack trace.*", replacement = "" }]
        "#);
        std::env::set_var("PROXY_CONFIG_FILE", &path);
        std::env::set_var("PROXY_HTTP_PORT", "9090");

        let settings = Settings::load().await.unwrap();
        assert_eq!(settings.server.http_port, 7070);
        assert!(settings.middleware.contains_key("rewrite"));

        cleanup_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_toml_file() {
        cleanup_env();
        let (path, _dir) = create_test_toml("[server\nhttp_port = 1");

        assert!(matches!(
            Settings::from_toml_file(&path).await,
            Err(SettingsError::ParseError { .. })
        ));
    }
}
