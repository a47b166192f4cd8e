use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::settings::{ClientConfig, LoggingConfig};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::DEFAULT_HTTP_TIMEOUT_MS;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ClientConfig> {
    let metrics = get_metrics().await;
    let mut client_config: ClientConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    // Apply defaults
    if client_config.settings.logging.is_none() {
        client_config.settings.logging = Some(LoggingConfig::default());
    }
    if client_config.settings.timeout_ms.is_none() {
        client_config.settings.timeout_ms = Some(DEFAULT_HTTP_TIMEOUT_MS);
    }
    client_config.settings.base_url = client_config
        .settings
        .base_url
        .trim_end_matches('/')
        .to_owned();

    debug!("validation config ...");
    proc_validator::validate_client_config(&client_config)
        .await
        .map_err(|errors| anyhow!(errors.join("; ")))?;

    Ok(client_config)
}

pub(crate) fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn expands_env_vars_with_defaults() {
        std::env::set_var("BEARER_CLIENT_TEST_HOST", "api.example.com");
        let out = expand_env_vars("url: https://${BEARER_CLIENT_TEST_HOST}/api lang: ${BEARER_CLIENT_TEST_LANG:de-DE}").unwrap();
        std::env::remove_var("BEARER_CLIENT_TEST_HOST");

        assert_eq!(out, "url: https://api.example.com/api lang: de-DE");
    }

    #[tokio::test]
    async fn applies_defaults() {
        let cfg = parse_config("settings:\n  base_url: http://localhost:8080/api/\n".to_owned())
            .await
            .unwrap();

        assert_eq!(cfg.settings.base_url, "http://localhost:8080/api");
        assert_eq!(cfg.settings.default_lang, "en-US");
        assert_eq!(cfg.settings.timeout_ms, Some(DEFAULT_HTTP_TIMEOUT_MS));
        assert_eq!(cfg.settings.refresh.path, "/auth/refresh");
        assert!(cfg.settings.refresh.single_flight);
        assert!(!cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.logging.unwrap().level, "info");
    }

    #[tokio::test]
    #[serial]
    async fn loads_file_with_env_placeholders() {
        std::env::set_var("BEARER_CLIENT_TEST_PORT", "9099");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
settings:
  base_url: "http://127.0.0.1:${{BEARER_CLIENT_TEST_PORT}}/api"
  default_lang: ${{BEARER_CLIENT_TEST_MISSING:fr-FR}}
  timeout_ms: 1500
  refresh:
    path: /auth/refresh
    single_flight: false
"#
        )
        .unwrap();

        let cfg = file_to_config(file.path()).await.unwrap();
        std::env::remove_var("BEARER_CLIENT_TEST_PORT");

        assert_eq!(cfg.settings.base_url, "http://127.0.0.1:9099/api");
        assert_eq!(cfg.settings.default_lang, "fr-FR");
        assert_eq!(cfg.settings.timeout_ms(), 1500);
        assert!(!cfg.settings.refresh.single_flight);
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let err = parse_config(
            "settings:\n  base_url: ftp://nowhere\n  timeout_ms: 0\n".to_owned(),
        )
        .await
        .unwrap_err()
        .to_string();

        assert!(err.contains("base_url"), "{err}");
        assert!(err.contains("timeout_ms"), "{err}");
    }
}
