//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates base url scheme, locale, timeout, refresh path and logging invariants

use tracing::{error, info};

use crate::config::settings::{ClientConfig, LoggingConfig, RefreshConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;

const ALLOWED_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_client_config(cfg: &ClientConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    let base_url = settings.base_url.trim();
    if base_url.is_empty() {
        errors.push("settings.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(format!(
            "settings.base_url '{}' must start with http:// or https://",
            base_url
        ));
    }

    if settings.default_lang.trim().is_empty() {
        errors.push("settings.default_lang must not be empty".to_string());
    }

    if let Some(timeout_ms) = settings.timeout_ms {
        if timeout_ms == 0 {
            errors.push("settings.timeout_ms must be > 0".to_string());
        }
    }

    validate_refresh(&settings.refresh, errors);

    if let Some(logging) = &settings.logging {
        validate_logging(logging, errors);
    }
}

fn validate_refresh(refresh: &RefreshConfig, errors: &mut Vec<String>) {
    if !refresh.path.starts_with('/') {
        errors.push(format!(
            "settings.refresh.path '{}' must start with '/'",
            refresh.path
        ));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    let level = logging.level.to_lowercase();
    if !ALLOWED_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, ALLOWED_LOG_LEVELS
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{LogFormat, MetricsConfig};

    fn settings() -> SettingsConfig {
        SettingsConfig {
            base_url: "http://localhost:8080/api".to_owned(),
            default_lang: "en-US".to_owned(),
            timeout_ms: Some(1000),
            refresh: RefreshConfig::default(),
            metrics: MetricsConfig::default(),
            logging: Some(LoggingConfig::default()),
        }
    }

    #[tokio::test]
    async fn valid_config_passes() {
        let cfg = ClientConfig { settings: settings() };
        assert!(validate_client_config(&cfg).await.is_ok());
    }

    #[tokio::test]
    async fn collects_every_issue() {
        let mut s = settings();
        s.base_url = "localhost".to_owned();
        s.default_lang = " ".to_owned();
        s.timeout_ms = Some(0);
        s.refresh.path = "auth/refresh".to_owned();
        s.logging = Some(LoggingConfig::new("verbose".to_owned(), LogFormat::Json));

        let errors = validate_client_config(&ClientConfig { settings: s })
            .await
            .unwrap_err();

        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("base_url")));
        assert!(errors.iter().any(|e| e.contains("default_lang")));
        assert!(errors.iter().any(|e| e.contains("timeout_ms")));
        assert!(errors.iter().any(|e| e.contains("refresh.path")));
        assert!(errors.iter().any(|e| e.contains("logging.level")));
    }
}
