use crate::config::types::{
    Config, CrawlerConfig, ExtractConfig, FetchConfig, SeedsConfig, StorageConfig,
    UserAgentConfig, MAX_WINDOW_HOURS,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_extract_config(&config.extract)?;
    validate_storage_config(&config.storage)?;
    validate_seeds_config(&config.seeds)?;
    Ok(())
}

/// Validates crawl loop configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_window(
        "retry_backoff_mins",
        config.retry_backoff_mins,
        MAX_WINDOW_HOURS * 60,
    )?;
    validate_window(
        "recrawl_window_hours",
        config.recrawl_window_hours,
        MAX_WINDOW_HOURS,
    )?;

    if config.idle_poll_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "idle_poll_secs must be >= 1, got {}",
            config.idle_poll_secs
        )));
    }

    Ok(())
}

/// Time windows must lie in `0..=max`
fn validate_window(name: &str, value: i64, max: i64) -> Result<(), ConfigError> {
    if !(0..=max).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 0 and {}, got {}",
            name, max, value
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // The name doubles as the robots.txt product token: [A-Za-z0-9_-]
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only letters, digits, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.robots_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeouts must be >= 1s, got timeout_secs={} robots_timeout_secs={}",
            config.timeout_secs, config.robots_timeout_secs
        )));
    }

    if config.max_body_bytes < 1 {
        return Err(ConfigError::Validation(
            "max_body_bytes must be >= 1".to_string(),
        ));
    }

    validate_window("robots_cache_hours", config.robots_cache_hours, MAX_WINDOW_HOURS)?;

    Ok(())
}

/// Validates extraction limits
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.max_links < 1 || config.max_text_chars < 1 || config.max_description_chars < 1 {
        return Err(ConfigError::Validation(format!(
            "extract limits must be >= 1, got max_links={} max_text_chars={} max_description_chars={}",
            config.max_links, config.max_text_chars, config.max_description_chars
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.max_stored_links < 1 || config.max_keywords < 1 {
        return Err(ConfigError::Validation(format!(
            "storage caps must be >= 1, got max_stored_links={} max_keywords={}",
            config.max_stored_links, config.max_keywords
        )));
    }

    Ok(())
}

fn validate_seeds_config(config: &SeedsConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seeds path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
