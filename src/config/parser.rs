use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates TOML configuration text
///
/// Missing sections and keys fall back to their defaults.
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads and validates the configuration file at `path`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use navigate_crawler::config::load_config;
///
/// let config = load_config(Path::new("navigate.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex-encoded SHA-256 of the configuration file, logged at startup
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact bytes parsed
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

/// Loads the configuration at `path`, or the built-in defaults when no path is given
///
/// The hash is `None` for the built-in defaults.
pub fn load_config_or_default(
    path: Option<&Path>,
) -> ConfigResult<(Config, Option<String>)> {
    match path {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)?;
            Ok((config, Some(hash)))
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            Ok((config, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-depth = 2
host-cooldown-secs = 5
item-delay-ms = 250

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "2.1"
contact-url = "https://example.com/about"

[fetch]
max-body-bytes = 1024

[storage]
database-path = "./test.db"

[seeds]
path = "./seeds.txt"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.host_cooldown_secs, 5);
        assert_eq!(config.crawler.item_delay_ms, 250);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(
            config.user_agent.user_agent_string(),
            "TestCrawler/2.1 (+https://example.com/about)"
        );
        assert_eq!(config.fetch.max_body_bytes, 1024);
        assert_eq!(config.storage.database_path, "./test.db");
        assert_eq!(config.seeds.path, "./seeds.txt");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let file = create_temp_config("[crawler]\nmax-depth = 5\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 5);
        assert_eq!(config.crawler.host_cooldown_secs, 30);
        assert_eq!(config.crawler.retry_backoff_mins, 30);
        assert_eq!(config.user_agent.user_agent_string(), "NavigateBot/1.0");
        assert_eq!(config.fetch.max_body_bytes, 5 * 1024 * 1024);
        assert_eq!(config.extract.max_text_chars, 50_000);
        assert_eq!(config.storage.max_stored_links, 50);
    }

    #[test]
    fn test_empty_file_is_default_config() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.seeds.path, "seeds.txt");
    }

    #[test]
    fn test_load_or_default_without_path() {
        let (config, hash) = load_config_or_default(None).unwrap();
        assert!(hash.is_none());
        assert_eq!(config.crawler.max_depth, 3);
    }

    #[test]
    fn test_load_or_default_with_path() {
        let file = create_temp_config("[crawler]\nmax-depth = 1\n");
        let (config, hash) = load_config_or_default(Some(file.path())).unwrap();
        assert_eq!(config.crawler.max_depth, 1);
        assert_eq!(hash.map(|h| h.len()), Some(64));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[user-agent]
crawler-name = "Bad Name"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_config_rejects_huge_backoff() {
        let result = parse_config("[crawler]\nretry-backoff-mins = 9000000000000\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
