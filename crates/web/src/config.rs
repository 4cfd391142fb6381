use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_MEDIA_MAX_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Rubric TOML file; the bundled rubric is used when unset.
    pub rubric_path: Option<PathBuf>,
    pub session_ttl_hours: i64,
    pub media: MediaConfig,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// File uploads are refused when no upload endpoint is configured.
    pub upload_url: Option<String>,
    pub upload_preset: Option<String>,
    pub max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let session_ttl_hours = match optional("SESSION_TTL_HOURS") {
            Some(value) => value
                .parse::<i64>()
                .context("SESSION_TTL_HOURS must be a number")?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };
        if session_ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive, got {}", session_ttl_hours);
        }

        let max_bytes = match optional("MEDIA_MAX_BYTES") {
            Some(value) => value
                .parse::<usize>()
                .context("MEDIA_MAX_BYTES must be a number")?,
            None => DEFAULT_MEDIA_MAX_BYTES,
        };

        Ok(Self {
            host: optional("HOST").context("Cannot load HOST env variable")?,
            port: optional("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: optional("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            rubric_path: optional("RUBRIC_PATH").map(PathBuf::from),
            session_ttl_hours,
            media: MediaConfig {
                upload_url: optional("MEDIA_UPLOAD_URL"),
                upload_preset: optional("MEDIA_UPLOAD_PRESET"),
                max_bytes,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("HOST", "127.0.0.1"),
        ("PORT", "8080"),
        ("DATABASE_URL", "postgres://jumper@localhost/jumper"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.rubric_path, None);
        assert_eq!(config.media.upload_url, None);
        assert_eq!(config.media.max_bytes, DEFAULT_MEDIA_MAX_BYTES);
    }

    #[test]
    fn test_optional_values() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("RUBRIC_PATH", "/etc/jumper/rubric.toml"),
            ("SESSION_TTL_HOURS", "2"),
            ("MEDIA_UPLOAD_URL", "https://media.example/upload"),
            ("MEDIA_MAX_BYTES", "1024"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.rubric_path,
            Some(PathBuf::from("/etc/jumper/rubric.toml"))
        );
        assert_eq!(config.session_ttl_hours, 2);
        assert_eq!(
            config.media.upload_url.as_deref(),
            Some("https://media.example/upload")
        );
        assert_eq!(config.media.max_bytes, 1024);
    }

    #[test]
    fn test_missing_database_url_fails() {
        let result = Config::from_lookup(lookup(&REQUIRED[..2]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_numbers_fail() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SESSION_TTL_HOURS", "-3"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = REQUIRED.to_vec();
        vars[1] = ("PORT", "http");
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
