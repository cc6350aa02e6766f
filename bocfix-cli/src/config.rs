use anyhow::{Context, Result};
use std::fmt;
use tracing::Level;

/// Process configuration, read from the environment once at start-up.
#[derive(Clone)]
pub struct Config {
    pub firefly_url: String,
    pub firefly_token: String,
    /// Shared webhook secret, used as raw bytes
    pub secret: Vec<u8>,
    pub host: String,
    pub port: u16,
    pub log_level: Level,
    /// Replay window for webhook signatures; `None` disables it
    pub max_age_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let firefly_url = get("FIREFLY_URL").context("FIREFLY_URL should be present")?;
        let firefly_token = get("FIREFLY_TOKEN").context("FIREFLY_TOKEN should be present")?;
        let secret = get("WEBHOOK_SECRET")
            .context("WEBHOOK_SECRET should be present")?
            .into_bytes();

        let host = get("FIREFLY_BOC_FIXER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("FIREFLY_BOC_FIXER_PORT") {
            Some(p) => p
                .parse()
                .with_context(|| format!("FIREFLY_BOC_FIXER_PORT '{p}' is not a port number"))?,
            None => 3000,
        };

        let log_level = parse_log_level(get("LOG_LEVEL").as_deref().unwrap_or(""));

        let max_age_secs = get("WEBHOOK_MAX_AGE_SECS")
            .map(|s| {
                s.parse::<u64>().with_context(|| {
                    format!("WEBHOOK_MAX_AGE_SECS '{s}' is not a number of seconds")
                })
            })
            .transpose()?;

        Ok(Self {
            firefly_url,
            firefly_token,
            secret,
            host,
            port,
            log_level,
            max_age_secs,
        })
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("firefly_url", &self.firefly_url)
            .field("firefly_token", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

/// ERROR / WARN / INFO / DEBUG, any case. Anything else means INFO.
pub fn parse_log_level(s: &str) -> Level {
    match s.to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "DEBUG" => Level::DEBUG,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("FIREFLY_URL", "https://firefly.local"),
        ("FIREFLY_TOKEN", "tok"),
        ("WEBHOOK_SECRET", "s3cret"),
    ];

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.secret, b"s3cret");
        assert_eq!(cfg.bind_address(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, Level::INFO);
        assert_eq!(cfg.max_age_secs, None);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("FIREFLY_BOC_FIXER_HOST", "::1"),
            ("FIREFLY_BOC_FIXER_PORT", "8080"),
            ("LOG_LEVEL", "debug"),
            ("WEBHOOK_MAX_AGE_SECS", "300"),
        ]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.bind_address(), "[::1]:8080");
        assert_eq!(cfg.log_level, Level::DEBUG);
        assert_eq!(cfg.max_age_secs, Some(300));
    }

    #[test]
    fn test_missing_or_empty_required() {
        let err = Config::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert!(err.to_string().contains("FIREFLY_URL"));

        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("WEBHOOK_SECRET", "");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("WEBHOOK_SECRET"));
    }

    #[test]
    fn test_bad_port() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FIREFLY_BOC_FIXER_PORT", "http"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse_log_level("error"), Level::ERROR);
        assert_eq!(parse_log_level("Warn"), Level::WARN);
        assert_eq!(parse_log_level("INFO"), Level::INFO);
        assert_eq!(parse_log_level("trace"), Level::INFO);
        assert_eq!(parse_log_level(""), Level::INFO);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let dbg = format!("{:?}", Config::from_lookup(lookup(&REQUIRED)).unwrap());
        assert!(!dbg.contains("s3cret"));
        assert!(!dbg.contains("\"tok\""));
    }
}
