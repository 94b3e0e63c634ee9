//! Configuration management

use anyhow::Result;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (optional - bot features disabled when absent)
    pub bot_token: Option<String>,

    /// HTTP listen port
    pub port: u16,

    /// Externally reachable base URL, used to build the shareable raw link
    pub public_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("BOT_TOKEN").ok().filter(|t| !t.is_empty());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let public_url = std::env::var("RENDER_EXTERNAL_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        Ok(Self {
            bot_token,
            port,
            public_url,
        })
    }

    /// The stable raw-content URL shared with clients
    pub fn raw_url(&self) -> String {
        format!("{}/raw", self.public_url)
    }

    /// Whether the base URL is publicly reachable (not localhost)
    pub fn is_public(&self) -> bool {
        !self.public_url.contains("localhost") && !self.public_url.contains("127.0.0.1")
    }

    /// Whether a bot front end is configured
    pub fn bot_enabled(&self) -> bool {
        self.bot_token.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_local() {
        let config = Config::default();
        assert!(!config.is_public());
        assert!(!config.bot_enabled());
        assert_eq!(config.raw_url(), "http://localhost:8080/raw");
    }

    #[test]
    fn test_public_url_detection() {
        let config = Config {
            public_url: "https://rawslot.onrender.com".to_string(),
            ..Default::default()
        };
        assert!(config.is_public());
        assert_eq!(config.raw_url(), "https://rawslot.onrender.com/raw");

        let loopback = Config {
            public_url: "http://127.0.0.1:9000".to_string(),
            ..Default::default()
        };
        assert!(!loopback.is_public());
    }
}
