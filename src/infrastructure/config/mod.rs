//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub webhook: WebhookConfig,
    pub scraper: ScraperConfig,
}

/// Deployment mode, decides how updates are received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    /// Long polling, for running on a local machine
    #[default]
    Development,
    /// Webhook behind a public URL
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidValue(format!("environment: {}", other))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub environment: Option<Environment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub poll_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WebhookConfig {
    pub port: Option<u16>,
    /// Public base URL Telegram posts to; the token is appended as path
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScraperConfig {
    pub profile_base_url: String,
    pub user_agent: String,
    pub challenge_delay_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "instapic-bot".to_string(),
            environment: None,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout_seconds: 60,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            profile_base_url: "https://instagram.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
            challenge_delay_ms: 4000,
        }
    }
}

impl ScraperConfig {
    pub fn challenge_delay(&self) -> Duration {
        Duration::from_millis(self.challenge_delay_ms)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable lookup; `BOT_TOKEN`/`TOKEN`,
    /// `PORT`, `BOT_ENV`/`GO_ENV` and `WEBHOOK_URL` are recognised
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |keys: &[&str]| keys.iter().find_map(|&k| lookup(k).filter(|v| !v.is_empty()));

        if let Some(token) = var(&["BOT_TOKEN", "TOKEN"]) {
            self.telegram.token = Some(token);
        }

        if let Some(port) = var(&["PORT"]) {
            let port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT: {}", port)))?;
            self.webhook.port = Some(port);
        }

        if let Some(env) = var(&["BOT_ENV", "GO_ENV"]) {
            self.bot.environment = Some(Environment::parse(&env)?);
        }

        if let Some(url) = var(&["WEBHOOK_URL"]) {
            self.webhook.public_url = Some(url);
        }

        Ok(())
    }

    /// Environment in effect; unset means development
    pub fn environment(&self) -> Environment {
        self.bot.environment.unwrap_or_default()
    }

    /// Check everything needed at startup is present: the token and the
    /// port always, the public URL in production.
    ///
    /// Returns the bot token so callers don't have to unwrap it again.
    pub fn validate(&self) -> Result<&str, ConfigError> {
        let token = self.telegram.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("telegram.token (BOT_TOKEN)".to_string()))?;

        if self.webhook.port.is_none() {
            return Err(ConfigError::MissingField("webhook.port (PORT)".to_string()));
        }

        if self.environment() == Environment::Production
            && self.webhook.public_url.as_deref().unwrap_or_default().is_empty()
        {
            return Err(ConfigError::MissingField("webhook.public-url (WEBHOOK_URL)".to_string()));
        }

        if self.scraper.profile_base_url.is_empty() {
            return Err(ConfigError::MissingField("scraper.profile-base-url".to_string()));
        }

        Ok(token)
    }
}
