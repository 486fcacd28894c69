use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::responses::{ResponseRule, ResponseTable};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    /// Replaces the built-in reply table when present
    #[serde(default)]
    pub responses: Option<ResponsesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_true")]
    pub greeting_enabled: bool,
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            greeting: default_greeting(),
            greeting_enabled: true,
            wrap_width: default_wrap_width(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResponsesConfig {
    #[serde(default = "default_fallback_reply")]
    pub default_reply: String,
    #[serde(default)]
    pub rules: Vec<ResponseRule>,
}

fn default_reply_delay_ms() -> u64 {
    1500
}

fn default_greeting() -> String {
    "Hello! I'm your AI Health Assistant. I can help you with health information, \
     disease awareness, and answer your medical questions. How can I assist you today?"
        .to_string()
}

fn default_true() -> bool {
    true
}

fn default_wrap_width() -> usize {
    80
}

fn default_assistant_name() -> String {
    "AI Health Assistant".to_string()
}

fn default_fallback_reply() -> String {
    crate::responses::DEFAULT_REPLY.to_string()
}

impl Config {
    /// Simulated typing delay before each reply
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.chat.reply_delay_ms)
    }

    /// Greeting to open each session with, if enabled
    pub fn greeting(&self) -> Option<&str> {
        if self.chat.greeting_enabled && !self.chat.greeting.trim().is_empty() {
            Some(&self.chat.greeting)
        } else {
            None
        }
    }

    /// The reply table: the configured one if [responses] is set, else the built-in
    pub fn response_table(&self) -> Result<ResponseTable> {
        match &self.responses {
            Some(custom) => ResponseTable::new(custom.rules.clone(), custom.default_reply.clone())
                .context("Invalid [responses] table"),
            None => Ok(ResponseTable::builtin()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        // Surface table errors at load time rather than on first use
        config.response_table()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
