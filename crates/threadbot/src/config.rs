//! Process configuration, read from the environment.

use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug};

use threadbot_core::ChannelId;
use threadbot_openai_completion::{OpenAIConfig, OpenAIConfigBuilder};

/// An error produced while reading the configuration.
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl StdError for ConfigError {}

/// Process-level settings for the assistant.
#[derive(Clone)]
pub struct BotConfig {
    api_key: Option<String>,
    model: Option<String>,
    forum_channel: ChannelId,
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    ///
    /// `OPENAI_API_KEY` and `OPENAI_MODEL` are optional: without a key
    /// the assistant still runs, and every request resolves to an
    /// unconfigured notice. A missing `FORUM_CHANNEL_ID` defaults to a
    /// channel id that matches no real channel, so the trigger policy
    /// engages nowhere until one is configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            env::var("OPENAI_API_KEY").ok(),
            env::var("OPENAI_MODEL").ok(),
            env::var("FORUM_CHANNEL_ID").ok(),
        )
    }

    fn from_vars(
        api_key: Option<String>,
        model: Option<String>,
        forum_channel: Option<String>,
    ) -> Result<Self, ConfigError> {
        let forum_channel = match forum_channel {
            Some(raw) => {
                ChannelId(raw.trim().parse().map_err(|_| ConfigError {
                    message: format!(
                        "FORUM_CHANNEL_ID is not a valid channel id: {raw:?}"
                    ),
                })?)
            }
            None => ChannelId(0),
        };
        Ok(Self {
            api_key,
            model,
            forum_channel,
        })
    }

    /// Returns the forum channel whose threads the assistant engages
    /// in.
    #[inline]
    pub fn forum_channel(&self) -> ChannelId {
        self.forum_channel
    }

    /// Returns `true` if an API key was provided.
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Builds the completion provider configuration from these
    /// settings.
    pub fn openai_config(&self) -> OpenAIConfig {
        let mut builder = OpenAIConfigBuilder::new();
        if let Some(api_key) = &self.api_key {
            builder = builder.with_api_key(api_key);
        }
        if let Some(model) = &self.model {
            builder = builder.with_model(model);
        }
        builder.build()
    }
}

impl Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("forum_channel", &self.forum_channel)
            .finish()
    }
}
