use std::path::Path;
use std::sync::Arc;

use crate::ai::{Intelligence, OpenAiClient};
use crate::app::cancel::CancellationToken;
use crate::app::error::Result;
use crate::config::{ChannelConfig, Settings};
use crate::pipeline::EpisodePipeline;

pub struct AppContext {
    pub channel: ChannelConfig,
    pub settings: Settings,
    pub ai: Arc<dyn Intelligence>,
    pub cancel: CancellationToken,
}

impl AppContext {
    /// Read settings from the environment and the channel file at
    /// `channel_path`, then build the OpenAI client.
    pub fn new(channel_path: &Path) -> Result<Self> {
        let settings = Settings::from_env()?;
        let channel = ChannelConfig::load(channel_path)?;
        Self::with_settings(settings, channel)
    }

    pub fn with_settings(settings: Settings, channel: ChannelConfig) -> Result<Self> {
        let ai: Arc<dyn Intelligence> = Arc::new(OpenAiClient::new(&settings)?);

        Ok(Self {
            channel,
            settings,
            ai,
            cancel: CancellationToken::new(),
        })
    }

    /// A fresh pipeline sharing this context's client and cancellation token.
    pub fn pipeline(&self) -> EpisodePipeline {
        EpisodePipeline::new(self.ai.clone(), self.cancel.clone())
    }
}
