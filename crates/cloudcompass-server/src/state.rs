use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cloudcompass_core::AiSettings;
use cloudcompass_suggest::{Advisor, Generator};
use tokio::sync::RwLock;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<AiSettings>>,
    pub settings_path: PathBuf,
    pub generate_delay: Duration,
    /// Replaces the settings-derived model when set.
    generator: Option<Arc<dyn Generator>>,
}

impl AppState {
    pub fn new(settings_path: PathBuf, generate_delay: Duration) -> Self {
        let settings = cloudcompass_core::read_settings_from(&settings_path);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            settings_path,
            generate_delay,
            generator: None,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.settings_path(), config.generate_delay())
    }

    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// An advisor reflecting the current AI settings.
    pub async fn advisor(&self) -> Advisor {
        match &self.generator {
            Some(generator) => Advisor::with_generator(generator.clone()),
            None => Advisor::from_settings(&*self.settings.read().await),
        }
    }
}
