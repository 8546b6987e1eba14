//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::{ConfigError, EngineConfig};
use crate::db::repository::FullRepository;
use crate::services::{ChatEngine, LogNotifier, Notifier, TrendMonitor};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub config: Arc<EngineConfig>,
    /// Owns the alert ledger for the stream endpoint.
    pub trend_monitor: Arc<TrendMonitor>,
    pub chat: Arc<ChatEngine>,
}

impl AppState {
    /// State that reports fired alerts through the log.
    pub fn new(repository: Arc<dyn FullRepository>, config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_notifier(repository, config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(
        repository: Arc<dyn FullRepository>,
        config: EngineConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let chat = ChatEngine::from_config(&config)?;
        let trend_monitor = TrendMonitor::new(config.trends.policy(), notifier);
        Ok(Self {
            repository,
            config: Arc::new(config),
            trend_monitor: Arc::new(trend_monitor),
            chat: Arc::new(chat),
        })
    }
}
