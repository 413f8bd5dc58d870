//! Application state management.

use crate::error::CommandError;
use leadgrid_core::AppConfig;
use leadgrid_places::{GoogleMapsGateway, PlacesGateway};
use leadgrid_scanner::{ScrapePipeline, ScrapeSettings};
use leadgrid_store::TabularStore;
use std::sync::Arc;

/// State shared by every command.
pub struct AppState {
    /// Effective configuration
    pub config: AppConfig,

    /// List store rooted at the configured lists directory
    pub store: Arc<TabularStore>,

    /// Gateway override; when unset one is built from `config.provider`
    gateway: Option<Arc<dyn PlacesGateway>>,
}

impl AppState {
    /// Open the list store described by `config`.
    ///
    /// Creates the lists directory if it doesn't exist.
    pub async fn new(config: AppConfig) -> Result<Self, CommandError> {
        let lists_dir = config.lists_dir()?;
        let store = TabularStore::open(&lists_dir).await?;
        tracing::info!("Lists directory: {}", store.root().display());

        Ok(Self {
            config,
            store: Arc::new(store),
            gateway: None,
        })
    }

    /// Use `gateway` instead of the configured provider.
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn PlacesGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Build a scrape pipeline over the store and the places provider.
    ///
    /// Fails when no gateway was injected and no API key is configured.
    pub fn pipeline(&self) -> Result<ScrapePipeline, CommandError> {
        let gateway = match &self.gateway {
            Some(gateway) => Arc::clone(gateway),
            None => Arc::new(GoogleMapsGateway::from_config(&self.config.provider)?)
                as Arc<dyn PlacesGateway>,
        };

        Ok(ScrapePipeline::new(gateway, Arc::clone(&self.store))
            .with_settings(ScrapeSettings::from(&self.config.scraping)))
    }
}
