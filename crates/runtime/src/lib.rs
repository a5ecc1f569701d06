use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sanketbani_chats::{Dispatcher, Relay};
use sanketbani_config::AppConfig;
use sanketbani_providers::HttpConversionProvider;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Long-lived services shared by every request.
///
/// Created once at start-up; call [`BackendServices::shutdown`] after the
/// server stops accepting connections.
#[derive(Clone)]
pub struct BackendServices {
    pub provider: Arc<HttpConversionProvider>,
    pub dispatcher: Arc<Dispatcher>,
    pub relay: Arc<Relay>,
}

impl BackendServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let provider = Arc::new(
            HttpConversionProvider::new(&config.providers)
                .context("failed to build conversion provider")?,
        );

        let routines = provider.configured_routines();
        if routines.is_empty() {
            warn!("no conversion endpoints configured, conversion services will fail");
        }

        let call_timeout = Duration::from_secs(config.providers.request_timeout_seconds.max(1));
        let dispatcher = Arc::new(Dispatcher::new(provider.clone(), call_timeout));
        let relay = Arc::new(Relay::new(&config.relay));

        info!(
            ?routines,
            timeout_seconds = call_timeout.as_secs(),
            echo_to_sender = config.relay.echo_to_sender,
            "backend services ready"
        );

        Ok(Self {
            provider,
            dispatcher,
            relay,
        })
    }

    /// Close every relay connection.
    pub async fn shutdown(&self) {
        self.relay.shutdown().await;
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
