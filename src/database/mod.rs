pub mod memory;
pub mod postgres;
pub mod service;
pub mod store;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use service::ResourceService;
pub use store::{Condition, DocumentStore, Filter, Projection, StoreError};

use crate::config::{DatabaseConfig, StoreBackend};

/// Build the configured document store
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let store = PgStore::connect(url, config.max_connections, config.connection_timeout).await?;
            Ok(Arc::new(store))
        }
    }
}
