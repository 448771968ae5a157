//! Application state management.
//!
//! Holds the storage backend, JWT service and the Digimart client shared
//! by all route handlers.

use std::sync::Arc;

use crate::services::digimart_service::DigimartService;
use crate::services::jwt_service::{JwtService, SharedJwtService};
use crate::storage::{MemoryStorage, PostgresStorage, StorageBackend, StorageError};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (in-memory unless DATABASE_URL selects PostgreSQL)
    pub storage: Arc<dyn StorageBackend>,
    /// JWT service for token issuance and validation
    pub jwt_service: SharedJwtService,
    /// Digimart billing aggregator client
    pub digimart: Arc<DigimartService>,
    /// Public base URL used to build absolute media URLs
    pub public_base_url: String,
}

impl AppState {
    /// Create a new application state backed by in-memory storage.
    pub fn new() -> Self {
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string());
        Self {
            storage: Arc::new(MemoryStorage::new()),
            jwt_service: Arc::new(JwtService::from_env()),
            digimart: Arc::new(DigimartService::from_env()),
            public_base_url,
        }
    }

    /// Switch to PostgreSQL storage when DATABASE_URL is configured.
    ///
    /// Runs migrations on connect. Without DATABASE_URL the in-memory
    /// backend stays in place.
    pub async fn init_storage(&mut self) -> Result<(), StorageError> {
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            let storage = PostgresStorage::connect(&database_url).await?;
            self.storage = Arc::new(storage);
        }
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
