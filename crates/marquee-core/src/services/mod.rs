//! Clients for the external collaborators: the auth and row services of the
//! hosted backend, and the movie catalog.

pub mod auth;
pub mod catalog;
mod http;
pub mod rows;

use anyhow::Result;

pub use auth::{AuthClient, Authenticator, Backend, SignUpOutcome};
pub use catalog::{CatalogClient, PLACEHOLDER_POSTER};
pub use rows::{RowsClient, average_score};

use crate::config::Config;

/// Every collaborator client, built once from config.
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthClient,
    pub rows: RowsClient,
    pub catalog: CatalogClient,
}

impl Services {
    /// # Errors
    /// Returns an error if any required setting is missing or invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = Backend::from_config(config)?;
        Ok(Self {
            auth: AuthClient::new(backend.clone()),
            rows: RowsClient::new(backend),
            catalog: CatalogClient::from_config(config)?,
        })
    }
}
