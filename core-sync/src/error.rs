use bridge_traits::error::BridgeError;
use core_catalog::{CatalogError, GatewayError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{category} item {id} not found")]
    NotFound { category: String, id: String },

    #[error("Local storage error: {0}")]
    Storage(#[from] BridgeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] CatalogError),
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        SyncError::Serialization(CatalogError::from(error))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
