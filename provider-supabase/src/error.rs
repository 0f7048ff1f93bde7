//! Error types for the Supabase provider

use bridge_traits::error::BridgeError;
use core_catalog::GatewayError;
use thiserror::Error;

/// Supabase provider errors
#[derive(Error, Debug)]
pub enum SupabaseError {
    /// URL or anon key missing
    #[error("Supabase is not configured")]
    NotConfigured,

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `message` is the raw response body
    #[error("Supabase API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// An insert succeeded but returned no row
    #[error("Insert returned no representation")]
    MissingRepresentation,

    #[error("Realtime error: {0}")]
    Realtime(String),
}

pub type Result<T> = std::result::Result<T, SupabaseError>;

impl From<BridgeError> for SupabaseError {
    fn from(error: BridgeError) -> Self {
        SupabaseError::Network(error.to_string())
    }
}

impl From<SupabaseError> for GatewayError {
    fn from(error: SupabaseError) -> Self {
        match error {
            SupabaseError::NotConfigured => GatewayError::NotConfigured,
            SupabaseError::Network(msg) | SupabaseError::Realtime(msg) => {
                GatewayError::Transport(msg)
            }
            SupabaseError::ApiError {
                status_code,
                message,
            } => GatewayError::Rejected {
                status: status_code,
                body: message,
            },
            SupabaseError::ParseError(msg) => GatewayError::Parse(msg),
            SupabaseError::MissingRepresentation => {
                GatewayError::Parse("insert returned no representation".to_string())
            }
        }
    }
}

impl From<SupabaseError> for BridgeError {
    fn from(error: SupabaseError) -> Self {
        match error {
            SupabaseError::NotConfigured => {
                BridgeError::NotAvailable("Supabase is not configured".to_string())
            }
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
