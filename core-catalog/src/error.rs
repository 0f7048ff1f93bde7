use thiserror::Error;

/// Failures at the remote gateway seam.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Endpoint or access key missing; no request was attempted
    #[error("Remote backend not configured")]
    NotConfigured,

    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success response; `body` is the response text as received
    #[error("Remote rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid category: '{0}' (expected 'film' or 'serie')")]
    InvalidCategory(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
