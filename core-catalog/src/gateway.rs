//! Remote Gateway seam
//!
//! The write and sync paths talk to the remote table only through
//! [`ContentGateway`]. Implementations issue exactly one request per call
//! and never retry.

use async_trait::async_trait;

use crate::error::{GatewayError, GatewayResult};
use crate::models::Category;
use crate::rows::{ContentPatchRow, ContentRow, NewContentRow};

#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Both connection values are present. When false, every operation
    /// fails with [`GatewayError::NotConfigured`] without network access.
    fn is_configured(&self) -> bool;

    /// Rows of one category ordered by creation time, oldest first
    async fn list(&self, category: Category) -> GatewayResult<Vec<ContentRow>>;

    /// Insert a row and return the created representation
    async fn insert(&self, row: &NewContentRow) -> GatewayResult<ContentRow>;

    async fn patch(&self, id: &str, patch: &ContentPatchRow) -> GatewayResult<()>;

    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Gateway for deployments without a remote backend.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl ContentGateway for UnconfiguredGateway {
    fn is_configured(&self) -> bool {
        false
    }

    async fn list(&self, _category: Category) -> GatewayResult<Vec<ContentRow>> {
        Err(GatewayError::NotConfigured)
    }

    async fn insert(&self, _row: &NewContentRow) -> GatewayResult<ContentRow> {
        Err(GatewayError::NotConfigured)
    }

    async fn patch(&self, _id: &str, _patch: &ContentPatchRow) -> GatewayResult<()> {
        Err(GatewayError::NotConfigured)
    }

    async fn delete(&self, _id: &str) -> GatewayResult<()> {
        Err(GatewayError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_gateway_rejects_everything() {
        let gateway = UnconfiguredGateway;
        assert!(!gateway.is_configured());
        assert_eq!(
            gateway.list(Category::Film).await.unwrap_err(),
            GatewayError::NotConfigured
        );
        assert_eq!(gateway.delete("1").await.unwrap_err(), GatewayError::NotConfigured);
    }
}
