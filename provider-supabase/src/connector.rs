//! Supabase REST connector
//!
//! Implements [`ContentGateway`] over the PostgREST endpoint of a Supabase
//! project. Every call issues exactly one request: failures surface to the
//! caller, which decides whether to fall back to local storage.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_catalog::{
    Category, ContentGateway, ContentPatchRow, ContentRow, GatewayResult, NewContentRow,
};
use core_runtime::config::RemoteSettings;
use tracing::{debug, instrument, warn};

use crate::error::{Result, SupabaseError};
use crate::types::{CONTENT_TABLE, REST_PREFIX};

/// REST gateway for the `content` table
pub struct SupabaseConnector {
    http_client: Arc<dyn HttpClient>,
    settings: RemoteSettings,
}

impl SupabaseConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, settings: RemoteSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    pub fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    fn table_url(&self, query: &str) -> Result<String> {
        let base = self.settings.base_url().ok_or(SupabaseError::NotConfigured)?;
        Ok(format!("{}{}/{}?{}", base, REST_PREFIX, CONTENT_TABLE, query))
    }

    fn access_key(&self) -> Result<&str> {
        self.settings
            .access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SupabaseError::NotConfigured)
    }

    /// Request carrying the project key as both `apikey` and bearer token
    fn request(&self, method: HttpMethod, query: &str) -> Result<HttpRequest> {
        let url = self.table_url(query)?;
        let key = self.access_key()?;

        Ok(HttpRequest::new(method, url)
            .header("apikey", key)
            .bearer_token(key)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation"))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .http_client
            .execute(request)
            .await?;

        if !response.is_success() {
            let message = response.text();
            warn!(status = response.status, "Supabase request rejected");
            return Err(SupabaseError::ApiError {
                status_code: response.status,
                message,
            });
        }

        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn list_rows(&self, category: Category) -> Result<Vec<ContentRow>> {
        let query = format!(
            "type=eq.{}&order=created_at.asc&select=*",
            category.as_str()
        );
        let request = self.request(HttpMethod::Get, &query)?;
        let response = self.send(request).await?;

        let rows: Vec<ContentRow> = serde_json::from_slice(&response.body)
            .map_err(|e| SupabaseError::ParseError(e.to_string()))?;

        debug!(category = %category, count = rows.len(), "Listed remote rows");
        Ok(rows)
    }

    #[instrument(skip(self, row), fields(category = %row.kind))]
    pub async fn insert_row(&self, row: &NewContentRow) -> Result<ContentRow> {
        let request = self
            .request(HttpMethod::Post, "select=*")?
            .json(row)
            .map_err(|e| SupabaseError::ParseError(e.to_string()))?;
        let response = self.send(request).await?;

        let mut rows: Vec<ContentRow> = serde_json::from_slice(&response.body)
            .map_err(|e| SupabaseError::ParseError(e.to_string()))?;

        if rows.is_empty() {
            return Err(SupabaseError::MissingRepresentation);
        }
        let created = rows.swap_remove(0);
        debug!(id = %created.id, "Inserted remote row");
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn patch_row(&self, id: &str, patch: &ContentPatchRow) -> Result<()> {
        let query = format!("id=eq.{}", urlencoding::encode(id));
        let request = self
            .request(HttpMethod::Patch, &query)?
            .json(patch)
            .map_err(|e| SupabaseError::ParseError(e.to_string()))?;
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_row(&self, id: &str) -> Result<()> {
        let query = format!("id=eq.{}", urlencoding::encode(id));
        let request = self.request(HttpMethod::Delete, &query)?;
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentGateway for SupabaseConnector {
    fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    async fn list(&self, category: Category) -> GatewayResult<Vec<ContentRow>> {
        Ok(self.list_rows(category).await?)
    }

    async fn insert(&self, row: &NewContentRow) -> GatewayResult<ContentRow> {
        Ok(self.insert_row(row).await?)
    }

    async fn patch(&self, id: &str, patch: &ContentPatchRow) -> GatewayResult<()> {
        Ok(self.patch_row(id, patch).await?)
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        Ok(self.delete_row(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bytes::Bytes;
    use core_catalog::{Episode, GatewayError, ItemPatch, NewItem};
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn connector(mock_http: MockHttpClient) -> SupabaseConnector {
        SupabaseConnector::new(
            Arc::new(mock_http),
            RemoteSettings::new("https://demo.supabase.co/", "anon-key"),
        )
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        req.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
            .unwrap_or(serde_json::Value::Null)
    }

    #[tokio::test]
    async fn test_list_builds_filtered_query() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url
                        == "https://demo.supabase.co/rest/v1/content?type=eq.serie&order=created_at.asc&select=*"
                    && req.headers.get("apikey").map(String::as_str) == Some("anon-key")
                    && req.headers.get("Authorization").map(String::as_str)
                        == Some("Bearer anon-key")
            })
            .returning(|_| {
                Ok(response(
                    200,
                    r#"[{"id":1,"type":"serie","title":"Dark","video_url":"d.mp4","episodes":null}]"#,
                ))
            });

        let rows = connector(mock_http).list(Category::Serie).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].to_series_item().episodes.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_returns_first_row() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                let body = body_json(req);
                req.method == HttpMethod::Post
                    && req.headers.get("Prefer").map(String::as_str)
                        == Some("return=representation")
                    && body["type"] == "film"
                    && body["title"] == "Heat"
            })
            .returning(|_| Ok(response(201, r#"[{"id":"42","title":"Heat"}]"#)));

        let row = NewContentRow::from_new_item(Category::Film, &NewItem::new("Heat")).unwrap();
        let created = connector(mock_http).insert(&row).await.unwrap();
        assert_eq!(created.id, "42");
    }

    #[tokio::test]
    async fn test_insert_without_representation_fails() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(201, "[]")));

        let row = NewContentRow::from_new_item(Category::Film, &NewItem::new("Heat")).unwrap();
        let result = connector(mock_http).insert_row(&row).await;
        assert!(matches!(result, Err(SupabaseError::MissingRepresentation)));
    }

    #[tokio::test]
    async fn test_patch_sends_only_provided_fields() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                req.method == HttpMethod::Patch
                    && req.url.ends_with("/rest/v1/content?id=eq.7")
                    && body_json(req) == serde_json::json!({ "title": "New" })
            })
            .returning(|_| Ok(response(200, "[]")));

        let patch = ItemPatch {
            title: Some("New".into()),
            ..Default::default()
        };
        let body = ContentPatchRow::from_patch(&patch).unwrap();
        connector(mock_http).patch("7", &body).await.unwrap();
    }

    #[tokio::test]
    async fn test_patch_with_episodes_serializes_them_as_text() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                let body = body_json(req);
                body["video_url"] == "a.mp4" && body["episodes"].is_string()
            })
            .returning(|_| Ok(response(204, "")));

        let patch = ItemPatch {
            episodes: Some(vec![Episode::new(1, 1, "A").with_video_url("a.mp4")]),
            ..Default::default()
        };
        let body = ContentPatchRow::from_patch(&patch).unwrap();
        connector(mock_http).patch("7", &body).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_encodes_identifier() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                req.method == HttpMethod::Delete
                    && req.url.ends_with("/rest/v1/content?id=eq.a%20b%26c")
            })
            .returning(|_| Ok(response(204, "")));

        connector(mock_http).delete("a b&c").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_carries_status_and_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(401, r#"{"message":"Invalid API key"}"#)));

        let error = connector(mock_http).delete("1").await.unwrap_err();
        assert_eq!(
            error,
            GatewayError::Rejected {
                status: 401,
                body: r#"{"message":"Invalid API key"}"#.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_transport() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("connection refused".into())));

        let error = connector(mock_http).list(Category::Film).await.unwrap_err();
        assert!(matches!(error, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, "<html>")));

        let error = connector(mock_http).list(Category::Film).await.unwrap_err();
        assert!(matches!(error, GatewayError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_request() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);
        mock_http.expect_execute().times(0);

        let connector = SupabaseConnector::new(
            Arc::new(mock_http),
            RemoteSettings {
                endpoint: Some("https://demo.supabase.co".into()),
                access_key: Some("  ".into()),
            },
        );

        assert!(!connector.is_configured());
        assert_eq!(
            connector.list(Category::Film).await.unwrap_err(),
            GatewayError::NotConfigured
        );
    }
}
