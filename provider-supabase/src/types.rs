//! Supabase wire types
//!
//! REST constants and the Phoenix channel frames spoken by Supabase Realtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// REST prefix under the project URL
pub const REST_PREFIX: &str = "/rest/v1";

/// Realtime websocket path under the project URL
pub const REALTIME_PATH: &str = "/realtime/v1/websocket";

/// Phoenix protocol version
pub const PHOENIX_VSN: &str = "1.0.0";

/// Remote table holding the catalog
pub const CONTENT_TABLE: &str = "content";

/// A Phoenix channel message
///
/// See: https://hexdocs.pm/phoenix/writing_a_channels_client.html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl PhoenixMessage {
    pub fn new(topic: impl Into<String>, event: impl Into<String>, payload: Value, reference: u64) -> Self {
        Self {
            topic: topic.into(),
            event: event.into(),
            payload,
            reference: Some(reference.to_string()),
        }
    }
}

/// Payload of a `postgres_changes` frame
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresChangePayload {
    pub data: PostgresChangeData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresChangeData {
    /// INSERT, UPDATE or DELETE
    #[serde(rename = "type", default)]
    pub change_type: String,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
}

/// Payload of a `phx_reply` frame
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub response: Value,
}
