//! Supabase Realtime change feed
//!
//! Subscribes to `postgres_changes` on a table through the Phoenix channel
//! protocol and turns every INSERT/UPDATE/DELETE into a [`ChangeSignal`].
//! Signals carry no row data; consumers re-read the table.
//!
//! The connection is best effort. A failed connect or join surfaces as an
//! error from [`ChangeFeed::subscribe`]; a connection lost later simply
//! ends the stream.

use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::realtime::{ChangeFeed, ChangeKind, ChangeSignal, ChangeStream};
use core_runtime::config::RemoteSettings;
use futures::StreamExt;
use futures_util::SinkExt;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{Result, SupabaseError};
use crate::types::{
    PhoenixMessage, PostgresChangePayload, ReplyPayload, PHOENIX_VSN, REALTIME_PATH,
};

/// Phoenix closes idle sockets after 60s without a heartbeat
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

const JOIN_REF: u64 = 1;
const SIGNAL_BUFFER: usize = 16;

/// What a single inbound frame means for the subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Change(ChangeKind),
    Joined,
    JoinRejected(String),
    Closed(String),
    Ignored,
}

/// Push feed backed by Supabase Realtime
#[derive(Debug, Clone)]
pub struct SupabaseRealtimeFeed {
    settings: RemoteSettings,
    schema: String,
    heartbeat_interval: Duration,
}

impl SupabaseRealtimeFeed {
    pub fn new(settings: RemoteSettings) -> Self {
        Self {
            settings,
            schema: "public".to_string(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    fn access_key(&self) -> Result<&str> {
        self.settings
            .access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SupabaseError::NotConfigured)
    }

    async fn open(&self, resource: &str) -> Result<ChangeStream> {
        let base = self.settings.base_url().ok_or(SupabaseError::NotConfigured)?;
        let key = self.access_key()?;
        let url = websocket_url(base, key)?;
        let topic = channel_topic(&self.schema, resource);

        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| SupabaseError::Realtime(format!("connect failed: {}", e)))?;
        let (mut write, mut read) = ws_stream.split();

        let join = join_message(&topic, &self.schema, resource, key);
        write
            .send(Message::Text(encode(&join)?.into()))
            .await
            .map_err(|e| SupabaseError::Realtime(format!("join failed: {}", e)))?;

        let (tx, mut rx) = mpsc::channel::<ChangeSignal>(SIGNAL_BUFFER);
        let resource = resource.to_string();
        let heartbeat_every = self.heartbeat_interval;

        info!(topic = %topic, "Realtime subscription opened");

        tokio::spawn(async move {
            let mut heartbeat = tokio::time::interval(heartbeat_every);
            // The first tick completes immediately
            heartbeat.tick().await;
            let mut next_ref = JOIN_REF + 1;

            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        debug!(topic = %topic, "Realtime consumer gone");
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    _ = heartbeat.tick() => {
                        let frame = heartbeat_message(next_ref);
                        next_ref += 1;
                        let sent = match encode(&frame) {
                            Ok(text) => write.send(Message::Text(text.into())).await,
                            Err(_) => continue,
                        };
                        if let Err(e) = sent {
                            warn!(error = %e, "Realtime heartbeat failed");
                            break;
                        }
                    }
                    frame = read.next() => {
                        let text = match frame {
                            Some(Ok(Message::Text(text))) => text,
                            Some(Ok(Message::Close(_))) | None => {
                                debug!(topic = %topic, "Realtime connection closed");
                                break;
                            }
                            Some(Ok(_)) => continue,
                            Some(Err(e)) => {
                                warn!(error = %e, "Realtime connection error");
                                break;
                            }
                        };

                        match parse_frame(&text, &topic) {
                            FrameOutcome::Change(kind) => {
                                let signal = ChangeSignal { resource: resource.clone(), kind };
                                // A full buffer already guarantees a pending re-read
                                let _ = tx.try_send(signal);
                            }
                            FrameOutcome::Joined => debug!(topic = %topic, "Realtime channel joined"),
                            FrameOutcome::JoinRejected(reason) => {
                                warn!(topic = %topic, reason = %reason, "Realtime join rejected");
                                break;
                            }
                            FrameOutcome::Closed(event) => {
                                debug!(topic = %topic, event = %event, "Realtime channel closed");
                                break;
                            }
                            FrameOutcome::Ignored => {}
                        }
                    }
                }
            }
        });

        let stream = futures::stream::poll_fn(move |cx| rx.poll_recv(cx));
        Ok(stream.boxed())
    }
}

#[async_trait]
impl ChangeFeed for SupabaseRealtimeFeed {
    async fn subscribe(&self, resource: &str) -> BridgeResult<ChangeStream> {
        self.open(resource).await.map_err(BridgeError::from)
    }
}

fn encode(message: &PhoenixMessage) -> Result<String> {
    serde_json::to_string(message).map_err(|e| SupabaseError::ParseError(e.to_string()))
}

/// `https://x.supabase.co` becomes `wss://x.supabase.co/realtime/v1/websocket?apikey=..&vsn=1.0.0`
pub fn websocket_url(base_url: &str, access_key: &str) -> Result<String> {
    let host = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        return Err(SupabaseError::Realtime(format!(
            "unsupported endpoint scheme: {}",
            base_url
        )));
    };

    Ok(format!(
        "{}{}?apikey={}&vsn={}",
        host.trim_end_matches('/'),
        REALTIME_PATH,
        urlencoding::encode(access_key),
        PHOENIX_VSN
    ))
}

pub fn channel_topic(schema: &str, table: &str) -> String {
    format!("realtime:{}:{}", schema, table)
}

pub fn join_message(topic: &str, schema: &str, table: &str, access_key: &str) -> PhoenixMessage {
    PhoenixMessage::new(
        topic,
        "phx_join",
        json!({
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": schema, "table": table }
                ]
            },
            "access_token": access_key
        }),
        JOIN_REF,
    )
}

pub fn heartbeat_message(reference: u64) -> PhoenixMessage {
    PhoenixMessage::new("phoenix", "heartbeat", json!({}), reference)
}

/// Classify an inbound text frame for the channel `topic`
pub fn parse_frame(text: &str, topic: &str) -> FrameOutcome {
    let message: PhoenixMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(_) => return FrameOutcome::Ignored,
    };

    if message.topic != topic {
        return FrameOutcome::Ignored;
    }

    match message.event.as_str() {
        "postgres_changes" => {
            match serde_json::from_value::<PostgresChangePayload>(message.payload) {
                Ok(payload) => FrameOutcome::Change(ChangeKind::from_event_type(
                    &payload.data.change_type,
                )),
                Err(_) => FrameOutcome::Change(ChangeKind::Unknown),
            }
        }
        "INSERT" | "UPDATE" | "DELETE" => {
            FrameOutcome::Change(ChangeKind::from_event_type(&message.event))
        }
        "phx_reply" => {
            let is_join = message.reference.as_deref() == Some(&JOIN_REF.to_string());
            match serde_json::from_value::<ReplyPayload>(message.payload) {
                Ok(reply) if reply.status == "ok" && is_join => FrameOutcome::Joined,
                Ok(reply) if reply.status == "error" => {
                    FrameOutcome::JoinRejected(reply.response.to_string())
                }
                _ => FrameOutcome::Ignored,
            }
        }
        "phx_error" | "phx_close" => FrameOutcome::Closed(message.event),
        _ => FrameOutcome::Ignored,
    }
}
