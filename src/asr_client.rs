//! WebSocket transport to the voice backend.
//!
//! Owns the socket and splits it into a spawned writer task and a spawned
//! reader task. Producers hand `Outbound` units to the writer through an
//! unbounded channel; the reader classifies every frame and forwards the
//! result. The session core never touches the socket.

use crate::events::{Inbound, Outbound};
use crate::protocol::{self, END_OF_UTTERANCE};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum AsrError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] WsError),
    #[error("timed out connecting to {0}")]
    Timeout(String),
    #[error("transport channel closed")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct AsrClientConfig {
    pub url: String,
    pub connect_timeout: Duration,
}

impl Default for AsrClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws/asr".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Connected transport handle.
///
/// `sender()` clones are how producers (the mic pump, the stdin loop) feed
/// the writer task; `next()` is the single consumption point for inbound
/// units.
pub struct AsrClient {
    outbound_tx: UnboundedSender<Outbound>,
    inbound_rx: UnboundedReceiver<Inbound>,
}

impl AsrClient {
    /// Open the socket and spawn the reader and writer tasks.
    pub async fn connect(config: &AsrClientConfig) -> Result<Self, AsrError> {
        info!("🔌 connecting to {}", config.url);
        let connect = connect_async(&config.url);
        let (ws, response) = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| AsrError::Timeout(config.url.clone()))??;
        debug!("websocket handshake complete: {}", response.status());

        let (mut sink, mut stream) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Inbound>();

        tokio::spawn(async move {
            while let Some(out) = outbound_rx.recv().await {
                let frame = match out {
                    Outbound::Audio(bytes) => {
                        debug!("🎤 sending audio frame ({} bytes)", bytes.len());
                        Message::Binary(bytes.into())
                    }
                    Outbound::EndOfUtterance => {
                        info!("📤 sending end-of-utterance");
                        Message::Text(END_OF_UTTERANCE.to_string().into())
                    }
                };
                if let Err(e) = sink.send(frame).await {
                    error!("❌ websocket send failed: {}", e);
                    break;
                }
            }
            debug!("writer task shutting down");
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(frame) => match protocol::classify(frame) {
                        // the single Closed is sent after the loop
                        Some(Inbound::Closed) => break,
                        Some(inbound) => {
                            if inbound_tx.send(inbound).is_err() {
                                break;
                            }
                        }
                        None => {}
                    },
                    Err(e) => {
                        warn!("websocket read failed: {}", e);
                        break;
                    }
                }
            }
            // stream exhausted without a close frame counts as a close
            let _ = inbound_tx.send(Inbound::Closed);
            debug!("reader task shutting down");
        });

        Ok(Self {
            outbound_tx,
            inbound_rx,
        })
    }

    /// Clone of the outbound channel for producer tasks.
    pub fn sender(&self) -> UnboundedSender<Outbound> {
        self.outbound_tx.clone()
    }

    pub fn send(&self, out: Outbound) -> Result<(), AsrError> {
        self.outbound_tx
            .send(out)
            .map_err(|_| AsrError::ChannelClosed)
    }

    /// Next inbound unit, or `None` once the reader task has exited.
    pub async fn next(&mut self) -> Option<Inbound> {
        self.inbound_rx.recv().await
    }
}
