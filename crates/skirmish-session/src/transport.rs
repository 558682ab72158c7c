//! Peer transport for two-player sync.
//!
//! Peers exchange self-describing JSON frames: single events during play,
//! full [`SavedGame`] snapshots for resync. The wire format is the frame's
//! serde tagging, so decoding is where a version-skewed peer surfaces - an
//! unrecognized tag comes back as [`SessionError::UnknownEvent`] instead of
//! poisoning the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::Mutex;

use skirmish_core::Event;

use crate::error::{Result, SessionError};
use crate::snapshot::SavedGame;

/// One unit on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Frame {
    Event(Event),
    Snapshot(Box<SavedGame>),
}

impl Frame {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a frame, mapping an unrecognized tag to
    /// [`SessionError::UnknownEvent`] with the offending tag name.
    pub fn decode(bytes: &[u8]) -> Result<Frame> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let tag = value
            .as_object()
            .and_then(|obj| obj.keys().next().cloned())
            .or_else(|| value.as_str().map(str::to_owned))
            .unwrap_or_default();
        serde_json::from_value(value).map_err(|_| SessionError::UnknownEvent(tag))
    }
}

/// Bidirectional frame channel to the other player.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(&self, frame: Frame) -> Result<()>;
    async fn recv(&self) -> Result<Frame>;
}

/// In-memory transport pair for tests and local hot-seat play.
///
/// Frames still round-trip through the encoded form, so codec failures show
/// up in tests exactly as they would across a socket.
pub struct Loopback {
    tx: mpsc::Sender<Vec<u8>>,
    rx: Mutex<mpsc::Receiver<Vec<u8>>>,
}

/// Connected transport pair: what one end sends, the other receives.
pub fn loopback_pair(capacity: usize) -> (Loopback, Loopback) {
    let (tx_a, rx_a) = mpsc::channel(capacity);
    let (tx_b, rx_b) = mpsc::channel(capacity);
    (
        Loopback {
            tx: tx_a,
            rx: Mutex::new(rx_b),
        },
        Loopback {
            tx: tx_b,
            rx: Mutex::new(rx_a),
        },
    )
}

#[async_trait]
impl PeerTransport for Loopback {
    async fn send(&self, frame: Frame) -> Result<()> {
        let bytes = frame.encode()?;
        self.tx
            .send(bytes)
            .await
            .map_err(|_| SessionError::TransportClosed)
    }

    async fn recv(&self) -> Result<Frame> {
        let bytes = {
            let mut rx = self.rx.lock().await;
            rx.recv().await.ok_or(SessionError::TransportClosed)?
        };
        Frame::decode(&bytes)
    }
}
