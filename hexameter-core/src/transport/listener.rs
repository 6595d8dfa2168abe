/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Listening side of the transport.
//!
//! The listener accepts peers and reads their multi-part messages in background tasks,
//! queueing each fully drained message (prefixed with the peer's identity part) into
//! the transport's inbox. It plays the role of a router socket's I/O thread; all
//! message processing stays with whoever calls `Transport::receive`.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::protocol::read_message;
use crate::message::HexameterError;

/// A raw inbound message: `[identity, parts...]`.
pub(crate) type RawMessage = Vec<Vec<u8>>;

/// Counters for one transport.
#[derive(Debug, Default)]
pub struct TransportStats {
    /// Total peer connections accepted.
    pub connections_accepted: AtomicUsize,
    /// Total multi-part messages read off the wire.
    pub messages_received: AtomicUsize,
    /// Inbound messages dropped as malformed.
    pub messages_dropped: AtomicUsize,
    /// Total envelopes handed to the network.
    pub messages_sent: AtomicUsize,
    /// Sends that failed.
    pub send_failures: AtomicUsize,
}

impl TransportStats {
    /// Get the number of connections accepted.
    #[must_use]
    pub fn connections_accepted(&self) -> usize {
        self.connections_accepted.load(Ordering::Relaxed)
    }

    /// Get the number of messages received.
    #[must_use]
    pub fn messages_received(&self) -> usize {
        self.messages_received.load(Ordering::Relaxed)
    }

    /// Get the number of malformed messages dropped.
    #[must_use]
    pub fn messages_dropped(&self) -> usize {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    /// Get the number of envelopes sent.
    #[must_use]
    pub fn messages_sent(&self) -> usize {
        self.messages_sent.load(Ordering::Relaxed)
    }

    /// Get the number of failed sends.
    #[must_use]
    pub fn send_failures(&self) -> usize {
        self.send_failures.load(Ordering::Relaxed)
    }
}

/// Accept peers until `cancel_token` fires.
pub(crate) async fn run(
    listener: TcpListener,
    inbox: Sender<RawMessage>,
    stats: Arc<TransportStats>,
    cancel_token: CancellationToken,
) {
    let next_identity = AtomicU32::new(1);
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                debug!("listener cancelled");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        stats.connections_accepted.fetch_add(1, Ordering::Relaxed);
                        let identity = next_identity.fetch_add(1, Ordering::Relaxed);
                        trace!(%peer, identity, "peer accepted");
                        tokio::spawn(read_peer(
                            stream,
                            identity,
                            inbox.clone(),
                            stats.clone(),
                            cancel_token.clone(),
                        ));
                    }
                    Err(e) => warn!("accept failed: {}", e),
                }
            }
        }
    }
    info!("listener stopped");
}

async fn read_peer(
    mut stream: TcpStream,
    identity: u32,
    inbox: Sender<RawMessage>,
    stats: Arc<TransportStats>,
    cancel_token: CancellationToken,
) {
    loop {
        let parts = tokio::select! {
            () = cancel_token.cancelled() => break,
            read = read_message(&mut stream) => {
                match read {
                    Ok(parts) => parts,
                    Err(HexameterError::ConnectionClosed) => {
                        trace!(identity, "peer disconnected");
                        break;
                    }
                    Err(e) => {
                        warn!(identity, "dropping peer: {}", e);
                        break;
                    }
                }
            }
        };
        stats.messages_received.fetch_add(1, Ordering::Relaxed);

        let mut message = Vec::with_capacity(parts.len() + 1);
        message.push(identity.to_be_bytes().to_vec());
        message.extend(parts);
        if inbox.send(message).await.is_err() {
            debug!(identity, "inbox closed");
            break;
        }
    }
}
