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

use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{channel, Receiver};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::connection_pool::ConnectionPool;
use super::listener::{self, RawMessage, TransportStats};
use super::protocol::{decode_envelope, envelope_parts, PAYLOAD_INDEX};
use crate::common::TransportConfig;
use crate::message::{Address, Envelope, HexameterError, MessageType, Parameter};
use crate::traits::Processor;

/// The local half of message exchange: one listening socket plus a pool of outbound
/// connections.
///
/// A `Transport` owns its listener and every connection it opens. Sending is best
/// effort: failures come back as `false` and are logged, nothing is retried, and a
/// caller that ignores the boolean loses the message.
#[derive(Debug)]
pub struct Transport {
    sender: TransportSender,
    config: TransportConfig,
    inbox: Receiver<RawMessage>,
    cancel_token: CancellationToken,
    listener_task: Option<JoinHandle<()>>,
}

/// Cloneable sending half of a [`Transport`].
///
/// This is what a behavior's outbound pipeline terminates in: as a [`Processor`] it
/// sends every envelope it is given and never produces a response.
#[derive(Debug, Clone)]
pub struct TransportSender {
    me: Address,
    header: Arc<str>,
    pool: Arc<Mutex<ConnectionPool>>,
    stats: Arc<TransportStats>,
}

impl Transport {
    /// Binds the listening socket on the port of `address` and starts accepting peers.
    ///
    /// The socket listens on all interfaces. Port `0` asks the OS for a free port; the
    /// transport's [`me`](Self::me) then reports the port actually bound.
    #[instrument(skip(config))]
    pub async fn init(address: Address, config: TransportConfig) -> Result<Self, HexameterError> {
        let listener = TcpListener::bind(("0.0.0.0", address.port()))
            .await
            .map_err(|e| HexameterError::Bind(format!("port {}: {e}", address.port())))?;
        let bound_port = listener.local_addr()?.port();
        let me = if address.port() == bound_port {
            address
        } else {
            address.with_port(bound_port)
        };

        let stats = Arc::new(TransportStats::default());
        let cancel_token = CancellationToken::new();
        let (inbox_sender, inbox) = channel(config.inbox_capacity.max(1));
        let listener_task = tokio::spawn(listener::run(
            listener,
            inbox_sender,
            stats.clone(),
            cancel_token.clone(),
        ));
        info!(%me, "transport listening");

        let sender = TransportSender {
            me,
            header: Arc::from(config.header.as_str()),
            pool: Arc::new(Mutex::new(ConnectionPool::new(config.socket_cache))),
            stats,
        };

        Ok(Self {
            sender,
            config,
            inbox,
            cancel_token,
            listener_task: Some(listener_task),
        })
    }

    /// Stops the listener and closes all cached connections.
    ///
    /// A second call finds nothing left to release.
    pub async fn term(&mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.listener_task.take() {
            if let Err(e) = task.await {
                warn!("listener task ended abnormally: {}", e);
            }
        }
        self.sender.pool.lock().await.close_all().await;
        self.inbox.close();
        debug!(me = %self.sender.me, "transport terminated");
    }

    /// The address this transport answers to.
    #[inline]
    pub fn me(&self) -> &Address {
        &self.sender.me
    }

    /// The configuration this transport was created with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Counters for this transport.
    pub fn stats(&self) -> &TransportStats {
        &self.sender.stats
    }

    /// A cloneable handle that sends through this transport.
    pub fn sender(&self) -> TransportSender {
        self.sender.clone()
    }

    /// Targets with a cached connection, oldest insertion first.
    pub async fn cached_targets(&self) -> Vec<Address> {
        self.sender.pool.lock().await.cached_targets()
    }

    /// Sends an envelope authored by this transport to `recipient`.
    ///
    /// Returns whether the final part reached the socket.
    pub async fn send(
        &self,
        kind: MessageType,
        recipient: &Address,
        space: &str,
        parameter: Parameter,
    ) -> bool {
        self.sender.send(kind, recipient, space, parameter).await
    }

    /// Takes one message off the inbox.
    ///
    /// With `max_attempts == 0` this waits until a message has been fully received.
    /// Otherwise it polls at most `max_attempts` times without blocking, yielding to the
    /// runtime between misses. Malformed messages are logged, dropped and count as a
    /// miss. Returns `None` when every attempt missed or the transport is terminated.
    pub async fn receive(&mut self, max_attempts: usize) -> Option<Envelope> {
        if max_attempts == 0 {
            loop {
                let raw = self.inbox.recv().await?;
                if let Some(envelope) = self.unpack(raw) {
                    return Some(envelope);
                }
            }
        }
        for _ in 0..max_attempts {
            match self.inbox.try_recv() {
                Ok(raw) => {
                    if let Some(envelope) = self.unpack(raw) {
                        return Some(envelope);
                    }
                }
                Err(TryRecvError::Empty) => tokio::task::yield_now().await,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
        None
    }

    /// Receives one message and lets `processor` handle it.
    ///
    /// When the processor yields a response it is sent back to the author as an `ack`
    /// on the same space. Returns `true` if a message was received, whether or not a
    /// response was produced, and `false` if nothing arrived. Processor errors are
    /// returned unchanged.
    pub async fn respond(
        &mut self,
        max_attempts: usize,
        processor: &dyn Processor,
    ) -> anyhow::Result<bool> {
        let Some(envelope) = self.receive(max_attempts).await else {
            return Ok(false);
        };
        let author = envelope.author.clone();
        let space = envelope.space.clone();
        if let Some(response) = processor.process(envelope).await? {
            if !self.send(MessageType::Ack, &author, &space, response).await {
                warn!(%author, %space, "acknowledgement was not delivered");
            }
        }
        Ok(true)
    }

    /// [`respond`](Self::respond) with the configured number of attempts.
    pub async fn respond_default(&mut self, processor: &dyn Processor) -> anyhow::Result<bool> {
        let attempts = self.config.recv_tries;
        self.respond(attempts, processor).await
    }

    fn unpack(&self, raw: RawMessage) -> Option<Envelope> {
        let stats = &self.sender.stats;
        let Some(payload) = raw.get(PAYLOAD_INDEX) else {
            warn!(parts = raw.len(), "dropping message with missing parts");
            stats.messages_dropped.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        match decode_envelope(payload, &self.sender.header) {
            Ok(envelope) => {
                trace!(
                    author = %envelope.author,
                    kind = %envelope.kind,
                    space = %envelope.space,
                    "received"
                );
                Some(envelope)
            }
            Err(e) => {
                warn!("dropping malformed envelope: {}", e);
                stats.messages_dropped.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }
}

impl TransportSender {
    /// The author address written into every envelope.
    #[inline]
    pub fn me(&self) -> &Address {
        &self.me
    }

    /// Sends an envelope authored by this transport to `recipient`.
    ///
    /// Returns whether the final part reached the socket.
    #[instrument(skip(self, parameter), fields(me = %self.me), level = "debug")]
    pub async fn send(
        &self,
        kind: MessageType,
        recipient: &Address,
        space: &str,
        parameter: Parameter,
    ) -> bool {
        let envelope = Envelope::new(self.me.clone(), recipient.clone(), kind, space, parameter);
        let parts = match envelope_parts(&envelope, &self.header) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("could not encode envelope: {}", e);
                self.stats.send_failures.fetch_add(1, Ordering::Relaxed);
                return false;
            }
        };

        match self.pool.lock().await.deliver(recipient, &parts[..]).await {
            Ok(()) => {
                self.stats.messages_sent.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                warn!(%recipient, "send failed: {}", e);
                self.stats.send_failures.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

#[async_trait]
impl Processor for TransportSender {
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        self.send(envelope.kind, &envelope.recipient, &envelope.space, envelope.parameter)
            .await;
        Ok(None)
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
