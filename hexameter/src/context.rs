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

use std::sync::Arc;

use hexameter_core::prelude::*;
use serde_json::json;
use tracing::{debug, info, instrument};

/// An addressable endpoint: one transport, one installed space and the spheres around it.
///
/// All processing runs in the task that calls into the context. Nothing is handled
/// until [`respond`](Self::respond) (or [`ask`](Self::ask), which drives it) is called.
#[derive(Debug)]
pub struct HexameterContext {
    behavior: Behavior,
    transport: Transport,
    config: HexameterConfig,
}

impl HexameterContext {
    /// Creates a context configured from [`HexameterConfig::load`] with the default spheres.
    ///
    /// `address` is `host:port`; a bare host uses the configured default port.
    pub async fn init(address: &str, space: &dyn Space) -> Result<Self, HexameterError> {
        let config = HexameterConfig::load();
        let spheres = default_spheres_with(config.correlation.policy);
        Self::init_with(address, space, &spheres, config).await
    }

    /// Creates a context with explicit spheres and configuration.
    ///
    /// Binding happens first, so with port `0` the behavior is built around the port
    /// actually bound.
    #[instrument(skip(space, spheres, config))]
    pub async fn init_with(
        address: &str,
        space: &dyn Space,
        spheres: &[SphereRef],
        config: HexameterConfig,
    ) -> Result<Self, HexameterError> {
        let address = Address::parse_with_default(address, config.transport.default_port)?;
        let transport = Transport::init(address, config.transport.clone()).await?;
        let me = transport.me().clone();
        let behavior = Behavior::init(me.clone(), Arc::new(transport.sender()), space, spheres);
        info!(%me, "context initialized");
        Ok(Self {
            behavior,
            transport,
            config,
        })
    }

    /// Tears down the behavior, then the transport.
    pub async fn term(&mut self) {
        self.behavior.term();
        self.transport.term().await;
        info!(me = %self.me(), "context terminated");
    }

    #[inline]
    pub fn me(&self) -> &Address {
        self.behavior.me()
    }

    pub fn config(&self) -> &HexameterConfig {
        &self.config
    }

    /// Counters of the underlying transport.
    pub fn stats(&self) -> &TransportStats {
        self.transport.stats()
    }

    /// Sends a message authored by this context.
    ///
    /// A message to [`me`](Self::me) is processed locally and its result returned.
    /// Anything else goes out through the outbound pipeline and yields `None`.
    ///
    /// Delivery is best effort: if the transport cannot reach `recipient` the message
    /// is lost. The failure is logged and counted in [`stats`](Self::stats), but it is
    /// not an error here.
    pub async fn tell(
        &self,
        kind: MessageType,
        recipient: &Address,
        space: &str,
        parameter: Parameter,
    ) -> anyhow::Result<Option<Parameter>> {
        let author = self.me().clone();
        self.tell_as(kind, recipient, space, parameter, &author).await
    }

    /// [`tell`](Self::tell) with an explicit author.
    ///
    /// The author is seen by local processing only; on the wire the transport always
    /// writes its own address.
    pub async fn tell_as(
        &self,
        kind: MessageType,
        recipient: &Address,
        space: &str,
        parameter: Parameter,
        author: &Address,
    ) -> anyhow::Result<Option<Parameter>> {
        let envelope = Envelope::new(author.clone(), recipient.clone(), kind, space, parameter);
        self.behavior.act(envelope).await
    }

    /// Injects a message into the inbound pipeline as if `author` had sent it.
    pub async fn process(
        &self,
        kind: MessageType,
        author: &Address,
        space: &str,
        parameter: Parameter,
    ) -> anyhow::Result<Option<Parameter>> {
        let recipient = self.me().clone();
        self.process_for(kind, author, space, parameter, &recipient).await
    }

    /// [`process`](Self::process) with an explicit recipient.
    pub async fn process_for(
        &self,
        kind: MessageType,
        author: &Address,
        space: &str,
        parameter: Parameter,
        recipient: &Address,
    ) -> anyhow::Result<Option<Parameter>> {
        let envelope = Envelope::new(author.clone(), recipient.clone(), kind, space, parameter);
        self.behavior.process(envelope).await
    }

    /// Handles one received message, acknowledging it when the pipeline answers.
    ///
    /// `max_attempts == 0` waits for a message. Returns whether one was handled.
    pub async fn respond(&mut self, max_attempts: usize) -> anyhow::Result<bool> {
        self.transport.respond(max_attempts, &self.behavior).await
    }

    /// [`respond`](Self::respond) with the configured number of attempts.
    pub async fn respond_default(&mut self) -> anyhow::Result<bool> {
        self.transport.respond_default(&self.behavior).await
    }

    /// Sends a request and waits for the acknowledgement from `recipient`.
    ///
    /// Interest in `(recipient, space)` is registered on `net.lust`, the request is sent,
    /// and incoming messages are handled until the correlator has collected an answer.
    /// Only items collected after the registration are returned, so repeated asks of
    /// the same pair each see their own answer under either correlation policy.
    ///
    /// There is no timeout; wrap the call in `tokio::time::timeout` for one. A request
    /// the transport cannot deliver is lost (see [`tell`](Self::tell)) and the call then
    /// never completes. The correlator must be among the context's spheres for the same
    /// reason.
    ///
    /// Asking the context itself completes immediately with the local answer.
    #[instrument(skip(self, parameter), fields(me = %self.me()))]
    pub async fn ask(
        &mut self,
        kind: MessageType,
        recipient: &Address,
        space: &str,
        parameter: Parameter,
    ) -> anyhow::Result<Parameter> {
        let me = self.me().clone();
        let wanted =
            parameter_from_json(json!([{ "author": recipient.to_string(), "space": space }]))?;
        let seen = self.register(&me, &wanted).await?;

        let local = self.tell(kind, recipient, space, parameter).await?;
        if *recipient == me {
            let Some(answer) = local else {
                debug!("local space gave no answer");
                return Ok(Parameter::new());
            };
            self.tell(MessageType::Ack, &me, space, answer).await?;
            let collected = self.collected(&me, &wanted).await?;
            return Ok(fresh(collected, seen).unwrap_or_default());
        }

        loop {
            if !self.respond(0).await? {
                anyhow::bail!("transport closed while waiting for an answer from {recipient}");
            }
            if let Some(answer) = fresh(self.collected(&me, &wanted).await?, seen) {
                debug!(items = answer.len(), "answer collected");
                return Ok(answer);
            }
        }
    }

    /// Registers interest in `wanted` and returns how many items it already holds.
    async fn register(&self, me: &Address, wanted: &Parameter) -> anyhow::Result<usize> {
        self.tell(MessageType::Put, me, LUST_SPACE, wanted.clone()).await?;
        if self.collected(me, wanted).await?.is_some() {
            // A consuming correlator released the entry while answering; restore it.
            self.tell(MessageType::Put, me, LUST_SPACE, wanted.clone()).await?;
        }
        Ok(self.collected(me, wanted).await?.map_or(0, |items| items.len()))
    }

    async fn collected(
        &self,
        me: &Address,
        wanted: &Parameter,
    ) -> anyhow::Result<Option<Parameter>> {
        self.tell(MessageType::Get, me, LUST_SPACE, wanted.clone()).await
    }
}

/// The items collected beyond the first `seen`, if there are any.
fn fresh(collected: Option<Parameter>, seen: usize) -> Option<Parameter> {
    collected
        .filter(|items| items.len() > seen)
        .map(|mut items| items.split_off(seen))
}
