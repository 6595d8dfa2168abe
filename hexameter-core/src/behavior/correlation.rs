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

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::common::CorrelationPolicy;
use crate::message::{Address, Envelope, Item, MessageType, Parameter};
use crate::traits::{Direction, Processor, ProcessorRef, Sphere};

/// The space used to register interest in, and collect, responses.
pub const LUST_SPACE: &str = "net.lust";

/// The space that echoes its parameter back to show the context is alive.
pub const LIFE_SPACE: &str = "net.life";

/// Responses collected for one `(author, space)` pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorrelationEntry {
    /// Set once a registration has been seen.
    pub interested: bool,
    /// Acknowledged items in arrival order.
    pub responses: Parameter,
}

/// Installs a [`Correlator`] on the inbound side; outbound messages pass untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorrelationSphere {
    policy: CorrelationPolicy,
}

impl CorrelationSphere {
    pub fn new(policy: CorrelationPolicy) -> Self {
        Self { policy }
    }
}

impl Sphere for CorrelationSphere {
    fn build(&self, continuation: ProcessorRef, direction: Direction) -> ProcessorRef {
        match direction {
            Direction::In => Arc::new(Correlator::new(continuation, self.policy)),
            Direction::Out => continuation,
        }
    }
}

/// Matches acknowledgements against registered interest.
///
/// * an `ack` on any space is collected if its `(author, space)` is registered, and
///   never reaches the continuation;
/// * a `put` to [`LUST_SPACE`] registers each `{author, space}` item;
/// * a `get` or `qry` to [`LUST_SPACE`] returns everything collected for the listed
///   pairs, or `None` while none of them has been answered;
/// * [`LIFE_SPACE`] echoes its parameter.
///
/// Everything else is handed to the continuation.
pub struct Correlator {
    continuation: ProcessorRef,
    policy: CorrelationPolicy,
    table: DashMap<(Address, String), CorrelationEntry>,
}

impl Correlator {
    pub fn new(continuation: ProcessorRef, policy: CorrelationPolicy) -> Self {
        Self {
            continuation,
            policy,
            table: DashMap::new(),
        }
    }

    /// Number of registered pairs, answered or not.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// A snapshot of the entry for `(author, space)`.
    pub fn entry(&self, author: &Address, space: &str) -> Option<CorrelationEntry> {
        self.table
            .get(&(author.clone(), space.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn collect(&self, envelope: &Envelope) {
        let key = (envelope.author.clone(), envelope.space.clone());
        match self.table.get_mut(&key) {
            Some(mut entry) => {
                trace!(
                    author = %envelope.author,
                    space = %envelope.space,
                    items = envelope.parameter.len(),
                    "collecting response"
                );
                entry.responses.extend(envelope.parameter.iter().cloned());
            }
            None => {
                debug!(
                    author = %envelope.author,
                    space = %envelope.space,
                    "no registration for acknowledgement"
                );
            }
        }
    }

    fn register(&self, parameter: &Parameter) {
        for key in parameter.iter().filter_map(wanted) {
            trace!(author = %key.0, space = %key.1, "registering interest");
            self.table.entry(key).or_default().interested = true;
        }
    }

    fn lookup(&self, parameter: &Parameter) -> Option<Parameter> {
        let mut answered = false;
        let mut response = Parameter::new();
        for key in parameter.iter().filter_map(wanted) {
            match self.policy {
                CorrelationPolicy::Retain => {
                    if let Some(entry) = self.table.get(&key) {
                        if !entry.responses.is_empty() {
                            answered = true;
                            response.extend(entry.responses.iter().cloned());
                        }
                    }
                }
                CorrelationPolicy::Consume => {
                    if let Some((_, entry)) =
                        self.table.remove_if(&key, |_, entry| !entry.responses.is_empty())
                    {
                        answered = true;
                        response.extend(entry.responses);
                    }
                }
            }
        }
        answered.then_some(response)
    }
}

#[async_trait]
impl Processor for Correlator {
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        if envelope.kind == MessageType::Ack {
            self.collect(&envelope);
            return Ok(None);
        }
        match envelope.space.as_str() {
            LUST_SPACE if envelope.kind == MessageType::Put => {
                self.register(&envelope.parameter);
                Ok(Some(envelope.parameter))
            }
            LUST_SPACE => Ok(self.lookup(&envelope.parameter)),
            LIFE_SPACE => Ok(Some(envelope.parameter)),
            _ => self.continuation.process(envelope).await,
        }
    }
}

fn wanted(item: &Item) -> Option<(Address, String)> {
    let author = item.get("author").and_then(Value::as_str)?.parse().ok()?;
    let space = item.get("space").and_then(Value::as_str)?;
    Some((author, space.to_string()))
}
