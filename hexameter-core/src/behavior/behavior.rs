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

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::behavior::Pipeline;
use crate::message::{Address, Envelope, Parameter};
use crate::traits::{Processor, ProcessorRef, Space, SphereRef};

/// Routes messages for one context through its pipelines.
///
/// Inbound messages run the inbound pipeline, which ends in the installed space.
/// Messages the context sends run the outbound pipeline, which ends in the transport,
/// unless they are addressed to the context itself.
#[derive(Debug)]
pub struct Behavior {
    me: Address,
    pipeline: Pipeline,
}

impl Behavior {
    /// Installs `space` and builds both pipelines around it and `outbound`.
    pub fn init(
        me: Address,
        outbound: ProcessorRef,
        space: &dyn Space,
        spheres: &[SphereRef],
    ) -> Self {
        let pipeline = Pipeline::build(spheres, space.install(), outbound);
        debug!(%me, spheres = spheres.len(), "behavior initialized");
        Self { me, pipeline }
    }

    pub fn me(&self) -> &Address {
        &self.me
    }

    /// Runs `envelope` through the inbound pipeline.
    #[instrument(skip(self, envelope), fields(kind = %envelope.kind, space = %envelope.space))]
    pub async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        self.pipeline.inbound().process(envelope).await
    }

    /// Sends `envelope` on its way: loopback when it is addressed to this context,
    /// the outbound pipeline otherwise.
    #[instrument(skip(self, envelope), fields(kind = %envelope.kind, space = %envelope.space))]
    pub async fn act(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        if envelope.recipient == self.me {
            debug!("loopback");
            self.pipeline.inbound().process(envelope).await
        } else {
            self.pipeline.outbound().process(envelope).await
        }
    }

    pub fn term(&self) -> bool {
        debug!(me = %self.me, "behavior terminated");
        true
    }
}

/// Lets a transport hand received messages straight to the inbound pipeline.
#[async_trait]
impl Processor for Behavior {
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        self.pipeline.inbound().process(envelope).await
    }
}
