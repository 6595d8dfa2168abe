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
use tracing::info;

use super::correlation::CorrelationSphere;
use crate::common::CorrelationPolicy;
use crate::message::{Envelope, Parameter};
use crate::traits::{Direction, Processor, ProcessorRef, Sphere, SphereRef};

/// A sphere that adds nothing: the continuation is used as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdSphere;

impl Sphere for IdSphere {
    fn build(&self, continuation: ProcessorRef, _direction: Direction) -> ProcessorRef {
        continuation
    }
}

/// A sphere that logs every message passing through it.
///
/// Logs the direction, type, space, the peer (author inbound, recipient outbound) and
/// the payload at `info` level, then delegates unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerboseSphere;

impl Sphere for VerboseSphere {
    fn build(&self, continuation: ProcessorRef, direction: Direction) -> ProcessorRef {
        Arc::new(Verbose { continuation, direction })
    }
}

struct Verbose {
    continuation: ProcessorRef,
    direction: Direction,
}

#[async_trait]
impl Processor for Verbose {
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        let payload = serde_json::to_string(&envelope.parameter)
            .unwrap_or_else(|_| format!("{:?}", envelope.parameter));
        match self.direction {
            Direction::In => info!(
                direction = %self.direction,
                kind = %envelope.kind,
                space = %envelope.space,
                from = %envelope.author,
                "[recv {}] {}", envelope.kind, payload
            ),
            Direction::Out => info!(
                direction = %self.direction,
                kind = %envelope.kind,
                space = %envelope.space,
                to = %envelope.recipient,
                "[send {}] {}", envelope.kind, payload
            ),
        }
        self.continuation.process(envelope).await
    }
}

/// The spheres a context uses unless told otherwise: just the correlator.
pub fn default_spheres() -> Vec<SphereRef> {
    default_spheres_with(CorrelationPolicy::default())
}

/// [`default_spheres`] with an explicit correlation policy.
pub fn default_spheres_with(policy: CorrelationPolicy) -> Vec<SphereRef> {
    vec![Arc::new(CorrelationSphere::new(policy))]
}

/// The correlator followed by a [`VerboseSphere`].
pub fn verbose_spheres() -> Vec<SphereRef> {
    verbose_spheres_with(CorrelationPolicy::default())
}

/// [`verbose_spheres`] with an explicit correlation policy.
pub fn verbose_spheres_with(policy: CorrelationPolicy) -> Vec<SphereRef> {
    vec![Arc::new(CorrelationSphere::new(policy)), Arc::new(VerboseSphere)]
}
