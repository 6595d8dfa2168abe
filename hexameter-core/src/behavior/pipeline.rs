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

use crate::traits::{Direction, ProcessorRef, SphereRef};

/// The inbound and outbound processor chains of one behavior.
///
/// Both chains are built from the same ordered sphere list, and the first-listed
/// sphere is the outermost layer in both directions: for `[a, b]` an arriving message
/// passes `a`, then `b`, then the space dispatcher, and a departing message passes
/// `a`, then `b`, then the transport. Chains never change after construction.
#[derive(Clone)]
pub struct Pipeline {
    inbound: ProcessorRef,
    outbound: ProcessorRef,
}

impl Pipeline {
    /// Wraps `inbound_base` and `outbound_base` in `spheres`.
    pub fn build(
        spheres: &[SphereRef],
        inbound_base: ProcessorRef,
        outbound_base: ProcessorRef,
    ) -> Self {
        // Wrapping from the last sphere inwards leaves the first one outermost.
        let inbound = spheres
            .iter()
            .rev()
            .fold(inbound_base, |continuation, sphere| {
                sphere.build(continuation, Direction::In)
            });
        let outbound = spheres
            .iter()
            .rev()
            .fold(outbound_base, |continuation, sphere| {
                sphere.build(continuation, Direction::Out)
            });
        Self { inbound, outbound }
    }

    /// Entry point for arriving messages.
    #[inline]
    pub fn inbound(&self) -> &ProcessorRef {
        &self.inbound
    }

    /// Entry point for departing messages.
    #[inline]
    pub fn outbound(&self) -> &ProcessorRef {
        &self.outbound
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}
