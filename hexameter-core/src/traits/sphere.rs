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

use std::fmt;
use std::sync::Arc;

use crate::traits::ProcessorRef;

/// Shared handle to a sphere, as listed in a pipeline definition.
pub type SphereRef = Arc<dyn Sphere>;

/// Which way a message travels through a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Arriving from the network (or from a local `process`).
    In,
    /// Departing towards the transport.
    Out,
}

impl Direction {
    /// `"in"` or `"out"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interceptor constructor.
///
/// Given the continuation of a pipeline and the direction it serves, a sphere returns
/// a new processor that may inspect or transform messages before and after delegating
/// to the continuation, or answer without delegating at all.
pub trait Sphere: Send + Sync {
    /// Wraps `continuation` for traffic flowing in `direction`.
    fn build(&self, continuation: ProcessorRef, direction: Direction) -> ProcessorRef;
}
