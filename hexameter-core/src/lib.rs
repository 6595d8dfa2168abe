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

#![forbid(unsafe_code)]
//! Hexameter Core Library
//!
//! The messaging stack of the Hexameter middleware: addressed JSON envelopes
//! exchanged over a multi-part TCP transport, composable sphere pipelines around
//! message processing, and the `net.lust` correlator that turns asynchronous
//! acknowledgements into answers.

/// Configuration and small shared utilities.
pub(crate) mod common;

pub(crate) mod behavior;
pub(crate) mod message;
/// Capabilities plugged into a context: processors, spaces and spheres.
pub(crate) mod traits;
/// Framing, connection pooling and the inbound listener.
pub mod transport;

/// Prelude module for convenient imports.
///
/// This module re-exports the data model, the capability traits, the built-in spheres
/// and spaces, as well as the `async_trait` crate.
pub mod prelude {
    pub use async_trait;

    pub use crate::behavior::{
        default_spheres, default_spheres_with, verbose_spheres, verbose_spheres_with, Behavior,
        CorrelationEntry, CorrelationSphere, Correlator, IdSphere, Pipeline, TrivialSpace,
        VerboseSphere, LIFE_SPACE, LUST_SPACE,
    };
    pub use crate::common::{
        Clock, CorrelationConfig, CorrelationPolicy, HexameterConfig, TransportConfig,
    };
    pub use crate::message::{
        parameter_from_json, Address, Envelope, HexameterError, Item, MessageType, Parameter,
        DEFAULT_PORT,
    };
    pub use crate::traits::{Direction, Processor, ProcessorRef, Space, Sphere, SphereRef};
    pub use crate::transport::{Transport, TransportSender, TransportStats};
}
