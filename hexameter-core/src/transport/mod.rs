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

//! The transport layer: listening, connecting, framing and polling.

pub use listener::TransportStats;
pub use transport::{Transport, TransportSender};

/// Bounded FIFO pool of outbound connections.
mod connection_pool;

/// Accept loop and per-peer frame reader.
mod listener;

/// Multi-part framing and envelope encoding.
pub mod protocol;

/// Defines [`Transport`] and [`TransportSender`].
#[allow(clippy::module_inception)]
mod transport;
