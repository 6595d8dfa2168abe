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

//! Defines the capabilities the messaging core consumes and exposes.
//!
//! *   [`Processor`]: handles one message and optionally yields a response.
//! *   [`Space`]: produces the per-context space handler.
//! *   [`Sphere`]: wraps a processor into an interceptor layer for one [`Direction`].

// --- Public Re-exports ---
pub use processor::{Processor, ProcessorRef};
pub use space::Space;
pub use sphere::{Direction, Sphere, SphereRef};

// --- Submodules ---

/// Defines the [`Processor`] trait.
mod processor;
/// Defines the [`Space`] factory trait.
mod space;
/// Defines the [`Sphere`] trait and [`Direction`].
mod sphere;
