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

//! Hexameter Main Library
//!
//! This library provides the main entry point for the Hexameter middleware: the
//! [`HexameterContext`](prelude::HexameterContext), an addressable endpoint that sends,
//! receives and answers messages, and emulates blocking request/response with `ask`.

mod context;

/// Prelude module for convenient imports.
///
/// This module re-exports the context along with everything from the `hexameter_core` prelude.
pub mod prelude {
    pub use hexameter_core::prelude::*;

    pub use crate::context::HexameterContext;
}
