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

//! Testing utilities for Hexameter.
//!
//! The [`hexameter_test`](prelude::hexameter_test) attribute turns an `async fn` into a
//! regular `#[test]` that runs on a fresh multi-thread Tokio runtime. Panics raised
//! inside the body are captured, logged through `tracing` with their location, and
//! re-raised so the test fails with a readable message.

/// Items the generated test code refers to. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use parking_lot;
    pub use tokio;
    pub use tracing;
}

/// Convenient imports for test modules.
pub mod prelude {
    pub use hexameter_test_macro::hexameter_test;
}
