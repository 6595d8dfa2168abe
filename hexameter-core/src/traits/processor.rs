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

use crate::message::{Envelope, Parameter};

/// Shared handle to a processor, as stored in pipelines.
pub type ProcessorRef = Arc<dyn Processor>;

/// Handles one message and optionally produces a response.
///
/// Processors are the links of a pipeline: space handlers, sphere layers and the
/// transport's outbound terminal all implement this trait. Returning `Ok(None)` means
/// "no response"; for the correlator's `get` it means "not answered yet".
///
/// Errors are not caught anywhere in the core. They propagate to whoever drove the
/// message in (`respond`, `process`, `tell` or `ask`).
#[async_trait]
pub trait Processor: Send + Sync + 'static {
    /// Processes `envelope`, returning the response parameter if there is one.
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>>;
}
