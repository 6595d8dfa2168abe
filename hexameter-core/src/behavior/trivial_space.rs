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
use serde_json::json;

use crate::message::{parameter_from_json, Envelope, Parameter};
use crate::traits::{Processor, ProcessorRef, Space};

/// A space that answers every request with a single description of the request.
///
/// Acknowledgements are answered too; the correlator normally consumes them first.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrivialSpace;

impl Space for TrivialSpace {
    fn install(&self) -> ProcessorRef {
        Arc::new(TrivialSpace)
    }
}

#[async_trait]
impl Processor for TrivialSpace {
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        let description = format!(
            "answer to message {}@{} from {}",
            envelope.kind, envelope.space, envelope.author
        );
        Ok(Some(parameter_from_json(json!([{ "description": description }]))?))
    }
}
