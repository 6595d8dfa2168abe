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

use derive_new::new;
use serde::{Deserialize, Deserializer, Serialize};
use static_assertions::assert_impl_all;

use crate::message::{Address, HexameterError, MessageType};

/// The atomic unit of payload content: an ordered mapping of string keys to JSON values.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// The payload of one message, an ordered sequence of [`Item`]s.
pub type Parameter = Vec<Item>;

/// One routed message as it travels on the wire.
///
/// Envelopes are built per call and discarded once delivered or processed. The
/// `parameter` is never null: a missing or `null` parameter on the wire becomes the
/// empty sequence.
///
/// ```json
/// {"author":"alpha:4000","recipient":"beta:4001","type":"qry","space":"test","parameter":[{"skills":1337}]}
/// ```
#[derive(new, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Who sent the message.
    pub author: Address,
    /// Who the message is for.
    pub recipient: Address,
    /// Request or acknowledgement kind.
    #[serde(rename = "type")]
    pub kind: MessageType,
    /// Logical channel the message is routed on.
    #[new(into)]
    pub space: String,
    /// Payload items.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parameter: Parameter,
}

impl Envelope {
    /// The envelope answering this one: an `ack` on the same space, sent back to the author.
    pub fn reply(&self, parameter: Parameter) -> Self {
        Self::new(
            self.recipient.clone(),
            self.author.clone(),
            MessageType::Ack,
            self.space.clone(),
            parameter,
        )
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Parameter, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Parameter>::deserialize(deserializer)?.unwrap_or_default())
}

/// Builds a [`Parameter`] from a JSON array of objects.
///
/// ```
/// use hexameter_core::prelude::*;
///
/// let parameter = parameter_from_json(serde_json::json!([{"skills": 1337}])).unwrap();
/// assert_eq!(parameter[0]["skills"], 1337);
/// ```
pub fn parameter_from_json(value: serde_json::Value) -> Result<Parameter, HexameterError> {
    serde_json::from_value(value).map_err(HexameterError::from)
}

assert_impl_all!(Envelope: Send, Sync);
