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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::message::HexameterError;

/// The kind of a message.
///
/// `get`, `put` and `qry` are requests whose meaning each space defines for itself;
/// `ack` carries the answer to an earlier request. The core only looks at the type to
/// route acknowledgements into the correlation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Read request.
    Get,
    /// Write request.
    Put,
    /// Query request.
    Qry,
    /// Response to a request.
    Ack,
}

impl MessageType {
    /// Wire name of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Qry => "qry",
            Self::Ack => "ack",
        }
    }

    /// Whether this is one of the request types.
    pub const fn is_request(self) -> bool {
        !matches!(self, Self::Ack)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = HexameterError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "get" => Ok(Self::Get),
            "put" => Ok(Self::Put),
            "qry" => Ok(Self::Qry),
            "ack" => Ok(Self::Ack),
            other => Err(HexameterError::Protocol(format!("unknown message type: {other}"))),
        }
    }
}
