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

/// Errors raised by the messaging core.
///
/// Send failures are not represented here: the transport reports them as a `false`
/// return value. Handler errors travel as `anyhow::Error` and are never wrapped.
#[derive(Debug, Clone)]
pub enum HexameterError {
    /// Address text that is not `host[:port]`.
    InvalidAddress(String),

    /// The listening socket could not be bound.
    Bind(String),

    /// Socket or I/O error.
    Io(String),

    /// Envelope serialization or deserialization failure.
    Serialization(String),

    /// Framing error (missing parts, bad header tag, oversized frame).
    Protocol(String),

    /// The peer closed the connection.
    ConnectionClosed,
}

impl fmt::Display for HexameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(e) => write!(f, "Invalid address: {e}"),
            Self::Bind(e) => write!(f, "Bind failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Serialization(e) => write!(f, "Serialization error: {e}"),
            Self::Protocol(e) => write!(f, "Protocol error: {e}"),
            Self::ConnectionClosed => write!(f, "Connection closed"),
        }
    }
}

impl std::error::Error for HexameterError {}

impl From<serde_json::Error> for HexameterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for HexameterError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::ConnectionClosed
        } else {
            Self::Io(err.to_string())
        }
    }
}
