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

/// Port used when an address carries no `:port` suffix.
pub const DEFAULT_PORT: u16 = 55555;

/// The endpoint identifier of a Hexameter context.
///
/// An `Address` is both "who I am" (the port a context listens on) and "where to send"
/// (the target of an outbound connection). Its textual form is `host:port`; when the
/// suffix is missing the port falls back to [`DEFAULT_PORT`] (or the configured default,
/// see [`Address::parse_with_default`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    host: String,
    port: u16,
}

impl Address {
    /// Creates an address from its parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Parses `host[:port]`, using `default_port` when no port is given.
    ///
    /// The split happens at the last `:`. An empty host or a port that is not a valid
    /// `u16` is rejected.
    pub fn parse_with_default(text: &str, default_port: u16) -> Result<Self, HexameterError> {
        let text = text.trim();
        let (host, port) = match text.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    HexameterError::InvalidAddress(format!("invalid port in '{text}'"))
                })?;
                (host, port)
            }
            None => (text, default_port),
        };
        if host.is_empty() {
            return Err(HexameterError::InvalidAddress(format!("missing host in '{text}'")));
        }
        Ok(Self::new(host, port))
    }

    /// The host part.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port part.
    #[inline]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns a copy of this address with a different port.
    pub fn with_port(&self, port: u16) -> Self {
        Self::new(self.host.clone(), port)
    }
}

impl FromStr for Address {
    type Err = HexameterError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(text, DEFAULT_PORT)
    }
}

impl TryFrom<String> for Address {
    type Error = HexameterError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl TryFrom<&str> for Address {
    type Error = HexameterError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
