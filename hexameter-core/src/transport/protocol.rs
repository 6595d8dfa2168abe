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

//! Wire protocol: multi-part framing and envelope encoding.
//!
//! A message is a sequence of parts. Each part is framed as:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Flags (1 byte, bit 0x01 = more parts follow)              │
//! ├───────────────────────────────────────────────────────────┤
//! │ Part Length (4 bytes, big-endian u32)                     │
//! ├───────────────────────────────────────────────────────────┤
//! │ Part Bytes                                                │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Senders write `["", "<header>\n\n<json envelope>"]`. The listening side prepends a
//! peer identity part, so an inbound message reads `[identity, "", payload]`.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::message::{Envelope, HexameterError};

/// Flag bit marking that another part follows.
pub const FLAG_MORE: u8 = 0x01;

/// Part header size: 1 byte flags + 4 bytes length.
pub const PART_HEADER_SIZE: usize = 5;

/// Maximum size of a single part (16 MiB hard limit).
pub const MAX_PART_SIZE: usize = 16 * 1024 * 1024;

/// Index of the serialized envelope in an inbound (identity-prefixed) message.
pub const PAYLOAD_INDEX: usize = 2;

/// Write one part.
pub async fn write_part<W>(writer: &mut W, part: &[u8], more: bool) -> Result<(), HexameterError>
where
    W: AsyncWrite + Unpin,
{
    if part.len() > MAX_PART_SIZE {
        return Err(HexameterError::Protocol(format!(
            "Part size {} exceeds hard limit {MAX_PART_SIZE}",
            part.len()
        )));
    }
    let length = part.len() as u32;

    let mut header = [0u8; PART_HEADER_SIZE];
    header[0] = if more { FLAG_MORE } else { 0 };
    header[1..].copy_from_slice(&length.to_be_bytes());

    writer.write_all(&header).await?;
    writer.write_all(part).await?;
    Ok(())
}

/// Write a complete multi-part message and flush it.
///
/// Succeeds only if the final part was written.
pub async fn write_message<W, P>(writer: &mut W, parts: &[P]) -> Result<(), HexameterError>
where
    W: AsyncWrite + Unpin,
    P: AsRef<[u8]>,
{
    let Some(last) = parts.len().checked_sub(1) else {
        return Err(HexameterError::Protocol("message has no parts".to_string()));
    };
    for (index, part) in parts.iter().enumerate() {
        write_part(writer, part.as_ref(), index < last).await?;
    }
    writer.flush().await?;
    trace!(parts = parts.len(), "message written");
    Ok(())
}

/// Read one part, returning its bytes and whether more parts follow.
pub async fn read_part<R>(reader: &mut R) -> Result<(Vec<u8>, bool), HexameterError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; PART_HEADER_SIZE];
    reader.read_exact(&mut header).await?;

    let more = header[0] & FLAG_MORE != 0;
    let length = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if length > MAX_PART_SIZE {
        return Err(HexameterError::Protocol(format!(
            "Part size {length} exceeds hard limit {MAX_PART_SIZE}"
        )));
    }

    let mut part = vec![0u8; length];
    reader.read_exact(&mut part).await?;
    Ok((part, more))
}

/// Read parts until one arrives without the "more" flag.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<Vec<u8>>, HexameterError>
where
    R: AsyncRead + Unpin,
{
    let mut parts = Vec::new();
    loop {
        let (part, more) = read_part(reader).await?;
        parts.push(part);
        if !more {
            return Ok(parts);
        }
    }
}

/// Serialize an envelope as `<header>\n\n<json>`.
pub fn encode_envelope(envelope: &Envelope, header: &str) -> Result<Vec<u8>, HexameterError> {
    let json = serde_json::to_vec(envelope)?;
    let mut payload = Vec::with_capacity(header.len() + 2 + json.len());
    payload.extend_from_slice(header.as_bytes());
    payload.extend_from_slice(b"\n\n");
    payload.extend_from_slice(&json);
    Ok(payload)
}

/// Parse a payload written by [`encode_envelope`].
///
/// A payload without the header tag is parsed as bare JSON. Any missing or mistyped
/// field rejects the whole envelope.
pub fn decode_envelope(payload: &[u8], header: &str) -> Result<Envelope, HexameterError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| HexameterError::Serialization(format!("payload is not UTF-8: {e}")))?;
    let json = text
        .strip_prefix(header)
        .and_then(|rest| rest.strip_prefix("\n\n"))
        .unwrap_or(text);
    Ok(serde_json::from_str(json)?)
}

/// Build the sender-side parts for an envelope: an empty delimiter and the payload.
pub fn envelope_parts(envelope: &Envelope, header: &str) -> Result<[Vec<u8>; 2], HexameterError> {
    Ok([Vec::new(), encode_envelope(envelope, header)?])
}
