// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire schema for LAN tile lights.
//!
//! Everything here is fixed-layout and little-endian:
//!
//! * [`header`] – the 36-byte frame header that wraps every message.
//! * [`tile`] – `GetTileState64` / `StateTileState64` / `SetTileState64`
//!   payloads, each carrying an 8×8 block of colors for one physical tile.
//! * [`color`] – the 8-byte HSBK color value.
//! * [`time`] – transition durations in whole milliseconds.

use thiserror::Error;

pub mod color;
pub mod header;
pub mod tile;
pub mod time;

pub use color::{Color, KelvinRange, COLOR_WIRE_SIZE};
pub use header::{
    decode_frame, encode_frame, AckResFlag, MessageKind, ParseTargetError, Response, Target,
    HEADER_SIZE, PROTOCOL,
};
pub use tile::{
    GetTileState64, SetTileState64, StateTileState64, TileColors, TILE_STATE64_CELLS,
    TILE_STATE64_WIDTH,
};
pub use time::TransitionTime;

/// Errors raised while decoding frames or payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the fixed layout requires.
    #[error("truncated {what}: need {expected} bytes, got {actual}")]
    Truncated {
        /// Structure being decoded.
        what: &'static str,
        /// Bytes required by the layout.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },
    /// The header size field disagrees with the datagram length.
    #[error("frame size field {declared} does not fit {actual} received bytes")]
    BadSize {
        /// Value of the header size field.
        declared: usize,
        /// Bytes actually received.
        actual: usize,
    },
    /// Protocol number other than [`PROTOCOL`].
    #[error("unsupported protocol number {0}")]
    BadProtocol(u16),
}

pub(crate) fn ensure_len(
    buf: &[u8],
    what: &'static str,
    expected: usize,
) -> Result<(), DecodeError> {
    if buf.len() < expected {
        return Err(DecodeError::Truncated {
            what,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}
