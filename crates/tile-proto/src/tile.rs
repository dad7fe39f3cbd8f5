// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! TileState64 payloads.
//!
//! Layouts (little-endian, no padding):
//!
//! ```text
//! GetTileState64   tile_index u8 | length u8 | reserved u8 | x u8 | y u8 | width u8
//! SetTileState64   tile_index u8 | length u8 | reserved u8 | x u8 | y u8 | width u8
//!                  | duration u32 | colors [Color; 64]
//! StateTileState64 tile_index u8 | reserved u8 | x u8 | y u8 | width u8 | colors [Color; 64]
//! ```
//!
//! The 64 colors form an 8×8 grid with `x` as the outer index: cell `(x, y)`
//! is entry `x * 8 + y`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{ensure_len, Color, DecodeError, TransitionTime, COLOR_WIRE_SIZE};

/// Width (and height) of the color block carried by every TileState64
/// message.
///
/// Tile dimensions normally come from the device chain, but the wire block is
/// always 64 colors, so this one is fixed.
pub const TILE_STATE64_WIDTH: usize = 8;

/// Number of colors in a TileState64 block.
pub const TILE_STATE64_CELLS: usize = TILE_STATE64_WIDTH * TILE_STATE64_WIDTH;

/// 8×8 color block indexed `[x][y]`.
pub type TileColors = [[Color; TILE_STATE64_WIDTH]; TILE_STATE64_WIDTH];

const COLORS_WIRE_SIZE: usize = TILE_STATE64_CELLS * COLOR_WIRE_SIZE;

fn put_colors(buf: &mut impl BufMut, colors: &TileColors) {
    for column in colors {
        for color in column {
            color.put(buf);
        }
    }
}

fn get_colors(buf: &mut impl Buf) -> TileColors {
    let mut colors = [[Color::BLACK; TILE_STATE64_WIDTH]; TILE_STATE64_WIDTH];
    for column in &mut colors {
        for cell in column.iter_mut() {
            *cell = Color::get(buf);
        }
    }
    colors
}

/// Request the colors of `length` consecutive tiles starting at
/// `tile_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetTileState64 {
    /// First tile in the chain to report.
    pub tile_index: u8,
    /// Number of tiles to report.
    pub length: u8,
    /// Column offset inside each tile.
    pub x: u8,
    /// Row offset inside each tile.
    pub y: u8,
    /// Width of the reported block.
    pub width: u8,
}

impl GetTileState64 {
    /// Encoded payload size.
    pub const WIRE_SIZE: usize = 6;

    /// Request covering `length` whole tiles from `tile_index`.
    pub fn chain(tile_index: u8, length: u8) -> Self {
        Self {
            tile_index,
            length,
            x: 0,
            y: 0,
            width: TILE_STATE64_WIDTH as u8,
        }
    }

    /// Encode into a fresh buffer.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::WIRE_SIZE);
        buf.put_u8(self.tile_index);
        buf.put_u8(self.length);
        buf.put_u8(0); // reserved
        buf.put_u8(self.x);
        buf.put_u8(self.y);
        buf.put_u8(self.width);
        buf.freeze()
    }

    /// Decode from the start of `bytes`; trailing bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(bytes, "GetTileState64", Self::WIRE_SIZE)?;
        let mut buf = bytes;
        let tile_index = buf.get_u8();
        let length = buf.get_u8();
        buf.advance(1);
        Ok(Self {
            tile_index,
            length,
            x: buf.get_u8(),
            y: buf.get_u8(),
            width: buf.get_u8(),
        })
    }
}

/// Paint one tile's 8×8 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTileState64 {
    /// Target tile in the chain.
    pub tile_index: u8,
    /// Number of tiles to apply the block to.
    pub length: u8,
    /// Column offset inside the tile.
    pub x: u8,
    /// Row offset inside the tile.
    pub y: u8,
    /// Width of the block.
    pub width: u8,
    /// Fade duration.
    pub duration: TransitionTime,
    /// Block contents.
    pub colors: TileColors,
}

impl SetTileState64 {
    /// Encoded payload size.
    pub const WIRE_SIZE: usize = 10 + COLORS_WIRE_SIZE;

    /// Single-tile payload with every cell set to `fill`.
    pub fn filled(tile_index: u8, duration: TransitionTime, fill: Color) -> Self {
        Self {
            tile_index,
            length: 1,
            x: 0,
            y: 0,
            width: TILE_STATE64_WIDTH as u8,
            duration,
            colors: [[fill; TILE_STATE64_WIDTH]; TILE_STATE64_WIDTH],
        }
    }

    /// Encode into a fresh buffer.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::WIRE_SIZE);
        buf.put_u8(self.tile_index);
        buf.put_u8(self.length);
        buf.put_u8(0); // reserved
        buf.put_u8(self.x);
        buf.put_u8(self.y);
        buf.put_u8(self.width);
        buf.put_u32_le(self.duration.0);
        put_colors(&mut buf, &self.colors);
        buf.freeze()
    }

    /// Decode from the start of `bytes`; trailing bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(bytes, "SetTileState64", Self::WIRE_SIZE)?;
        let mut buf = bytes;
        let tile_index = buf.get_u8();
        let length = buf.get_u8();
        buf.advance(1);
        let x = buf.get_u8();
        let y = buf.get_u8();
        let width = buf.get_u8();
        let duration = TransitionTime(buf.get_u32_le());
        Ok(Self {
            tile_index,
            length,
            x,
            y,
            width,
            duration,
            colors: get_colors(&mut buf),
        })
    }
}

/// One tile's 8×8 block as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTileState64 {
    /// Reporting tile in the chain.
    pub tile_index: u8,
    /// Column offset inside the tile.
    pub x: u8,
    /// Row offset inside the tile.
    pub y: u8,
    /// Width of the block.
    pub width: u8,
    /// Block contents.
    pub colors: TileColors,
}

impl StateTileState64 {
    /// Encoded payload size.
    pub const WIRE_SIZE: usize = 5 + COLORS_WIRE_SIZE;

    /// Encode into a fresh buffer.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::WIRE_SIZE);
        buf.put_u8(self.tile_index);
        buf.put_u8(0); // reserved
        buf.put_u8(self.x);
        buf.put_u8(self.y);
        buf.put_u8(self.width);
        put_colors(&mut buf, &self.colors);
        buf.freeze()
    }

    /// Decode from the start of `bytes`; trailing bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(bytes, "StateTileState64", Self::WIRE_SIZE)?;
        let mut buf = bytes;
        let tile_index = buf.get_u8();
        buf.advance(1);
        let x = buf.get_u8();
        let y = buf.get_u8();
        let width = buf.get_u8();
        Ok(Self {
            tile_index,
            x,
            y,
            width,
            colors: get_colors(&mut buf),
        })
    }
}
