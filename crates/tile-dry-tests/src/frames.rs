// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Inbound frame builders and recognizable color grids.

use bytes::Bytes;
use tile_proto::{
    encode_frame, AckResFlag, Color, MessageKind, Response, StateTileState64, Target, TileColors,
    TILE_STATE64_WIDTH,
};

/// A grid where every cell is distinct and tagged with `seed`.
///
/// Cell `(x, y)` has hue `seed * 1000 + x * 8 + y`, so a misplaced cell
/// shows up as a wrong hue.
pub fn tagged_grid(seed: u16) -> TileColors {
    let mut colors = [[Color::BLACK; TILE_STATE64_WIDTH]; TILE_STATE64_WIDTH];
    for (x, column) in colors.iter_mut().enumerate() {
        for (y, cell) in column.iter_mut().enumerate() {
            let hue = seed
                .wrapping_mul(1000)
                .wrapping_add((x * TILE_STATE64_WIDTH + y) as u16);
            *cell = Color::new(hue, 65535, 32768, 3500);
        }
    }
    colors
}

/// The color [`tagged_grid`] puts at `(x, y)`.
pub fn tagged_color(seed: u16, x: usize, y: usize) -> Color {
    tagged_grid(seed)[x][y]
}

/// A `StateTileState64` for `tile_index` carrying `colors`.
pub fn state_payload(tile_index: u8, colors: TileColors) -> StateTileState64 {
    StateTileState64 {
        tile_index,
        x: 0,
        y: 0,
        width: TILE_STATE64_WIDTH as u8,
        colors,
    }
}

/// A decoded frame as the device would send it.
pub fn response(source: u32, sequence: u8, message: MessageKind, payload: Bytes) -> Response {
    Response {
        source,
        target: Target::ALL,
        flags: AckResFlag::NONE,
        sequence,
        message,
        payload,
    }
}

/// A decoded `StateTileState64` frame.
pub fn state_response(source: u32, sequence: u8, state: &StateTileState64) -> Response {
    response(
        source,
        sequence,
        MessageKind::STATE_TILE_STATE64,
        state.encode(),
    )
}

/// A decoded acknowledgement.
pub fn ack_response(source: u32, sequence: u8) -> Response {
    response(source, sequence, MessageKind::ACKNOWLEDGEMENT, Bytes::new())
}

/// An encoded `StateTileState64` datagram, for transports that read bytes.
pub fn state_datagram(source: u32, sequence: u8, state: &StateTileState64) -> Bytes {
    encode_frame(
        source,
        Target::ALL,
        AckResFlag::NONE,
        sequence,
        MessageKind::STATE_TILE_STATE64,
        &state.encode(),
    )
}

/// An encoded acknowledgement datagram.
pub fn ack_datagram(source: u32, sequence: u8) -> Bytes {
    encode_frame(
        source,
        Target::ALL,
        AckResFlag::NONE,
        sequence,
        MessageKind::ACKNOWLEDGEMENT,
        &[],
    )
}
