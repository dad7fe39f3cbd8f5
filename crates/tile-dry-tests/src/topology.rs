// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Topology fixtures.

use tile_sync::{TileLayout, TilePlacement, Topology, TopologyError};

/// `count` 8×8 tiles in a row starting at protocol index `start_index`.
pub fn tile_row(count: usize, start_index: u8) -> Result<Topology, TopologyError> {
    TileLayout {
        start_index,
        ..TileLayout::row(count, 8, 8)
    }
    .build()
}

/// Two 8×8 tiles stacked vertically, the second above the first.
///
/// Board is 8 wide and 16 tall; tile 0 covers rows 8..16.
pub fn stacked_pair() -> Result<Topology, TopologyError> {
    TileLayout {
        start_index: 0,
        tiles: vec![
            TilePlacement {
                x: 0,
                y: 8,
                width: 8,
                height: 8,
            },
            TilePlacement {
                x: 0,
                y: 0,
                width: 8,
                height: 8,
            },
        ],
    }
    .build()
}

/// One tile wider and taller than the 8×8 wire block.
pub fn oversized_tile(width: u8, height: u8) -> Result<Topology, TopologyError> {
    TileLayout::row(1, width, height).build()
}
