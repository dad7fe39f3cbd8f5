// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mapping between board coordinates and physical tile cells.
//!
//! A [`Topology`] is two precomputed lookup tables:
//!
//! * forward: board `(x, y)` → `(tile position, intra-tile x, intra-tile y)`
//!   or "not on a tile";
//! * reverse: `(tile position, intra-tile x, intra-tile y)` → board `(x, y)`.
//!
//! The tables are supplied by whoever knows the physical layout (device
//! discovery, a config file) and never change afterwards. [`TileLayout`]
//! builds them for the common case of unrotated tiles placed at integer board
//! offsets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pixel dimensions of one physical tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    /// Pixel columns.
    pub width: u8,
    /// Pixel rows.
    pub height: u8,
}

/// A cell on a physical tile. `tile` is the 0-based position in the chain,
/// not the protocol tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    /// Position in the chain.
    pub tile: usize,
    /// Column inside the tile.
    pub x: usize,
    /// Row inside the tile.
    pub y: usize,
}

/// A cell on the logical board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCoord {
    /// Board column.
    pub x: usize,
    /// Board row.
    pub y: usize,
}

/// Rejected tables or layouts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// No tiles at all.
    #[error("tile chain is empty")]
    Empty,
    /// Start index plus tile count exceeds the u8 tile index space.
    #[error("{count} tiles starting at index {start} do not fit a u8 tile index")]
    TooManyTiles {
        /// First protocol tile index.
        start: u8,
        /// Tiles in the chain.
        count: usize,
    },
    /// A tile with zero width or height.
    #[error("tile {0} has zero width or height")]
    EmptyTile(usize),
    /// A lookup table has the wrong number of entries.
    #[error("{table} table has {actual} entries, expected {expected}")]
    TableSize {
        /// Which table.
        table: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// A table entry points outside the board or its tile.
    #[error("{table} table entry {entry} points out of range")]
    OutOfRange {
        /// Which table.
        table: &'static str,
        /// Offending entry index.
        entry: usize,
    },
    /// Two tiles claim the same board cell.
    #[error("tiles {first} and {second} overlap at ({x}, {y})")]
    Overlap {
        /// Tile already covering the cell.
        first: usize,
        /// Tile placed second.
        second: usize,
        /// Board column.
        x: usize,
        /// Board row.
        y: usize,
    },
}

/// Immutable tile layout of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    start_index: u8,
    tiles: Vec<TileInfo>,
    width: usize,
    height: usize,
    // board x * height + y
    forward: Vec<Option<TileCoord>>,
    // per tile: x * tile.height + y
    reverse: Vec<Vec<Option<BoardCoord>>>,
}

impl Topology {
    /// Adopt precomputed lookup tables after checking their shape.
    ///
    /// `forward` is indexed `x * height + y`; `reverse[tile]` is indexed
    /// `x * tile.height + y`.
    pub fn from_tables(
        start_index: u8,
        tiles: Vec<TileInfo>,
        width: usize,
        height: usize,
        forward: Vec<Option<TileCoord>>,
        reverse: Vec<Vec<Option<BoardCoord>>>,
    ) -> Result<Self, TopologyError> {
        if tiles.is_empty() {
            return Err(TopologyError::Empty);
        }
        let max = usize::from(u8::MAX);
        if tiles.len() > max || usize::from(start_index) + tiles.len() > max + 1 {
            return Err(TopologyError::TooManyTiles {
                start: start_index,
                count: tiles.len(),
            });
        }
        if let Some(i) = tiles.iter().position(|t| t.width == 0 || t.height == 0) {
            return Err(TopologyError::EmptyTile(i));
        }
        check_size("forward", width * height, forward.len())?;
        check_size("reverse", tiles.len(), reverse.len())?;
        for (entry, coord) in forward.iter().enumerate() {
            let Some(c) = coord else { continue };
            let ok = tiles
                .get(c.tile)
                .is_some_and(|t| c.x < usize::from(t.width) && c.y < usize::from(t.height));
            if !ok {
                return Err(TopologyError::OutOfRange {
                    table: "forward",
                    entry,
                });
            }
        }
        for (tile, cells) in tiles.iter().zip(&reverse) {
            check_size(
                "reverse tile",
                usize::from(tile.width) * usize::from(tile.height),
                cells.len(),
            )?;
            if let Some(entry) = cells
                .iter()
                .position(|c| c.is_some_and(|c| c.x >= width || c.y >= height))
            {
                return Err(TopologyError::OutOfRange {
                    table: "reverse",
                    entry,
                });
            }
        }
        Ok(Self {
            start_index,
            tiles,
            width,
            height,
            forward,
            reverse,
        })
    }

    /// Protocol index of the first tile in the chain.
    pub fn start_index(&self) -> u8 {
        self.start_index
    }

    /// Number of physical tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// All tiles in chain order.
    pub fn tiles(&self) -> &[TileInfo] {
        &self.tiles
    }

    /// Tile at chain position `tile`.
    pub fn tile(&self, tile: usize) -> Option<&TileInfo> {
        self.tiles.get(tile)
    }

    /// Board width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Forward lookup; `None` when `(x, y)` is outside the board or not on a
    /// tile.
    pub fn tile_at(&self, x: usize, y: usize) -> Option<TileCoord> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.forward[x * self.height + y]
    }

    /// Reverse lookup for a cell of the tile at chain position `tile`.
    pub fn board_coord(&self, tile: usize, x: usize, y: usize) -> Option<BoardCoord> {
        let info = self.tiles.get(tile)?;
        let (w, h) = (usize::from(info.width), usize::from(info.height));
        if x >= w || y >= h {
            return None;
        }
        self.reverse[tile][x * h + y]
    }
}

fn check_size(table: &'static str, expected: usize, actual: usize) -> Result<(), TopologyError> {
    if expected != actual {
        return Err(TopologyError::TableSize {
            table,
            expected,
            actual,
        });
    }
    Ok(())
}

/// One tile placed on the board with its top-left cell at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlacement {
    /// Board column of the tile's first column.
    pub x: usize,
    /// Board row of the tile's first row.
    pub y: usize,
    /// Pixel columns.
    pub width: u8,
    /// Pixel rows.
    pub height: u8,
}

/// Serializable description of a device's tiles, in chain order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    /// Protocol index of the first tile.
    #[serde(default)]
    pub start_index: u8,
    /// Tile placements in chain order.
    pub tiles: Vec<TilePlacement>,
}

impl TileLayout {
    /// `count` tiles side by side along the x axis.
    pub fn row(count: usize, width: u8, height: u8) -> Self {
        let tiles = (0..count)
            .map(|i| TilePlacement {
                x: i * usize::from(width),
                y: 0,
                width,
                height,
            })
            .collect();
        Self {
            start_index: 0,
            tiles,
        }
    }

    /// Build both lookup tables. The board is the bounding box of all tiles.
    pub fn build(&self) -> Result<Topology, TopologyError> {
        let width = self
            .tiles
            .iter()
            .map(|t| t.x + usize::from(t.width))
            .max()
            .unwrap_or(0);
        let height = self
            .tiles
            .iter()
            .map(|t| t.y + usize::from(t.height))
            .max()
            .unwrap_or(0);

        let mut forward: Vec<Option<TileCoord>> = vec![None; width * height];
        let mut reverse = Vec::with_capacity(self.tiles.len());
        for (tile, p) in self.tiles.iter().enumerate() {
            let (w, h) = (usize::from(p.width), usize::from(p.height));
            let mut cells = vec![None; w * h];
            for tx in 0..w {
                for ty in 0..h {
                    let (bx, by) = (p.x + tx, p.y + ty);
                    let slot = &mut forward[bx * height + by];
                    if let Some(prev) = slot {
                        return Err(TopologyError::Overlap {
                            first: prev.tile,
                            second: tile,
                            x: bx,
                            y: by,
                        });
                    }
                    *slot = Some(TileCoord {
                        tile,
                        x: tx,
                        y: ty,
                    });
                    cells[tx * h + ty] = Some(BoardCoord { x: bx, y: by });
                }
            }
            reverse.push(cells);
        }

        let tiles = self
            .tiles
            .iter()
            .map(|p| TileInfo {
                width: p.width,
                height: p.height,
            })
            .collect();
        Topology::from_tables(self.start_index, tiles, width, height, forward, reverse)
    }
}
