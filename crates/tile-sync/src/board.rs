// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Device-agnostic color board.

use serde::Serialize;
use tile_proto::Color;

/// Logical grid of optional colors addressed by `(x, y)`.
///
/// The board is stored column by column: there is one column per `x`, and
/// every column holds exactly `height` cells. `None` means "leave unchanged"
/// when painting and "not on any tile" when reading back.
///
/// Coordinates accept any integer type. Anything negative or past the
/// board's dimensions reads as `None` and is ignored on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColorBoard {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
}

impl ColorBoard {
    /// A `width × height` board with every cell absent.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells per column.
    pub fn height(&self) -> usize {
        self.height
    }

    fn index<X, Y>(&self, x: X, y: Y) -> Option<usize>
    where
        X: TryInto<usize>,
        Y: TryInto<usize>,
    {
        let x = x.try_into().ok().filter(|x| *x < self.width)?;
        let y = y.try_into().ok().filter(|y| *y < self.height)?;
        Some(x * self.height + y)
    }

    /// Color at `(x, y)`, or `None` when absent or out of range.
    pub fn get<X, Y>(&self, x: X, y: Y) -> Option<Color>
    where
        X: TryInto<usize>,
        Y: TryInto<usize>,
    {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Assign `(x, y)`. Returns `false` (and changes nothing) when out of
    /// range.
    pub fn set<X, Y>(&mut self, x: X, y: Y, color: Option<Color>) -> bool
    where
        X: TryInto<usize>,
        Y: TryInto<usize>,
    {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = color;
                true
            }
            None => false,
        }
    }

    /// Set every cell to `color`.
    pub fn fill(&mut self, color: Color) {
        self.cells.fill(Some(color));
    }

    /// Present cells as `(x, y, color)`, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        let height = self.height;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|c| (i / height, i % height, c)))
    }
}
