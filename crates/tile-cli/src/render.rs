// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Text rendering of boards.

use tile_proto::Color;
use tile_sync::ColorBoard;

/// Brightness ramp, darkest first.
const RAMP: &[u8] = b".:-=+*#%@";

/// Glyph for one cell: blank when absent, otherwise a brightness step.
pub fn glyph(color: Option<Color>) -> char {
    let Some(color) = color else {
        return ' ';
    };
    let last = RAMP.len() - 1;
    let max = usize::from(u16::MAX);
    let step = (usize::from(color.brightness) * last + max / 2) / max;
    char::from(RAMP[step.min(last)])
}

/// One line per board row, top row first.
pub fn render_board(board: &ColorBoard) -> String {
    let mut out = String::with_capacity((board.width() + 1) * board.height());
    for y in 0..board.height() {
        out.extend((0..board.width()).map(|x| glyph(board.get(x, y))));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_follows_brightness() {
        assert_eq!(glyph(None), ' ');
        assert_eq!(glyph(Some(Color::BLACK)), '.');
        assert_eq!(glyph(Some(Color::new(0, 0, u16::MAX, 3500))), '@');
    }

    #[test]
    fn rows_are_lines() {
        let mut board = ColorBoard::new(3, 2);
        board.set(0, 0, Some(Color::new(0, 0, u16::MAX, 3500)));
        board.set(2, 1, Some(Color::BLACK));
        assert_eq!(render_board(&board), "@  \n  .\n");
    }
}
