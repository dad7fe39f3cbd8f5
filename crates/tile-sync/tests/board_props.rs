// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

use proptest::prelude::*;
use tile_proto::Color;
use tile_sync::{ColorBoard, TileLayout};

proptest! {
    #[test]
    fn fresh_board_is_all_absent(width in 0usize..24, height in 0usize..24) {
        let board = ColorBoard::new(width, height);
        prop_assert_eq!(board.iter().count(), 0);
        for x in 0..width {
            for y in 0..height {
                prop_assert_eq!(board.get(x, y), None);
            }
        }
    }

    #[test]
    fn out_of_range_reads_absent_and_writes_are_ignored(
        width in 1usize..16,
        height in 1usize..16,
        x in -32i64..48,
        y in -32i64..48,
    ) {
        let mut board = ColorBoard::new(width, height);
        board.fill(Color::new(1, 2, 3, 4));
        let inside = (0..width as i64).contains(&x) && (0..height as i64).contains(&y);
        prop_assert_eq!(board.get(x, y).is_some(), inside);

        let before = board.clone();
        let written = board.set(x, y, Some(Color::BLACK));
        prop_assert_eq!(written, inside);
        if !inside {
            prop_assert_eq!(board, before);
        }
    }

    #[test]
    fn row_layouts_map_every_cell_both_ways(count in 1usize..6, width in 1u8..12, height in 1u8..12) {
        let topology = TileLayout::row(count, width, height).build().unwrap();
        prop_assert_eq!(topology.width(), count * usize::from(width));
        prop_assert_eq!(topology.height(), usize::from(height));
        for x in 0..topology.width() {
            for y in 0..topology.height() {
                let at = topology.tile_at(x, y).unwrap();
                let back = topology.board_coord(at.tile, at.x, at.y).unwrap();
                prop_assert_eq!((back.x, back.y), (x, y));
            }
        }
    }
}
