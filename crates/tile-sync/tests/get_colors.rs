// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Get collector behavior against scripted devices.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use tile_dry_tests::{
    ack_response, oversized_tile, response, stacked_pair, state_payload, state_response,
    tagged_color, tagged_grid, tile_row, MockDevice,
};
use tile_proto::{AckResFlag, DecodeError, GetTileState64, MessageKind};
use tile_sync::{CancelToken, ColorBoard, Connection, TileDevice, TileError, Topology};

const SRC: u32 = MockDevice::DEFAULT_SOURCE;

fn device_with(topology: Topology) -> (MockDevice, TileDevice<MockDevice>) {
    let mock = MockDevice::new();
    let device = TileDevice::new(Arc::new(mock.clone()), topology);
    (mock, device)
}

/// Queue a state reply for `tile_index`, tagged with `tile_index + 1`.
fn reply(mock: &MockDevice, sequence: u8, tile_index: u8) {
    let state = state_payload(tile_index, tagged_grid(u16::from(tile_index) + 1));
    mock.connection().push_frame(state_response(SRC, sequence, &state));
}

fn assert_row_board(board: &ColorBoard, tiles: usize) {
    assert_eq!((board.width(), board.height()), (tiles * 8, 8));
    for x in 0..tiles * 8 {
        for y in 0..8 {
            let seed = (x / 8) as u16 + 1;
            assert_eq!(board.get(x, y), Some(tagged_color(seed, x % 8, y)), "cell ({x}, {y})");
        }
    }
}

#[tokio::test]
async fn replies_reassemble_in_any_order() {
    for order in [[0u8, 1], [1, 0]] {
        let (mock, device) = device_with(tile_row(2, 0).unwrap());
        for tile in order {
            reply(&mock, 1, tile);
        }

        let board = device.get_colors(&CancelToken::new(), None).await.unwrap();

        assert_row_board(&board, 2);
        assert_eq!(mock.connection().closes(), 1);
    }
}

#[tokio::test]
async fn sends_one_request_for_the_whole_chain() {
    let (mock, device) = device_with(tile_row(3, 2).unwrap());
    for tile in 2..5 {
        reply(&mock, 1, tile);
    }

    device.get_colors(&CancelToken::new(), None).await.unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, MessageKind::GET_TILE_STATE64);
    assert_eq!(sent[0].flags, AckResFlag::NONE);
    let request = GetTileState64::decode(&sent[0].payload).unwrap();
    assert_eq!(request, GetTileState64::chain(2, 3));
    assert_eq!(request.width, 8);
}

#[tokio::test]
async fn unrelated_frames_are_skipped() {
    let (mock, device) = device_with(tile_row(2, 0).unwrap());
    let conn = mock.connection();
    conn.push_frame(ack_response(SRC, 1));
    let stray = state_payload(0, tagged_grid(9));
    conn.push_frame(state_response(SRC, 2, &stray));
    conn.push_frame(state_response(SRC + 1, 1, &stray));
    reply(&mock, 1, 1);
    reply(&mock, 1, 0);

    let board = device.get_colors(&CancelToken::new(), None).await.unwrap();

    assert_row_board(&board, 2);
    assert_eq!(conn.reads(), 5);
}

#[tokio::test]
async fn repeated_state_overwrites_without_completing() {
    let (mock, device) = device_with(tile_row(2, 0).unwrap());
    let conn = mock.connection();
    conn.push_frame(state_response(SRC, 1, &state_payload(0, tagged_grid(9))));
    reply(&mock, 1, 0);
    reply(&mock, 1, 1);

    let board = device.get_colors(&CancelToken::new(), None).await.unwrap();

    assert_row_board(&board, 2);
    assert_eq!(conn.reads(), 3);
}

#[tokio::test]
async fn states_outside_the_chain_are_ignored() {
    let (mock, device) = device_with(tile_row(2, 4).unwrap());
    let conn = mock.connection();
    conn.push_frame(state_response(SRC, 1, &state_payload(9, tagged_grid(7))));
    conn.push_frame(state_response(SRC, 1, &state_payload(3, tagged_grid(7))));
    reply(&mock, 1, 4);
    reply(&mock, 1, 5);

    let board = device.get_colors(&CancelToken::new(), None).await.unwrap();

    assert_eq!(board.get(0, 0), Some(tagged_color(5, 0, 0)));
    assert_eq!(board.get(15, 7), Some(tagged_color(6, 7, 7)));
}

#[tokio::test]
async fn malformed_state_aborts() {
    let (mock, device) = device_with(tile_row(2, 0).unwrap());
    reply(&mock, 1, 0);
    mock.connection().push_frame(response(
        SRC,
        1,
        MessageKind::STATE_TILE_STATE64,
        Bytes::from_static(&[1; 10]),
    ));

    let res = device.get_colors(&CancelToken::new(), None).await;

    assert!(matches!(
        res,
        Err(TileError::Decode(DecodeError::Truncated { actual: 10, .. }))
    ));
    assert_eq!(mock.connection().closes(), 1);
}

#[tokio::test]
async fn read_failure_aborts() {
    let (mock, device) = device_with(tile_row(2, 0).unwrap());
    reply(&mock, 1, 0);
    mock.connection().push_error(io::ErrorKind::UnexpectedEof);

    let res = device.get_colors(&CancelToken::new(), None).await;

    assert!(matches!(res, Err(TileError::Read(e)) if e.kind() == io::ErrorKind::UnexpectedEof));
}

#[tokio::test]
async fn closed_caller_connection_ends_the_read() {
    let (mock, device) = device_with(tile_row(1, 0).unwrap());
    let conn = Arc::new(mock.connection());
    conn.close();

    let res = device.get_colors(&CancelToken::new(), Some(Arc::clone(&conn))).await;

    assert!(matches!(res, Err(TileError::Closed)));
    assert_eq!(conn.closes(), 1);
}

#[tokio::test]
async fn cells_past_the_wire_block_stay_absent() {
    let (mock, device) = device_with(oversized_tile(10, 10).unwrap());
    reply(&mock, 1, 0);

    let board = device.get_colors(&CancelToken::new(), None).await.unwrap();

    assert_eq!(board.get(7, 7), Some(tagged_color(1, 7, 7)));
    assert_eq!(board.get(8, 0), None);
    assert_eq!(board.get(0, 9), None);
    assert_eq!(board.iter().count(), 64);
}

#[tokio::test]
async fn stacked_tiles_map_through_the_reverse_table() {
    let (mock, device) = device_with(stacked_pair().unwrap());
    reply(&mock, 1, 0);
    reply(&mock, 1, 1);

    let board = device.get_colors(&CancelToken::new(), None).await.unwrap();

    assert_eq!((board.width(), board.height()), (8, 16));
    assert_eq!(board.get(0, 8), Some(tagged_color(1, 0, 0)));
    assert_eq!(board.get(3, 2), Some(tagged_color(2, 3, 2)));
}

#[tokio::test]
async fn cancelled_before_start_touches_nothing() {
    let (mock, device) = device_with(tile_row(2, 0).unwrap());
    let ctx = CancelToken::new();
    ctx.cancel();

    let res = device.get_colors(&ctx, None).await;

    assert!(matches!(res, Err(TileError::Cancelled)));
    assert_eq!(mock.dials(), 0);
    assert_eq!(mock.send_count(), 0);
    assert_eq!(mock.connection().reads(), 0);
}

#[tokio::test]
async fn waiting_for_replies_is_cancellable() {
    let (mock, device) = device_with(tile_row(2, 0).unwrap());
    reply(&mock, 1, 0);
    let ctx = CancelToken::new();
    let canceller = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            ctx.cancel();
        })
    };

    let res = device.get_colors(&ctx, None).await;
    canceller.await.unwrap();

    assert!(matches!(res, Err(TileError::Cancelled)));
    assert_eq!(mock.connection().closes(), 1);
}
