// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Painting a board onto the tiles.

use std::sync::Arc;
use std::time::Duration;

use tile_proto::{AckResFlag, Color, MessageKind, SetTileState64, TransitionTime};
use tokio::sync::mpsc;
use tracing::debug;

use crate::port::{Connection, Device};
use crate::{CancelToken, ColorBoard, TileDevice, TileError};

impl<D: Device> TileDevice<D> {
    /// One `SetTileState64` per physical tile, in chain order.
    ///
    /// Every cell starts as sanitized black and is overwritten by the
    /// sanitized board color mapped onto it. Board cells that are not on a
    /// tile, or that land beyond the 8×8 wire block, are skipped.
    pub fn build_set_payloads(&self, board: &ColorBoard, transition: Duration) -> Vec<SetTileState64> {
        let topo = &self.topology;
        let black = self.base.sanitize_color(Color::BLACK);
        let duration = TransitionTime::from_duration(transition);
        let mut payloads: Vec<SetTileState64> = (0..topo.tile_count())
            .map(|i| SetTileState64::filled(topo.start_index() + i as u8, duration, black))
            .collect();

        for x in 0..topo.width() {
            for y in 0..topo.height() {
                let Some(color) = board.get(x, y) else {
                    continue;
                };
                let Some(at) = topo.tile_at(x, y) else {
                    continue;
                };
                let cell = payloads[at.tile]
                    .colors
                    .get_mut(at.x)
                    .and_then(|column| column.get_mut(at.y));
                if let Some(cell) = cell {
                    *cell = self.base.sanitize_color(color);
                }
            }
        }
        payloads
    }

    /// Paint `board` onto the device.
    ///
    /// Sends one frame per tile concurrently over a single connection. With
    /// `conn == None` a connection is dialed for this call and closed before
    /// returning; a caller-supplied connection is left open.
    ///
    /// Returns the first send error, or `Cancelled` as soon as `ctx` fires,
    /// without waiting for the remaining sends. When `ack` is set, waits for
    /// the device to acknowledge every frame; otherwise returns once all
    /// frames are out.
    pub async fn set_colors(
        &self,
        ctx: &CancelToken,
        conn: Option<Arc<D::Conn>>,
        board: &ColorBoard,
        transition: Duration,
        ack: bool,
    ) -> Result<(), TileError> {
        let guard = self.acquire(ctx, conn).await?;
        let payloads = self.build_set_payloads(board, transition);

        let mut flags = AckResFlag::NONE;
        if ack {
            flags |= AckResFlag::ACK_REQUIRED;
        }

        let total = payloads.len();
        debug!(tiles = total, ack, ?transition, "setting tile colors");

        let (tx, mut rx) = mpsc::channel::<Result<u8, TileError>>(total.max(1));
        for payload in payloads {
            let tx = tx.clone();
            let base = Arc::clone(&self.base);
            let conn = Arc::clone(guard.conn());
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let tile_index = payload.tile_index;
                let res = ctx
                    .run(base.send(&conn, flags, MessageKind::SET_TILE_STATE64, payload.encode()))
                    .await;
                match &res {
                    Ok(sequence) => debug!(tile_index, sequence, "tile frame sent"),
                    Err(err) => debug!(tile_index, %err, "tile frame failed"),
                }
                // The caller may already have returned on another tile's error.
                let _ = tx.send(res).await;
            });
        }
        drop(tx);

        let mut sequences = Vec::with_capacity(total);
        while sequences.len() < total {
            tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(TileError::Cancelled),
                res = rx.recv() => match res {
                    Some(Ok(sequence)) => sequences.push(sequence),
                    Some(Err(err)) => return Err(err),
                    None => return Err(TileError::TaskAborted),
                },
            }
        }

        if ack {
            ctx.run(guard.conn().wait_for_acks(self.base.source(), &sequences))
                .await?;
            debug!(frames = sequences.len(), "tile colors acknowledged");
        }
        Ok(())
    }
}
