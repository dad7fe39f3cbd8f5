// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reading the tiles back into a board.

use std::sync::Arc;

use tile_proto::{
    AckResFlag, GetTileState64, MessageKind, StateTileState64, TILE_STATE64_WIDTH,
};
use tracing::{debug, trace, warn};

use crate::port::{Connection, Device};
use crate::{CancelToken, ColorBoard, TileDevice, TileError};

impl<D: Device> TileDevice<D> {
    /// Read the current colors of every tile.
    ///
    /// Sends one `GetTileState64` covering the whole chain, then reads frames
    /// until every tile has reported. Frames for other requests, other
    /// sources or other message kinds are skipped. Any read or decode error,
    /// or cancellation, aborts the call; no partial board is returned.
    pub async fn get_colors(
        &self,
        ctx: &CancelToken,
        conn: Option<Arc<D::Conn>>,
    ) -> Result<ColorBoard, TileError> {
        let guard = self.acquire(ctx, conn).await?;
        let conn = guard.conn();
        let topo = &self.topology;
        let source = self.base.source();

        let request = GetTileState64::chain(topo.start_index(), topo.tile_count() as u8);
        let sequence = ctx
            .run(self.base.send(
                conn,
                AckResFlag::NONE,
                MessageKind::GET_TILE_STATE64,
                request.encode(),
            ))
            .await?;
        debug!(tiles = topo.tile_count(), sequence, "requested tile colors");

        let mut received = vec![false; topo.tile_count()];
        let mut board = ColorBoard::new(topo.width(), topo.height());
        loop {
            let resp = ctx.run(conn.read_next_response()).await?;
            if resp.sequence != sequence || resp.source != source {
                trace!(sequence = resp.sequence, source = resp.source, "skipping unrelated frame");
                continue;
            }
            if resp.message != MessageKind::STATE_TILE_STATE64 {
                trace!(message = %resp.message, "skipping unexpected message kind");
                continue;
            }

            let state = StateTileState64::decode(&resp.payload)?;
            let Some(tile) = state
                .tile_index
                .checked_sub(topo.start_index())
                .map(usize::from)
                .filter(|t| *t < topo.tile_count())
            else {
                warn!(tile_index = state.tile_index, "state for a tile outside the chain");
                continue;
            };
            received[tile] = true;

            let Some(info) = topo.tile(tile) else {
                continue;
            };
            let width = usize::from(info.width).min(TILE_STATE64_WIDTH);
            let height = usize::from(info.height).min(TILE_STATE64_WIDTH);
            for x in 0..width {
                for y in 0..height {
                    if let Some(at) = topo.board_coord(tile, x, y) {
                        board.set(at.x, at.y, Some(state.colors[x][y]));
                    }
                }
            }

            if received.iter().all(|r| *r) {
                debug!(tiles = received.len(), "all tiles reported");
                return Ok(board);
            }
        }
    }
}
