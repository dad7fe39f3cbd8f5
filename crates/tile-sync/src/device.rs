// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tile device handle and connection acquisition.

use std::sync::Arc;

use tracing::debug;

use crate::port::{Connection, Device};
use crate::{CancelToken, TileError, Topology};

/// A tile device: the base device port plus its fixed tile topology.
///
/// Cheap to clone; clones share the port and the topology.
pub struct TileDevice<D> {
    pub(crate) base: Arc<D>,
    pub(crate) topology: Arc<Topology>,
}

impl<D> Clone for TileDevice<D> {
    fn clone(&self) -> Self {
        Self {
            base: Arc::clone(&self.base),
            topology: Arc::clone(&self.topology),
        }
    }
}

impl<D: Device> TileDevice<D> {
    /// Pair a device port with its (already known) topology.
    pub fn new(base: Arc<D>, topology: Topology) -> Self {
        Self {
            base,
            topology: Arc::new(topology),
        }
    }

    /// The underlying device port.
    pub fn base(&self) -> &Arc<D> {
        &self.base
    }

    /// The tile topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Board width covered by the tiles.
    pub fn width(&self) -> usize {
        self.topology.width()
    }

    /// Board height covered by the tiles.
    pub fn height(&self) -> usize {
        self.topology.height()
    }

    /// Use the caller's connection, or dial one that the returned guard
    /// closes on drop.
    pub(crate) async fn acquire(
        &self,
        ctx: &CancelToken,
        conn: Option<Arc<D::Conn>>,
    ) -> Result<ConnGuard<D::Conn>, TileError> {
        ctx.check()?;
        if let Some(conn) = conn {
            return Ok(ConnGuard { conn, owned: false });
        }
        let conn = ctx.run(self.base.dial()).await?;
        let guard = ConnGuard {
            conn: Arc::new(conn),
            owned: true,
        };
        debug!("dialed device for a single operation");
        ctx.check()?;
        Ok(guard)
    }
}

/// Connection in use by one operation.
pub(crate) struct ConnGuard<C: Connection> {
    conn: Arc<C>,
    owned: bool,
}

impl<C: Connection> ConnGuard<C> {
    pub(crate) fn conn(&self) -> &Arc<C> {
        &self.conn
    }
}

impl<C: Connection> Drop for ConnGuard<C> {
    fn drop(&mut self) {
        if self.owned {
            self.conn.close();
        }
    }
}
