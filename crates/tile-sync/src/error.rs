// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error type shared by the tile operations and the ports they call.

use std::io;

use thiserror::Error;
use tile_proto::DecodeError;

/// Errors surfaced by [`TileDevice`](crate::TileDevice) operations.
///
/// Collaborator errors pass through unchanged; nothing here is retried.
#[derive(Debug, Error)]
pub enum TileError {
    /// The caller's [`CancelToken`](crate::CancelToken) fired.
    #[error("operation cancelled")]
    Cancelled,
    /// Opening a connection to the device failed.
    #[error("dial failed: {0}")]
    Dial(#[source] io::Error),
    /// Transmitting a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
    /// Receiving a frame failed.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    /// A frame or payload did not match its fixed layout.
    #[error("malformed frame: {0}")]
    Decode(#[from] DecodeError),
    /// The connection was closed before the operation finished.
    #[error("connection closed")]
    Closed,
    /// A send task stopped without reporting a result.
    #[error("send task ended without reporting")]
    TaskAborted,
}
