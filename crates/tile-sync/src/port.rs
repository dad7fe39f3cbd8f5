// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collaborator ports consumed by the tile operations.
//!
//! Framing, sequence numbering, dialing and color sanitization live behind
//! these traits; `tile-lan` implements them over UDP and `tile-dry-tests`
//! provides scripted doubles.

use std::collections::HashSet;
use std::future::Future;

use bytes::Bytes;
use tile_proto::{AckResFlag, Color, MessageKind, Response};
use tracing::trace;

use crate::TileError;

/// An open transport to one device.
pub trait Connection: Send + Sync + 'static {
    /// Block until the next inbound frame has been decoded.
    fn read_next_response(&self) -> impl Future<Output = Result<Response, TileError>> + Send;

    /// Block until every sequence number in `sequences` has been
    /// acknowledged for `source`.
    ///
    /// The provided implementation is [`collect_acks`].
    fn wait_for_acks(
        &self,
        source: u32,
        sequences: &[u8],
    ) -> impl Future<Output = Result<(), TileError>> + Send {
        collect_acks(self, source, sequences)
    }

    /// Release the transport.
    fn close(&self);
}

/// The device-level half of the protocol.
pub trait Device: Send + Sync + 'static {
    /// Transport produced by [`dial`](Self::dial).
    type Conn: Connection;

    /// Source identifier stamped on outgoing frames and echoed in replies.
    fn source(&self) -> u32;

    /// Open a new connection to the device.
    fn dial(&self) -> impl Future<Output = Result<Self::Conn, TileError>> + Send;

    /// Frame and transmit one message; returns the sequence number used.
    fn send(
        &self,
        conn: &Self::Conn,
        flags: AckResFlag,
        message: MessageKind,
        payload: Bytes,
    ) -> impl Future<Output = Result<u8, TileError>> + Send;

    /// Device-specific clean-up applied to every color before it is sent.
    fn sanitize_color(&self, color: Color) -> Color;
}

/// Read frames from `conn` until `source` has acknowledged every sequence
/// number in `sequences`. Anything else on the wire is dropped.
pub async fn collect_acks<C>(conn: &C, source: u32, sequences: &[u8]) -> Result<(), TileError>
where
    C: Connection + ?Sized,
{
    let mut pending: HashSet<u8> = sequences.iter().copied().collect();
    while !pending.is_empty() {
        let resp = conn.read_next_response().await?;
        if resp.source != source || resp.message != MessageKind::ACKNOWLEDGEMENT {
            trace!(message = %resp.message, sequence = resp.sequence, "skipping non-ack frame");
            continue;
        }
        if pending.remove(&resp.sequence) {
            trace!(sequence = resp.sequence, remaining = pending.len(), "ack received");
        }
    }
    Ok(())
}
