// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A fake light answering on a loopback UDP socket.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tile_proto::{decode_frame, AckResFlag, MessageKind, SetTileState64};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::frames::{ack_datagram, state_datagram, state_payload, tagged_grid};

/// Handle to a running fake light.
///
/// The light acknowledges `SetTileState64` frames that ask for it and
/// answers `GetTileState64` with a stray acknowledgement followed by one
/// [`tagged_grid`] state per tile (seed `tile + 1`), last tile first.
pub struct FakeLight {
    /// Address the light listens on.
    pub addr: SocketAddr,
    /// Every set payload the light decoded, in arrival order.
    pub sets: mpsc::UnboundedReceiver<SetTileState64>,
    received: Arc<AtomicUsize>,
}

impl FakeLight {
    /// Datagrams received so far, undecodable ones included.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

/// Bind a fake light with `tiles` tiles on `127.0.0.1` and serve it from a
/// background task.
pub async fn spawn_fake_light(tiles: u8) -> io::Result<FakeLight> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    let addr = socket.local_addr()?;
    let (tx, sets) = mpsc::unbounded_channel();
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    tokio::spawn(async move {
        let mut buf = [0u8; 1500];
        while let Ok((n, peer)) = socket.recv_from(&mut buf).await {
            counter.fetch_add(1, Ordering::SeqCst);
            let Ok(req) = decode_frame(&buf[..n]) else {
                continue;
            };
            if req.message == MessageKind::SET_TILE_STATE64 {
                if let Ok(set) = SetTileState64::decode(&req.payload) {
                    let _ = tx.send(set);
                }
                if req.flags.contains(AckResFlag::ACK_REQUIRED) {
                    let _ = socket
                        .send_to(&ack_datagram(req.source, req.sequence), peer)
                        .await;
                }
            } else if req.message == MessageKind::GET_TILE_STATE64 {
                let stray = ack_datagram(req.source, req.sequence.wrapping_add(1));
                let _ = socket.send_to(&stray, peer).await;
                for tile in (0..tiles).rev() {
                    let state = state_payload(tile, tagged_grid(u16::from(tile) + 1));
                    let frame = state_datagram(req.source, req.sequence, &state);
                    let _ = socket.send_to(&frame, peer).await;
                }
            }
        }
    });
    Ok(FakeLight {
        addr,
        sets,
        received,
    })
}
