// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! UDP adapter implementing the tile-sync device ports.
//!
//! One [`LanDevice`] per light. Every dial binds a fresh ephemeral socket
//! connected to the light, so the kernel filters out datagrams from other
//! hosts. Frames are the 36-byte LAN header plus payload, one per datagram.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU8, Ordering};

use bytes::Bytes;
use rand::Rng;
use tile_proto::{
    decode_frame, encode_frame, AckResFlag, Color, KelvinRange, MessageKind, Response, Target,
};
use tile_sync::{CancelToken, Connection, Device, TileError};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

/// UDP port lights listen on.
pub const DEFAULT_PORT: u16 = 56700;

/// Largest datagram accepted from a light.
const MAX_DATAGRAM: usize = 1500;

/// A light reachable over UDP.
#[derive(Debug)]
pub struct LanDevice {
    addr: SocketAddr,
    target: Target,
    source: u32,
    kelvin: KelvinRange,
    sequence: AtomicU8,
}

impl LanDevice {
    /// A device at `addr` with a random source identifier.
    ///
    /// Sources 0 and 1 are never picked; lights treat them as broadcast
    /// requests.
    pub fn new(addr: SocketAddr, target: Target) -> Self {
        Self {
            addr,
            target,
            source: rand::thread_rng().gen_range(2..=u32::MAX),
            kelvin: KelvinRange::default(),
            sequence: AtomicU8::new(0),
        }
    }

    /// Override the source identifier.
    pub fn with_source(mut self, source: u32) -> Self {
        self.source = source;
        self
    }

    /// Override the kelvin range applied by [`Device::sanitize_color`].
    pub fn with_kelvin_range(mut self, kelvin: KelvinRange) -> Self {
        self.kelvin = kelvin;
        self
    }

    /// Address frames are sent to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Target written into every header.
    pub fn target(&self) -> Target {
        self.target
    }

    fn next_sequence(&self) -> u8 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

impl Device for LanDevice {
    type Conn = UdpConnection;

    fn source(&self) -> u32 {
        self.source
    }

    async fn dial(&self) -> Result<UdpConnection, TileError> {
        let local = match self.addr.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(local, 0))
            .await
            .map_err(TileError::Dial)?;
        socket.connect(self.addr).await.map_err(TileError::Dial)?;
        debug!(peer = %self.addr, local = ?socket.local_addr().ok(), "udp socket ready");
        Ok(UdpConnection::new(socket))
    }

    async fn send(
        &self,
        conn: &UdpConnection,
        flags: AckResFlag,
        message: MessageKind,
        payload: Bytes,
    ) -> Result<u8, TileError> {
        let sequence = self.next_sequence();
        let frame = encode_frame(self.source, self.target, flags, sequence, message, &payload);
        conn.send(&frame).await?;
        trace!(%message, sequence, len = frame.len(), "frame sent");
        Ok(sequence)
    }

    fn sanitize_color(&self, color: Color) -> Color {
        self.kelvin.clamp(color)
    }
}

/// A connected UDP socket.
///
/// Reads and sends take `&self`, so one connection serves concurrent sends
/// and a reader at the same time.
#[derive(Debug)]
pub struct UdpConnection {
    socket: UdpSocket,
    closed: CancelToken,
}

impl UdpConnection {
    /// Wrap an already connected socket.
    pub fn new(socket: UdpSocket) -> Self {
        Self {
            socket,
            closed: CancelToken::new(),
        }
    }

    /// Local address of the socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TileError> {
        if self.closed.is_cancelled() {
            return Err(TileError::Closed);
        }
        let sent = self.socket.send(frame).await.map_err(TileError::Send)?;
        if sent != frame.len() {
            return Err(TileError::Send(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short datagram: {sent} of {} bytes", frame.len()),
            )));
        }
        Ok(())
    }
}

impl Connection for UdpConnection {
    async fn read_next_response(&self) -> Result<Response, TileError> {
        let mut buf = [0u8; MAX_DATAGRAM];
        let len = tokio::select! {
            biased;
            () = self.closed.cancelled() => return Err(TileError::Closed),
            res = self.socket.recv(&mut buf) => res.map_err(TileError::Read)?,
        };
        let resp = decode_frame(&buf[..len])?;
        trace!(message = %resp.message, sequence = resp.sequence, len, "frame received");
        Ok(resp)
    }

    fn close(&self) {
        self.closed.cancel();
    }
}
