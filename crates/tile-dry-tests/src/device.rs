// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted [`Device`] / [`Connection`] doubles.
//!
//! Send outcomes are keyed by the payload's first byte (the protocol tile
//! index), so scripts stay deterministic even though `set_colors` sends
//! concurrently. Sequence numbers are handed out 1, 2, 3, … in call order.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use tile_proto::{AckResFlag, Color, KelvinRange, MessageKind, Response};
use tile_sync::{collect_acks, Connection, Device, TileError};
use tokio::sync::Notify;

use crate::frames::ack_response;

/// What a scripted send does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Succeed immediately.
    Ok,
    /// Succeed after sleeping.
    Delay(Duration),
    /// Fail with an I/O error of this kind.
    Fail(io::ErrorKind),
    /// Never complete.
    Hang,
}

/// One recorded call to [`Device::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Flags passed by the caller.
    pub flags: AckResFlag,
    /// Message type.
    pub message: MessageKind,
    /// Encoded payload.
    pub payload: Bytes,
    /// Sequence number assigned by the double.
    pub sequence: u8,
}

impl SentMessage {
    /// First payload byte; the tile index for every tile message.
    pub fn tile_index(&self) -> Option<u8> {
        self.payload.first().copied()
    }
}

/// A queued result for [`Connection::read_next_response`].
#[derive(Debug, Clone)]
pub enum ReadStep {
    /// Deliver this frame.
    Frame(Response),
    /// Fail the read with an I/O error of this kind.
    Error(io::ErrorKind),
}

#[derive(Default)]
struct DeviceState {
    next_sequence: u8,
    dials: usize,
    dial_error: Option<io::ErrorKind>,
    default_outcome: Option<SendOutcome>,
    outcomes: HashMap<u8, SendOutcome>,
    sent: Vec<SentMessage>,
    auto_ack: bool,
}

/// Scripted device double.
///
/// Every dial hands out a handle to the same [`MockConnection`], so frames
/// scripted through [`connection`](Self::connection) are visible to
/// operations that dial for themselves.
#[derive(Clone)]
pub struct MockDevice {
    source: u32,
    kelvin: Option<KelvinRange>,
    conn: MockConnection,
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    /// Source identifier used by every double unless overridden.
    pub const DEFAULT_SOURCE: u32 = 0x5eed;

    /// A device whose sends all succeed and whose colors pass through
    /// unchanged.
    pub fn new() -> Self {
        Self {
            source: Self::DEFAULT_SOURCE,
            kelvin: None,
            conn: MockConnection::new(),
            state: Arc::new(Mutex::new(DeviceState::default())),
        }
    }

    /// Override the source identifier.
    pub fn with_source(mut self, source: u32) -> Self {
        self.source = source;
        self
    }

    /// Clamp kelvin in [`Device::sanitize_color`].
    pub fn with_kelvin_range(mut self, range: KelvinRange) -> Self {
        self.kelvin = Some(range);
        self
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Script the outcome of sends whose tile index is `tile_index`.
    pub fn script_send(&self, tile_index: u8, outcome: SendOutcome) {
        self.lock().outcomes.insert(tile_index, outcome);
    }

    /// Outcome for sends with no per-tile script.
    pub fn set_default_outcome(&self, outcome: SendOutcome) {
        self.lock().default_outcome = Some(outcome);
    }

    /// Make every dial fail with `kind`.
    pub fn fail_dial(&self, kind: io::ErrorKind) {
        self.lock().dial_error = Some(kind);
    }

    /// Queue an acknowledgement on the connection for every successful send
    /// that asked for one.
    pub fn set_auto_ack(&self, on: bool) {
        self.lock().auto_ack = on;
    }

    /// The connection every dial returns.
    pub fn connection(&self) -> MockConnection {
        self.conn.clone()
    }

    /// Number of dials attempted.
    pub fn dials(&self) -> usize {
        self.lock().dials
    }

    /// Every send attempted, in call order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// Number of sends attempted.
    pub fn send_count(&self) -> usize {
        self.lock().sent.len()
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for MockDevice {
    type Conn = MockConnection;

    fn source(&self) -> u32 {
        self.source
    }

    async fn dial(&self) -> Result<MockConnection, TileError> {
        let mut state = self.lock();
        state.dials += 1;
        if let Some(kind) = state.dial_error {
            return Err(TileError::Dial(io::Error::from(kind)));
        }
        Ok(self.conn.clone())
    }

    async fn send(
        &self,
        conn: &MockConnection,
        flags: AckResFlag,
        message: MessageKind,
        payload: Bytes,
    ) -> Result<u8, TileError> {
        let (sequence, outcome, auto_ack) = {
            let mut state = self.lock();
            state.next_sequence = state.next_sequence.wrapping_add(1);
            let sequence = state.next_sequence;
            let outcome = payload
                .first()
                .and_then(|tile| state.outcomes.get(tile).cloned())
                .or_else(|| state.default_outcome.clone())
                .unwrap_or(SendOutcome::Ok);
            state.sent.push(SentMessage {
                flags,
                message,
                payload,
                sequence,
            });
            (sequence, outcome, state.auto_ack)
        };

        match outcome {
            SendOutcome::Ok => {}
            SendOutcome::Delay(d) => tokio::time::sleep(d).await,
            SendOutcome::Fail(kind) => return Err(TileError::Send(io::Error::from(kind))),
            SendOutcome::Hang => std::future::pending::<()>().await,
        }
        if auto_ack && flags.contains(AckResFlag::ACK_REQUIRED) {
            conn.push_frame(ack_response(self.source, sequence));
        }
        Ok(sequence)
    }

    fn sanitize_color(&self, color: Color) -> Color {
        match &self.kelvin {
            Some(range) => range.clamp(color),
            None => color,
        }
    }
}

#[derive(Default)]
struct ConnState {
    queue: VecDeque<ReadStep>,
    closed: bool,
    reads: usize,
    closes: usize,
    ack_waits: Vec<(u32, Vec<u8>)>,
}

struct ConnShared {
    state: Mutex<ConnState>,
    notify: Notify,
}

/// Scripted connection double. Clones share one inbound queue.
///
/// Reads pop the queue in order; an empty queue blocks until a frame is
/// pushed or the connection is closed, after which reads fail with
/// [`TileError::Closed`].
#[derive(Clone)]
pub struct MockConnection {
    shared: Arc<ConnShared>,
}

impl MockConnection {
    /// An open connection with nothing queued.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ConnShared {
                state: Mutex::new(ConnState::default()),
                notify: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnState> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, step: ReadStep) {
        self.lock().queue.push_back(step);
        self.shared.notify.notify_one();
    }

    /// Queue an inbound frame.
    pub fn push_frame(&self, frame: Response) {
        self.push(ReadStep::Frame(frame));
    }

    /// Queue a failing read.
    pub fn push_error(&self, kind: io::ErrorKind) {
        self.push(ReadStep::Error(kind));
    }

    /// Number of reads attempted.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    /// Number of times [`Connection::close`] was called.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    /// True once closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// `(source, sequences)` for every ack wait, in call order.
    pub fn ack_waits(&self) -> Vec<(u32, Vec<u8>)> {
        self.lock().ack_waits.clone()
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for MockConnection {
    async fn read_next_response(&self) -> Result<Response, TileError> {
        self.lock().reads += 1;
        loop {
            {
                let mut state = self.lock();
                if let Some(step) = state.queue.pop_front() {
                    return match step {
                        ReadStep::Frame(frame) => Ok(frame),
                        ReadStep::Error(kind) => Err(TileError::Read(io::Error::from(kind))),
                    };
                }
                if state.closed {
                    return Err(TileError::Closed);
                }
            }
            self.shared.notify.notified().await;
        }
    }

    async fn wait_for_acks(&self, source: u32, sequences: &[u8]) -> Result<(), TileError> {
        self.lock().ack_waits.push((source, sequences.to_vec()));
        collect_acks(self, source, sequences).await
    }

    fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.closes += 1;
        }
        self.shared.notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequences_count_up_and_outcomes_follow_tile_index() {
        let device = MockDevice::new();
        device.script_send(1, SendOutcome::Fail(io::ErrorKind::BrokenPipe));
        let conn = device.connection();

        let seq = device
            .send(&conn, AckResFlag::NONE, MessageKind(1), Bytes::from_static(&[0]))
            .await
            .unwrap();
        assert_eq!(seq, 1);
        let err = device
            .send(&conn, AckResFlag::NONE, MessageKind(1), Bytes::from_static(&[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, TileError::Send(e) if e.kind() == io::ErrorKind::BrokenPipe));

        let sent = device.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].sequence, 2);
        assert_eq!(sent[1].tile_index(), Some(1));
    }

    #[tokio::test]
    async fn auto_ack_feeds_the_connection() {
        let device = MockDevice::new();
        device.set_auto_ack(true);
        let conn = device.dial().await.unwrap();
        let seq = device
            .send(&conn, AckResFlag::ACK_REQUIRED, MessageKind(1), Bytes::new())
            .await
            .unwrap();
        let frame = conn.read_next_response().await.unwrap();
        assert_eq!(frame, ack_response(MockDevice::DEFAULT_SOURCE, seq));
        assert_eq!(device.dials(), 1);
    }

    #[tokio::test]
    async fn close_wakes_a_blocked_reader() {
        let conn = MockConnection::new();
        let reader = {
            let conn = conn.clone();
            tokio::spawn(async move { conn.read_next_response().await })
        };
        tokio::task::yield_now().await;
        conn.close();
        let res = reader.await.unwrap();
        assert!(matches!(res, Err(TileError::Closed)));
        assert_eq!(conn.closes(), 1);
    }

    #[tokio::test]
    async fn scripted_read_error_surfaces() {
        let conn = MockConnection::new();
        conn.push_error(io::ErrorKind::UnexpectedEof);
        let err = conn.read_next_response().await.unwrap_err();
        assert!(matches!(err, TileError::Read(e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert_eq!(conn.reads(), 1);
    }

    #[test]
    fn kelvin_range_sanitizes() {
        let device = MockDevice::new().with_kelvin_range(KelvinRange::default());
        assert_eq!(device.sanitize_color(Color::BLACK).kelvin, 2500);
        assert_eq!(MockDevice::new().sanitize_color(Color::BLACK), Color::BLACK);
    }
}
