// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! LAN frame header.
//!
//! Layout (36 bytes, little-endian):
//!
//! ```text
//! size u16 | protocol:12 addressable:1 tagged:1 origin:2 | source u32
//! target [u8; 8] | reserved [u8; 6] | res_required:1 ack_required:1 reserved:6 | sequence u8
//! reserved u64 | type u16 | reserved u16
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::{ensure_len, DecodeError};

/// Header length in bytes.
pub const HEADER_SIZE: usize = 36;
/// Protocol number carried in every frame.
pub const PROTOCOL: u16 = 1024;

const PROTOCOL_MASK: u16 = 0x0fff;
const ADDRESSABLE: u16 = 1 << 12;
const TAGGED: u16 = 1 << 13;

/// Acknowledgement / response request bits of the frame address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AckResFlag(u8);

impl AckResFlag {
    /// No reply requested.
    pub const NONE: AckResFlag = AckResFlag(0);
    /// Ask the device to answer with a state message.
    pub const RES_REQUIRED: AckResFlag = AckResFlag(1 << 0);
    /// Ask the device to answer with an acknowledgement.
    pub const ACK_REQUIRED: AckResFlag = AckResFlag(1 << 1);

    /// Raw bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from a raw byte, dropping reserved bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    /// True when every bit of `other` is set in `self`.
    pub const fn contains(self, other: AckResFlag) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AckResFlag {
    type Output = AckResFlag;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AckResFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Message type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageKind(pub u16);

impl MessageKind {
    /// Device acknowledgement of an `ACK_REQUIRED` message.
    pub const ACKNOWLEDGEMENT: MessageKind = MessageKind(45);
    /// Request tile colors.
    pub const GET_TILE_STATE64: MessageKind = MessageKind(707);
    /// Tile colors reported by the device.
    pub const STATE_TILE_STATE64: MessageKind = MessageKind(711);
    /// Paint tile colors.
    pub const SET_TILE_STATE64: MessageKind = MessageKind(715);

    fn name(self) -> Option<&'static str> {
        match self {
            Self::ACKNOWLEDGEMENT => Some("Acknowledgement"),
            Self::GET_TILE_STATE64 => Some("GetTileState64"),
            Self::STATE_TILE_STATE64 => Some("StateTileState64"),
            Self::SET_TILE_STATE64 => Some("SetTileState64"),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.0),
            None => write!(f, "Message({})", self.0),
        }
    }
}

/// Error returned when a target string is not six `:`-separated hex bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid target {0:?}: expected aa:bb:cc:dd:ee:ff")]
pub struct ParseTargetError(pub String);

/// Device MAC address; all zeros addresses every device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Target(pub [u8; 6]);

impl Target {
    /// Broadcast target.
    pub const ALL: Target = Target([0; 6]);

    /// True for the broadcast target.
    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut out {
            let part = parts
                .next()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| ParseTargetError(s.to_string()))?;
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseTargetError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseTargetError(s.to_string()));
        }
        Ok(Target(out))
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Source identifier echoed by the device.
    pub source: u32,
    /// Device that sent the frame.
    pub target: Target,
    /// Ack/res bits.
    pub flags: AckResFlag,
    /// Sequence number echoed by the device.
    pub sequence: u8,
    /// Message type.
    pub message: MessageKind,
    /// Raw payload bytes.
    pub payload: Bytes,
}

/// Frame `payload` behind a header.
pub fn encode_frame(
    source: u32,
    target: Target,
    flags: AckResFlag,
    sequence: u8,
    message: MessageKind,
    payload: &[u8],
) -> Bytes {
    let size = HEADER_SIZE + payload.len();
    let mut buf = BytesMut::with_capacity(size);
    buf.put_u16_le(size as u16);
    let mut protocol = PROTOCOL | ADDRESSABLE;
    if target.is_all() {
        protocol |= TAGGED;
    }
    buf.put_u16_le(protocol);
    buf.put_u32_le(source);
    buf.put_slice(&target.0);
    buf.put_bytes(0, 2); // target padding
    buf.put_bytes(0, 6); // reserved
    buf.put_u8(flags.bits());
    buf.put_u8(sequence);
    buf.put_u64_le(0); // reserved
    buf.put_u16_le(message.0);
    buf.put_u16_le(0); // reserved
    buf.put_slice(payload);
    buf.freeze()
}

/// Decode one datagram into a [`Response`].
pub fn decode_frame(bytes: &[u8]) -> Result<Response, DecodeError> {
    ensure_len(bytes, "frame header", HEADER_SIZE)?;
    let mut buf = bytes;
    let size = usize::from(buf.get_u16_le());
    if size < HEADER_SIZE || size > bytes.len() {
        return Err(DecodeError::BadSize {
            declared: size,
            actual: bytes.len(),
        });
    }
    let protocol = buf.get_u16_le() & PROTOCOL_MASK;
    if protocol != PROTOCOL {
        return Err(DecodeError::BadProtocol(protocol));
    }
    let source = buf.get_u32_le();
    let mut target = [0u8; 6];
    buf.copy_to_slice(&mut target);
    buf.advance(2 + 6);
    let flags = AckResFlag::from_bits(buf.get_u8());
    let sequence = buf.get_u8();
    buf.advance(8);
    let message = MessageKind(buf.get_u16_le());
    Ok(Response {
        source,
        target: Target(target),
        flags,
        sequence,
        message,
        payload: Bytes::copy_from_slice(&bytes[HEADER_SIZE..size]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_vector() {
        let target: Target = "d0:73:d5:01:02:03".parse().unwrap();
        let frame = encode_frame(
            0x0000_abcd,
            target,
            AckResFlag::ACK_REQUIRED,
            7,
            MessageKind::GET_TILE_STATE64,
            &[],
        );
        assert_eq!(
            hex::encode(&frame),
            concat!(
                "2400", "0014", "cdab0000",
                "d073d50102030000", "000000000000", "02", "07",
                "0000000000000000", "c302", "0000",
            )
        );
    }

    #[test]
    fn broadcast_target_sets_tagged_bit() {
        let frame = encode_frame(1, Target::ALL, AckResFlag::NONE, 0, MessageKind(2), &[]);
        assert_eq!(u16::from_le_bytes([frame[2], frame[3]]), 0x3400);
    }

    #[test]
    fn decode_reads_back_encoded_frame() {
        let target = Target([1, 2, 3, 4, 5, 6]);
        let frame = encode_frame(
            99,
            target,
            AckResFlag::RES_REQUIRED | AckResFlag::ACK_REQUIRED,
            200,
            MessageKind::STATE_TILE_STATE64,
            b"abc",
        );
        let resp = decode_frame(&frame).unwrap();
        assert_eq!(resp.source, 99);
        assert_eq!(resp.target, target);
        assert!(resp.flags.contains(AckResFlag::ACK_REQUIRED));
        assert!(resp.flags.contains(AckResFlag::RES_REQUIRED));
        assert_eq!(resp.sequence, 200);
        assert_eq!(resp.message, MessageKind::STATE_TILE_STATE64);
        assert_eq!(&resp.payload[..], b"abc");
    }

    #[test]
    fn decode_rejects_bad_size_and_protocol() {
        let mut frame = encode_frame(1, Target::ALL, AckResFlag::NONE, 0, MessageKind(2), b"xy").to_vec();
        frame.truncate(37);
        assert_eq!(
            decode_frame(&frame).unwrap_err(),
            DecodeError::BadSize {
                declared: 38,
                actual: 37
            }
        );

        let mut frame = encode_frame(1, Target::ALL, AckResFlag::NONE, 0, MessageKind(2), &[]).to_vec();
        frame[2] = 0x01;
        frame[3] = 0x14;
        assert_eq!(
            decode_frame(&frame).unwrap_err(),
            DecodeError::BadProtocol(0x0401)
        );

        assert!(matches!(
            decode_frame(&[0u8; 10]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn target_parse_and_display() {
        let t: Target = "D0:73:d5:aa:0b:ff".parse().unwrap();
        assert_eq!(t.to_string(), "d0:73:d5:aa:0b:ff");
        assert!("d0:73:d5".parse::<Target>().is_err());
        assert!("d0:73:d5:aa:0b:ff:00".parse::<Target>().is_err());
        assert!("zz:73:d5:aa:0b:ff".parse::<Target>().is_err());
        assert!(Target::ALL.is_all());
    }

    #[test]
    fn message_kind_display() {
        assert_eq!(MessageKind::SET_TILE_STATE64.to_string(), "SetTileState64(715)");
        assert_eq!(MessageKind(3).to_string(), "Message(3)");
    }
}
