// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Color synchronization for chains of LED tiles.
//!
//! A [`TileDevice`] pairs a device port with its [`Topology`] and moves a
//! [`ColorBoard`] to and from the hardware:
//!
//! * [`TileDevice::set_colors`] fans one `SetTileState64` per tile out over a
//!   shared connection and returns on the first failure.
//! * [`TileDevice::get_colors`] sends a single `GetTileState64` for the whole
//!   chain and reassembles the `StateTileState64` replies.
//!
//! Transport, framing and sequence numbering stay behind the [`Device`] and
//! [`Connection`] ports. Every operation takes a [`CancelToken`].

mod board;
mod cancel;
mod device;
mod error;
mod get;
pub mod port;
mod set;
mod topology;

pub use board::ColorBoard;
pub use cancel::CancelToken;
pub use device::TileDevice;
pub use error::TileError;
pub use port::{collect_acks, Connection, Device};
pub use topology::{
    BoardCoord, TileCoord, TileInfo, TileLayout, TilePlacement, Topology, TopologyError,
};

pub use tile_proto as proto;
