// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for tile crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`device`] - Scripted device and connection doubles
//! - [`frames`] - Inbound frame builders and recognizable color grids
//! - [`light`] - Fake light on a loopback UDP socket
//! - [`topology`] - Common tile layouts

pub mod config;
pub mod device;
pub mod frames;
pub mod light;
pub mod topology;

pub use config::InMemoryConfigStore;
pub use device::{MockConnection, MockDevice, ReadStep, SendOutcome, SentMessage};
pub use frames::{
    ack_datagram, ack_response, response, state_datagram, state_payload, state_response,
    tagged_color, tagged_grid,
};
pub use light::{spawn_fake_light, FakeLight};
pub use topology::{oversized_tile, stacked_pair, tile_row};
