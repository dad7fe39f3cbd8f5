// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stored device preferences.

use std::net::{IpAddr, SocketAddr};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tile_config::{ConfigService, ConfigStore};
use tile_lan::DEFAULT_PORT;
use tile_proto::{KelvinRange, Target};
use tile_sync::TileLayout;

/// Config key the preferences live under.
pub const PREFS_KEY: &str = "device";

/// Everything needed to reach and drive one tile device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicePrefs {
    /// Light address, `ip` or `ip:port`.
    pub address: Option<String>,
    /// Device MAC written into every header; all zeros when unset.
    pub target: Option<String>,
    /// Lowest kelvin the device accepts.
    pub kelvin_min: u16,
    /// Highest kelvin the device accepts.
    pub kelvin_max: u16,
    /// Physical tile arrangement.
    pub layout: TileLayout,
}

impl Default for DevicePrefs {
    fn default() -> Self {
        let kelvin = KelvinRange::default();
        Self {
            address: None,
            target: None,
            kelvin_min: kelvin.min,
            kelvin_max: kelvin.max,
            layout: TileLayout::row(5, 8, 8),
        }
    }
}

impl DevicePrefs {
    /// Load stored prefs, or defaults when nothing is stored.
    pub fn load<S: ConfigStore>(config: &ConfigService<S>) -> Result<Self> {
        config
            .load_or_default(PREFS_KEY)
            .context("loading device preferences")
    }

    /// Persist these prefs.
    pub fn save<S: ConfigStore>(&self, config: &ConfigService<S>) -> Result<()> {
        config
            .save(PREFS_KEY, self)
            .context("saving device preferences")
    }

    /// Replace stored values with those given on the command line.
    pub fn override_with(&mut self, address: Option<&str>, target: Option<&str>) {
        if let Some(address) = address {
            self.address = Some(address.to_owned());
        }
        if let Some(target) = target {
            self.target = Some(target.to_owned());
        }
    }

    /// Resolved socket address of the light.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let address = self
            .address
            .as_deref()
            .ok_or_else(|| anyhow!("no device address; pass --address or store one in the config"))?;
        parse_address(address)
    }

    /// Parsed header target.
    pub fn target(&self) -> Result<Target> {
        match self.target.as_deref() {
            Some(t) => t.parse().with_context(|| format!("invalid target {t:?}")),
            None => Ok(Target::ALL),
        }
    }

    /// Kelvin range as the device adapter wants it.
    pub fn kelvin_range(&self) -> KelvinRange {
        KelvinRange {
            min: self.kelvin_min,
            max: self.kelvin_max,
        }
    }
}

/// Parse `ip:port`, or a bare `ip` using the default light port.
pub fn parse_address(s: &str) -> Result<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let ip: IpAddr = s
        .parse()
        .with_context(|| format!("invalid device address {s:?}"))?;
    Ok(SocketAddr::new(ip, DEFAULT_PORT))
}
