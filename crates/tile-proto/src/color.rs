// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! HSBK color value.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Encoded size of a [`Color`] in bytes.
pub const COLOR_WIRE_SIZE: usize = 8;

/// Hue, saturation, brightness and kelvin, each a full-range `u16`.
///
/// Values are copied verbatim onto the wire; device-specific clean-up
/// (kelvin bounds) happens before a color reaches a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Hue, `0..=65535` maps onto `0..360` degrees.
    pub hue: u16,
    /// Saturation, `0..=65535` maps onto `0.0..=1.0`.
    pub saturation: u16,
    /// Brightness, `0..=65535` maps onto `0.0..=1.0`.
    pub brightness: u16,
    /// Color temperature in kelvin.
    pub kelvin: u16,
}

impl Color {
    /// All channels zero ("off").
    pub const BLACK: Color = Color::new(0, 0, 0, 0);

    /// Construct a color from raw channel values.
    pub const fn new(hue: u16, saturation: u16, brightness: u16, kelvin: u16) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            kelvin,
        }
    }

    /// Construct a color from hue in degrees and unit-interval saturation and
    /// brightness. Hue wraps; saturation and brightness clamp to `0.0..=1.0`.
    #[allow(clippy::cast_sign_loss)]
    pub fn from_hsbk(hue_degrees: f64, saturation: f64, brightness: f64, kelvin: u16) -> Self {
        let unit = |v: f64| (v.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16;
        let hue = (hue_degrees.rem_euclid(360.0) / 360.0 * f64::from(u16::MAX)).round() as u16;
        Self::new(hue, unit(saturation), unit(brightness), kelvin)
    }

    /// Brightness as a fraction in `0.0..=1.0`.
    pub fn brightness_fraction(&self) -> f64 {
        f64::from(self.brightness) / f64::from(u16::MAX)
    }

    pub(crate) fn put(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.hue);
        buf.put_u16_le(self.saturation);
        buf.put_u16_le(self.brightness);
        buf.put_u16_le(self.kelvin);
    }

    // Caller guarantees COLOR_WIRE_SIZE bytes remain.
    pub(crate) fn get(buf: &mut impl Buf) -> Self {
        Self {
            hue: buf.get_u16_le(),
            saturation: buf.get_u16_le(),
            brightness: buf.get_u16_le(),
            kelvin: buf.get_u16_le(),
        }
    }
}

/// Inclusive kelvin range supported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KelvinRange {
    /// Lowest accepted color temperature.
    pub min: u16,
    /// Highest accepted color temperature.
    pub max: u16,
}

impl Default for KelvinRange {
    fn default() -> Self {
        Self {
            min: 2500,
            max: 9000,
        }
    }
}

impl KelvinRange {
    /// Return `color` with its kelvin channel pulled into range.
    pub fn clamp(&self, color: Color) -> Color {
        Color {
            kelvin: color.kelvin.clamp(self.min, self.max.max(self.min)),
            ..color
        }
    }
}
