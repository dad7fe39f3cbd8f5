// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transition durations.

use std::fmt;
use std::time::Duration;

/// Transition time carried in messages, in whole milliseconds.
///
/// `u32::MAX` milliseconds is a little under 50 days. Longer durations are
/// not rejected: [`TransitionTime::from_duration`] keeps the low 32 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionTime(pub u32);

impl TransitionTime {
    /// Convert a duration, truncating to millisecond resolution.
    pub fn from_duration(d: Duration) -> Self {
        Self(d.as_millis() as u32)
    }

    /// Convert back into a duration.
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }
}

impl From<Duration> for TransitionTime {
    fn from(d: Duration) -> Self {
        Self::from_duration(d)
    }
}

impl fmt::Display for TransitionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_duration())
    }
}
