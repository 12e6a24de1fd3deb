//! Animation - Surface-Agnostic Card Entrance
//!
//! Describes how a freshly revealed sentence card enters, independent of how
//! a surface draws it. A surface asks for progress at some elapsed time and
//! maps it onto whatever it can animate (opacity, colour, offset).
//!
//! The entrance is shorter than the reveal's settle delay, so the last card
//! has finished entering by the time a reply is committed.

mod easing;

pub use easing::EasingFunction;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default card entrance length
pub const CARD_ENTRANCE_DURATION: Duration = Duration::from_millis(400);

/// Fade-in of one sentence card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntrance {
    /// Total entrance length
    pub duration: Duration,
    /// Progress curve
    pub easing: EasingFunction,
}

impl Default for CardEntrance {
    fn default() -> Self {
        Self {
            duration: CARD_ENTRANCE_DURATION,
            easing: EasingFunction::EaseOut,
        }
    }
}

impl CardEntrance {
    /// Eased progress (0.0 to 1.0) after `elapsed`
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.easing.apply(t)
    }

    /// Whether the entrance has finished after `elapsed`
    #[must_use]
    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Colour partway between `from` and `to` after `elapsed`
    #[must_use]
    pub fn blend(&self, from: (u8, u8, u8), to: (u8, u8, u8), elapsed: Duration) -> (u8, u8, u8) {
        let p = self.progress(elapsed);
        let mix = |a: u8, b: u8| -> u8 {
            let v = f32::from(a) + (f32::from(b) - f32::from(a)) * p;
            v.round().clamp(0.0, 255.0) as u8
        };
        (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
    }
}
