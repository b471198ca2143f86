//! The seam between servo logic and PWM hardware.
//!
//! Also holds the arithmetic for drivers whose counter ticks at 1 µs, such as
//! an RP2040 PWM slice.

use crate::config::{PWM_TICK_MAX, PWM_TICKS};

/// Counter rate of a 1 µs PWM tick.
pub const MICROSECOND_TICK_HZ: u32 = 1_000_000;

/// A multi-channel, 12-bit PWM output such as a PCA9685 servo driver.
///
/// Channel numbers are servo indices. Within each period of
/// [`PWM_TICKS`](crate::config::PWM_TICKS) ticks, the output goes high at
/// `on_tick` and low at `off_tick`. A zero pulse (`0, 0`) de-energizes the
/// output, so the servo relaxes.
///
/// Writes are infallible: a servo command must never halt the arm.
pub trait PwmDriver {
    /// Power up and reset the driver.
    fn begin(&mut self);

    /// Set the PWM frame rate for all channels.
    fn set_frequency(&mut self, hz: u32);

    /// Set one channel's on/off ticks (`0..=4095`).
    fn set_channel_pulse(&mut self, channel: u8, on_tick: u16, off_tick: u16);
}

impl<D: PwmDriver + ?Sized> PwmDriver for &mut D {
    fn begin(&mut self) {
        (**self).begin();
    }

    fn set_frequency(&mut self, hz: u32) {
        (**self).set_frequency(hz);
    }

    fn set_channel_pulse(&mut self, channel: u8, on_tick: u16, off_tick: u16) {
        (**self).set_channel_pulse(channel, on_tick, off_tick);
    }
}

/// Counter `top` for a frame of `frame_hz` at 1 µs per tick.
///
/// The frame is `top + 1` ticks. Rates below
/// [`MIN_PWM_FREQ_HZ`](crate::config::MIN_PWM_FREQ_HZ) do not fit a 16-bit
/// counter and give `u16::MAX`. A rate of 0 is treated as 1 Hz.
///
/// ```rust
/// use servo_arm::pwm::frame_top;
///
/// assert_eq!(frame_top(60), 16_665);
/// ```
#[must_use]
pub fn frame_top(frame_hz: u32) -> u16 {
    let ticks = MICROSECOND_TICK_HZ
        .checked_div(frame_hz)
        .unwrap_or(MICROSECOND_TICK_HZ);
    u16::try_from(ticks.saturating_sub(1)).unwrap_or(u16::MAX)
}

/// Rescale a 12-bit `on_tick..off_tick` pulse to a compare value for a counter
/// that wraps at `top`.
///
/// `off_tick` is capped at 4095. A pulse that ends before it starts gives 0.
#[must_use]
pub fn compare_for(on_tick: u16, off_tick: u16, top: u16) -> u16 {
    let width = off_tick.min(PWM_TICK_MAX).saturating_sub(on_tick);
    let frame_ticks = u32::from(top).saturating_add(1);
    let compare = u32::from(width)
        .saturating_mul(frame_ticks)
        .checked_div(u32::from(PWM_TICKS))
        .unwrap_or(0);
    u16::try_from(compare).unwrap_or(top)
}
