//! A device abstraction for a bank of calibrated hobby servos.
//!
//! See [`ServoActuator`] for usage.

use crate::config::ArmConfig;
use crate::fmt::{debug, info};
use crate::packet::ServoCommand;
use crate::pwm::PwmDriver;

/// Drives `N` servos through a [`PwmDriver`], applying trim and a hard 0..=180
/// clamp before anything reaches the hardware.
///
/// The actuator records the angle the caller *asked for*, not the trimmed one,
/// so [`angle`](Self::angle) reads back exactly what was commanded.
///
/// # Example
///
/// ```rust
/// use servo_arm::actuator::ServoActuator;
/// use servo_arm::config::ArmConfig;
/// use servo_arm::pwm::PwmDriver;
///
/// #[derive(Default)]
/// struct LastPulse(u16);
///
/// impl PwmDriver for LastPulse {
///     fn begin(&mut self) {}
///     fn set_frequency(&mut self, _hz: u32) {}
///     fn set_channel_pulse(&mut self, _channel: u8, _on_tick: u16, off_tick: u16) {
///         self.0 = off_tick;
///     }
/// }
///
/// let config = ArmConfig::DEFAULT.with_trim_offsets([0, -2, 0, 0, 0, 0]);
/// let mut arm = ServoActuator::new(LastPulse::default(), config);
/// arm.init();
///
/// arm.set_angle(1, 90);
/// assert_eq!(arm.angle(1), 90); // untrimmed value is recorded
/// assert_eq!(arm.driver().0, 245 + 88 * 245 / 180); // pulse for 88°
///
/// arm.set_angle(9, 90); // no such servo: ignored
/// assert_eq!(arm.angle(9), 0);
/// ```
pub struct ServoActuator<D, const N: usize> {
    driver: D,
    config: ArmConfig<N>,
    angles: [u8; N],
}

impl<D: PwmDriver, const N: usize> ServoActuator<D, N> {
    /// Wrap a driver. Nothing is written until [`init`](Self::init).
    ///
    /// Recorded angles start at the configured initial angles.
    #[must_use]
    pub const fn new(driver: D, config: ArmConfig<N>) -> Self {
        Self {
            driver,
            angles: *config.init_angles(),
            config,
        }
    }

    /// Start the driver, set the frame rate, and move every servo to its
    /// initial angle (trim and clamp included).
    pub fn init(&mut self) {
        self.driver.begin();
        self.driver.set_frequency(self.config.pwm_freq_hz());
        info!(
            "servo actuator: {} servos at {}Hz",
            N,
            self.config.pwm_freq_hz()
        );
        let init_angles = *self.config.init_angles();
        for (channel, angle) in (0..=u8::MAX).zip(init_angles) {
            self.set_angle(channel, angle);
        }
    }

    /// Move servo `index` to `angle` degrees.
    ///
    /// Out-of-range indices are ignored. The pulse sent is for the trimmed and
    /// clamped angle. The recorded angle is `angle` unchanged.
    pub fn set_angle(&mut self, index: u8, angle: u8) {
        let servo_index = usize::from(index);
        let Some(recorded) = self.angles.get_mut(servo_index) else {
            return;
        };
        let safe_angle = self.config.safe_angle(servo_index, angle);
        let pulse = self.config.pulse_for(safe_angle);
        self.driver.set_channel_pulse(index, 0, pulse);
        *recorded = angle;
        debug!(
            "servo {} -> {}deg (safe {}deg, pulse {})",
            index, angle, safe_angle, pulse
        );
    }

    /// Apply a decoded command.
    pub fn apply(&mut self, command: ServoCommand) {
        self.set_angle(command.index, command.angle);
    }

    /// Last commanded angle for servo `index`, or 0 if there is no such servo.
    #[must_use]
    pub fn angle(&self, index: u8) -> u8 {
        self.angles.get(usize::from(index)).copied().unwrap_or(0)
    }

    /// Last commanded angle of every servo.
    #[must_use]
    pub const fn angles(&self) -> &[u8; N] {
        &self.angles
    }

    /// Send a zero pulse to every channel so all servos relax.
    ///
    /// Recorded angles are kept.
    pub fn disable_all(&mut self) {
        for channel in (0..=u8::MAX).take(N) {
            self.driver.set_channel_pulse(channel, 0, 0);
        }
        info!("servo actuator: all outputs disabled");
    }

    /// The calibration in use.
    #[must_use]
    pub const fn config(&self) -> &ArmConfig<N> {
        &self.config
    }

    /// The underlying driver.
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The underlying driver, mutably.
    pub const fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Give the driver back.
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }
}
