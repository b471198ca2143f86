//! Calibration and hardware constants for the arm.
//!
//! Everything here is fixed at build time. [`ArmConfig::new`] checks its
//! invariants with `assert!`, so an invalid table used in a `const` fails the
//! build instead of reaching a servo.

/// Serial link speed shared with the host (8N1 framing).
pub const SERIAL_BAUDRATE: u32 = 115_200;

/// Number of servos on the arm.
pub const SERVO_COUNT: usize = 6;

/// PWM frame rate in Hz. 60 Hz suits analog hobby servos such as the SG90.
pub const PWM_FREQ_HZ: u32 = 60;

/// Slowest frame rate accepted. A slower frame overflows the 16-bit counter of
/// a PWM slice ticking at 1 µs.
pub const MIN_PWM_FREQ_HZ: u32 = 16;

/// Ticks per PWM period on a 12-bit driver.
pub const PWM_TICKS: u16 = 4096;

/// Largest tick value a 12-bit driver accepts.
pub const PWM_TICK_MAX: u16 = 4095;

/// Pulse for 0°, in 12-bit ticks. At 60 Hz one tick is about 4.07 µs, so 245 ≈ 1.0 ms.
pub const MIN_PULSE: u16 = 245;

/// Pulse for 180°, in 12-bit ticks (≈ 2.0 ms at 60 Hz).
pub const MAX_PULSE: u16 = 490;

/// Largest angle a servo may be commanded to, in degrees.
pub const MAX_ANGLE: u8 = 180;

/// Power-on target angle per servo.
pub const INIT_ANGLES: [u8; SERVO_COUNT] = [90, 90, 90, 90, 90, 90];

/// Per-servo trim in degrees, added to every commanded angle.
///
/// If a servo commanded to 90 settles at 92, its trim is -2. Index 0 is the
/// gripper, index 5 the base rotation.
pub const TRIM_OFFSETS: [i8; SERVO_COUNT] = [0, 0, 0, 0, 0, 0];

/// Calibration for an arm of `N` servos.
///
/// # Example
///
/// ```rust
/// use servo_arm::config::ArmConfig;
///
/// const GRIPPER_ONLY: ArmConfig<1> = ArmConfig::new(50, 205, 410, [0], [-3]);
///
/// assert_eq!(GRIPPER_ONLY.safe_angle(0, 0), 0); // trim cannot push below 0°
/// assert_eq!(GRIPPER_ONLY.pulse_for(180), 410);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmConfig<const N: usize> {
    pwm_freq_hz: u32,
    min_pulse: u16,
    max_pulse: u16,
    init_angles: [u8; N],
    trim_offsets: [i8; N],
}

impl ArmConfig<SERVO_COUNT> {
    /// The calibrated 6-servo arm built from this module's constants.
    pub const DEFAULT: Self = Self::new(
        PWM_FREQ_HZ,
        MIN_PULSE,
        MAX_PULSE,
        INIT_ANGLES,
        TRIM_OFFSETS,
    );
}

impl<const N: usize> ArmConfig<N> {
    /// Create a configuration for `N` servos.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `N` is 0 or above
    /// 255, if `pwm_freq_hz` is below [`MIN_PWM_FREQ_HZ`], if
    /// `min_pulse >= max_pulse`, if `max_pulse` exceeds 12 bits, or if an
    /// initial angle is above 180.
    #[must_use]
    pub const fn new(
        pwm_freq_hz: u32,
        min_pulse: u16,
        max_pulse: u16,
        init_angles: [u8; N],
        trim_offsets: [i8; N],
    ) -> Self {
        assert!(N > 0, "at least one servo required");
        assert!(N <= 255, "servo index must fit in a packet byte");
        assert!(
            pwm_freq_hz >= MIN_PWM_FREQ_HZ,
            "pwm_freq_hz must be at least 16"
        );
        assert!(min_pulse < max_pulse, "min_pulse must be less than max_pulse");
        assert!(max_pulse <= PWM_TICK_MAX, "max_pulse must fit in 12 bits");
        let mut remaining: &[u8] = &init_angles;
        while let [angle, rest @ ..] = remaining {
            assert!(*angle <= MAX_ANGLE, "initial angles must be within 0..=180");
            remaining = rest;
        }
        Self {
            pwm_freq_hz,
            min_pulse,
            max_pulse,
            init_angles,
            trim_offsets,
        }
    }

    /// Same configuration with a different trim table.
    #[must_use]
    pub const fn with_trim_offsets(self, trim_offsets: [i8; N]) -> Self {
        Self::new(
            self.pwm_freq_hz,
            self.min_pulse,
            self.max_pulse,
            self.init_angles,
            trim_offsets,
        )
    }

    /// Same configuration with different power-on angles.
    #[must_use]
    pub const fn with_init_angles(self, init_angles: [u8; N]) -> Self {
        Self::new(
            self.pwm_freq_hz,
            self.min_pulse,
            self.max_pulse,
            init_angles,
            self.trim_offsets,
        )
    }

    /// PWM frame rate in Hz.
    #[must_use]
    pub const fn pwm_freq_hz(&self) -> u32 {
        self.pwm_freq_hz
    }

    /// Pulse for 0°, in 12-bit ticks.
    #[must_use]
    pub const fn min_pulse(&self) -> u16 {
        self.min_pulse
    }

    /// Pulse for 180°, in 12-bit ticks.
    #[must_use]
    pub const fn max_pulse(&self) -> u16 {
        self.max_pulse
    }

    /// Power-on angles.
    #[must_use]
    pub const fn init_angles(&self) -> &[u8; N] {
        &self.init_angles
    }

    /// Trim table in degrees.
    #[must_use]
    pub const fn trim_offsets(&self) -> &[i8; N] {
        &self.trim_offsets
    }

    /// Apply the servo's trim, then clamp into 0..=180.
    ///
    /// An out-of-range `servo_index` gets no trim.
    #[must_use]
    pub fn safe_angle(&self, servo_index: usize, angle: u8) -> u8 {
        let trim = self.trim_offsets.get(servo_index).copied().unwrap_or(0);
        // i16 holds every u8 + i8 sum, including negative ones.
        let trimmed = i16::from(angle).saturating_add(i16::from(trim));
        let clamped = trimmed.clamp(0, i16::from(MAX_ANGLE));
        u8::try_from(clamped).unwrap_or(MAX_ANGLE)
    }

    /// Map 0..=180° linearly onto `min_pulse..=max_pulse`.
    ///
    /// The division truncates toward zero, like Arduino's `map()`. Angles
    /// above 180 are treated as 180.
    #[must_use]
    pub fn pulse_for(&self, safe_angle: u8) -> u16 {
        let degrees = u32::from(safe_angle.min(MAX_ANGLE));
        let span = u32::from(self.max_pulse.saturating_sub(self.min_pulse));
        let offset = degrees
            .saturating_mul(span)
            .checked_div(u32::from(MAX_ANGLE))
            .unwrap_or(0);
        let pulse = u32::from(self.min_pulse).saturating_add(offset);
        u16::try_from(pulse).unwrap_or(self.max_pulse)
    }
}
