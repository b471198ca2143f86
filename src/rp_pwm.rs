//! A [`PwmDriver`] on the RP2040's own PWM slices.
//!
//! Each servo channel gets one PWM slice output. Slices tick at about 1 µs, so
//! a 60 Hz frame is 16 667 compare ticks. The driver's 12-bit pulse values are
//! rescaled to that resolution.
//!
//! See [`RpPwmDriver`] for usage.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{Config, Pwm};

use crate::config::PWM_FREQ_HZ;
use crate::fmt::info;
use crate::pwm::{MICROSECOND_TICK_HZ, PwmDriver, compare_for, frame_top};

#[derive(Debug, Clone, Copy)]
enum SliceOutput {
    A,
    B,
}

/// One servo output: a PWM slice and which of its two pins drives the servo.
pub struct PwmChannel<'d> {
    pwm: Pwm<'d>,
    cfg: Config, // Kept so reconfiguring never resets the divider
    output: SliceOutput,
}

impl<'d> PwmChannel<'d> {
    /// Use output A of a slice, e.g. `Pwm::new_output_a(p.PWM_SLICE0, p.PIN_0, Config::default())`.
    #[must_use]
    pub fn new_output_a(pwm: Pwm<'d>) -> Self {
        Self::new(pwm, SliceOutput::A)
    }

    /// Use output B of a slice, e.g. `Pwm::new_output_b(p.PWM_SLICE0, p.PIN_1, Config::default())`.
    #[must_use]
    pub fn new_output_b(pwm: Pwm<'d>) -> Self {
        Self::new(pwm, SliceOutput::B)
    }

    fn new(pwm: Pwm<'d>, output: SliceOutput) -> Self {
        let mut cfg = Config::default();
        cfg.enable = false;
        Self { pwm, cfg, output }
    }

    fn set_compare(&mut self, compare: u16) {
        match self.output {
            SliceOutput::A => self.cfg.compare_a = compare,
            SliceOutput::B => self.cfg.compare_b = compare,
        }
        self.pwm.set_config(&self.cfg);
    }
}

/// Servo outputs `0..N` on RP2040 PWM slices.
///
/// # Example
///
/// ```rust,no_run
/// # #![no_std]
/// # #![no_main]
/// # use panic_probe as _;
/// use embassy_rp::pwm::{Config, Pwm};
/// use servo_arm::{pwm::PwmDriver, rp_pwm::{PwmChannel, RpPwmDriver}};
///
/// fn example(p: embassy_rp::Peripherals) {
///     let mut pwm = RpPwmDriver::new([
///         PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE0, p.PIN_0, Config::default())),
///         PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, Config::default())),
///     ]);
///     pwm.begin();
///     pwm.set_frequency(60);
///     pwm.set_channel_pulse(0, 0, 368); // about 1.5 ms
/// }
/// ```
pub struct RpPwmDriver<'d, const N: usize> {
    channels: [PwmChannel<'d>; N],
    top: u16,
}

impl<'d, const N: usize> RpPwmDriver<'d, N> {
    /// Take ownership of the servo outputs; channel `i` is `channels[i]`.
    #[must_use]
    pub fn new(channels: [PwmChannel<'d>; N]) -> Self {
        Self {
            channels,
            top: frame_top(PWM_FREQ_HZ),
        }
    }

    fn apply_all(&mut self) {
        for channel in &mut self.channels {
            channel.pwm.set_config(&channel.cfg);
        }
    }
}

impl<const N: usize> PwmDriver for RpPwmDriver<'_, N> {
    fn begin(&mut self) {
        let clk = clk_sys_freq(); // Hz
        // Aim for tick ≈ 1 µs: divider = clk_sys / 1_000_000
        let divider = clk.checked_div(MICROSECOND_TICK_HZ).unwrap_or(1);
        let div_int = u8::try_from(divider.clamp(1, 255)).unwrap_or(u8::MAX);
        for channel in &mut self.channels {
            channel.cfg.top = self.top;
            channel.cfg.phase_correct = false; // edge-aligned => exact 1 µs steps
            channel.cfg.divider = div_int.into();
            channel.cfg.compare_a = 0;
            channel.cfg.compare_b = 0;
            channel.cfg.enable = true;
        }
        self.apply_all();
        info!("rp pwm: clk={}Hz div={} top={}", clk, div_int, self.top);
    }

    fn set_frequency(&mut self, hz: u32) {
        self.top = frame_top(hz);
        for channel in &mut self.channels {
            channel.cfg.top = self.top;
        }
        self.apply_all();
        info!("rp pwm: {}Hz top={}", hz, self.top);
    }

    fn set_channel_pulse(&mut self, channel: u8, on_tick: u16, off_tick: u16) {
        let top = self.top;
        let Some(output) = self.channels.get_mut(usize::from(channel)) else {
            return;
        };
        output.set_compare(compare_for(on_tick, off_tick, top));
    }
}
