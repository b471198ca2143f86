//! Binary serial protocol and calibrated servo control for a 6-servo robotic arm.
//!
//! A host sends 4-byte packets (`[0xFF][servo][angle][checksum]`). The firmware
//! decodes them a byte at a time, applies per-servo trim and a hard 0..=180
//! clamp, and writes 12-bit pulses to a PWM driver. Each packet gets a
//! one-line reply: `OK`, `ERR: Checksum mismatch`, or `ERR: Invalid data range`.
//!
//! - [`decoder`]: the packet state machine.
//! - [`actuator`]: trim, clamp, angle-to-pulse, and recorded angles.
//! - [`link`]: ties both to an `embedded-io-async` serial transport.
//! - [`pwm`]: the driver seam; `rp_pwm` implements it on RP2040 PWM slices
//!   (`embedded` feature).
//!
//! # Glossary
//!
//! - **Trim offset:** per-servo signed degrees added to every commanded angle to
//!   compensate for how the servo horn was mounted.
//! - **Safety clamp:** the 0..=180 limit applied *after* trim, so no trim table
//!   can command a servo past its stops.
//! - **Pulse value:** a 12-bit tick count (0..=4095 per PWM period) derived
//!   linearly from the clamped angle.
#![cfg_attr(not(test), no_std)]

// Compile-time check: the embedded build needs a board
#[cfg(all(feature = "embedded", not(feature = "pico1")))]
compile_error!("The 'embedded' feature needs a board feature: 'pico1'");

mod error;
mod fmt;

pub mod actuator;
pub mod config;
pub mod decoder;
pub mod link;
pub mod packet;
pub mod pwm;
#[cfg(feature = "embedded")]
pub mod rp_pwm;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
