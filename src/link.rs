//! The serial link that feeds host bytes to the arm and answers each packet.
//!
//! See [`ArmLink`] for usage.

use core::ops::ControlFlow;

use derive_more::Display;
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Timer};
use embedded_io_async::{Read, Write};

use crate::actuator::ServoActuator;
use crate::decoder::{DecoderState, PacketDecoder, PacketError};
use crate::fmt::{debug, info, warning};
use crate::pwm::PwmDriver;
use crate::{Error, Result};

/// Bytes requested from the transport per read.
const READ_CHUNK: usize = 16;

/// Line terminator after each status, matching Arduino's `println`.
const LINE_END: &[u8] = b"\r\n";

/// Line a host waits for after opening the port.
pub const READY_LINE: &str = "Ready.";

/// The one-line reply sent for every completed packet.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// The command was applied.
    #[display("OK")]
    Ok,
    /// The packet was corrupted in transit and discarded.
    #[display("ERR: Checksum mismatch")]
    ChecksumMismatch,
    /// The checksum passed but the servo index or angle was out of range.
    #[display("ERR: Invalid data range")]
    InvalidDataRange,
}

impl Status {
    /// The reply text, without line terminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ChecksumMismatch => "ERR: Checksum mismatch",
            Self::InvalidDataRange => "ERR: Invalid data range",
        }
    }
}

impl From<PacketError> for Status {
    fn from(err: PacketError) -> Self {
        match err {
            PacketError::ChecksumMismatch { .. } => Self::ChecksumMismatch,
            PacketError::InvalidDataRange { .. } => Self::InvalidDataRange,
        }
    }
}

/// Couples a [`PacketDecoder`] to a [`ServoActuator`] and speaks the status
/// protocol over an `embedded-io-async` transport.
///
/// One `ArmLink` owns all mutable protocol and servo state, so a single task
/// can run it without locks.
///
/// # Example
///
/// ```rust
/// use servo_arm::actuator::ServoActuator;
/// use servo_arm::config::ArmConfig;
/// use servo_arm::link::{ArmLink, Status};
/// use servo_arm::pwm::PwmDriver;
///
/// struct NoPwm;
///
/// impl PwmDriver for NoPwm {
///     fn begin(&mut self) {}
///     fn set_frequency(&mut self, _hz: u32) {}
///     fn set_channel_pulse(&mut self, _channel: u8, _on_tick: u16, _off_tick: u16) {}
/// }
///
/// let mut link = ArmLink::new(ServoActuator::new(NoPwm, ArmConfig::DEFAULT));
/// link.init();
///
/// let replies: Vec<_> = [0xFF, 0x02, 0x5A, 0x5B]
///     .into_iter()
///     .filter_map(|byte| link.process_byte(byte))
///     .collect();
/// assert_eq!(replies, [Status::Ok]);
/// assert_eq!(link.actuator().angle(2), 90);
/// ```
pub struct ArmLink<D, const N: usize> {
    decoder: PacketDecoder<N>,
    actuator: ServoActuator<D, N>,
}

impl<D: PwmDriver, const N: usize> ArmLink<D, N> {
    /// Create a link around an actuator. Call [`init`](Self::init) before use.
    #[must_use]
    pub const fn new(actuator: ServoActuator<D, N>) -> Self {
        Self {
            decoder: PacketDecoder::new(),
            actuator,
        }
    }

    /// Initialize the servos and start from a clean decoder.
    pub fn init(&mut self) {
        self.actuator.init();
        self.decoder.reset();
    }

    /// Feed one byte. Returns the reply once a packet completes.
    pub fn process_byte(&mut self, byte: u8) -> Option<Status> {
        match self.decoder.feed(byte)? {
            Ok(command) => {
                self.actuator.apply(command);
                Some(Status::Ok)
            }
            Err(err) => Some(err.into()),
        }
    }

    /// Read bytes from `rx` until it reports end of stream, writing a status
    /// line to `tx` for every completed packet.
    ///
    /// A partial packet waits indefinitely for its remaining bytes; see
    /// [`PacketDecoder`] for what that means when a byte is lost. A read error
    /// (framing, parity, overrun) is treated as line noise: any partial packet
    /// is dropped and reading continues.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if writing a status line fails.
    pub async fn run<R: Read, W: Write>(&mut self, rx: &mut R, tx: &mut W) -> Result<()> {
        info!("arm link: running");
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read_result = rx.read(&mut chunk).await;
            if self.handle_read(read_result, &chunk, tx).await?.is_break() {
                return Ok(());
            }
        }
    }

    /// Like [`run`](Self::run), but a partial packet is dropped if no byte
    /// arrives for `idle`.
    ///
    /// A host writes each packet's four bytes back to back, so the gap only
    /// exceeds `idle` after a lost byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if writing a status line fails.
    pub async fn run_with_idle_reset<R: Read, W: Write>(
        &mut self,
        rx: &mut R,
        tx: &mut W,
        idle: Duration,
    ) -> Result<()> {
        info!("arm link: running, idle reset {}ms", idle.as_millis());
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read_result = if self.decoder.state() == DecoderState::AwaitingHeader {
                rx.read(&mut chunk).await
            } else {
                match select(rx.read(&mut chunk), Timer::after(idle)).await {
                    Either::First(read_result) => read_result,
                    Either::Second(()) => {
                        debug!("arm link: dropping partial packet");
                        self.decoder.reset();
                        continue;
                    }
                }
            };
            if self.handle_read(read_result, &chunk, tx).await?.is_break() {
                return Ok(());
            }
        }
    }

    /// Process one read. Breaks on end of stream.
    async fn handle_read<E: embedded_io_async::Error, W: Write>(
        &mut self,
        read_result: core::result::Result<usize, E>,
        chunk: &[u8],
        tx: &mut W,
    ) -> Result<ControlFlow<()>> {
        match read_result {
            Ok(0) => {
                info!("arm link: transport closed");
                Ok(ControlFlow::Break(()))
            }
            Ok(received) => {
                self.process_chunk(chunk.get(..received).unwrap_or(chunk), tx)
                    .await?;
                Ok(ControlFlow::Continue(()))
            }
            Err(err) => {
                warning!("arm link: read error {}, dropping partial packet", err.kind());
                self.decoder.reset();
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    async fn process_chunk<W: Write>(&mut self, bytes: &[u8], tx: &mut W) -> Result<()> {
        for &byte in bytes {
            if let Some(status) = self.process_byte(byte) {
                write_status(tx, status).await?;
            }
        }
        Ok(())
    }

    /// The packet decoder.
    #[must_use]
    pub const fn decoder(&self) -> &PacketDecoder<N> {
        &self.decoder
    }

    /// The servo actuator.
    #[must_use]
    pub const fn actuator(&self) -> &ServoActuator<D, N> {
        &self.actuator
    }

    /// The servo actuator, mutably (for example to [`disable_all`](ServoActuator::disable_all)).
    pub const fn actuator_mut(&mut self) -> &mut ServoActuator<D, N> {
        &mut self.actuator
    }
}

/// Write [`READY_LINE`], telling a host that the arm has initialized.
///
/// # Errors
///
/// Returns [`Error::Transport`] if the write fails.
pub async fn announce_ready<W: Write>(tx: &mut W) -> Result<()> {
    write_line(tx, READY_LINE).await
}

async fn write_status<W: Write>(tx: &mut W, status: Status) -> Result<()> {
    write_line(tx, status.as_str()).await
}

async fn write_line<W: Write>(tx: &mut W, text: &str) -> Result<()> {
    tx.write_all(text.as_bytes())
        .await
        .map_err(Error::transport)?;
    tx.write_all(LINE_END).await.map_err(Error::transport)?;
    tx.flush().await.map_err(Error::transport)
}
