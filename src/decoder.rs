//! Byte-at-a-time decoder for the binary servo protocol.
//!
//! See [`PacketDecoder`] for usage.

use derive_more::{Display, Error};

use crate::config::MAX_ANGLE;
use crate::fmt::warning;
use crate::packet::{PACKET_HEADER, PACKET_LEN, Packet, ServoCommand};

/// Why a completed packet was discarded.
///
/// `Display` gives the text the firmware reports after `"ERR: "`.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// The checksum byte did not match `header + index + angle`.
    #[display("Checksum mismatch")]
    ChecksumMismatch {
        /// Checksum computed from the first three bytes.
        expected: u8,
        /// Checksum byte as received.
        received: u8,
    },
    /// The checksum matched but the index or angle is out of range.
    #[display("Invalid data range")]
    InvalidDataRange {
        /// Received servo index.
        index: u8,
        /// Received angle.
        angle: u8,
    },
}

/// Which packet byte the decoder expects next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Dropping bytes until a 0xFF header arrives.
    #[default]
    AwaitingHeader,
    /// Header seen; next byte is the servo index.
    AwaitingIndex,
    /// Next byte is the angle.
    AwaitingAngle,
    /// Next byte is the checksum; it completes the packet.
    AwaitingChecksum,
}

impl DecoderState {
    /// State after consuming `byte`.
    ///
    /// Every cycle ends back in [`AwaitingHeader`](Self::AwaitingHeader), and a
    /// non-header byte in that state is dropped.
    #[must_use]
    pub const fn next(self, byte: u8) -> Self {
        match self {
            Self::AwaitingHeader if byte == PACKET_HEADER => Self::AwaitingIndex,
            Self::AwaitingHeader | Self::AwaitingChecksum => Self::AwaitingHeader,
            Self::AwaitingIndex => Self::AwaitingAngle,
            Self::AwaitingAngle => Self::AwaitingChecksum,
        }
    }

    /// Buffer slot the byte received in this state is stored in.
    const fn slot(self) -> usize {
        match self {
            Self::AwaitingHeader => 0,
            Self::AwaitingIndex => 1,
            Self::AwaitingAngle => 2,
            Self::AwaitingChecksum => 3,
        }
    }
}

/// Assembles 4-byte packets and validates them for an arm of `N` servos.
///
/// Feed it one byte at a time. It returns `Some` exactly once per completed
/// packet, whether the packet was accepted or rejected. A stray byte between
/// packets is dropped while waiting for a header. A stray byte inside a packet
/// shifts the frame, and the checksum catches it.
///
/// There is no inter-byte timeout here. If a byte is lost mid-frame, the next
/// packet's bytes complete the broken one until a header lines up again. Use
/// [`reset`](Self::reset) (or the link's idle reset) to drop a stale partial
/// packet.
///
/// # Example
///
/// ```rust
/// use servo_arm::decoder::{DecoderState, PacketDecoder};
/// use servo_arm::packet::ServoCommand;
///
/// let mut decoder = PacketDecoder::<6>::new();
/// assert_eq!(decoder.feed(0x01), None); // noise, dropped
/// assert_eq!(decoder.feed(0xFF), None);
/// assert_eq!(decoder.feed(0x02), None);
/// assert_eq!(decoder.feed(0x5A), None);
/// assert_eq!(
///     decoder.feed(0x5B),
///     Some(Ok(ServoCommand { index: 2, angle: 90 }))
/// );
/// assert_eq!(decoder.state(), DecoderState::AwaitingHeader);
/// ```
#[derive(Clone, Debug)]
pub struct PacketDecoder<const N: usize> {
    state: DecoderState,
    buffer: [u8; PACKET_LEN],
}

impl<const N: usize> Default for PacketDecoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacketDecoder<N> {
    /// A decoder waiting for a header.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::AwaitingHeader,
            buffer: [0; PACKET_LEN],
        }
    }

    /// The byte the decoder expects next.
    #[must_use]
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    /// Abandon any partial packet.
    pub const fn reset(&mut self) {
        self.state = DecoderState::AwaitingHeader;
    }

    /// Consume one byte.
    ///
    /// Returns `None` until the fourth byte of a packet arrives, then the
    /// validated command or the reason it was rejected.
    pub fn feed(&mut self, byte: u8) -> Option<Result<ServoCommand, PacketError>> {
        let state = self.state;
        let next = state.next(byte);
        if state == DecoderState::AwaitingHeader && next == DecoderState::AwaitingHeader {
            return None;
        }
        if let Some(slot) = self.buffer.get_mut(state.slot()) {
            *slot = byte;
        }
        self.state = next;
        if state == DecoderState::AwaitingChecksum {
            Some(Self::finalize(Packet::from_bytes(self.buffer)))
        } else {
            None
        }
    }

    /// Checksum first, then range.
    fn finalize(packet: Packet) -> Result<ServoCommand, PacketError> {
        if !packet.is_checksum_valid() {
            let (expected, received) = (packet.expected_checksum(), packet.received_checksum());
            warning!("checksum mismatch: expected {} got {}", expected, received);
            return Err(PacketError::ChecksumMismatch { expected, received });
        }
        let (index, angle) = (packet.index(), packet.angle());
        if usize::from(index) >= N || angle > MAX_ANGLE {
            warning!("out of range: servo {} angle {}", index, angle);
            return Err(PacketError::InvalidDataRange { index, angle });
        }
        Ok(ServoCommand { index, angle })
    }
}
