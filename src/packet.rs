//! The 4-byte wire packet: `[0xFF][index][angle][checksum]`.
//!
//! The checksum is the low 8 bits of `header + index + angle`. It covers the
//! header too, so a stray byte that shifts the frame is caught.

use crate::config::MAX_ANGLE;
use crate::{Error, Result};

/// Sentinel byte that starts every packet.
pub const PACKET_HEADER: u8 = 0xFF;

/// Length of a packet on the wire.
pub const PACKET_LEN: usize = 4;

/// Low 8 bits of `header + index + angle`.
#[must_use]
pub const fn checksum(header: u8, index: u8, angle: u8) -> u8 {
    header.wrapping_add(index).wrapping_add(angle)
}

/// A fully assembled packet, not yet validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    /// Wrap four received bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw wire bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    /// Header byte (0xFF for any packet the decoder assembled).
    #[must_use]
    pub const fn header(&self) -> u8 {
        let [header, ..] = self.0;
        header
    }

    /// Servo index byte.
    #[must_use]
    pub const fn index(&self) -> u8 {
        let [_, index, ..] = self.0;
        index
    }

    /// Angle byte.
    #[must_use]
    pub const fn angle(&self) -> u8 {
        let [.., angle, _] = self.0;
        angle
    }

    /// Checksum byte as received.
    #[must_use]
    pub const fn received_checksum(&self) -> u8 {
        let [.., checksum] = self.0;
        checksum
    }

    /// Checksum computed over the first three bytes.
    #[must_use]
    pub const fn expected_checksum(&self) -> u8 {
        checksum(self.header(), self.index(), self.angle())
    }

    /// Whether the received checksum matches the computed one.
    #[must_use]
    pub const fn is_checksum_valid(&self) -> bool {
        self.expected_checksum() == self.received_checksum()
    }
}

impl From<Packet> for [u8; PACKET_LEN] {
    fn from(packet: Packet) -> Self {
        packet.0
    }
}

/// A validated "move servo `index` to `angle`" command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoCommand {
    /// Servo index, `0..N`.
    pub index: u8,
    /// Angle in degrees, `0..=180`.
    pub angle: u8,
}

impl ServoCommand {
    /// Build a command for an arm of `N` servos, rejecting anything the
    /// firmware would answer with `ERR: Invalid data range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] if `index >= N` or `angle > 180`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use servo_arm::packet::ServoCommand;
    ///
    /// let command = ServoCommand::new::<6>(2, 90)?;
    /// assert_eq!(command.to_packet().as_bytes(), &[0xFF, 0x02, 0x5A, 0x5B]);
    /// assert!(ServoCommand::new::<6>(6, 90).is_err());
    /// # Ok::<(), servo_arm::Error>(())
    /// ```
    pub fn new<const N: usize>(index: u8, angle: u8) -> Result<Self> {
        if usize::from(index) < N && angle <= MAX_ANGLE {
            Ok(Self { index, angle })
        } else {
            Err(Error::InvalidCommand { index, angle })
        }
    }

    /// Encode as a packet with a correct checksum.
    #[must_use]
    pub const fn to_packet(self) -> Packet {
        Packet([
            PACKET_HEADER,
            self.index,
            self.angle,
            checksum(PACKET_HEADER, self.index, self.angle),
        ])
    }
}
