//! Error and result types shared across the crate.

use derive_more::{Display, Error, From};
use embedded_io_async::ErrorKind;

use crate::decoder::PacketError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced by the arm link and by host-side command construction.
///
/// Rejected packets never stop the firmware: the link turns a
/// [`PacketError`] into a status line and keeps reading.
#[derive(Debug, Display, Error, From, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A completed packet failed validation.
    #[display("packet rejected: {_0}")]
    Packet(PacketError),

    /// The serial transport failed to write a reply.
    #[display("transport error: {_0:?}")]
    #[from(ignore)]
    Transport(#[error(not(source))] ErrorKind),

    /// A command was built with a servo index or angle outside the arm's range.
    #[display("invalid command: servo {index}, angle {angle}")]
    #[from(ignore)]
    InvalidCommand {
        /// Requested servo index.
        index: u8,
        /// Requested angle in degrees.
        angle: u8,
    },
}

impl Error {
    /// Wrap an `embedded-io` error by its portable kind.
    #[must_use]
    #[expect(
        clippy::needless_pass_by_value,
        reason = "takes the error by value so it can be passed to `map_err`"
    )]
    pub fn transport(err: impl embedded_io_async::Error) -> Self {
        Self::Transport(err.kind())
    }
}
