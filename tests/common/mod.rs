//! Shared fakes for host-level tests.
#![allow(dead_code, reason = "not every test file uses every fake")]

use std::collections::VecDeque;

use embassy_futures::yield_now;
use embassy_time::{Duration, MockDriver};
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use servo_arm::packet::checksum;
use servo_arm::pwm::PwmDriver;

/// One call made on a [`RecordingPwm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwmCall {
    Begin,
    Frequency(u32),
    Pulse { channel: u8, on: u16, off: u16 },
}

/// A [`PwmDriver`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingPwm {
    pub calls: Vec<PwmCall>,
}

impl RecordingPwm {
    /// Only the `set_channel_pulse` calls, as `(channel, off_tick)`.
    pub fn pulses(&self) -> Vec<(u8, u16)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                PwmCall::Pulse { channel, on, off } => {
                    assert_eq!(on, 0, "on-tick is always 0");
                    Some((channel, off))
                }
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl PwmDriver for RecordingPwm {
    fn begin(&mut self) {
        self.calls.push(PwmCall::Begin);
    }

    fn set_frequency(&mut self, hz: u32) {
        self.calls.push(PwmCall::Frequency(hz));
    }

    fn set_channel_pulse(&mut self, channel: u8, on_tick: u16, off_tick: u16) {
        self.calls.push(PwmCall::Pulse {
            channel,
            on: on_tick,
            off: off_tick,
        });
    }
}

enum RxStep {
    Bytes(Vec<u8>),
    Error(ErrorKind),
    Idle(Duration),
}

/// Serial receive side: plays back a script of reads, then end of stream.
#[derive(Default)]
pub struct ScriptedRx {
    steps: VecDeque<RxStep>,
}

impl ScriptedRx {
    /// Deliver `bytes` in reads of at most `chunk_len` bytes.
    pub fn new(bytes: &[u8], chunk_len: usize) -> Self {
        Self::default().then_bytes(bytes, chunk_len)
    }

    /// Then deliver `bytes` in reads of at most `chunk_len` bytes.
    pub fn then_bytes(mut self, bytes: &[u8], chunk_len: usize) -> Self {
        self.steps
            .extend(bytes.chunks(chunk_len).map(|chunk| RxStep::Bytes(chunk.to_vec())));
        self
    }

    /// Then fail one read with `kind`.
    pub fn then_error(mut self, kind: ErrorKind) -> Self {
        self.steps.push_back(RxStep::Error(kind));
        self
    }

    /// Then go quiet while the mock clock moves forward by `gap`.
    pub fn then_idle(mut self, gap: Duration) -> Self {
        self.steps.push_back(RxStep::Idle(gap));
        self
    }
}

impl ErrorType for ScriptedRx {
    type Error = ErrorKind;
}

impl Read for ScriptedRx {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.steps.pop_front() {
                None => return Ok(0),
                Some(RxStep::Error(kind)) => return Err(kind),
                Some(RxStep::Idle(gap)) => {
                    MockDriver::get().advance(gap);
                    // Pending once, so a racing timer gets polled.
                    yield_now().await;
                }
                Some(RxStep::Bytes(mut chunk)) => {
                    let len = chunk.len().min(buf.len());
                    buf[..len].copy_from_slice(&chunk[..len]);
                    if len < chunk.len() {
                        self.steps.push_front(RxStep::Bytes(chunk.split_off(len)));
                    }
                    return Ok(len);
                }
            }
        }
    }
}

/// Serial transmit side: collects everything written.
#[derive(Debug, Default)]
pub struct CapturedTx {
    pub bytes: Vec<u8>,
}

impl CapturedTx {
    /// Written text split into lines (terminators removed).
    pub fn lines(&self) -> Vec<String> {
        let text = String::from_utf8(self.bytes.clone()).expect("status lines are ASCII");
        text.split_terminator("\r\n").map(str::to_owned).collect()
    }
}

impl ErrorType for CapturedTx {
    type Error = ErrorKind;
}

impl Write for CapturedTx {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Serial transmit side that always fails.
#[derive(Debug, Default)]
pub struct BrokenTx;

impl ErrorType for BrokenTx {
    type Error = ErrorKind;
}

impl Write for BrokenTx {
    async fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> {
        Err(ErrorKind::BrokenPipe)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::BrokenPipe)
    }
}

/// A well-formed packet for `(index, angle)`.
pub fn packet(index: u8, angle: u8) -> [u8; 4] {
    [0xFF, index, angle, checksum(0xFF, index, angle)]
}
