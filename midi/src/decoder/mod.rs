use defmt::{Format, trace};

use crate::packet::UsbMidiPacket;
use crate::status::{MessageType, is_status_byte};

pub const MAX_MESSAGE_LEN: usize = 3;

/// Bytes of the message being assembled.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PendingMessage {
    bytes: [u8; MAX_MESSAGE_LEN],
    len: usize,
}

impl PendingMessage {
    fn push(&mut self, byte: u8) {
        debug_assert!(self.len < MAX_MESSAGE_LEN);
        self.bytes[self.len] = byte;
        self.len += 1;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn len(&self) -> usize {
        self.len
    }

    fn status(&self) -> u8 {
        self.bytes[0]
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Reassembles MIDI messages from a UART byte stream, one byte per call.
///
/// Handles running status on input and real-time bytes interleaved in the
/// middle of other messages. Every call does a bounded amount of work, so it
/// can run straight from the receive interrupt.
///
/// System exclusive is not forwarded: its start byte clears running status and
/// the body is dropped up to the next status byte that isn't real-time. A
/// status byte that interrupts an unfinished message abandons that message and
/// starts over with the new byte.
#[derive(Format, Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiDecoder {
    pending: PendingMessage,
    expected_len: usize,
    running_status: Option<u8>,
    skipping_sysex: bool,
}

impl MidiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel voice status reused for messages that omit theirs.
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// True when no message is partially assembled.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, byte: u8) -> Option<UsbMidiPacket> {
        if self.pending.is_empty() {
            self.start_message(byte)
        } else {
            self.continue_message(byte)
        }
    }

    fn start_message(&mut self, byte: u8) -> Option<UsbMidiPacket> {
        if self.skipping_sysex {
            if !is_status_byte(byte) {
                return None;
            }
            if byte >= 0xF8 {
                return Self::real_time(byte);
            }
            self.skipping_sysex = false;
        }

        match self.running_status {
            Some(status) if !is_status_byte(byte) => {
                self.pending.push(status);
                self.pending.push(byte);
            }
            _ => self.pending.push(byte),
        }

        let kind = MessageType::from_status_byte(self.pending.status());
        match kind.expected_length() {
            Some(1) => {
                let packet = UsbMidiPacket::single_byte(self.pending.status());
                self.reset();
                Some(packet)
            }
            Some(len) => {
                self.expected_len = len;
                if self.pending.len() >= len {
                    Some(self.complete())
                } else {
                    None
                }
            }
            None => {
                if kind == MessageType::SystemExclusive {
                    trace!("sysex start, skipping body");
                    self.running_status = None;
                    self.skipping_sysex = true;
                }
                self.reset();
                None
            }
        }
    }

    fn continue_message(&mut self, byte: u8) -> Option<UsbMidiPacket> {
        if is_status_byte(byte) {
            if byte >= 0xF8 {
                return Self::real_time(byte);
            }

            trace!(
                "status {=u8:#x} interrupted {} byte message",
                byte,
                self.pending.len()
            );
            self.reset();
            return self.start_message(byte);
        }

        self.pending.push(byte);
        if self.pending.len() >= self.expected_len {
            Some(self.complete())
        } else {
            None
        }
    }

    /// Real-time bytes pass straight through without touching pending state.
    /// The two undefined ones in that range are dropped.
    fn real_time(byte: u8) -> Option<UsbMidiPacket> {
        MessageType::from_status_byte(byte)
            .is_real_time()
            .then(|| UsbMidiPacket::single_byte(byte))
    }

    fn complete(&mut self) -> UsbMidiPacket {
        let status = self.pending.status();
        let packet = UsbMidiPacket::from_message(self.pending.as_slice());

        self.running_status = MessageType::from_status_byte(status)
            .is_channel_voice()
            .then_some(status);
        self.reset();

        trace!("decoded {}", packet);
        packet
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.expected_len = 0;
    }
}
