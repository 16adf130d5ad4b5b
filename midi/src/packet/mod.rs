use defmt::Format;

use crate::status::{MessageCategory, MessageType};

/// Four byte USB-MIDI event packet: a header with cable number and code index
/// number, followed by up to three MIDI bytes, zero filled.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsbMidiPacket {
    pub header: u8,
    pub data: [u8; 3],
}

impl UsbMidiPacket {
    /// Wraps a complete MIDI message of one to three bytes on cable 0.
    pub fn from_message(message: &[u8]) -> Self {
        debug_assert!(!message.is_empty() && message.len() <= 3);

        let mut data = [0; 3];
        let len = message.len().min(3);
        data[..len].copy_from_slice(&message[..len]);

        Self {
            header: code_index_number(data[0], len),
            data,
        }
    }

    /// Packet for a message that consists of its status byte only.
    pub fn single_byte(status: u8) -> Self {
        Self::from_message(&[status])
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            header: bytes[0],
            data: [bytes[1], bytes[2], bytes[3]],
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.header, self.data[0], self.data[1], self.data[2]]
    }

    pub fn cable(&self) -> u8 {
        self.header >> 4
    }

    pub fn code_index(&self) -> u8 {
        self.header & 0x0F
    }

    pub fn status(&self) -> u8 {
        self.data[0]
    }

    pub fn payload(&self) -> [u8; 3] {
        self.data
    }
}

/// Code index number of a message, as defined by the USB-MIDI class: the
/// status nibble for channel voice, 0xF for single bytes, and a length code
/// for multi-byte system common messages.
fn code_index_number(status: u8, len: usize) -> u8 {
    let kind = MessageType::from_status_byte(status);
    match kind.category() {
        MessageCategory::ChannelVoice => status >> 4,
        MessageCategory::SystemRealTime => 0x0F,
        MessageCategory::SystemCommon => match len {
            2 => 0x02,
            3 => 0x03,
            _ => 0x05,
        },
        MessageCategory::Invalid => 0x0F,
    }
}
